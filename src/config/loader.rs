//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Remote-config connection string.
pub const ENV_CONNECTION_STRING: &str = "EDGE_CONFIG";
pub const ENV_ENVIRONMENT: &str = "GATEWAY_ENVIRONMENT";
pub const ENV_SERVICE_VERSION: &str = "GATEWAY_SERVICE_VERSION";
pub const ENV_SERVICE_NAME: &str = "GATEWAY_SERVICE_NAME";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text, then apply environment overrides.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let mut config: GatewayConfig = toml::from_str(content)?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Defaults plus environment overrides, for running without a config file.
pub fn default_config() -> Result<GatewayConfig, ConfigError> {
    let mut config = GatewayConfig::default();
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay the process configuration surface onto a parsed config.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(conn) = non_empty(ENV_CONNECTION_STRING) {
        config.remote_config.connection_string = Some(conn);
    }
    if let Some(env) = non_empty(ENV_ENVIRONMENT) {
        config.service.environment = env;
    }
    if let Some(version) = non_empty(ENV_SERVICE_VERSION) {
        config.service.version = version;
    }
    if let Some(name) = non_empty(ENV_SERVICE_NAME) {
        config.service.name = name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_minimal_config() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.routing.sso_param, "sso");
        assert_eq!(config.remote_config.table_key, "appUrls");
        assert!(config.site.is_none());
    }

    #[test]
    fn test_parse_full_sections() {
        let raw = r#"
            [service]
            name = "staff-router"
            environment = "staging"

            [remote_config]
            connection_string = "https://config.example.com/ecfg_1?token=abc"
            cache_ttl_secs = 30

            [[routing.fallback]]
            match_path = "/inventory"
            target = "https://inv.internal"

            [[routing.fallback]]
            match_path = "/reports"

            [site]
            storage_root = "/srv/staff"
            is_regulated = true
        "#;
        let config: GatewayConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.service.name, "staff-router");
        assert_eq!(config.routing.fallback.len(), 2);
        assert!(config.routing.fallback[1].target.is_none());
        let site = config.site.unwrap();
        assert_eq!(site.route_prefix, "/");
        assert!(site.is_regulated);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_CONNECTION_STRING, "https://config.example.com/ecfg_2?token=t"),
            (ENV_ENVIRONMENT, "development"),
            (ENV_SERVICE_VERSION, ""),
        ]
        .into_iter()
        .collect();

        let mut config = GatewayConfig::default();
        let default_version = config.service.version.clone();
        apply_env_overrides(&mut config, |name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(
            config.remote_config.connection_string.as_deref(),
            Some("https://config.example.com/ecfg_2?token=t")
        );
        assert_eq!(config.service.environment, "development");
        // Empty values are ignored
        assert_eq!(config.service.version, default_version);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let raw = r#"
            [[routing.fallback]]
            match_path = "inventory"
        "#;
        match parse_config(raw) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
