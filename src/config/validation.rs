//! Configuration validation.
//!
//! Serde handles syntax; this module checks semantics and returns every
//! problem found rather than stopping at the first.

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route match path `{0}` must start with '/'")]
    RelativeMatchPath(String),

    #[error("route match path `{0}` is declared more than once")]
    DuplicateMatchPath(String),

    #[error("route `{path}` has an invalid target `{target}`")]
    InvalidTarget { path: String, target: String },

    #[error("pending route `{0}` must start with '/'")]
    RelativePendingRoute(String),

    #[error("site route prefix `{0}` must start with '/'")]
    RelativeRoutePrefix(String),

    #[error("`{field}` value `{value}` contains route pattern syntax")]
    RoutePattern { field: &'static str, value: String },

    #[error("pending route `{0}` collides with a health route")]
    PendingRouteCollision(String),

    #[error("`{0}` must not be empty")]
    Empty(&'static str),

    #[error("`{0}` must be greater than zero")]
    Zero(&'static str),

    #[error("trusted source `{0}` contains characters not allowed in a header")]
    InvalidTrustedSource(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for route in &config.routing.fallback {
        if !route.match_path.starts_with('/') {
            errors.push(ValidationError::RelativeMatchPath(route.match_path.clone()));
        }
        // Host-scoped entries may share a path with entries for other hosts
        let identity = (route.match_path.as_str(), route.host.as_deref());
        if !seen.insert(identity) {
            errors.push(ValidationError::DuplicateMatchPath(route.match_path.clone()));
        }
        if let Some(target) = &route.target {
            let valid = Url::parse(target)
                .map(|url| !url.cannot_be_a_base())
                .unwrap_or(false);
            if !valid {
                errors.push(ValidationError::InvalidTarget {
                    path: route.match_path.clone(),
                    target: target.clone(),
                });
            }
        }
    }

    let routing = &config.routing;
    if !routing.pending_route.starts_with('/') {
        errors.push(ValidationError::RelativePendingRoute(routing.pending_route.clone()));
    }
    if routing.sso_param.trim().is_empty() {
        errors.push(ValidationError::Empty("routing.sso_param"));
    }
    if routing.pending_param.trim().is_empty() {
        errors.push(ValidationError::Empty("routing.pending_param"));
    }
    if config.remote_config.table_key.trim().is_empty() {
        errors.push(ValidationError::Empty("remote_config.table_key"));
    }

    if has_route_syntax(&routing.pending_route) {
        errors.push(ValidationError::RoutePattern {
            field: "routing.pending_route",
            value: routing.pending_route.clone(),
        });
    }
    if health_routes(config).contains(&routing.pending_route) {
        errors.push(ValidationError::PendingRouteCollision(routing.pending_route.clone()));
    }

    if let Some(site) = &config.site {
        if !site.route_prefix.starts_with('/') {
            errors.push(ValidationError::RelativeRoutePrefix(site.route_prefix.clone()));
        }
        if has_route_syntax(&site.route_prefix) {
            errors.push(ValidationError::RoutePattern {
                field: "site.route_prefix",
                value: site.route_prefix.clone(),
            });
        }
        if site.storage_root.trim().is_empty() {
            errors.push(ValidationError::Empty("site.storage_root"));
        }
    }

    if config.remote_config.timeout_ms == 0 {
        errors.push(ValidationError::Zero("remote_config.timeout_ms"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.timeouts.upstream_connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.upstream_connect_secs"));
    }

    for source in &config.security.trusted_sources {
        if source.is_empty() || !source.chars().all(|c| c.is_ascii_graphic()) || source.contains(';') {
            errors.push(ValidationError::InvalidTrustedSource(source.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Captures, wildcards and `:` segments are router syntax, not literal paths.
fn has_route_syntax(path: &str) -> bool {
    path.contains(['{', '}', '*']) || path.split('/').any(|segment| segment.starts_with(':'))
}

/// Paths the server mounts the health handler on.
fn health_routes(config: &GatewayConfig) -> Vec<String> {
    let mut routes = vec!["/health".to_string()];
    if let Some(site) = &config.site {
        let prefix = site.route_prefix.trim_end_matches('/');
        if !prefix.is_empty() {
            routes.push(format!("{prefix}/health"));
        }
    }
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{RouteConfig, SiteConfig};

    fn route(path: &str, target: Option<&str>) -> RouteConfig {
        RouteConfig {
            match_path: path.to_string(),
            target: target.map(str::to_string),
            is_regulated: false,
            name: None,
            host: None,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.routing.fallback = vec![
            route("/inventory", Some("https://inv.internal")),
            route("/inventory", None),
            route("reports", None),
            route("/meds", Some("not a url")),
        ];
        config.routing.sso_param = String::new();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateMatchPath("/inventory".into())));
        assert!(errors.contains(&ValidationError::RelativeMatchPath("reports".into())));
        assert!(errors.contains(&ValidationError::InvalidTarget {
            path: "/meds".into(),
            target: "not a url".into(),
        }));
        assert!(errors.contains(&ValidationError::Empty("routing.sso_param")));
        assert!(errors.contains(&ValidationError::Zero("timeouts.request_secs")));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_same_path_on_different_hosts() {
        let mut config = GatewayConfig::default();
        let mut a = route("/", Some("https://handouts.internal"));
        a.host = Some("handouts.example.com".into());
        let mut b = route("/", Some("https://kiosk.internal"));
        b.host = Some("kiosk.example.com".into());
        config.routing.fallback = vec![a, b];
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_site_prefix_must_be_absolute() {
        let mut config = GatewayConfig::default();
        config.site = Some(SiteConfig {
            storage_root: "/srv/site".into(),
            route_prefix: "compliance".into(),
            is_regulated: false,
        });
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::RelativeRoutePrefix("compliance".into())]);
    }

    #[test]
    fn test_pending_route_must_not_shadow_health() {
        let mut config = GatewayConfig::default();
        config.routing.pending_route = "/health".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::PendingRouteCollision("/health".into())]);

        config.routing.pending_route = "/meds/health".into();
        assert!(validate_config(&config).is_ok());
        config.site = Some(SiteConfig {
            storage_root: "/srv/site".into(),
            route_prefix: "/meds/".into(),
            is_regulated: true,
        });
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::PendingRouteCollision("/meds/health".into())]
        );
    }

    #[test]
    fn test_route_syntax_is_rejected() {
        let mut config = GatewayConfig::default();
        config.routing.pending_route = "/coming-soon/{app}".into();
        config.site = Some(SiteConfig {
            storage_root: "/srv/site".into(),
            route_prefix: "/*rest".into(),
            is_regulated: false,
        });
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::RoutePattern {
            field: "routing.pending_route",
            value: "/coming-soon/{app}".into(),
        }));
        assert!(errors.contains(&ValidationError::RoutePattern {
            field: "site.route_prefix",
            value: "/*rest".into(),
        }));
        assert_eq!(errors.len(), 2);

        config.routing.pending_route = "/:app".into();
        config.site = None;
        assert_eq!(validate_config(&config).unwrap_err().len(), 1);
    }

    #[test]
    fn test_trusted_source_rejects_directive_injection() {
        let mut config = GatewayConfig::default();
        config.security.trusted_sources = vec!["https://a.example; script-src *".into()];
        assert!(validate_config(&config).is_err());
    }
}
