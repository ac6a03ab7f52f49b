//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Identity reported by the health endpoint and logs.
    pub service: ServiceConfig,

    /// Remote route-table service.
    pub remote_config: RemoteConfig,

    /// Dispatch behaviour and the static fallback table.
    pub routing: RoutingConfig,

    /// Locally served static site, if any.
    pub site: Option<SiteConfig>,

    /// Cache windows for asset responses.
    pub cache: CacheConfig,

    /// Security header settings.
    pub security: SecurityConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Service identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub version: String,
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "edge-gateway".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "production".to_string(),
        }
    }
}

/// Remote configuration service settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Connection string, e.g. `https://config.example.com/<config-id>?token=<token>`.
    /// Unset means every fetch fails and the static table is used.
    pub connection_string: Option<String>,

    /// Logical key of the route table item.
    pub table_key: String,

    /// Upper bound on a single fetch, in milliseconds.
    pub timeout_ms: u64,

    /// Reuse a successfully fetched table for this long. Zero fetches per request.
    pub cache_ttl_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            table_key: "appUrls".to_string(),
            timeout_ms: 2_000,
            cache_ttl_secs: 0,
        }
    }
}

/// Request dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Enable the router variant. When false only the local site is served.
    pub enabled: bool,

    /// Static fallback routes. Empty means the compiled-in table.
    pub fallback: Vec<RouteConfig>,

    /// Cookies whose presence marks an authenticated session.
    pub session_cookies: Vec<String>,

    /// Query parameter added to rewrites for authenticated sessions.
    pub sso_param: String,

    /// Route rendering the "not yet available" placeholder.
    pub pending_route: String,

    /// Query parameter carrying the application name to the placeholder.
    pub pending_param: String,

    /// Emit the `x-gateway-route` diagnostic header.
    pub route_header: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fallback: Vec::new(),
            session_cookies: vec![
                "sb-access-token".to_string(),
                "sb-refresh-token".to_string(),
                "gangerplatform-auth-token".to_string(),
            ],
            sso_param: "sso".to_string(),
            pending_route: "/coming-soon".to_string(),
            pending_param: "app".to_string(),
            route_header: true,
        }
    }
}

/// One static route definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Path matched exactly or as a prefix.
    pub match_path: String,

    /// Deployment target. Absent means declared but not yet deployed.
    #[serde(default)]
    pub target: Option<String>,

    /// Regulated applications get strict transport and content security headers.
    #[serde(default)]
    pub is_regulated: bool,

    /// Application name shown by the placeholder page.
    #[serde(default)]
    pub name: Option<String>,

    /// Host header to match (case-insensitive). Absent matches any host.
    #[serde(default)]
    pub host: Option<String>,
}

/// Static site served from object storage.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Storage binding: root directory of the site bundle.
    pub storage_root: String,

    /// Prefix the site is mounted under ("/" for the host root).
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,

    #[serde(default)]
    pub is_regulated: bool,
}

fn default_route_prefix() -> String {
    "/".to_string()
}

/// Cache windows for non-immutable assets.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Max-age for HTML documents, in seconds.
    pub html_max_age_secs: u64,

    /// Max-age for every other asset, in seconds.
    pub default_max_age_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            html_max_age_secs: 3_600,
            default_max_age_secs: 86_400,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Sources trusted by the content security policy of regulated apps.
    pub trusted_sources: Vec<String>,

    /// Strict-Transport-Security max-age, in seconds.
    pub hsts_max_age_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            trusted_sources: vec![
                "https://*.gangerdermatology.com".to_string(),
                "https://*.supabase.co".to_string(),
            ],
            hsts_max_age_secs: 31_536_000,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Connection establishment timeout for rewrites, in seconds.
    pub upstream_connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_connect_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
