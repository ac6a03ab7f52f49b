//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + process environment
//!     → loader.rs (parse, deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared by value with every subsystem at startup
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server rebuilds the static fallback table and swaps it atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Only the variables named in `loader` are read from the environment

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CacheConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, RemoteConfig, RouteConfig,
    RoutingConfig, SecurityConfig, ServiceConfig, SiteConfig, TimeoutConfig,
};
