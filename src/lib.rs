//! Edge request router and static-asset gateway.
//!
//! Decides per request which independently deployed application handles
//! it, serves pre-built application bundles with single-page-application
//! semantics, and applies one security and caching policy to all of them.

pub mod assets;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod policy;
pub mod remote;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use error::GatewayError;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
