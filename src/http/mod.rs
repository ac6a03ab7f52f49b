//! Gateway Entry Point subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, security headers, request ID, timeout)
//!     → health.rs | placeholder.rs (fixed routes, no routing work)
//!     → methods.rs (allow-list, 405 + Allow)
//!     → request.rs (RequestContext)
//!     → routing::Dispatcher
//!         Rewrite     → rewrite.rs (stream to upstream and back)
//!         Pending     → placeholder.rs
//!         PassThrough → site.rs (Asset Resolver) or 404
//! ```

pub mod health;
pub mod methods;
pub mod placeholder;
pub mod request;
pub mod rewrite;
pub mod server;
pub mod site;

pub use request::{RequestContext, X_REQUEST_ID};
pub use server::{GatewayServer, ServerError};
pub use site::StaticSite;
