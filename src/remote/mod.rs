//! Config Resolver subsystem.
//!
//! # Data Flow
//! ```text
//! table key
//!     → connection.rs (endpoint, config id, token from process config)
//!     → resolver.rs (single GET, bounded by timeout)
//!     → table_format.rs (JSON → RouteTable)
//!     → Ok(RouteTable) | Err(FetchFailure)
//! ```
//!
//! # Design Decisions
//! - Two-case outcome; no error escapes as a panic or propagates further
//! - No retries; the dispatcher falls back to the static table instead
//! - The token never appears in logs or error text

pub mod connection;
pub mod resolver;
pub mod table_format;

pub use connection::Connection;
pub use resolver::{FetchFailure, RemoteConfigResolver, RouteSource};
