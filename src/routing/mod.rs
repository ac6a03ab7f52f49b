//! Request Dispatcher subsystem.
//!
//! # Data Flow
//! ```text
//! RequestContext (host, path, query, cookies)
//!     → dispatcher.rs (remote table via RouteSource, else fallback.rs)
//!     → table.rs + matcher.rs (first matching entry, declaration order)
//!     → Dispatch: Rewrite | Pending | PassThrough
//!
//! Fallback table (startup and config reload):
//!     RouteConfig[] or compiled-in applications
//!     → RouteTable (validated, immutable)
//!     → RouteTableStore::replace (atomic swap)
//! ```
//!
//! # Design Decisions
//! - Tables are immutable; refresh swaps the whole table
//! - No regex in hot path (exact or prefix matching only)
//! - Deterministic: same table and request always give the same decision

pub mod dispatcher;
pub mod fallback;
pub mod matcher;
pub mod table;

pub use dispatcher::{Dispatch, DispatchSettings, Dispatcher};
pub use table::{RouteEntry, RouteTable, RouteTableStore, TableError};
