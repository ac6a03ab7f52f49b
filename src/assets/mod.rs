//! Asset Resolver subsystem.
//!
//! # Data Flow
//! ```text
//! request path
//!     → key.rs (normalize to ResourceKey)
//!     → store.rs (ObjectStore::get)
//!     → resolver.rs (SPA fallback rules, status selection)
//!     → policy (content type, cache, security headers)
//!     → streamed response
//! ```
//!
//! # Design Decisions
//! - One canonical fallback-suppression rule for every site: reserved
//!   build directory OR static asset extension
//! - Storage errors become a generic 500; details go to logs only

pub mod key;
pub mod resolver;
pub mod store;

pub use key::{ResourceKey, INDEX_KEY};
pub use resolver::{AssetOutcome, AssetResolver, Resolution};
pub use store::{FsObjectStore, MemoryObjectStore, ObjectRecord, ObjectStore, StoreError};
