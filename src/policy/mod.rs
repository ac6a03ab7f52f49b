//! Content Policy Engine.
//!
//! # Data Flow
//! ```text
//! ResourceKey + is_regulated
//!     → content_type.rs (extension table)
//!     → cache_control.rs (immutable / service worker / html / default)
//!     → security_headers.rs (baseline + regulated extras)
//!     → ResponsePolicy (fresh per response)
//! ```
//!
//! # Design Decisions
//! - Pure functions, no I/O
//! - Storage content-type hints are ignored
//! - Policies are computed per response and never shared

pub mod cache_control;
pub mod content_type;
pub mod security_headers;

use axum::http::header::{HeaderMap, HeaderValue, CACHE_CONTROL, CONTENT_TYPE};

use crate::config::{CacheConfig, SecurityConfig};

pub use cache_control::cache_control_for;
pub use content_type::content_type_for;
pub use security_headers::security_headers;

/// Settings the engine needs beyond the key itself.
#[derive(Debug, Clone, Default)]
pub struct PolicySettings {
    pub cache: CacheConfig,
    pub security: SecurityConfig,
}

/// Response headers computed for one resource.
#[derive(Debug, Clone)]
pub struct ResponsePolicy {
    pub content_type: &'static str,
    pub cache_control: String,
    pub security_headers: HeaderMap,
}

impl ResponsePolicy {
    /// Compute the policy for a storage key.
    pub fn for_key(key: &str, is_regulated: bool, settings: &PolicySettings) -> Self {
        Self {
            content_type: content_type_for(key),
            cache_control: cache_control_for(key, &settings.cache),
            security_headers: security_headers(is_regulated, &settings.security),
        }
    }

    /// Policy for generic error bodies: plain text, never cached, same
    /// security headers as the resource would have had.
    pub fn for_error(self) -> Self {
        Self {
            content_type: "text/plain; charset=utf-8",
            cache_control: cache_control::NO_STORE.to_string(),
            security_headers: self.security_headers,
        }
    }

    /// Write every header of this policy into `headers`.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        if let Ok(value) = HeaderValue::from_str(&self.cache_control) {
            headers.insert(CACHE_CONTROL, value);
        }
        for (name, value) in &self.security_headers {
            headers.insert(name.clone(), value.clone());
        }
    }
}
