//! Cache-Control directives by resource key.
//!
//! Rules are evaluated in priority order:
//! 1. immutable build output → one year, immutable
//! 2. service-worker scripts → always revalidate
//! 3. HTML documents → short window
//! 4. everything else → medium window

use crate::config::CacheConfig;
use crate::policy::content_type::{extension, final_segment};

pub const IMMUTABLE: &str = "public, max-age=31536000, immutable";
pub const REVALIDATE: &str = "public, max-age=0, must-revalidate";

/// Used on error responses, which must never be cached.
pub const NO_STORE: &str = "no-store";

/// Directories holding content-hashed build output.
pub const IMMUTABLE_PREFIXES: &[&str] = &["_next/static/", "assets/", "static/"];

const SERVICE_WORKER_NAMES: &[&str] = &["sw.js", "service-worker.js", "worker.js"];

/// True if the key lies under a content-hashed build output directory.
pub fn is_immutable_build_output(key: &str) -> bool {
    IMMUTABLE_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
}

/// True if the key names a service worker, which browsers must always revalidate.
pub fn is_service_worker(key: &str) -> bool {
    let name = final_segment(key).to_ascii_lowercase();
    SERVICE_WORKER_NAMES.contains(&name.as_str())
        || (name.starts_with("workbox-") && name.ends_with(".js"))
}

/// Cache-Control value for a resource key.
pub fn cache_control_for(key: &str, windows: &CacheConfig) -> String {
    if is_immutable_build_output(key) {
        IMMUTABLE.to_string()
    } else if is_service_worker(key) {
        REVALIDATE.to_string()
    } else if extension(key).as_deref() == Some("html") {
        format!("public, max-age={}, must-revalidate", windows.html_max_age_secs)
    } else {
        format!("public, max-age={}", windows.default_max_age_secs)
    }
}
