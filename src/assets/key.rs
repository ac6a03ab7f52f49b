//! Request path → storage key normalization.
//!
//! ```text
//! "/"                     → "index.html"
//! "/foo/"                 → "foo/index.html"
//! "/foo"                  → "foo.html"
//! "/assets/app.abc123.js" → "assets/app.abc123.js"
//! ```

use crate::policy::cache_control::is_immutable_build_output;
use crate::policy::content_type::{extension, final_segment};

/// Root document, also the single-page-application shell.
pub const INDEX_KEY: &str = "index.html";

/// Extensions of build artifacts that must never fall back to the app shell.
pub const STATIC_EXTENSIONS: &[&str] = &[
    "js", "mjs", "css", "map", "json", "webmanifest", "ico", "png", "jpg", "jpeg", "gif", "svg",
    "webp", "avif", "woff", "woff2", "ttf", "otf", "eot", "txt", "xml", "wasm",
];

/// Normalized storage lookup key for one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Derive the key from a request path.
    pub fn from_path(path: &str) -> Self {
        let path = if path.is_empty() { "/" } else { path };

        let full = if path == "/" {
            INDEX_KEY.to_string()
        } else if path.ends_with('/') {
            format!("{path}{INDEX_KEY}")
        } else if !final_segment(path).contains('.') {
            format!("{path}.html")
        } else {
            path.to_string()
        };

        let key = full.strip_prefix('/').unwrap_or(&full);
        Self(key.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// False for keys that could escape the storage root.
    pub fn is_safe(&self) -> bool {
        !self.0.starts_with('/')
            && !self.0.contains('\0')
            && !self.0.contains('\\')
            && self.0.split('/').all(|segment| segment != "..")
    }

    /// Build-internal or static asset keys: a miss is a real 404, not an app route.
    pub fn is_build_internal(&self) -> bool {
        is_immutable_build_output(&self.0)
            || extension(&self.0)
                .map(|ext| STATIC_EXTENSIONS.contains(&ext.as_str()))
                .unwrap_or(false)
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
