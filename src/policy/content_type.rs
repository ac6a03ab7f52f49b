//! Content-Type detection by resource key.
//!
//! Storage hints are never trusted; the type is derived from the key's
//! extension alone.

/// Fallback for unknown or missing extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

pub const HTML: &str = "text/html; charset=utf-8";

/// Last path segment of a key.
pub fn final_segment(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Lowercased extension of the key's final segment, if it has one.
pub fn extension(key: &str) -> Option<String> {
    let segment = final_segment(key);
    let (stem, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() || (stem.is_empty() && !segment[1..].contains('.')) {
        // ".env"-style dotfiles carry no extension
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Content-Type for a resource key.
pub fn content_type_for(key: &str) -> &'static str {
    match extension(key).as_deref() {
        // Documents
        Some("html" | "htm") => HTML,
        Some("txt") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",
        Some("pdf") => "application/pdf",

        // Styles and scripts
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json" | "map") => "application/json",
        Some("webmanifest") => "application/manifest+json",
        Some("wasm") => "application/wasm",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("eot") => "application/vnd.ms-fontobject",

        _ => OCTET_STREAM,
    }
}
