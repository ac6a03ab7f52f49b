//! Security response headers.
//!
//! The baseline set goes on every response the gateway produces. Regulated
//! applications additionally get HSTS and a content security policy limited
//! to the platform's own domains plus the configured trusted sources.

use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, CONTENT_SECURITY_POLICY, REFERRER_POLICY,
    STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
};

use crate::config::SecurityConfig;

pub const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

/// Headers applied to every response, regulated or not.
pub const BASELINE: [(HeaderName, &str); 4] = [
    (X_FRAME_OPTIONS, "DENY"),
    (X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (REFERRER_POLICY, "strict-origin-when-cross-origin"),
    (
        PERMISSIONS_POLICY,
        "camera=(), microphone=(), geolocation=(), payment=()",
    ),
];

/// Write the baseline headers into `headers`, replacing existing values.
pub fn apply_baseline(headers: &mut HeaderMap) {
    for (name, value) in BASELINE {
        headers.insert(name, HeaderValue::from_static(value));
    }
}

/// Security headers for a response.
pub fn security_headers(is_regulated: bool, settings: &SecurityConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    apply_baseline(&mut headers);

    if !is_regulated {
        return headers;
    }

    let hsts = format!("max-age={}; includeSubDomains", settings.hsts_max_age_secs);
    if let Ok(value) = HeaderValue::from_str(&hsts) {
        headers.insert(STRICT_TRANSPORT_SECURITY, value);
    }

    let csp = content_security_policy(&settings.trusted_sources);
    match HeaderValue::from_str(&csp) {
        Ok(value) => {
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(_) => {
            // Validation rejects such sources; fall back to self-only
            tracing::warn!("Trusted sources produce an invalid CSP header, using 'self' only");
            headers.insert(
                CONTENT_SECURITY_POLICY,
                HeaderValue::from_static("default-src 'self'; frame-ancestors 'none'"),
            );
        }
    }

    headers
}

/// Build the CSP value for regulated applications.
pub fn content_security_policy(trusted_sources: &[String]) -> String {
    let trusted = trusted_sources.join(" ");
    let with_trusted = |base: &str| {
        if trusted.is_empty() {
            base.to_string()
        } else {
            format!("{base} {trusted}")
        }
    };

    [
        "default-src 'self'".to_string(),
        with_trusted("script-src 'self'"),
        with_trusted("style-src 'self' 'unsafe-inline'"),
        with_trusted("img-src 'self' data: blob:"),
        with_trusted("connect-src 'self'"),
        "font-src 'self' data:".to_string(),
        "frame-ancestors 'none'".to_string(),
        "base-uri 'self'".to_string(),
        "form-action 'self'".to_string(),
    ]
    .join("; ")
}
