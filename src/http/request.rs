//! Per-request context and request IDs.
//!
//! # Responsibilities
//! - Derive `RequestContext` once per request (host, path, query, cookies)
//! - Generate a UUID v4 request ID when the client sent none
//!
//! # Design Decisions
//! - The context is read-only after construction
//! - Hostname is lowercased with any port stripped
//! - Path never includes the query string

use std::collections::HashMap;

use axum::http::request::Parts;
use axum::http::{header, HeaderName, HeaderValue, Method, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Routing-relevant view of an incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub hostname: String,
    pub path: String,
    pub method: Method,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    pub query_params: Vec<(String, String)>,
    pub cookies: HashMap<String, String>,
}

impl RequestContext {
    pub fn from_parts(parts: &Parts) -> Self {
        let hostname = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| parts.uri.host())
            .map(strip_port)
            .unwrap_or_default()
            .to_ascii_lowercase();

        let query = parts.uri.query().map(str::to_string);
        let query_params = query
            .as_deref()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        let cookies = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                Some((name.trim().to_string(), value.trim().to_string()))
            })
            .collect();

        Self {
            hostname,
            path: parts.uri.path().to_string(),
            method: parts.method.clone(),
            query,
            query_params,
            cookies,
        }
    }

    /// True if any of the named cookies is present with a non-empty value.
    pub fn has_session(&self, cookie_names: &[String]) -> bool {
        cookie_names
            .iter()
            .any(|name| self.cookies.get(name).is_some_and(|v| !v.is_empty()))
    }

    pub fn has_query_param(&self, name: &str) -> bool {
        self.query_params.iter().any(|(key, _)| key == name)
    }
}

fn strip_port(host: &str) -> &str {
    // IPv6 literals keep their brackets
    if let Some(end) = host.find(']') {
        return &host[..=end];
    }
    host.split(':').next().unwrap_or(host)
}

/// Request ID generator (UUID v4).
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID of a request, or "unknown" before the ID layer ran.
pub fn request_id(headers: &axum::http::HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}
