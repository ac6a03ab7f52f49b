//! Gateway error taxonomy.
//!
//! Every failure inside the gateway ends up as one of these outcomes before
//! a response is written. Bodies are generic; details go to logs only.

use axum::http::header::{HeaderValue, ALLOW, CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::policy::cache_control::NO_STORE;
use crate::policy::security_headers::apply_baseline;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Remote route table unavailable; the static table is used instead.
    #[error("route configuration unavailable")]
    ConfigUnavailable,

    /// No route matched and there is no local site to pass through to.
    #[error("no route matches the request")]
    NoRouteMatch,

    #[error("application `{0}` is not deployed yet")]
    PendingDeployment(String),

    #[error("asset not found")]
    AssetNotFound,

    #[error("asset fetch failed")]
    AssetFetchFailure,

    #[error("method {method} not allowed")]
    MethodNotAllowed {
        method: Method,
        allowed: &'static [Method],
    },

    /// Rewrite destination could not be reached.
    #[error("upstream unavailable")]
    UpstreamUnavailable,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ConfigUnavailable | Self::PendingDeployment(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::NoRouteMatch | Self::AssetNotFound => StatusCode::NOT_FOUND,
            Self::AssetFetchFailure => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
        }
    }

    /// Client-safe body text.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::ConfigUnavailable | Self::PendingDeployment(_) => "Service Unavailable",
            Self::NoRouteMatch | Self::AssetNotFound => "Not Found",
            Self::AssetFetchFailure => "Internal Server Error",
            Self::MethodNotAllowed { .. } => "Method Not Allowed",
            Self::UpstreamUnavailable => "Bad Gateway",
        }
    }
}

/// `Allow` header value for an allow-list.
pub fn allow_header(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), self.public_message()).into_response();
        let headers = response.headers_mut();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
        apply_baseline(headers);

        if let Self::MethodNotAllowed { allowed, .. } = &self {
            if let Ok(value) = HeaderValue::from_str(&allow_header(allowed)) {
                headers.insert(ALLOW, value);
            }
        }
        response
    }
}
