//! Upstream forwarding for rewritten requests.
//!
//! # Responsibilities
//! - Send the client's request to the rewrite destination
//! - Stream both bodies instead of buffering them
//! - Strip hop-by-hop headers in both directions
//!
//! # Design Decisions
//! - Rewrite, not redirect: upstream redirects are passed back verbatim
//! - No retries; a failed upstream is a 502 with a generic body

use std::time::Duration;

use axum::body::{Body, HttpBody};
use axum::http::header::{self, HeaderMap, HeaderName};
use axum::http::Request;
use axum::response::Response;
use url::Url;

use crate::config::TimeoutConfig;
use crate::error::GatewayError;

const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Connection-scoped headers that must not be forwarded.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    // Headers named in Connection are hop-by-hop too
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// HTTP client for rewrite destinations.
#[derive(Debug, Clone)]
pub struct Upstream {
    client: reqwest::Client,
}

impl Upstream {
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.upstream_connect_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }

    /// Forward `request` to `destination` and stream the answer back.
    pub async fn forward(
        &self,
        request: Request<Body>,
        destination: Url,
    ) -> Result<Response, GatewayError> {
        let (parts, body) = request.into_parts();

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        if let Some(host) = headers.remove(header::HOST) {
            headers.insert(X_FORWARDED_HOST, host);
        }

        let body = if body.size_hint().exact() == Some(0) {
            reqwest::Body::from(Vec::new())
        } else {
            reqwest::Body::wrap_stream(body.into_data_stream())
        };

        let upstream_host = destination.host_str().unwrap_or("unknown").to_string();
        let upstream_path = destination.path().to_string();

        let response = self
            .client
            .request(parts.method, destination)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    upstream = %upstream_host,
                    path = %upstream_path,
                    error = %e.without_url(),
                    "Upstream request failed"
                );
                GatewayError::UpstreamUnavailable
            })?;

        let status = response.status();
        let mut response_headers = response.headers().clone();
        strip_hop_by_hop(&mut response_headers);

        let mut forwarded = Response::new(Body::from_stream(response.bytes_stream()));
        *forwarded.status_mut() = status;
        *forwarded.headers_mut() = response_headers;
        Ok(forwarded)
    }
}
