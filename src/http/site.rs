//! Static-site surface: one application's bundle served from object storage.
//!
//! Every per-application entry point is this one component, parameterised
//! by storage binding, route prefix and regulated flag.

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::IF_NONE_MATCH;
use axum::http::{Method, Request};
use axum::response::{IntoResponse, Response};

use crate::assets::{AssetResolver, FsObjectStore, ObjectStore};
use crate::config::SiteConfig;
use crate::error::GatewayError;
use crate::http::methods::{ensure_allowed, SITE_METHODS};
use crate::policy::PolicySettings;

#[derive(Debug, Clone)]
pub struct StaticSite {
    resolver: AssetResolver,
    /// Normalised: "" for the root, otherwise "/prefix" without trailing slash.
    route_prefix: String,
}

impl StaticSite {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        route_prefix: &str,
        is_regulated: bool,
        settings: PolicySettings,
    ) -> Self {
        Self {
            resolver: AssetResolver::new(store, is_regulated, settings),
            route_prefix: route_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Site backed by a directory on disk.
    pub fn from_config(site: &SiteConfig, settings: PolicySettings) -> Self {
        let store = Arc::new(FsObjectStore::new(&site.storage_root));
        Self::new(store, &site.route_prefix, site.is_regulated, settings)
    }

    pub fn route_prefix(&self) -> &str {
        if self.route_prefix.is_empty() {
            "/"
        } else {
            &self.route_prefix
        }
    }

    /// Path relative to the route prefix, or `None` when outside it.
    pub fn strip_prefix<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.route_prefix.is_empty() {
            return Some(path);
        }
        match path.strip_prefix(self.route_prefix.as_str())? {
            "" => Some("/"),
            rest if rest.starts_with('/') => Some(rest),
            _ => None,
        }
    }

    /// Serve one request from the bundle.
    pub async fn serve(&self, request: Request<Body>) -> Response {
        if let Err(e) = ensure_allowed(request.method(), SITE_METHODS) {
            return e.into_response();
        }

        let Some(path) = self.strip_prefix(request.uri().path()) else {
            return GatewayError::AssetNotFound.into_response();
        };

        let if_none_match = request
            .headers()
            .get(IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok());
        let head_only = request.method() == Method::HEAD;

        self.resolver
            .resolve(path)
            .await
            .respond(if_none_match, head_only)
    }
}
