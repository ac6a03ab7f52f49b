//! Asset resolution with single-page-application fallback.
//!
//! ```text
//! path → ResourceKey
//!     → store.get(key)
//!         found             → 200, policy(key)
//!         missing + build   → 404
//!         missing otherwise → store.get("index.html")
//!                               found   → 200, policy(index.html)
//!                               missing → 404
//!     any storage error     → 500
//! ```

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{HeaderValue, ETAG};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::assets::key::{ResourceKey, INDEX_KEY};
use crate::assets::store::{ObjectRecord, ObjectStore, StoreError};
use crate::error::GatewayError;
use crate::observability::metrics;
use crate::policy::{PolicySettings, ResponsePolicy};

/// Which branch of the algorithm produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOutcome {
    Found,
    SpaFallback,
    NotFound,
    FetchFailure,
}

impl AssetOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::SpaFallback => "spa_fallback",
            Self::NotFound => "not_found",
            Self::FetchFailure => "fetch_failure",
        }
    }
}

/// Result of resolving one request path.
#[derive(Debug)]
pub struct Resolution {
    pub status: StatusCode,
    pub policy: ResponsePolicy,
    pub body: Body,
    pub etag: Option<String>,
    pub outcome: AssetOutcome,
}

impl Resolution {
    fn object(record: ObjectRecord, policy: ResponsePolicy, outcome: AssetOutcome) -> Self {
        Self {
            status: StatusCode::OK,
            policy,
            body: record.body,
            etag: Some(record.etag),
            outcome,
        }
    }

    fn error(error: GatewayError, policy: ResponsePolicy, outcome: AssetOutcome) -> Self {
        Self {
            status: error.status(),
            policy: policy.for_error(),
            body: Body::from(error.public_message()),
            etag: None,
            outcome,
        }
    }

    fn not_found(policy: ResponsePolicy) -> Self {
        Self::error(GatewayError::AssetNotFound, policy, AssetOutcome::NotFound)
    }

    fn failure(policy: ResponsePolicy) -> Self {
        Self::error(GatewayError::AssetFetchFailure, policy, AssetOutcome::FetchFailure)
    }

    /// Build the HTTP response, honouring `If-None-Match` and HEAD.
    pub fn respond(self, if_none_match: Option<&str>, head_only: bool) -> Response {
        let not_modified = self.status == StatusCode::OK
            && self
                .etag
                .as_deref()
                .is_some_and(|etag| etag_matches(if_none_match, etag));

        let (status, body) = if not_modified {
            (StatusCode::NOT_MODIFIED, Body::empty())
        } else if head_only {
            (self.status, Body::empty())
        } else {
            (self.status, self.body)
        };

        let mut response = (status, body).into_response();
        self.policy.apply(response.headers_mut());
        if let Some(value) = self.etag.as_deref().and_then(|e| HeaderValue::from_str(e).ok()) {
            response.headers_mut().insert(ETAG, value);
        }
        response
    }
}

impl IntoResponse for Resolution {
    fn into_response(self) -> Response {
        self.respond(None, false)
    }
}

/// True if the client's `If-None-Match` list contains `etag` or `*`.
pub fn etag_matches(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|header| {
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate == etag || candidate.strip_prefix("W/") == Some(etag)
        })
    })
}

/// Resolves request paths against one application's bundle.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    store: Arc<dyn ObjectStore>,
    is_regulated: bool,
    settings: PolicySettings,
}

impl AssetResolver {
    pub fn new(store: Arc<dyn ObjectStore>, is_regulated: bool, settings: PolicySettings) -> Self {
        Self {
            store,
            is_regulated,
            settings,
        }
    }

    fn policy(&self, key: &str) -> ResponsePolicy {
        ResponsePolicy::for_key(key, self.is_regulated, &self.settings)
    }

    /// Resolve a request path to a response.
    pub async fn resolve(&self, path: &str) -> Resolution {
        let key = ResourceKey::from_path(path);
        let resolution = self.resolve_key(&key).await;
        metrics::record_asset_resolution(resolution.outcome.as_str());
        tracing::debug!(
            path = %path,
            key = %key,
            status = resolution.status.as_u16(),
            outcome = resolution.outcome.as_str(),
            "Asset resolved"
        );
        resolution
    }

    async fn resolve_key(&self, key: &ResourceKey) -> Resolution {
        if !key.is_safe() {
            tracing::warn!(key = %key, "Rejected unsafe resource key");
            return Resolution::not_found(self.policy(INDEX_KEY));
        }

        match self.store.get(key.as_str()).await {
            Ok(Some(record)) => {
                Resolution::object(record, self.policy(key.as_str()), AssetOutcome::Found)
            }
            Ok(None) if key.is_build_internal() => Resolution::not_found(self.policy(key.as_str())),
            Ok(None) => self.resolve_shell(key).await,
            Err(e) => self.storage_failure(key.as_str(), &e),
        }
    }

    async fn resolve_shell(&self, requested: &ResourceKey) -> Resolution {
        match self.store.get(INDEX_KEY).await {
            Ok(Some(record)) => {
                Resolution::object(record, self.policy(INDEX_KEY), AssetOutcome::SpaFallback)
            }
            Ok(None) => Resolution::not_found(self.policy(requested.as_str())),
            Err(e) => self.storage_failure(INDEX_KEY, &e),
        }
    }

    fn storage_failure(&self, key: &str, error: &StoreError) -> Resolution {
        tracing::error!(key = %key, error = %error, "Object storage fetch failed");
        Resolution::failure(self.policy(key))
    }
}
