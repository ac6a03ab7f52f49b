//! Config Resolver: fetches the dynamic route table.
//!
//! Every failure is logged here and returned as a plain `FetchFailure`
//! value. Nothing is retried and no call outlives the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::RemoteConfig;
use crate::observability::metrics;
use crate::remote::connection::Connection;
use crate::remote::table_format::decode_table;
use crate::routing::table::RouteTable;

/// Why a route table could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("remote config connection string is not configured")]
    NotConfigured,

    #[error("malformed remote config endpoint: {0}")]
    MalformedEndpoint(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("remote config returned status {0}")]
    Status(u16),

    #[error("malformed route table: {0}")]
    MalformedBody(String),
}

impl FetchFailure {
    fn label(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::MalformedEndpoint(_) => "malformed_endpoint",
            Self::Network(_) => "network",
            Self::Status(_) => "status",
            Self::MalformedBody(_) => "malformed_body",
        }
    }
}

/// Source of the dynamic route table.
#[async_trait]
pub trait RouteSource: Send + Sync {
    /// Fetch the table stored under `key`.
    async fn resolve(&self, key: &str) -> Result<RouteTable, FetchFailure>;
}

/// Fetches route tables from the remote configuration service over HTTP.
pub struct RemoteConfigResolver {
    client: reqwest::Client,
    connection: Result<Connection, FetchFailure>,
}

impl RemoteConfigResolver {
    pub fn new(config: &RemoteConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        let connection = match config.connection_string.as_deref() {
            Some(raw) => Connection::parse(raw),
            None => Err(FetchFailure::NotConfigured),
        };
        if let Err(failure) = &connection {
            tracing::warn!(error = %failure, "Remote route table unavailable, static table will be used");
        }

        Ok(Self { client, connection })
    }

    async fn fetch(&self, connection: &Connection, key: &str) -> Result<RouteTable, FetchFailure> {
        let response = self
            .client
            .get(connection.item_url(key))
            .send()
            .await
            // The URL carries the token
            .map_err(|e| FetchFailure::Network(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FetchFailure::MalformedBody(e.without_url().to_string()))?;

        decode_table(value).map_err(FetchFailure::MalformedBody)
    }
}

#[async_trait]
impl RouteSource for RemoteConfigResolver {
    async fn resolve(&self, key: &str) -> Result<RouteTable, FetchFailure> {
        let result = match &self.connection {
            Ok(connection) => {
                let result = self.fetch(connection, key).await;
                if let Err(failure) = &result {
                    tracing::warn!(
                        host = %connection.host(),
                        config_id = %connection.config_id(),
                        key = %key,
                        error = %failure,
                        "Route table fetch failed"
                    );
                }
                result
            }
            // Already logged at construction
            Err(failure) => Err(failure.clone()),
        };

        match &result {
            Ok(table) => {
                tracing::debug!(key = %key, entries = table.len(), "Route table fetched");
                metrics::record_config_fetch("success");
            }
            Err(failure) => metrics::record_config_fetch(failure.label()),
        }
        result
    }
}
