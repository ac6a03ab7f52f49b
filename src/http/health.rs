//! Liveness endpoint.
//!
//! Answers from process metadata only: no storage or config I/O.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::config::ServiceConfig;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: String,
    pub service_name: String,
    pub version: String,
    pub environment: String,
}

impl HealthReport {
    pub fn alive(service: &ServiceConfig) -> Self {
        Self {
            status: "healthy",
            timestamp: chrono::Utc::now().to_rfc3339(),
            service_name: service.name.clone(),
            version: service.version.clone(),
            environment: service.environment.clone(),
        }
    }
}

pub async fn health_handler(State(service): State<Arc<ServiceConfig>>) -> Json<HealthReport> {
    Json(HealthReport::alive(&service))
}
