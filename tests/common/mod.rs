//! Shared utilities for gateway integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use edge_gateway::assets::{MemoryObjectStore, ObjectRecord, ObjectStore, StoreError};
use edge_gateway::config::{GatewayConfig, RouteConfig};
use edge_gateway::http::server::policy_settings;
use edge_gateway::http::StaticSite;
use edge_gateway::remote::RemoteConfigResolver;
use edge_gateway::GatewayServer;
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SHELL: &str = "<!DOCTYPE html><html><body><div id=\"root\"></div></body></html>";
pub const SESSION_COOKIE: &str = "sb-access-token=eyJhbGciOi.session";

/// Remote config service answering `GET /item/appUrls` with `table`.
pub async fn config_service(table: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/item/appUrls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(table))
        .mount(&server)
        .await;
    server
}

/// Remote config service that always fails with `status`.
pub async fn failing_config_service(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

pub fn connection_string(server: &MockServer) -> String {
    format!("{}/ecfg_test?token=secret", server.uri())
}

pub fn route(match_path: &str, target: Option<&str>) -> RouteConfig {
    RouteConfig {
        match_path: match_path.to_string(),
        target: target.map(str::to_string),
        is_regulated: false,
        name: None,
        host: None,
    }
}

/// Router config pointing at `config_service`, with the given static fallback routes.
pub fn router_config(config_service: Option<&MockServer>, fallback: Vec<RouteConfig>) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.service.name = "staff-router".into();
    config.service.environment = "test".into();
    config.remote_config.connection_string = config_service.map(connection_string);
    config.remote_config.timeout_ms = 500;
    config.routing.fallback = fallback;
    config
}

pub fn shell_store() -> MemoryObjectStore {
    MemoryObjectStore::new()
        .with_object("index.html", SHELL)
        .with_object("favicon.ico", vec![0u8, 0, 1, 0])
        .with_object("_next/static/chunks/main-4f2a.js", "console.log('main')")
}

/// Gateway with the real remote resolver and an in-memory local site.
pub fn gateway(config: &GatewayConfig, store: impl ObjectStore + 'static) -> GatewayServer {
    let source = Arc::new(RemoteConfigResolver::new(&config.remote_config).unwrap());
    let (prefix, is_regulated) = config
        .site
        .as_ref()
        .map_or(("/", false), |site| (site.route_prefix.as_str(), site.is_regulated));
    let site = StaticSite::new(Arc::new(store), prefix, is_regulated, policy_settings(config));
    GatewayServer::with_parts(config, source, Some(site)).unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Host", "staff.example.com")
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_session(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Host", "staff.example.com")
        .header("Cookie", format!("theme=dark; {SESSION_COOKIE}"))
        .body(Body::empty())
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Store whose backend is always down.
#[derive(Debug)]
pub struct BrokenStore;

#[async_trait]
impl ObjectStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<ObjectRecord>, StoreError> {
        Err(StoreError::Backend("bucket unreachable: secret-bucket-name".into()))
    }
}

/// Baseline headers every response must carry.
pub fn assert_baseline_headers<B>(response: &Response<B>) {
    let headers = response.headers();
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
    assert!(headers.contains_key("permissions-policy"));
}
