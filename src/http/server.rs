//! Gateway Entry Point: HTTP server setup and request composition.
//!
//! # Responsibilities
//! - Create the Axum router (health, placeholder, gateway fallback)
//! - Wire up middleware (security headers, request ID, tracing, timeout)
//! - Enforce the method allow-list before any routing work
//! - Dispatch and rewrite, or serve the local static site
//! - Swap the static fallback table on config reload

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{
    HeaderName, HeaderValue, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
};
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{GatewayConfig, SecurityConfig};
use crate::error::GatewayError;
use crate::http::health::health_handler;
use crate::http::methods::{ensure_allowed, ROUTER_METHODS};
use crate::http::placeholder::{self, placeholder_handler, PlaceholderParam};
use crate::http::request::{request_id, MakeRequestUuid, RequestContext, X_REQUEST_ID};
use crate::http::rewrite::Upstream;
use crate::http::site::StaticSite;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::policy::security_headers::{security_headers, PERMISSIONS_POLICY};
use crate::policy::PolicySettings;
use crate::remote::{RemoteConfigResolver, RouteSource};
use crate::routing::fallback::fallback_table;
use crate::routing::{Dispatch, DispatchSettings, Dispatcher, RouteTableStore, TableError};

pub const X_GATEWAY_ROUTE: HeaderName = HeaderName::from_static("x-gateway-route");

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid static route table: {0}")]
    Table(#[from] TableError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// State shared by the gateway fallback handler.
#[derive(Clone)]
struct GatewayState {
    /// `None` when routing is disabled and only the local site is served.
    dispatcher: Option<Arc<Dispatcher>>,
    upstream: Upstream,
    site: Option<Arc<StaticSite>>,
    /// Source of the strict headers added for regulated route entries.
    security: Arc<SecurityConfig>,
    route_header: bool,
}

/// The edge gateway: router surface, static-site surface, or both.
pub struct GatewayServer {
    app: Router,
    fallback: Arc<RouteTableStore>,
}

impl GatewayServer {
    /// Build a gateway from configuration, with the remote config service
    /// and the on-disk site it names.
    pub fn new(config: &GatewayConfig) -> Result<Self, ServerError> {
        let source = Arc::new(RemoteConfigResolver::new(&config.remote_config)?);
        let site = config
            .site
            .as_ref()
            .map(|site| StaticSite::from_config(site, policy_settings(config)));
        Self::with_parts(config, source, site)
    }

    /// Build a gateway around an explicit route source and site.
    pub fn with_parts(
        config: &GatewayConfig,
        source: Arc<dyn RouteSource>,
        site: Option<StaticSite>,
    ) -> Result<Self, ServerError> {
        let fallback = Arc::new(RouteTableStore::new(fallback_table(
            &config.routing.fallback,
        )?));

        let dispatcher = config.routing.enabled.then(|| {
            Arc::new(Dispatcher::new(
                source,
                fallback.clone(),
                DispatchSettings::from_config(&config.remote_config, &config.routing),
            ))
        });

        let state = GatewayState {
            dispatcher,
            upstream: Upstream::new(&config.timeouts)?,
            site: site.map(Arc::new),
            security: Arc::new(config.security.clone()),
            route_header: config.routing.route_header,
        };

        let app = Self::build_router(config, state);
        Ok(Self { app, fallback })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: GatewayState) -> Router {
        let service = Arc::new(config.service.clone());
        let health_prefix = state
            .site
            .as_ref()
            .map(|site| site.route_prefix().to_string())
            .filter(|prefix| prefix != "/");

        let mut router: Router<GatewayState> = Router::new().route(
            "/health",
            get(health_handler).with_state::<GatewayState>(service.clone()),
        );
        if let Some(prefix) = health_prefix {
            router = router.route(
                &format!("{prefix}/health"),
                get(health_handler).with_state::<GatewayState>(service),
            );
        }

        let placeholder = PlaceholderParam(config.routing.pending_param.clone());
        router
            .route(
                &config.routing.pending_route,
                get(placeholder_handler).with_state::<GatewayState>(placeholder),
            )
            .fallback(gateway_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request_id(request.headers()),
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
            .layer(SetResponseHeaderLayer::if_not_present(
                X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                REFERRER_POLICY,
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                PERMISSIONS_POLICY,
                HeaderValue::from_static("camera=(), microphone=(), geolocation=(), payment=()"),
            ))
    }

    /// The composed service, for serving or driving directly in tests.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Rebuild the static fallback table from `config` and swap it in.
    pub fn reload(&self, config: &GatewayConfig) -> Result<(), TableError> {
        reload_fallback(&self.fallback, config)
    }

    /// Run the server until `shutdown` fires, applying config updates as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: Option<mpsc::UnboundedReceiver<GatewayConfig>>,
        shutdown: Shutdown,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if let Some(mut updates) = config_updates {
            let fallback = self.fallback.clone();
            let mut stop = shutdown.subscribe();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        update = updates.recv() => match update {
                            Some(config) => {
                                if let Err(e) = reload_fallback(&fallback, &config) {
                                    tracing::error!(error = %e, "Rejected reloaded route table, keeping current table");
                                }
                            }
                            None => break,
                        },
                        _ = stop.recv() => break,
                    }
                }
            });
        }

        axum::serve(listener, self.app.into_make_service())
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn reload_fallback(store: &RouteTableStore, config: &GatewayConfig) -> Result<(), TableError> {
    let table = fallback_table(&config.routing.fallback)?;
    let entries = table.len();
    store.replace(table);
    tracing::info!(entries, "Static fallback table reloaded");
    Ok(())
}

/// Policy settings derived from a config.
pub fn policy_settings(config: &GatewayConfig) -> PolicySettings {
    PolicySettings {
        cache: config.cache.clone(),
        security: config.security.clone(),
    }
}

/// Every request not claimed by health or the placeholder lands here.
async fn gateway_handler(State(state): State<GatewayState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let (surface, response) = match &state.dispatcher {
        Some(dispatcher) => ("router", route_request(&state, dispatcher, request).await),
        None => ("site", serve_locally(&state, request).await),
    };
    metrics::record_request(surface, response.status().as_u16(), start);
    response
}

async fn route_request(state: &GatewayState, dispatcher: &Dispatcher, request: Request<Body>) -> Response {
    if let Err(e) = ensure_allowed(request.method(), ROUTER_METHODS) {
        return e.into_response();
    }

    let (parts, body) = request.into_parts();
    let ctx = RequestContext::from_parts(&parts);
    let request = Request::from_parts(parts, body);

    let decision = dispatcher.dispatch(&ctx).await;
    let mut response = match &decision {
        Dispatch::Rewrite { destination, .. } => state
            .upstream
            .forward(request, destination.clone())
            .await
            .unwrap_or_else(IntoResponse::into_response),
        Dispatch::Pending { route, uri } => {
            let pending = GatewayError::PendingDeployment(route.name.clone());
            tracing::debug!(route = %route.match_path, rewrite = %uri, reason = %pending, "Rendering placeholder");
            placeholder::render(&route.name)
        }
        Dispatch::PassThrough => serve_locally(state, request).await,
    };

    let Some(route) = decision.route() else {
        return response;
    };
    if route.is_regulated {
        // Gateway policy replaces whatever the upstream sent for these headers
        response
            .headers_mut()
            .extend(security_headers(true, &state.security));
    }
    if state.route_header {
        let label = format!("{} -> {}", route.match_path, decision.outcome());
        if let Ok(value) = HeaderValue::from_str(&label) {
            response.headers_mut().insert(X_GATEWAY_ROUTE, value);
        }
    }
    response
}

async fn serve_locally(state: &GatewayState, request: Request<Body>) -> Response {
    match &state.site {
        Some(site) => site.serve(request).await,
        None => GatewayError::NoRouteMatch.into_response(),
    }
}
