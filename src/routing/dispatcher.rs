//! Request Dispatcher.
//!
//! # Responsibilities
//! - Obtain the route table (remote, else static fallback)
//! - Select the first matching entry in declaration order
//! - Decide between rewrite, pending placeholder and pass-through
//!
//! # Design Decisions
//! - Stateless across requests apart from the optional remote snapshot
//! - Never fails: anything unexpected degrades to `PassThrough`
//! - Rewrites keep path and raw query byte-for-byte; the SSO marker is
//!   only ever appended once

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use url::Url;

use crate::config::{RemoteConfig, RoutingConfig};
use crate::error::GatewayError;
use crate::http::request::RequestContext;
use crate::observability::metrics;
use crate::remote::RouteSource;
use crate::routing::table::{RouteEntry, RouteTable, RouteTableStore};

/// Dispatch parameters taken from process configuration.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub table_key: String,
    pub session_cookies: Vec<String>,
    pub sso_param: String,
    pub pending_route: String,
    pub pending_param: String,
    /// Zero disables the remote snapshot; every request fetches.
    pub cache_ttl: Duration,
}

impl DispatchSettings {
    pub fn from_config(remote: &RemoteConfig, routing: &RoutingConfig) -> Self {
        Self {
            table_key: remote.table_key.clone(),
            session_cookies: routing.session_cookies.clone(),
            sso_param: routing.sso_param.clone(),
            pending_route: routing.pending_route.clone(),
            pending_param: routing.pending_param.clone(),
            cache_ttl: Duration::from_secs(remote.cache_ttl_secs),
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from_config(&RemoteConfig::default(), &RoutingConfig::default())
    }
}

/// Outcome of dispatching one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Serve the request from `destination` without telling the client.
    Rewrite { route: RouteEntry, destination: Url },
    /// Application declared but not deployed; serve the placeholder at `uri`.
    Pending { route: RouteEntry, uri: String },
    /// No route applies; the gateway handles the request locally.
    PassThrough,
}

impl Dispatch {
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Rewrite { .. } => "rewrite",
            Self::Pending { .. } => "pending",
            Self::PassThrough => "pass_through",
        }
    }

    pub fn route(&self) -> Option<&RouteEntry> {
        match self {
            Self::Rewrite { route, .. } | Self::Pending { route, .. } => Some(route),
            Self::PassThrough => None,
        }
    }
}

struct Snapshot {
    table: Arc<RouteTable>,
    fetched_at: Instant,
}

pub struct Dispatcher {
    source: Arc<dyn RouteSource>,
    fallback: Arc<RouteTableStore>,
    snapshot: ArcSwapOption<Snapshot>,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(
        source: Arc<dyn RouteSource>,
        fallback: Arc<RouteTableStore>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            source,
            fallback,
            snapshot: ArcSwapOption::empty(),
            settings,
        }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Decide how to handle a request.
    pub async fn dispatch(&self, ctx: &RequestContext) -> Dispatch {
        let table = self.table().await;
        let decision = decide(&table, ctx, &self.settings);

        metrics::record_dispatch(decision.outcome());
        tracing::debug!(
            path = %ctx.path,
            host = %ctx.hostname,
            outcome = decision.outcome(),
            route = decision.route().map(|r| r.match_path.as_str()),
            "Request dispatched"
        );
        decision
    }

    /// Route table for the current request.
    async fn table(&self) -> Arc<RouteTable> {
        let ttl = self.settings.cache_ttl;
        if !ttl.is_zero() {
            if let Some(snapshot) = self.snapshot.load_full() {
                if snapshot.fetched_at.elapsed() < ttl {
                    return snapshot.table.clone();
                }
            }
        }

        match self.source.resolve(&self.settings.table_key).await {
            Ok(table) => {
                let table = Arc::new(table);
                if !ttl.is_zero() {
                    self.snapshot.store(Some(Arc::new(Snapshot {
                        table: table.clone(),
                        fetched_at: Instant::now(),
                    })));
                }
                table
            }
            // Cause already logged by the resolver; the snapshot is left as is
            Err(_) => {
                tracing::debug!(error = %GatewayError::ConfigUnavailable, "Using static fallback table");
                self.fallback.load()
            }
        }
    }
}

/// Pure dispatch decision for one request against one table.
pub fn decide(table: &RouteTable, ctx: &RequestContext, settings: &DispatchSettings) -> Dispatch {
    let Some(route) = table.find(ctx) else {
        return Dispatch::PassThrough;
    };

    match &route.target {
        Some(target) => match destination(target, ctx, settings) {
            Some(destination) => Dispatch::Rewrite {
                route: route.clone(),
                destination,
            },
            None => {
                tracing::warn!(
                    route = %route.match_path,
                    target = %target,
                    "Route target cannot take a path, passing through"
                );
                Dispatch::PassThrough
            }
        },
        None => Dispatch::Pending {
            route: route.clone(),
            uri: pending_uri(&route.name, settings),
        },
    }
}

/// `target` + original path + original query, plus the SSO marker when a
/// session cookie is present and the marker is not already there.
pub fn destination(target: &Url, ctx: &RequestContext, settings: &DispatchSettings) -> Option<Url> {
    if target.cannot_be_a_base() {
        return None;
    }

    let mut url = target.clone();
    let base = target.path().trim_end_matches('/');
    url.set_path(&format!("{base}{}", ctx.path));
    url.set_query(ctx.query.as_deref());
    url.set_fragment(None);

    if ctx.has_session(&settings.session_cookies) && !ctx.has_query_param(&settings.sso_param) {
        url.query_pairs_mut().append_pair(&settings.sso_param, "true");
    }
    Some(url)
}

/// Placeholder route carrying the application name, e.g. `/coming-soon?app=reports`.
pub fn pending_uri(app: &str, settings: &DispatchSettings) -> String {
    let name: String = url::form_urlencoded::byte_serialize(app.as_bytes()).collect();
    format!("{}?{}={}", settings.pending_route, settings.pending_param, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::FetchFailure;
    use crate::routing::fallback::compiled_table;
    use async_trait::async_trait;
    use axum::http::Request;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticSource {
        result: Result<RouteTable, FetchFailure>,
        calls: AtomicUsize,
    }

    impl StaticSource {
        fn new(result: Result<RouteTable, FetchFailure>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RouteSource for StaticSource {
        async fn resolve(&self, _key: &str) -> Result<RouteTable, FetchFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn ctx(uri: &str, cookie: Option<&str>) -> RequestContext {
        let mut builder = Request::builder().uri(uri).header("Host", "staff.example.com");
        if let Some(cookie) = cookie {
            builder = builder.header("Cookie", cookie);
        }
        RequestContext::from_parts(&builder.body(()).unwrap().into_parts().0)
    }

    fn table(entries: Vec<RouteEntry>) -> RouteTable {
        RouteTable::new(entries).unwrap()
    }

    fn target(s: &str) -> Option<Url> {
        Some(Url::parse(s).unwrap())
    }

    fn inventory_table() -> RouteTable {
        table(vec![RouteEntry::new("/inventory", target("https://inv.internal"))])
    }

    fn destination_of(decision: Dispatch) -> String {
        match decision {
            Dispatch::Rewrite { destination, .. } => destination.to_string(),
            other => panic!("expected rewrite, got {other:?}"),
        }
    }

    #[test]
    fn test_rewrite_adds_sso_marker_for_session() {
        let decision = decide(
            &inventory_table(),
            &ctx("/inventory/items?x=1", Some("sb-access-token=abc")),
            &DispatchSettings::default(),
        );
        assert_eq!(
            destination_of(decision),
            "https://inv.internal/inventory/items?x=1&sso=true"
        );
    }

    #[test]
    fn test_rewrite_without_session_keeps_query_exactly() {
        let decision = decide(
            &inventory_table(),
            &ctx("/inventory/a%20b?q=1&q=2&empty=", None),
            &DispatchSettings::default(),
        );
        assert_eq!(
            destination_of(decision),
            "https://inv.internal/inventory/a%20b?q=1&q=2&empty="
        );
    }

    #[test]
    fn test_marker_never_duplicated() {
        let settings = DispatchSettings::default();
        let first = destination_of(decide(
            &inventory_table(),
            &ctx("/inventory", Some("sb-access-token=abc")),
            &settings,
        ));
        assert_eq!(first, "https://inv.internal/inventory?sso=true");

        let url = Url::parse(&first).unwrap();
        let again = ctx(
            &format!("{}?{}", url.path(), url.query().unwrap()),
            Some("sb-access-token=abc"),
        );
        let second = destination_of(decide(&inventory_table(), &again, &settings));
        assert_eq!(second.matches("sso=").count(), 1);
    }

    #[test]
    fn test_target_base_path_is_joined() {
        let table = table(vec![RouteEntry::new(
            "/l10",
            target("https://apps.internal/eos/"),
        )]);
        let decision = decide(&table, &ctx("/l10/meetings", None), &DispatchSettings::default());
        assert_eq!(
            destination_of(decision),
            "https://apps.internal/eos/l10/meetings"
        );
    }

    #[test]
    fn test_pending_route() {
        let table = table(vec![RouteEntry::new("/reports", None)]);
        let decision = decide(&table, &ctx("/reports/summary", None), &DispatchSettings::default());
        match decision {
            Dispatch::Pending { route, uri } => {
                assert_eq!(route.match_path, "/reports");
                assert_eq!(uri, "/coming-soon?app=reports");
            }
            other => panic!("expected pending, got {other:?}"),
        }
    }

    #[test]
    fn test_pending_name_is_encoded() {
        let uri = pending_uri("eos l10&x", &DispatchSettings::default());
        assert_eq!(uri, "/coming-soon?app=eos+l10%26x");
    }

    #[test]
    fn test_declaration_order_wins() {
        let table = table(vec![
            RouteEntry::new("/app", target("https://first.internal")),
            RouteEntry::new("/app/admin", target("https://second.internal")),
        ]);
        let decision = decide(&table, &ctx("/app/admin", None), &DispatchSettings::default());
        assert!(destination_of(decision).starts_with("https://first.internal/"));
    }

    #[test]
    fn test_no_match_passes_through() {
        let decision = decide(&inventory_table(), &ctx("/", None), &DispatchSettings::default());
        assert_eq!(decision, Dispatch::PassThrough);
    }

    #[tokio::test]
    async fn test_fetch_failure_matches_static_table() {
        let fallback = Arc::new(RouteTableStore::new(compiled_table()));
        let source = StaticSource::new(Err(FetchFailure::Status(503)));
        let dispatcher = Dispatcher::new(source, fallback, DispatchSettings::default());

        for path in ["/inventory/items", "/meds", "/", "/unknown"] {
            let request = ctx(path, Some("sb-access-token=abc"));
            assert_eq!(
                dispatcher.dispatch(&request).await,
                decide(&compiled_table(), &request, &DispatchSettings::default()),
                "{path}"
            );
        }
    }

    #[tokio::test]
    async fn test_remote_table_used_when_available() {
        let fallback = Arc::new(RouteTableStore::new(compiled_table()));
        let source = StaticSource::new(Ok(inventory_table()));
        let dispatcher = Dispatcher::new(source.clone(), fallback, DispatchSettings::default());

        let decision = dispatcher.dispatch(&ctx("/inventory", None)).await;
        assert_eq!(destination_of(decision), "https://inv.internal/inventory");

        dispatcher.dispatch(&ctx("/inventory", None)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_snapshot_reused_within_ttl() {
        let fallback = Arc::new(RouteTableStore::new(RouteTable::default()));
        let source = StaticSource::new(Ok(inventory_table()));
        let settings = DispatchSettings {
            cache_ttl: Duration::from_secs(60),
            ..DispatchSettings::default()
        };
        let dispatcher = Dispatcher::new(source.clone(), fallback, settings);

        for _ in 0..3 {
            dispatcher.dispatch(&ctx("/inventory", None)).await;
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
