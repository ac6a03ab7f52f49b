//! Route matching logic.
//!
//! # Responsibilities
//! - Match host header (exact match, case-insensitive)
//! - Match path exactly or by non-root prefix (case-sensitive)
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Host matching is case-insensitive (RFC 9110 host names)
//! - Path matching is case-sensitive
//! - "/" only ever matches the root path exactly, never as a prefix
//! - No regex to guarantee O(n) matching

use crate::http::request::RequestContext;
use crate::routing::table::RouteEntry;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, ctx: &RequestContext) -> bool;
}

/// Matches the request hostname.
#[derive(Debug, Clone, Copy)]
pub struct HostMatcher<'a> {
    expected_host: &'a str,
}

impl<'a> HostMatcher<'a> {
    pub fn new(expected_host: &'a str) -> Self {
        Self { expected_host }
    }
}

impl Matcher for HostMatcher<'_> {
    fn matches(&self, ctx: &RequestContext) -> bool {
        ctx.hostname.eq_ignore_ascii_case(self.expected_host)
    }
}

/// Matches the path exactly, or as a prefix unless the match path is "/".
#[derive(Debug, Clone, Copy)]
pub struct PathMatcher<'a> {
    match_path: &'a str,
}

impl<'a> PathMatcher<'a> {
    pub fn new(match_path: &'a str) -> Self {
        Self { match_path }
    }
}

impl Matcher for PathMatcher<'_> {
    fn matches(&self, ctx: &RequestContext) -> bool {
        ctx.path == self.match_path
            || (self.match_path != "/" && ctx.path.starts_with(self.match_path))
    }
}

impl Matcher for RouteEntry {
    fn matches(&self, ctx: &RequestContext) -> bool {
        let host_ok = self
            .host
            .as_deref()
            .map_or(true, |host| HostMatcher::new(host).matches(ctx));
        host_ok && PathMatcher::new(&self.match_path).matches(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn ctx(host: &str, uri: &str) -> RequestContext {
        let req = Request::builder()
            .uri(uri)
            .header("Host", host)
            .body(())
            .unwrap();
        RequestContext::from_parts(&req.into_parts().0)
    }

    #[test]
    fn test_host_matcher() {
        let matcher = HostMatcher::new("staff.example.com");
        assert!(matcher.matches(&ctx("staff.example.com", "/")));
        assert!(matcher.matches(&ctx("STAFF.example.com:8443", "/")));
        assert!(!matcher.matches(&ctx("other.com", "/")));
    }

    #[test]
    fn test_path_matcher() {
        let matcher = PathMatcher::new("/inventory");
        assert!(matcher.matches(&ctx("a", "/inventory")));
        assert!(matcher.matches(&ctx("a", "/inventory/items?x=1")));
        assert!(!matcher.matches(&ctx("a", "/Inventory")));
        assert!(!matcher.matches(&ctx("a", "/reports")));
    }

    #[test]
    fn test_root_is_exact_only() {
        let matcher = PathMatcher::new("/");
        assert!(matcher.matches(&ctx("a", "/")));
        assert!(!matcher.matches(&ctx("a", "/inventory")));
    }

    #[test]
    fn test_entry_combines_host_and_path() {
        let entry = RouteEntry::new("/qr", None).with_host("handouts.example.com");
        assert!(entry.matches(&ctx("handouts.example.com", "/qr/123")));
        assert!(!entry.matches(&ctx("kiosk.example.com", "/qr/123")));

        let any_host = RouteEntry::new("/qr", None);
        assert!(any_host.matches(&ctx("kiosk.example.com", "/qr/123")));
    }
}
