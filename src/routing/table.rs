//! Route table types.
//!
//! # Design Decisions
//! - Tables are immutable once built; refresh replaces the whole table
//! - Declaration order is preserved and decides precedence
//! - `match_path` (per host) is unique within a table

use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use thiserror::Error;
use url::Url;

use crate::config::RouteConfig;
use crate::http::request::RequestContext;
use crate::routing::matcher::Matcher;

/// One application in the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Logical application name.
    pub name: String,
    pub match_path: String,
    /// `None` while the application is declared but not deployed.
    pub target: Option<Url>,
    pub is_regulated: bool,
    /// Lowercased host restriction.
    pub host: Option<String>,
}

impl RouteEntry {
    pub fn new(match_path: impl Into<String>, target: Option<Url>) -> Self {
        let match_path = match_path.into();
        Self {
            name: default_name(&match_path),
            match_path,
            target,
            is_regulated: false,
            host: None,
        }
    }

    pub fn regulated(mut self, is_regulated: bool) -> Self {
        self.is_regulated = is_regulated;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into().to_ascii_lowercase());
        self
    }

    pub fn is_deployed(&self) -> bool {
        self.target.is_some()
    }
}

/// "/inventory" → "inventory", "/" → "root".
fn default_name(match_path: &str) -> String {
    let trimmed = match_path.trim_matches('/');
    if trimmed.is_empty() {
        "root".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Reasons a table cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("match path `{0}` is declared more than once")]
    DuplicateMatchPath(String),

    #[error("match path `{0}` must start with '/'")]
    RelativeMatchPath(String),

    #[error("route `{path}` has an invalid target: {reason}")]
    InvalidTarget { path: String, reason: String },
}

/// Ordered, immutable sequence of route entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Build a table, rejecting relative or duplicate match paths.
    pub fn new(entries: Vec<RouteEntry>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !entry.match_path.starts_with('/') {
                return Err(TableError::RelativeMatchPath(entry.match_path.clone()));
            }
            if !seen.insert((entry.match_path.as_str(), entry.host.as_deref())) {
                return Err(TableError::DuplicateMatchPath(entry.match_path.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// Build a table from static route configuration.
    pub fn from_config(routes: &[RouteConfig]) -> Result<Self, TableError> {
        let entries = routes
            .iter()
            .map(|route| {
                let target = route
                    .target
                    .as_deref()
                    .map(|t| parse_target(&route.match_path, t))
                    .transpose()?;
                let mut entry =
                    RouteEntry::new(route.match_path.clone(), target).regulated(route.is_regulated);
                if let Some(name) = &route.name {
                    entry = entry.with_name(name.clone());
                }
                if let Some(host) = &route.host {
                    entry = entry.with_host(host.clone());
                }
                Ok(entry)
            })
            .collect::<Result<Vec<_>, TableError>>()?;
        Self::new(entries)
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry, in declaration order, matching the request.
    pub fn find(&self, ctx: &RequestContext) -> Option<&RouteEntry> {
        self.entries.iter().find(|entry| entry.matches(ctx))
    }
}

/// Shared, atomically replaceable route table snapshot.
///
/// Readers get an `Arc` to the table current at load time and keep it for
/// the rest of their request; `replace` never mutates a live table.
#[derive(Debug)]
pub struct RouteTableStore {
    current: ArcSwap<RouteTable>,
}

impl RouteTableStore {
    pub fn new(table: RouteTable) -> Self {
        Self {
            current: ArcSwap::from_pointee(table),
        }
    }

    pub fn load(&self) -> Arc<RouteTable> {
        self.current.load_full()
    }

    pub fn replace(&self, table: RouteTable) {
        self.current.store(Arc::new(table));
    }
}

/// Parse a deployment target, which must be usable as a base URL.
pub fn parse_target(match_path: &str, target: &str) -> Result<Url, TableError> {
    let invalid = |reason: String| TableError::InvalidTarget {
        path: match_path.to_string(),
        reason,
    };
    let url = Url::parse(target).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("not a base URL".to_string()));
    }
    Ok(url)
}
