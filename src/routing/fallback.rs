//! Compiled-in static fallback route table.
//!
//! Used whenever the remote table cannot be fetched and the config file
//! declares no `routing.fallback` routes of its own.

use crate::config::RouteConfig;
use crate::routing::table::{RouteEntry, RouteTable, TableError};

/// Applications known to the platform, in precedence order.
/// (match path, application name, regulated)
const KNOWN_APPLICATIONS: &[(&str, &str, bool)] = &[
    ("/inventory", "inventory", false),
    ("/handouts", "handouts", true),
    ("/l10", "eos-l10", false),
    ("/dashboard", "platform-dashboard", false),
    ("/compliance", "compliance-training", true),
    ("/phones", "call-center-ops", false),
    ("/config", "config-dashboard", false),
    ("/social", "socials-reviews", false),
    ("/pepe", "ai-receptionist", true),
    ("/staffing", "clinical-staffing", false),
    ("/meds", "medication-auth", true),
    ("/reps", "pharma-scheduling", false),
    ("/kiosk", "checkin-kiosk", true),
];

/// The compiled-in table. Every entry is pending until the remote table
/// supplies a deployment target, so with the config service down and no
/// `routing.fallback` routes configured, each known application renders the
/// placeholder page and unknown paths still pass through to the local site.
/// Deployments that need rewrites to keep working during an outage declare
/// their targets under `routing.fallback`.
pub fn compiled_table() -> RouteTable {
    let entries = KNOWN_APPLICATIONS
        .iter()
        .map(|(path, name, regulated)| {
            RouteEntry::new(*path, None)
                .with_name(*name)
                .regulated(*regulated)
        })
        .collect();
    // Match paths above are unique and absolute
    RouteTable::new(entries).unwrap_or_default()
}

/// Static fallback table for a config: its own routes if any, else the compiled-in table.
pub fn fallback_table(routes: &[RouteConfig]) -> Result<RouteTable, TableError> {
    if routes.is_empty() {
        Ok(compiled_table())
    } else {
        RouteTable::from_config(routes)
    }
}
