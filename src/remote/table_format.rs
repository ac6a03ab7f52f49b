//! Route table wire formats.
//!
//! Two shapes are accepted, both decoded in document order:
//!
//! ```text
//! [ { "matchPath": "/inventory", "target": "https://inv.internal", "isRegulated": false } ]
//!
//! { "inventory": "https://inv.internal", "reports": null,
//!   "meds": { "target": "https://meds.internal", "isRegulated": true } }
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::routing::table::{parse_target, RouteEntry, RouteTable};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEntry {
    match_path: String,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    is_regulated: bool,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    host: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTarget {
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    is_regulated: bool,
}

/// Decode a fetched JSON value into a route table.
pub fn decode_table(value: Value) -> Result<RouteTable, String> {
    let entries = match value {
        Value::Array(items) => items
            .into_iter()
            .map(decode_entry)
            .collect::<Result<Vec<_>, _>>()?,
        Value::Object(map) => map
            .into_iter()
            .map(|(name, value)| decode_map_entry(name, value))
            .collect::<Result<Vec<_>, _>>()?,
        other => return Err(format!("expected array or object, found {}", type_name(&other))),
    };
    RouteTable::new(entries).map_err(|e| e.to_string())
}

fn decode_entry(item: Value) -> Result<RouteEntry, String> {
    let wire: WireEntry = serde_json::from_value(item).map_err(|e| e.to_string())?;
    let target = wire
        .target
        .as_deref()
        .map(|t| parse_target(&wire.match_path, t))
        .transpose()
        .map_err(|e| e.to_string())?;

    let mut entry = RouteEntry::new(wire.match_path, target).regulated(wire.is_regulated);
    if let Some(name) = wire.name {
        entry = entry.with_name(name);
    }
    if let Some(host) = wire.host {
        entry = entry.with_host(host);
    }
    Ok(entry)
}

fn decode_map_entry(name: String, value: Value) -> Result<RouteEntry, String> {
    let match_path = format!("/{}", name.trim_matches('/'));
    let (target, is_regulated) = match value {
        Value::Null => (None, false),
        Value::String(target) => (Some(target), false),
        Value::Object(_) => {
            let wire: WireTarget = serde_json::from_value(value).map_err(|e| e.to_string())?;
            (wire.target, wire.is_regulated)
        }
        other => {
            return Err(format!("entry `{name}`: unexpected {}", type_name(&other)));
        }
    };
    let target = target
        .as_deref()
        .map(|t| parse_target(&match_path, t))
        .transpose()
        .map_err(|e| e.to_string())?;

    Ok(RouteEntry::new(match_path, target)
        .with_name(name)
        .regulated(is_regulated))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
