//! "Coming soon" page for applications that are declared but not deployed.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::header::{HeaderValue, CACHE_CONTROL};
use axum::response::{Html, IntoResponse, Response};

use crate::policy::cache_control::NO_STORE;

/// Query parameter carrying the application name.
#[derive(Debug, Clone)]
pub struct PlaceholderParam(pub String);

/// Render the placeholder for `app`.
pub fn render(app: &str) -> Response {
    let app = if app.trim().is_empty() {
        "This application".to_string()
    } else {
        escape_html(app)
    };
    let page = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>Coming soon</title>\n</head>\n<body>\n<main>\n\
         <h1>Coming soon</h1>\n<p>{app} is not available yet. Please check back later.</p>\n\
         </main>\n</body>\n</html>\n"
    );

    let mut response = Html(page).into_response();
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    response
}

pub async fn placeholder_handler(
    State(param): State<PlaceholderParam>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    render(query.get(&param.0).map(String::as_str).unwrap_or_default())
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}
