//! Method allow-lists, checked before any routing or resolution work.

use axum::http::Method;

use crate::error::GatewayError;

/// Methods accepted on the routing surface.
pub const ROUTER_METHODS: &[Method] = &[Method::GET, Method::POST, Method::PUT, Method::DELETE];

/// Methods accepted by a static site served without routing.
pub const SITE_METHODS: &[Method] = &[Method::GET, Method::HEAD];

pub fn ensure_allowed(method: &Method, allowed: &'static [Method]) -> Result<(), GatewayError> {
    if allowed.contains(method) {
        Ok(())
    } else {
        Err(GatewayError::MethodNotAllowed {
            method: method.clone(),
            allowed,
        })
    }
}
