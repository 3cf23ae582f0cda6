//! Request interception routes
//!
//! The gateway plays the part of the hosting runtime's fetch event: every
//! incoming request is turned into a descriptor and handed to the cache
//! manager, which decides cache vs. network.

use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tracing::debug;

use shellcache_core::RequestDescriptor;
use shellcache_storage::StoredResponse;

use crate::error::ApiError;
use crate::state::AppState;

/// Create the gateway router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .fallback(intercept)
        .with_state(state)
}

/// GET /healthz - liveness and lifecycle phase
async fn health(State(state): State<AppState>) -> Response {
    axum::Json(json!({
        "status": "ok",
        "phase": state.manager.phase().as_str(),
        "partition": state.manager.config().partition_name(),
    }))
    .into_response()
}

/// Fallback handler: intercept any request and dispatch it to the cache manager
async fn intercept(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    let method = request.method().clone();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let url = state
        .origin
        .join(path_and_query)
        .map_err(|e| ApiError::BadRequest(format!("unresolvable path {path_and_query}: {e}")))?;

    let navigation = is_navigation(&method, request.headers());
    debug!(
        "Intercepted {} {} (navigation: {})",
        method, url, navigation
    );

    let descriptor = RequestDescriptor::new(method, url, navigation);
    let stored = state.manager.handle_fetch(&descriptor).await?;

    build_response(stored)
}

/// Whether a request is a navigation (full-page load).
///
/// Browsers send `Sec-Fetch-Mode: navigate` on page loads; older clients are
/// approximated by a GET with an HTML Accept header.
fn is_navigation(method: &Method, headers: &HeaderMap) -> bool {
    if method != Method::GET {
        return false;
    }
    if let Some(mode) = headers.get("sec-fetch-mode").and_then(|v| v.to_str().ok()) {
        return mode.eq_ignore_ascii_case("navigate");
    }
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

fn build_response(stored: StoredResponse) -> Result<Response, ApiError> {
    let status = StatusCode::from_u16(stored.status)
        .map_err(|_| ApiError::Internal(format!("stored status {} is invalid", stored.status)))?;

    let mut response = Response::builder().status(status);
    if let Some(headers) = response.headers_mut() {
        for (name, value) in &stored.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                headers.insert(name, value);
            }
        }
        // The stored length is authoritative; any transfer framing headers
        // captured from the upstream no longer apply.
        headers.remove(header::TRANSFER_ENCODING);
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(stored.body.len()));
    }

    response
        .body(Body::from(stored.body))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
