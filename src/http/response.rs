//! Responses produced by the router itself, and headers added to
//! upstream responses.

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Temporary redirect, empty body.
pub fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Unknown tenant domain: 404 with an empty body.
pub fn not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

pub fn error(status: StatusCode, message: &'static str) -> Response {
    (status, message).into_response()
}

/// Mark a tenant response: the tenant header, and `vary: host` so shared
/// caches never serve one tenant's page to another.
pub fn apply_tenant_headers(response: &mut Response<Body>, name: &HeaderName, tenant: HeaderValue) {
    let headers = response.headers_mut();
    headers.insert(name.clone(), tenant);
    headers.append(header::VARY, HeaderValue::from_static("host"));
}
