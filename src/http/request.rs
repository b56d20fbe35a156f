//! Request inspection and preparation for forwarding.
//!
//! # Responsibilities
//! - Extract routing-relevant information (host, path, query, cookies)
//! - Strip headers that must not travel to the upstream
//!
//! # Design Decisions
//! - `X-Forwarded-Host` is only honored when configured as trusted
//! - HTTP/2 requests carry the host in the URI authority, not `Host`

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Request};

use crate::routing::RequestContext;

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Connection-scoped headers that are never forwarded.
const HOP_BY_HOP: [&str; 6] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "upgrade",
];

/// Host the client asked for, before any rewriting.
pub fn client_host(request: &Request<Body>, trust_forwarded_host: bool) -> Option<String> {
    let headers = request.headers();
    let forwarded = trust_forwarded_host
        .then(|| header_str(headers, &X_FORWARDED_HOST))
        .flatten()
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or_else(|| header_str(headers, &header::HOST))
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
        .map(str::to_string)
}

/// Build the routing input for a request.
pub fn request_context(request: &Request<Body>, trust_forwarded_host: bool) -> RequestContext {
    let host = client_host(request, trust_forwarded_host).unwrap_or_default();
    let uri = request.uri();

    let mut ctx = RequestContext::new(&host, uri.path());
    if let Some(query) = uri.query() {
        ctx = ctx.with_query(query);
    }
    if let Some(authority) = uri.authority() {
        ctx = ctx.with_url_host(authority.as_str());
    }
    for value in request.headers().get_all(header::COOKIE) {
        if let Ok(cookies) = value.to_str() {
            ctx = ctx.with_cookie_header(cookies);
        }
    }
    ctx
}

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
