//! HTTP server setup and request forwarding.
//!
//! # Responsibilities
//! - Create the axum Router and wire up middleware (request id, trace, timeout)
//! - Run the tenant routing pipeline for each request
//! - Forward pass-through and rewritten requests to the upstream application
//! - Answer redirects and 404s directly

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, uri::Authority, HeaderName, HeaderValue, Request, StatusCode, Uri, Version},
    response::Response,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Semaphore};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RouterConfig;
use crate::http::request::{
    client_host, request_context, strip_hop_by_hop, X_FORWARDED_HOST, X_FORWARDED_PROTO, X_REQUEST_ID,
};
use crate::http::response;
use crate::lifecycle::shutdown::recv_shutdown;
use crate::lookup::{self, DomainLookup, LookupError};
use crate::net::NetError;
use crate::observability::metrics;
use crate::routing::{Outcome, RewriteTarget, TenantRouter};

/// How long in-flight requests may drain after a TLS shutdown signal.
const TLS_DRAIN_SECS: u64 = 10;

/// Error type for server setup and serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("domain lookup setup failed: {0}")]
    Lookup(#[from] LookupError),
    #[error("invalid upstream address: {0}")]
    Upstream(String),
    #[error("invalid tenant header name: {0}")]
    TenantHeader(String),
    #[error(transparent)]
    Net(#[from] NetError),
    #[error("server IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<TenantRouter>,
    pub client: Client<HttpConnector, Body>,
    pub upstream: Authority,
    pub tenant_header: HeaderName,
    pub trust_forwarded_host: bool,
    pub forwarded_proto: HeaderValue,
    pub upstream_timeout: Duration,
    pub in_flight: Arc<Semaphore>,
}

/// HTTP front door for the tenant router.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
    in_flight: Arc<Semaphore>,
}

impl HttpServer {
    /// Create a server, building the domain lookup from configuration.
    pub fn new(config: RouterConfig) -> Result<Self, ServerError> {
        let lookup = lookup::from_config(&config.lookup)?;
        Self::with_lookup(config, lookup)
    }

    /// Create a server around an already built domain lookup.
    pub fn with_lookup(config: RouterConfig, lookup: Arc<dyn DomainLookup>) -> Result<Self, ServerError> {
        let upstream: Authority = config
            .upstream
            .address
            .parse()
            .map_err(|_| ServerError::Upstream(config.upstream.address.clone()))?;
        let tenant_header = HeaderName::from_bytes(config.tenancy.tenant_header.as_bytes())
            .map_err(|_| ServerError::TenantHeader(config.tenancy.tenant_header.clone()))?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let in_flight = Arc::new(Semaphore::new(config.listener.max_in_flight.max(1)));

        let state = AppState {
            router: Arc::new(TenantRouter::from_config(&config, lookup)),
            client,
            upstream,
            tenant_header,
            trust_forwarded_host: config.tenancy.trust_forwarded_host,
            forwarded_proto: HeaderValue::from_static(if config.listener.tls.is_some() {
                "https"
            } else {
                "http"
            }),
            upstream_timeout: Duration::from_secs(config.timeouts.upstream_secs),
            in_flight: in_flight.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            in_flight,
        })
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        Router::new()
            .fallback(route_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            root_domain = %self.config.tenancy.root_domain,
            upstream = %self.config.upstream.address,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(stop_admitting(shutdown, self.in_flight))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        tracing::info!(
            address = %addr,
            root_domain = %self.config.tenancy.root_domain,
            upstream = %self.config.upstream.address,
            "HTTPS server starting"
        );

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        let in_flight = self.in_flight;
        tokio::spawn(async move {
            stop_admitting(shutdown, in_flight).await;
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// The assembled axum router, middleware included.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

/// Wait for shutdown, then refuse new requests on connections that are
/// still open while in-flight ones drain.
async fn stop_admitting(shutdown: broadcast::Receiver<()>, in_flight: Arc<Semaphore>) {
    recv_shutdown(shutdown).await;
    in_flight.close();
}

/// Route one request and act on the decision.
async fn route_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();

    let _permit = match state.in_flight.clone().acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => return response::error(StatusCode::SERVICE_UNAVAILABLE, "Shutting down"),
    };

    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let ctx = request_context(&request, state.trust_forwarded_host);
    let decision = state.router.route(&ctx).await;

    tracing::debug!(
        request_id = %request_id,
        host = %ctx.hostname,
        path = %ctx.path,
        outcome = decision.outcome.as_str(),
        "Request routed"
    );

    let response = match &decision.outcome {
        Outcome::PassThrough => forward(&state, request, None, &request_id).await,
        Outcome::Redirect { location } => response::redirect(location),
        Outcome::NotFound => response::not_found(),
        Outcome::Rewrite(target) => forward(&state, request, Some(target), &request_id).await,
    };

    metrics::record_decision(decision.outcome.as_str(), decision.class_label(), start_time);
    response
}

/// Send the request to the upstream application, rewritten when a target
/// is given.
async fn forward(
    state: &AppState,
    request: Request<Body>,
    target: Option<&RewriteTarget>,
    request_id: &str,
) -> Response {
    let original_host = client_host(&request, state.trust_forwarded_host);
    let (mut parts, body) = request.into_parts();

    let path_and_query = match target {
        Some(target) => target.internal_path.clone(),
        None => parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string()),
    };

    let uri = match Uri::builder()
        .scheme("http")
        .authority(state.upstream.clone())
        .path_and_query(path_and_query.as_str())
        .build()
    {
        Ok(uri) => uri,
        Err(e) => {
            tracing::debug!(request_id = %request_id, path = %path_and_query, error = %e, "Unforwardable target");
            return response::error(StatusCode::BAD_REQUEST, "Bad request target");
        }
    };

    let tenant_value = match target.map(|t| HeaderValue::from_str(t.tenant.as_str())) {
        Some(Ok(value)) => Some(value),
        Some(Err(_)) => {
            tracing::debug!(request_id = %request_id, "Tenant is not a valid header value");
            return response::error(StatusCode::BAD_REQUEST, "Bad tenant");
        }
        None => None,
    };

    strip_hop_by_hop(&mut parts.headers);
    // The tenant header is ours to set; never trust the client's.
    parts.headers.remove(&state.tenant_header);
    if let Some(value) = &tenant_value {
        parts.headers.insert(state.tenant_header.clone(), value.clone());
    }

    if let Some(host) = original_host.and_then(|h| HeaderValue::from_str(&h).ok()) {
        if !parts.headers.contains_key(header::HOST) {
            parts.headers.insert(header::HOST, host.clone());
        }
        if !state.trust_forwarded_host || !parts.headers.contains_key(&X_FORWARDED_HOST) {
            parts.headers.insert(X_FORWARDED_HOST, host);
        }
    }
    parts
        .headers
        .entry(X_FORWARDED_PROTO)
        .or_insert_with(|| state.forwarded_proto.clone());

    parts.uri = uri;
    parts.version = Version::HTTP_11;
    let upstream_request = Request::from_parts(parts, body);

    let result = tokio::time::timeout(state.upstream_timeout, state.client.request(upstream_request)).await;
    let mut response = match result {
        Ok(Ok(upstream_response)) => {
            let (parts, body) = upstream_response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Ok(Err(e)) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_upstream_error("connect");
            return response::error(StatusCode::BAD_GATEWAY, "Upstream request failed");
        }
        Err(_) => {
            tracing::error!(request_id = %request_id, timeout = ?state.upstream_timeout, "Upstream timed out");
            metrics::record_upstream_error("timeout");
            return response::error(StatusCode::GATEWAY_TIMEOUT, "Upstream timed out");
        }
    };

    if let Some(value) = tenant_value {
        response::apply_tenant_headers(&mut response, &state.tenant_header, value);
    }
    response
}
