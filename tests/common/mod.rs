//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use sovoli_router::config::{self, OrgRecord, RouterConfig};
use sovoli_router::{HttpServer, Shutdown};

/// Start an upstream that answers every request with a JSON echo of what
/// it received.
#[allow(dead_code)]
pub async fn start_echo_upstream() -> SocketAddr {
    let app = Router::new().fallback(|request: Request| async move {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Json(json!({
            "target": request.uri().path_and_query().map(|pq| pq.as_str()).unwrap_or("/"),
            "host": header("host"),
            "tenant": header("x-tenant"),
            "forwarded_host": header("x-forwarded-host"),
            "forwarded_proto": header("x-forwarded-proto"),
        }))
    });
    serve(app).await
}

/// Start a domain lookup service backed by `domains`; each answer is
/// delayed by `delay`.
#[allow(dead_code)]
pub async fn start_lookup_service(domains: &[(&str, &str)], delay: Duration) -> SocketAddr {
    let table: Arc<HashMap<String, String>> = Arc::new(
        domains
            .iter()
            .map(|(d, t)| (d.to_string(), t.to_string()))
            .collect(),
    );

    let app = Router::new()
        .route(
            "/domains/{domain}",
            get(
                |State((table, delay)): State<(Arc<HashMap<String, String>>, Duration)>,
                 Path(domain): Path<String>| async move {
                    tokio::time::sleep(delay).await;
                    match table.get(&domain) {
                        Some(tenant) => Json(json!({ "tenant": tenant })).into_response(),
                        None => StatusCode::NOT_FOUND.into_response(),
                    }
                },
            ),
        )
        .with_state((table, delay));
    serve(app).await
}

/// Start the router in front of `upstream` with the given config tweaks.
/// The returned `Shutdown` stops it.
#[allow(dead_code)]
pub async fn start_router(mut config: RouterConfig, upstream: SocketAddr) -> (SocketAddr, Shutdown) {
    config.upstream.address = upstream.to_string();
    config.listener.bind_address = "127.0.0.1:0".into();
    let config = config::loader::finalize(config).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// Default production config with one custom domain.
#[allow(dead_code)]
pub fn sovoli_config() -> RouterConfig {
    let mut config = RouterConfig::default();
    config.tenancy.root_domain = "sovoli.com".into();
    config.lookup.orgs = vec![
        OrgRecord {
            username: "magy".into(),
            domain: Some("magyschool.com".into()),
        },
        OrgRecord {
            username: "mongolsbuildersdepotjm".into(),
            domain: None,
        },
    ];
    config
}

/// Client that never follows redirects or uses a system proxy.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

/// GET `path` through the router with the given Host header.
#[allow(dead_code)]
pub async fn get_via(router: SocketAddr, host: &str, path: &str, cookie: Option<&str>) -> reqwest::Response {
    let mut request = client()
        .get(format!("http://{}{}", router, path))
        .header("host", host);
    if let Some(cookie) = cookie {
        request = request.header("cookie", cookie);
    }
    request.send().await.expect("router unreachable")
}

#[allow(dead_code)]
pub async fn echo_body(response: reqwest::Response) -> Value {
    response.json().await.expect("upstream echo is JSON")
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}
