//! End-to-end routing through a live router and echo upstream.

use reqwest::StatusCode;

mod common;

#[tokio::test]
async fn test_subdomain_rewrite_and_headers() {
    let upstream = common::start_echo_upstream().await;
    let (router, shutdown) = common::start_router(common::sovoli_config(), upstream).await;

    let res = common::get_via(router, "mongolsbuildersdepotjm.sovoli.com", "/catalog", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-tenant"], "mongolsbuildersdepotjm");
    assert_eq!(res.headers()["vary"], "host");
    assert!(res.headers().contains_key("x-request-id"));

    let body = common::echo_body(res).await;
    assert_eq!(body["target"], "/w/mongolsbuildersdepotjm/catalog");
    assert_eq!(body["tenant"], "mongolsbuildersdepotjm");
    assert_eq!(body["host"], "mongolsbuildersdepotjm.sovoli.com");
    assert_eq!(body["forwarded_host"], "mongolsbuildersdepotjm.sovoli.com");
    assert_eq!(body["forwarded_proto"], "http");

    shutdown.trigger();
}

#[tokio::test]
async fn test_root_domain_passes_through_untouched() {
    let upstream = common::start_echo_upstream().await;
    let (router, shutdown) = common::start_router(common::sovoli_config(), upstream).await;

    for host in ["sovoli.com", "www.sovoli.com"] {
        let res = common::get_via(router, host, "/pricing?plan=pro", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(!res.headers().contains_key("x-tenant"));

        let body = common::echo_body(res).await;
        assert_eq!(body["target"], "/pricing?plan=pro");
        assert!(body["tenant"].is_null());
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_custom_domain_any_case() {
    let upstream = common::start_echo_upstream().await;
    let (router, shutdown) = common::start_router(common::sovoli_config(), upstream).await;

    let res = common::get_via(router, "MagySchool.com", "/programs?grade=1", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-tenant"], "magy");
    let body = common::echo_body(res).await;
    assert_eq!(body["target"], "/w/magy/programs?grade=1");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_custom_domain_is_404() {
    let upstream = common::start_echo_upstream().await;
    let (router, shutdown) = common::start_router(common::sovoli_config(), upstream).await;

    let res = common::get_via(router, "stranger.org", "/", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(!res.headers().contains_key("x-tenant"));
    assert!(res.text().await.unwrap().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_static_assets_bypass_tenant_logic() {
    let upstream = common::start_echo_upstream().await;
    let (router, shutdown) = common::start_router(common::sovoli_config(), upstream).await;

    for path in ["/_next/static/chunk.js", "/favicon.ico", "/images/hero", "/logo.png"] {
        let res = common::get_via(router, "stranger.org", path, None).await;
        assert_eq!(res.status(), StatusCode::OK, "{path}");
        let body = common::echo_body(res).await;
        assert_eq!(body["target"], path);
        assert!(body["tenant"].is_null());
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_api_routes_keep_their_path() {
    let upstream = common::start_echo_upstream().await;
    let (router, shutdown) = common::start_router(common::sovoli_config(), upstream).await;

    let res = common::get_via(router, "acme.sovoli.com", "/api/orgs?limit=5", None).await;
    assert_eq!(res.headers()["x-tenant"], "acme");
    assert_eq!(res.headers()["vary"], "host");
    let body = common::echo_body(res).await;
    assert_eq!(body["target"], "/api/orgs?limit=5");
    assert_eq!(body["tenant"], "acme");

    shutdown.trigger();
}

#[tokio::test]
async fn test_client_tenant_header_is_replaced() {
    let upstream = common::start_echo_upstream().await;
    let (router, shutdown) = common::start_router(common::sovoli_config(), upstream).await;

    let res = common::client()
        .get(format!("http://{}/pricing", router))
        .header("host", "sovoli.com")
        .header("x-tenant", "spoofed")
        .send()
        .await
        .unwrap();
    let body = common::echo_body(res).await;
    assert!(body["tenant"].is_null());

    shutdown.trigger();
}

#[tokio::test]
async fn test_preview_hosts() {
    let upstream = common::start_echo_upstream().await;
    let (router, shutdown) = common::start_router(common::sovoli_config(), upstream).await;

    let legacy = common::get_via(router, "tenant123---abcdef.vercel.app", "/", None).await;
    assert_eq!(legacy.headers()["x-tenant"], "tenant123");
    assert_eq!(common::echo_body(legacy).await["target"], "/w/tenant123/");

    let git = common::get_via(router, "foo-git-branch.vercel.app", "/about", None).await;
    assert!(!git.headers().contains_key("x-tenant"));
    assert_eq!(common::echo_body(git).await["target"], "/about");

    let explicit = common::get_via(router, "foo-git-branch.vercel.app", "/about?tenant=Magy", None).await;
    assert_eq!(explicit.headers()["x-tenant"], "magy");
    assert_eq!(common::echo_body(explicit).await["target"], "/w/magy/about?tenant=Magy");

    shutdown.trigger();
}

#[tokio::test]
async fn test_localhost_development() {
    let upstream = common::start_echo_upstream().await;
    let (router, shutdown) = common::start_router(common::sovoli_config(), upstream).await;

    let sub = common::get_via(router, "acme.localhost:3000", "/", None).await;
    assert_eq!(sub.headers()["x-tenant"], "acme");

    let root = common::get_via(router, "localhost:3000", "/", None).await;
    assert!(!root.headers().contains_key("x-tenant"));
    assert_eq!(common::echo_body(root).await["target"], "/");

    let query = common::get_via(router, "localhost:3000", "/x?tenant=magy", None).await;
    assert_eq!(common::echo_body(query).await["target"], "/w/magy/x?tenant=magy");

    shutdown.trigger();
}

#[tokio::test]
async fn test_admin_gate() {
    let upstream = common::start_echo_upstream().await;
    let (router, shutdown) = common::start_router(common::sovoli_config(), upstream).await;

    let denied = common::get_via(router, "sovoli.com", "/admin/dashboard", None).await;
    assert_eq!(denied.status(), StatusCode::FOUND);
    assert_eq!(denied.headers()["location"], "/admin?next=%2Fadmin%2Fdashboard");

    let login = common::get_via(router, "sovoli.com", "/admin", None).await;
    assert_eq!(login.status(), StatusCode::OK);

    let allowed = common::get_via(
        router,
        "acme.sovoli.com",
        "/admin/dashboard",
        Some("theme=dark; sovoli_admin_pin=ok"),
    )
    .await;
    assert_eq!(allowed.status(), StatusCode::OK);
    assert!(!allowed.headers().contains_key("x-tenant"));
    assert_eq!(common::echo_body(allowed).await["target"], "/admin/dashboard");

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_down_is_bad_gateway() {
    // Bind and drop to get a port nobody listens on.
    let dead = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let (router, shutdown) = common::start_router(common::sovoli_config(), dead).await;

    let res = common::get_via(router, "acme.sovoli.com", "/", None).await;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    shutdown.trigger();
}
