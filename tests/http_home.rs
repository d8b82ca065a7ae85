mod support;

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use serde_json::Value;
use storefront::cache::{CacheConfig, QueryCache};
use storefront::infra::http::{AdminState, HttpState, build_admin_router, build_router};
use tower::ServiceExt;

use support::{StubRepos, VALID_TOKEN, category, pending_order, product, service_with_cache};

const SESSION_COOKIE: &str = "session";

struct Harness {
    stub: Arc<StubRepos>,
    public: Router,
    admin: Router,
}

fn harness(stub: StubRepos) -> Harness {
    let stub = Arc::new(stub);
    let cache = QueryCache::in_memory(&CacheConfig::default());
    let storefront = Arc::new(service_with_cache(&stub, cache.clone()));

    let public = build_router(HttpState {
        storefront,
        session_cookie: Arc::from(SESSION_COOKIE),
    });
    let admin = build_admin_router(AdminState {
        cache,
        health: stub.clone(),
    });

    Harness {
        stub,
        public,
        admin,
    }
}

fn shop() -> StubRepos {
    StubRepos {
        products: vec![product(1, "Gift <Card>", "**Instant** delivery")],
        visitors: 9,
        categories: vec![category("Games", 1)],
        product_categories: vec!["Games".to_string(), "Software".to_string()],
        orders: vec![pending_order("ORD-7")],
        ..StubRepos::default()
    }
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).expect("json body")
}

#[tokio::test]
async fn json_endpoint_normalizes_filters() {
    let harness = harness(shop());
    let response = send(
        &harness.public,
        get("/api/home?q=%20gift%20&category=all&sort=bogus&page=0&page=4"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::CACHE_CONTROL).is_none());

    let json = body_json(response).await;
    assert_eq!(json["filters"]["query"], "gift");
    assert_eq!(json["filters"]["category"], Value::Null);
    assert_eq!(json["filters"]["sort"], "newest");
    assert_eq!(json["filters"]["page"], 1);
    assert_eq!(json["visitorCount"], 9);
    assert_eq!(json["categories"], serde_json::json!(["Games", "Software"]));
    assert_eq!(json["pagination"]["totalPages"], 1);
    assert_eq!(json["products"][0]["descriptionPlain"], "Instant delivery");
    assert_eq!(json["products"][0]["stockCount"], 6);
    assert_eq!(json["pendingOrders"], serde_json::json!([]));
    assert_eq!(json["session"], Value::Null);
}

#[tokio::test]
async fn json_endpoint_survives_every_failure() {
    let harness = harness(StubRepos::failing_all());
    let request = Request::builder()
        .uri("/api/home")
        .header(header::COOKIE, format!("{SESSION_COOKIE}={VALID_TOKEN}"))
        .body(Body::empty())
        .expect("valid request");
    let response = send(&harness.public, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    for key in [
        "products",
        "announcement",
        "visitorCount",
        "categories",
        "categoryConfig",
        "pendingOrders",
        "filters",
        "pagination",
        "session",
    ] {
        assert!(json.get(key).is_some(), "missing `{key}`");
    }
    assert_eq!(json["products"], serde_json::json!([]));
    assert_eq!(json["visitorCount"], 0);
    assert_eq!(json["pagination"]["total"], 0);
}

#[tokio::test]
async fn homepage_renders_escaped_html() {
    let harness = harness(shop());
    let response = send(&harness.public, get("/?category=Games")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));

    let html = body_text(response).await;
    assert!(html.contains("Gift "));
    assert!(!html.contains("<Card>"));
    assert!(html.contains("Instant delivery"));
    assert!(html.contains("19.99"));
    assert!(html.contains("Software"));
}

#[tokio::test]
async fn session_cookie_personalizes_the_page() {
    let harness = harness(shop());
    let request = Request::builder()
        .uri("/")
        .header(header::COOKIE, format!("{SESSION_COOKIE}={VALID_TOKEN}"))
        .body(Body::empty())
        .expect("valid request");
    let response = send(&harness.public, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok()),
        Some("private, no-store")
    );
    let html = body_text(response).await;
    assert!(html.contains("ORD-7"));
    assert_eq!(harness.stub.calls.orders(), 1);
}

#[tokio::test]
async fn unknown_paths_render_not_found() {
    let harness = harness(shop());
    let response = send(&harness.public, get("/missing")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_text(response).await;
    assert!(html.contains("Page Not Found"));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let harness = harness(shop());

    let generated = send(&harness.public, get("/api/home")).await;
    assert!(generated.headers().contains_key("x-request-id"));

    let request = Request::builder()
        .uri("/api/home")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .expect("valid request");
    let echoed = send(&harness.public, request).await;
    assert_eq!(
        echoed
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok()),
        Some("req-42")
    );
}

#[tokio::test]
async fn admin_invalidates_a_tag() {
    let harness = harness(shop());
    send(&harness.public, get("/api/home")).await;
    send(&harness.public, get("/api/home")).await;
    assert_eq!(harness.stub.calls.search(), 1);

    let response = send(&harness.admin, post("/_cache/invalidate/products")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["tag"], "products");
    assert_eq!(json["removed"], 2);

    send(&harness.public, get("/api/home")).await;
    assert_eq!(harness.stub.calls.search(), 2);
}

#[tokio::test]
async fn admin_rejects_unknown_tags() {
    let harness = harness(shop());
    let response = send(&harness.admin, post("/_cache/invalidate/orders")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_clears_the_whole_cache() {
    let harness = harness(shop());
    send(&harness.public, get("/api/home")).await;

    let response = send(&harness.admin, post("/_cache/invalidate")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    send(&harness.public, get("/api/home")).await;
    assert_eq!(harness.stub.calls.search(), 2);
    assert_eq!(harness.stub.calls.ratings(), 2);
}

#[tokio::test]
async fn admin_health_reflects_the_database() {
    let healthy = harness(shop());
    let response = send(&healthy.admin, get("/_health/db")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let broken = harness(StubRepos::failing_all());
    let response = send(&broken.admin, get("/_health/db")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
