//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use serde_json::Value;

use service_scaffold::config::{AppConfig, BusinessConfig};
use service_scaffold::http::{build_router, AppState};
use service_scaffold::user::UserService;
use service_scaffold::{wire, HttpServer};

/// Config bound to an ephemeral loopback port with metrics off.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.http.bind_address = "127.0.0.1:0".to_string();
    config.observability.metrics_enabled = false;
    config
}

/// Router over a fresh in-memory user store.
#[allow(dead_code)]
pub fn test_router() -> Router {
    test_router_with_business().0
}

/// Router plus the business config handle it reads from.
#[allow(dead_code)]
pub fn test_router_with_business() -> (Router, Arc<ArcSwap<BusinessConfig>>) {
    let config = test_config();
    let business = Arc::new(ArcSwap::from_pointee(config.business.clone()));
    let state = AppState {
        users: UserService::new(wire::provide_user_repository()),
        business: Arc::clone(&business),
    };
    (build_router(&config, state), business)
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Wait until `server` has bound its listener.
#[allow(dead_code)]
pub async fn wait_for_addr(server: &HttpServer) -> SocketAddr {
    for _ in 0..200 {
        if let Some(addr) = server.local_addr() {
            return addr;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("server did not bind within 2s");
}
