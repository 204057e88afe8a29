//! Router construction.
//!
//! ```text
//! GET    /healthcheck/ping       liveness
//! GET    /healthcheck/active     component status
//! GET    /metrics                Prometheus exposition (when enabled)
//! POST   /api/v1/users           create user
//! GET    /api/v1/users           list users (page, page_size, keyword)
//! GET    /api/v1/users/{id}      fetch user
//! PUT    /api/v1/users/{id}      update user
//! DELETE /api/v1/users/{id}      delete user
//! ```

use std::time::Duration;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Router};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::schema::AppConfig;
use crate::http::request::{propagate_request_id_layer, record_metrics, set_request_id_layer};
use crate::http::response::ApiResponse;
use crate::http::server::AppState;
use crate::http::trim::trim_request;
use crate::observability::metrics;
use crate::user::handler;

#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub user_store: bool,
    /// Whether the current business config carries a token key.
    pub token_configured: bool,
}

/// Build the API router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &AppConfig, state: AppState) -> Router {
    let users = Router::new()
        .route("/users", get(handler::list_users).post(handler::create_user))
        .route(
            "/users/{id}",
            get(handler::get_user)
                .put(handler::update_user)
                .delete(handler::delete_user),
        );

    let mut router = Router::new()
        .route("/healthcheck/ping", get(ping))
        .route("/healthcheck/active", get(active))
        .nest("/api/v1", users);
    if config.observability.metrics_enabled {
        metrics::init_metrics();
        router = router.route("/metrics", get(render_metrics));
    }

    let mut router = router
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn_with_state(config.http.body_limit_bytes, trim_request))
        .layer(DefaultBodyLimit::max(config.http.body_limit_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(propagate_request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(record_metrics))
                .layer(TimeoutLayer::new(Duration::from_secs(config.http.request_timeout_secs))),
        );

    if let Some(cors) = cors_layer(&config.http.cors_allowed_origins) {
        router = router.layer(cors);
    }
    router
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any),
    )
}

async fn ping() -> &'static str {
    "pong"
}

async fn active(State(state): State<AppState>) -> impl IntoResponse {
    ApiResponse::success(ComponentStatus {
        user_store: state.users.store_healthy().await,
        token_configured: !state.business.load().token.key.is_empty(),
    })
}

async fn render_metrics() -> impl IntoResponse {
    match metrics::render() {
        Some(body) => (StatusCode::OK, body),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed".to_string()),
    }
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
