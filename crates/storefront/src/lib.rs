//! JuiceQu Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod voice;

use std::time::Duration;

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::Span;

use state::AppState;

/// Directory holding the voice script and other static assets.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Build the storefront application around a session layer.
///
/// The binary passes the `PostgreSQL` session layer; tests pass one backed
/// by `MemoryStore`. Sentry layers are added by the binary.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::{BackendConfig, SentryConfig, StorefrontConfig, VoiceConfig};

    fn test_app() -> Router {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/juicequ_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("kX9#mQ2$vL7@pR4!wN8&zT3*bY6^cF1%"),
            backend: BackendConfig {
                base_url: "http://127.0.0.1:9".parse().unwrap(),
                timeout: Duration::from_secs(1),
            },
            voice: VoiceConfig::default(),
            sentry: SentryConfig::default(),
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/juicequ_test")
            .unwrap();
        let state = AppState::new(config, pool).unwrap();
        app(state, middleware::session_layer(MemoryStore::default(), false))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_carries_security_headers() {
        let response = test_app().oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert!(
            headers
                .get("permissions-policy")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.contains("microphone=(self)"))
        );
        assert!(headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_upstream_request_id_is_echoed() {
        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "edge-42")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.headers().get("x-request-id").unwrap(), "edge-42");
    }

    #[tokio::test]
    async fn test_protected_routes_without_session() {
        let api = test_app().oneshot(get("/api/account/orders")).await.unwrap();
        assert_eq!(api.status(), StatusCode::UNAUTHORIZED);

        let page = test_app().oneshot(get("/checkout")).await.unwrap();
        assert_eq!(page.status(), StatusCode::SEE_OTHER);
        assert_eq!(page.headers().get(header::LOCATION).unwrap(), "/auth/login");
    }

    #[tokio::test]
    async fn test_empty_cart_summary() {
        let response = test_app().oneshot(get("/api/cart")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let cart: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(cart["item_count"], 0);
        assert_eq!(cart["total_display"], "Rp 0");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = test_app().oneshot(get("/wp-admin")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
