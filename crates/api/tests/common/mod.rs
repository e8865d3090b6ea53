#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::{Duration, Utc};
use folio_api::config::{GatewayMode, ServerConfig};
use folio_api::router::build_app_router;
use folio_api::state::AppState;
use folio_core::project::Project;
use folio_gateway::{AccessToken, InMemoryGateway};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        site_title: "Test Portfolio".to_string(),
        gateway_mode: GatewayMode::Memory,
    }
}

/// The full router plus handles on what it runs over.
pub struct TestApp {
    pub router: Router,
    pub gateway: Arc<InMemoryGateway>,
    pub state: AppState,
}

/// Build the full application router over a fresh in-memory gateway.
///
/// Uses [`build_app_router`] so tests exercise the production middleware
/// stack (CORS, request ID, timeout, tracing, panic recovery).
pub fn build_test_app() -> TestApp {
    let gateway = Arc::new(InMemoryGateway::new());
    let config = test_config();
    let state = AppState::new(gateway.clone(), config.clone());
    let router = build_app_router(state.clone(), &config);
    TestApp {
        router,
        gateway,
        state,
    }
}

impl TestApp {
    /// Open a session for the dashboard owner.
    pub fn sign_in_owner(&self) -> AccessToken {
        self.gateway.open_session(OWNER_EMAIL)
    }

    /// Seed a project created `age_minutes` ago.
    pub fn seed(&self, id: &str, title: &str, tags: &[&str], age_minutes: i64) -> Project {
        let project = Project {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("{title} is a project worth showing"),
            image_url: "https://example.com/a.png".to_string(),
            link: "https://example.com".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            user_id: None,
            created_at: Utc::now() - Duration::minutes(age_minutes),
            updated_at: None,
        };
        self.gateway.seed(project.clone());
        project
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub const OWNER_EMAIL: &str = "owner@example.com";

// ---------------------------------------------------------------------------
// Request builders
// ---------------------------------------------------------------------------

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn with_bearer(mut request: Request<Body>, token: &AccessToken) -> Request<Body> {
    request.headers_mut().insert(
        AUTHORIZATION,
        format!("Bearer {}", token.as_str()).parse().unwrap(),
    );
    request
}

pub fn with_cookie(mut request: Request<Body>, token: &AccessToken) -> Request<Body> {
    request.headers_mut().insert(
        COOKIE,
        format!("folio_session={}", token.as_str()).parse().unwrap(),
    );
    request
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// JSON content type with a body sent as-is, for payloads that do not parse.
pub fn raw_json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// `application/x-www-form-urlencoded` POST; `body` must already be encoded.
pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
