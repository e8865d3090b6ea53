//! Integration tests for the public showcase and sign-in pages.

mod common;

use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use common::{body_text, build_test_app, form_post, get, location, with_cookie, OWNER_EMAIL};
use folio_gateway::memory::Operation;
use folio_gateway::Gateway;

// ---------------------------------------------------------------------------
// Public showcase
// ---------------------------------------------------------------------------

#[tokio::test]
async fn home_lists_every_project_with_tech_links() {
    let app = build_test_app();
    app.seed("1", "Alpha Engine", &["Rust", "Tokio"], 2);
    app.seed("2", "Beta Service", &["Go"], 1);

    let response = app.send(get("/")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Test Portfolio"));
    assert!(html.contains("Alpha Engine"));
    assert!(html.contains("Beta Service"));
    assert!(html.contains("tech=Tokio"));
}

#[tokio::test]
async fn home_filters_by_tech() {
    let app = build_test_app();
    app.seed("1", "Alpha Engine", &["Rust"], 2);
    app.seed("2", "Beta Service", &["Go"], 1);

    let response = app.send(get("/?tech=Go")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Beta Service"));
    assert!(!html.contains("Alpha Engine"));
}

#[tokio::test]
async fn home_survives_gateway_outage() {
    let app = build_test_app();
    app.gateway.fail(Operation::ListProjects);

    let response = app.send(get("/")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Projects are unavailable right now"));
}

// ---------------------------------------------------------------------------
// Sign in / sign out
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_page_renders() {
    let app = build_test_app();
    let response = app.send(get("/login")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("name=\"password\""));
}

#[tokio::test]
async fn login_sets_session_cookie_and_redirects() {
    let app = build_test_app();
    app.gateway.add_account(OWNER_EMAIL, "hunter22");

    let response = app
        .send(form_post(
            "/login",
            "email=owner%40example.com&password=hunter22",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with("folio_session="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn login_with_wrong_password_rerenders_form() {
    let app = build_test_app();
    app.gateway.add_account(OWNER_EMAIL, "hunter22");

    let response = app
        .send(form_post("/login", "email=owner%40example.com&password=nope"))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(SET_COOKIE).is_none());
    let html = body_text(response).await;
    assert!(html.contains("Invalid email or password"));
    assert!(html.contains("owner@example.com"));
}

#[tokio::test]
async fn logout_ends_session_and_clears_cookie() {
    let app = build_test_app();
    let token = app.sign_in_owner();

    let response = app.send(with_cookie(form_post("/logout", ""), &token)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.contains("Max-Age=0"));
    assert!(app.gateway.get_session(&token).await.unwrap().is_none());
}
