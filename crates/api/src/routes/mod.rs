pub mod dashboard;
pub mod health;
pub mod pages;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /projects                  list, create (requires session)
/// /projects/{id}             get, update, delete (requires session)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/projects", project::router())
}

/// Server-rendered pages, mounted at the root.
///
/// ```text
/// /                          public showcase (?tech= filter)
/// /login                     sign-in form
/// /logout                    sign out
/// /dashboard                 owner dashboard (requires session)
/// /dashboard/projects/...    form and delete actions
/// ```
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .merge(pages::router())
        .nest("/dashboard", dashboard::router())
}
