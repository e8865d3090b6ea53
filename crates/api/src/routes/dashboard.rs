use axum::routing::{get, post};
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`.
///
/// ```text
/// GET    /                         -> show
/// POST   /projects                 -> create
/// POST   /projects/{id}            -> update
/// POST   /projects/{id}/delete     -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::show))
        .route("/projects", post(dashboard::create))
        .route("/projects/{id}", post(dashboard::update))
        .route("/projects/{id}/delete", post(dashboard::delete))
}
