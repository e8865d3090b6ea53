use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{auth, pages};
use crate::state::AppState;

/// Public pages and sign-in.
///
/// ```text
/// GET    /          -> home
/// GET    /login     -> login_form
/// POST   /login     -> login
/// POST   /logout    -> logout
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", post(auth::logout))
}
