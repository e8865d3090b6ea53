//! Sign-in and sign-out for the owner dashboard.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use folio_gateway::Credentials;

use crate::dashboard::notice::Notice;
use crate::error::AppResult;
use crate::middleware::session::{cleared_session_cookie, session_cookie, session_token};
use crate::state::AppState;
use crate::views::{render, LoginPage};

/// GET /login
pub async fn login_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    render(&LoginPage {
        site_title: state.config.site_title.clone(),
        email: String::new(),
        notice: None,
    })
}

/// POST /login
///
/// On success stores the access token in the session cookie and redirects to
/// the dashboard. On failure re-renders the form with the email kept.
pub async fn login(
    State(state): State<AppState>,
    Form(credentials): Form<Credentials>,
) -> AppResult<Response> {
    match state.gateway.sign_in(&credentials).await {
        Ok(session) => {
            tracing::info!(user_id = %session.user.id, "Signed in");
            Ok((
                [(SET_COOKIE, session_cookie(&session))],
                Redirect::to("/dashboard"),
            )
                .into_response())
        }
        Err(e) => {
            let (status, message) = if e.is_unauthorized() {
                (StatusCode::UNAUTHORIZED, "Invalid email or password")
            } else {
                tracing::warn!(error = %e, "Sign-in failed");
                (StatusCode::BAD_GATEWAY, "Sign-in is unavailable right now")
            };
            let page = render(&LoginPage {
                site_title: state.config.site_title.clone(),
                email: credentials.email,
                notice: Some(Notice::error(message)),
            })?;
            Ok((status, page).into_response())
        }
    }
}

/// POST /logout
///
/// Always clears the cookie; a failed sign-out call is only logged.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        if let Err(e) = state.gateway.sign_out(&token).await {
            tracing::warn!(error = %e, "Sign-out failed");
        }
    }
    (
        [(SET_COOKIE, cleared_session_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}
