//! Owner dashboard pages.
//!
//! Each request mounts a [`ProjectList`] for the caller's session under the
//! server's shutdown token, applies the action, and renders the result.
//! Requests without a live session are sent to `/login`; when the session
//! cannot be checked at all the sign-in page is rendered with a notice.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use folio_core::project::ProjectInput;
use serde::Deserialize;

use crate::dashboard::form::{ProjectForm, SubmitError};
use crate::dashboard::list::{ListError, MountError, ProjectList};
use crate::dashboard::notice::Notice;
use crate::error::AppResult;
use crate::middleware::session::session_token;
use crate::state::AppState;
use crate::views::{render, DashboardPage, FormView, LoginPage};

const SESSION_CHECK_NOTICE: &str = "Could not check your session right now";
const SHUTDOWN_NOTICE: &str = "The server is shutting down";

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// Id of the project to open in the form.
    pub edit: Option<String>,
}

fn to_login() -> Response {
    Redirect::to("/login").into_response()
}

/// Sign-in page carrying `message`, for when the dashboard cannot be shown.
fn unavailable(state: &AppState, status: StatusCode, message: &str) -> Response {
    let page = render(&LoginPage {
        site_title: state.config.site_title.clone(),
        email: String::new(),
        notice: Some(Notice::error(message)),
    });
    match page {
        Ok(html) => (status, html).into_response(),
        Err(e) => e.into_response(),
    }
}

fn shutting_down(state: &AppState) -> Response {
    unavailable(state, StatusCode::SERVICE_UNAVAILABLE, SHUTDOWN_NOTICE)
}

/// Mount the caller's list view. `Err` holds the page to send instead: a
/// redirect to `/login` without a live session, or a sign-in page with a
/// notice when the session could not be checked.
async fn open_list(state: &AppState, headers: &HeaderMap) -> Result<ProjectList, Response> {
    let Some(token) = session_token(headers) else {
        return Err(to_login());
    };
    match ProjectList::mount_within(state.gateway.clone(), token, state.shutdown.child_token())
        .await
    {
        Ok(list) => Ok(list),
        Err(MountError::NoSession) => Err(to_login()),
        Err(MountError::Gateway(e)) => {
            tracing::warn!(error = %e, "Session check failed");
            Err(unavailable(state, StatusCode::BAD_GATEWAY, SESSION_CHECK_NOTICE))
        }
        Err(MountError::Cancelled) => Err(shutting_down(state)),
    }
}

fn blank_form(state: &AppState) -> FormView {
    FormView::opened(&ProjectForm::new(
        state.gateway.clone(),
        None,
        state.submit_guard.clone(),
    ))
}

fn page(
    state: &AppState,
    list: &ProjectList,
    form: FormView,
    status: StatusCode,
) -> AppResult<Response> {
    let html = render(&DashboardPage::new(&state.config.site_title, list, form))?;
    Ok((status, html).into_response())
}

/// GET /dashboard?edit={id}
pub async fn show(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Response> {
    let mut list = match open_list(&state, &headers).await {
        Ok(list) => list,
        Err(response) => return Ok(response),
    };

    let form = match query.edit.as_deref() {
        None => blank_form(&state),
        Some(id) => match list.find(id) {
            Some(existing) => FormView::opened(&ProjectForm::new(
                state.gateway.clone(),
                Some(existing),
                state.submit_guard.clone(),
            )),
            None => {
                list.set_notice(Notice::error(format!("Project {id} was not found")));
                blank_form(&state)
            }
        },
    };
    page(&state, &list, form, StatusCode::OK)
}

/// POST /dashboard/projects
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(input): Form<ProjectInput>,
) -> AppResult<Response> {
    let mut list = match open_list(&state, &headers).await {
        Ok(list) => list,
        Err(response) => return Ok(response),
    };
    let form = ProjectForm::new(state.gateway.clone(), None, state.submit_guard.clone());
    submit(&state, &mut list, form, input).await
}

/// POST /dashboard/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(input): Form<ProjectInput>,
) -> AppResult<Response> {
    let mut list = match open_list(&state, &headers).await {
        Ok(list) => list,
        Err(response) => return Ok(response),
    };
    let Some(existing) = list.find(&id).cloned() else {
        list.set_notice(Notice::error(format!("Project {id} was not found")));
        return page(&state, &list, blank_form(&state), StatusCode::NOT_FOUND);
    };
    let form = ProjectForm::new(
        state.gateway.clone(),
        Some(&existing),
        state.submit_guard.clone(),
    );
    submit(&state, &mut list, form, input).await
}

/// POST /dashboard/projects/{id}/delete
pub async fn delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let mut list = match open_list(&state, &headers).await {
        Ok(list) => list,
        Err(response) => return Ok(response),
    };
    let status = match list.delete(&id).await {
        Ok(()) => StatusCode::OK,
        Err(ListError::Gateway(e)) if e.is_unauthorized() => return Ok(to_login()),
        Err(ListError::Gateway(_)) => StatusCode::BAD_GATEWAY,
        Err(ListError::Cancelled) => return Ok(shutting_down(&state)),
    };
    page(&state, &list, blank_form(&state), status)
}

/// Save `input` through `form` and render the dashboard with the outcome.
///
/// Rejected input is echoed back with its field errors; a successful save
/// refreshes the list and resets the form.
async fn submit(
    state: &AppState,
    list: &mut ProjectList,
    form: ProjectForm,
    input: ProjectInput,
) -> AppResult<Response> {
    match form.submit(list.token(), &input).await {
        Ok(project) => {
            if let Err(ListError::Cancelled) = list.after_save(&project).await {
                return Ok(shutting_down(state));
            }
            page(state, list, blank_form(state), StatusCode::OK)
        }
        Err(SubmitError::Invalid(errors)) => {
            let view = FormView::opened(&form).with_input(input, errors);
            page(state, list, view, StatusCode::UNPROCESSABLE_ENTITY)
        }
        Err(SubmitError::InFlight) => {
            list.set_notice(Notice::error(SubmitError::InFlight.to_string()));
            let view = FormView::opened(&form).with_input(input, Default::default());
            page(state, list, view, StatusCode::CONFLICT)
        }
        Err(SubmitError::Unauthenticated) => Ok(to_login()),
        Err(SubmitError::Gateway(e)) => {
            list.set_notice(Notice::error(format!("Could not save project: {e}")));
            let view = FormView::opened(&form).with_input(input, Default::default());
            page(state, list, view, StatusCode::BAD_GATEWAY)
        }
    }
}
