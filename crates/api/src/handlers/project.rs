//! Handlers for the `/projects` JSON resource.
//!
//! Writes go through [`ProjectForm`] so API clients get the same validation,
//! ownership and in-flight rules as the dashboard.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use folio_core::error::CoreError;
use folio_core::project::{Project, ProjectInput};

use crate::dashboard::form::ProjectForm;
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::middleware::session::AuthSession;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
    auth: AuthSession,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = state.gateway.list_projects(Some(auth.token())).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    auth: AuthSession,
    ApiJson(input): ApiJson<ProjectInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let form = ProjectForm::new(state.gateway.clone(), None, state.submit_guard.clone());
    let project = form.submit(auth.token(), &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = find_or_404(&state, &auth, id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ProjectInput>,
) -> AppResult<Json<DataResponse<Project>>> {
    let existing = find_or_404(&state, &auth, id).await?;
    let form = ProjectForm::new(
        state.gateway.clone(),
        Some(&existing),
        state.submit_guard.clone(),
    );
    let project = form.submit(auth.token(), &input).await?;
    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/projects/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.gateway.delete_project(auth.token(), &id).await?;
    tracing::info!(project_id = %id, user_id = %auth.user().id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_or_404(state: &AppState, auth: &AuthSession, id: String) -> AppResult<Project> {
    state
        .gateway
        .find_project(auth.token(), &id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}
