//! Public pages.

use axum::extract::{Query, State};
use axum::response::Html;
use folio_core::showcase::{distinct_tags, filter_by_tech};
use serde::Deserialize;

use crate::dashboard::notice::Notice;
use crate::error::AppResult;
use crate::state::AppState;
use crate::views::{render, HomePage};

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    pub tech: Option<String>,
}

/// GET /
///
/// Lists every project anonymously, optionally narrowed to one tag. A gateway
/// failure still renders the page, empty and with an error notice.
pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<HomeQuery>,
) -> AppResult<Html<String>> {
    let (projects, notice) = match state.gateway.list_projects(None).await {
        Ok(projects) => (projects, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load public projects");
            (
                Vec::new(),
                Some(Notice::error("Projects are unavailable right now")),
            )
        }
    };

    let selected_tech = query.tech.filter(|t| !t.trim().is_empty());
    let techs = distinct_tags(&projects);
    let shown = filter_by_tech(&projects, selected_tech.as_deref())
        .into_iter()
        .cloned()
        .collect();

    render(&HomePage {
        site_title: state.config.site_title.clone(),
        projects: shown,
        techs,
        selected_tech,
        notice,
    })
}
