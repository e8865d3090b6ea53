//! Server-rendered pages.
//!
//! Templates live in `crates/api/templates/` and are compiled in by askama.

use askama::Template;
use axum::response::Html;
use folio_core::project::{FieldErrors, Project, ProjectInput};

use crate::dashboard::form::{FormMode, ProjectForm};
use crate::dashboard::list::ProjectList;
use crate::dashboard::notice::Notice;
use crate::error::{AppError, AppResult};

/// Render `template` into an HTML response body.
pub fn render<T: Template>(template: &T) -> AppResult<Html<String>> {
    template
        .render()
        .map(Html)
        .map_err(|e| AppError::InternalError(format!("Template rendering failed: {e}")))
}

/// Public landing page with the tech filter.
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub site_title: String,
    pub projects: Vec<Project>,
    pub techs: Vec<String>,
    pub selected_tech: Option<String>,
    pub notice: Option<Notice>,
}

impl HomePage {
    fn is_selected(&self, tech: &str) -> bool {
        self.selected_tech.as_deref() == Some(tech)
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub site_title: String,
    pub email: String,
    pub notice: Option<Notice>,
}

/// Values and errors for the project form as rendered.
pub struct FormView {
    pub action: String,
    pub heading: &'static str,
    pub submit_label: &'static str,
    pub editing: bool,
    pub values: ProjectInput,
    pub errors: FieldErrors,
}

impl FormView {
    /// The form as opened: create or edit defaults, no errors.
    pub fn opened(form: &ProjectForm) -> Self {
        let (action, heading, editing) = match form.mode() {
            FormMode::Create => ("/dashboard/projects".to_string(), "Add New Project", false),
            FormMode::Update { id } => (format!("/dashboard/projects/{id}"), "Edit Project", true),
        };
        Self {
            action,
            heading,
            submit_label: form.submit_label(),
            editing,
            values: form.defaults().clone(),
            errors: FieldErrors::new(),
        }
    }

    /// Keep what the user typed, with any validation messages.
    pub fn with_input(mut self, values: ProjectInput, errors: FieldErrors) -> Self {
        self.values = values;
        self.errors = errors;
        self
    }

    fn error(&self, field: &str) -> Option<&str> {
        self.errors.first(field)
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub site_title: String,
    pub user_email: String,
    pub projects: Vec<Project>,
    pub notice: Option<Notice>,
    pub form: FormView,
}

impl DashboardPage {
    pub fn new(site_title: &str, list: &ProjectList, form: FormView) -> Self {
        Self {
            site_title: site_title.to_string(),
            user_email: list.session().user.email.clone().unwrap_or_default(),
            projects: list.projects().to_vec(),
            notice: list.notice().cloned(),
            form,
        }
    }

    fn field_error(&self, field: &str) -> Option<&str> {
        self.form.error(field)
    }
}
