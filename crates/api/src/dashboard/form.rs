//! Two-mode project form: create a new record or edit an existing one.
//!
//! A [`ProjectForm`] is opened either blank (create mode) or from an existing
//! record (update mode). [`ProjectForm::submit`] validates the raw input and
//! issues exactly one gateway write per accepted submission. While a save is
//! running, further submissions of the same form by the same session are
//! refused with [`SubmitError::InFlight`] before any gateway call is made.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use folio_core::project::{self, FieldErrors, Project, ProjectInput};
use folio_core::types::ProjectId;
use folio_gateway::{AccessToken, GatewayError, SharedGateway};

/// Why a submission did not produce a saved record.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Input failed validation; no gateway call was made.
    #[error("Validation failed: {0}")]
    Invalid(FieldErrors),

    /// A save of this form is already running.
    #[error("A save for this project is already in progress")]
    InFlight,

    /// Create mode found no signed-in user; nothing was inserted.
    #[error("No signed-in user")]
    Unauthenticated,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

// ---------------------------------------------------------------------------
// In-flight guard
// ---------------------------------------------------------------------------

type InFlightSet = Arc<Mutex<HashSet<String>>>;

fn lock(set: &InFlightSet) -> MutexGuard<'_, HashSet<String>> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keys of submissions currently being saved, shared across requests.
#[derive(Debug, Clone, Default)]
pub struct SubmitGuard {
    in_flight: InFlightSet,
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, or `None` if a submission holding it is still running.
    pub fn try_acquire(&self, key: String) -> Option<InFlightPermit> {
        if !lock(&self.in_flight).insert(key.clone()) {
            return None;
        }
        Some(InFlightPermit {
            key,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_held(&self, key: &str) -> bool {
        lock(&self.in_flight).contains(key)
    }
}

/// Releases its key when dropped.
#[derive(Debug)]
pub struct InFlightPermit {
    key: String,
    in_flight: InFlightSet,
}

impl Drop for InFlightPermit {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.key);
    }
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update { id: ProjectId },
}

pub struct ProjectForm {
    gateway: SharedGateway,
    guard: SubmitGuard,
    mode: FormMode,
    defaults: ProjectInput,
}

impl ProjectForm {
    /// Open the form. With `existing` it edits that record and starts from its
    /// values; without it the form creates a new record and starts blank.
    pub fn new(gateway: SharedGateway, existing: Option<&Project>, guard: SubmitGuard) -> Self {
        let (mode, defaults) = match existing {
            Some(project) => (
                FormMode::Update {
                    id: project.id.clone(),
                },
                ProjectInput::from_record(project),
            ),
            None => (FormMode::Create, ProjectInput::default()),
        };
        Self {
            gateway,
            guard,
            mode,
            defaults,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Initial field values.
    pub fn defaults(&self) -> &ProjectInput {
        &self.defaults
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Add Project",
            FormMode::Update { .. } => "Update Project",
        }
    }

    /// Guard key: one in-flight save per session and target record.
    pub fn guard_key(&self, token: &AccessToken) -> String {
        let target = match &self.mode {
            FormMode::Create => "new",
            FormMode::Update { id } => id.as_str(),
        };
        format!("{}:{target}", token.as_str())
    }

    /// Validate `input` and save it.
    ///
    /// Update mode issues one `update_project` for the edited id. Create mode
    /// looks up the current user and issues one `insert_project` owned by them.
    pub async fn submit(
        &self,
        token: &AccessToken,
        input: &ProjectInput,
    ) -> Result<Project, SubmitError> {
        let _permit = self
            .guard
            .try_acquire(self.guard_key(token))
            .ok_or(SubmitError::InFlight)?;

        let validated = project::validate(input).map_err(SubmitError::Invalid)?;

        let saved = match &self.mode {
            FormMode::Update { id } => {
                let changes = validated.into_changes(Utc::now());
                self.gateway.update_project(token, id, &changes).await
            }
            FormMode::Create => match self.gateway.get_current_user(token).await {
                Ok(Some(user)) => {
                    self.gateway
                        .insert_project(token, &validated.into_new(user.id))
                        .await
                }
                Ok(None) => return Err(SubmitError::Unauthenticated),
                Err(e) => Err(e),
            },
        };

        match saved {
            Ok(project) => {
                tracing::info!(project_id = %project.id, mode = ?self.mode, "Project saved");
                Ok(project)
            }
            Err(e) => {
                tracing::warn!(error = %e, mode = ?self.mode, "Project save failed");
                Err(SubmitError::Gateway(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use folio_gateway::memory::Operation;
    use folio_gateway::{Gateway, InMemoryGateway};

    fn input(title: &str) -> ProjectInput {
        ProjectInput {
            title: title.to_string(),
            description: "A portfolio dashboard service".to_string(),
            image_url: "https://example.com/shot.png".to_string(),
            link: "https://example.com/folio".to_string(),
            tags: "Rust, axum ,  , askama".to_string(),
        }
    }

    fn gateway_with_session() -> (Arc<InMemoryGateway>, AccessToken) {
        let gateway = Arc::new(InMemoryGateway::new());
        let token = gateway.open_session("owner@example.com");
        (gateway, token)
    }

    #[test]
    fn permit_releases_key_on_drop() {
        let guard = SubmitGuard::new();
        let permit = guard.try_acquire("k".into()).unwrap();
        assert!(guard.try_acquire("k".into()).is_none());
        assert!(guard.try_acquire("other".into()).is_some());
        drop(permit);
        assert!(!guard.is_held("k"));
        assert!(guard.try_acquire("k".into()).is_some());
    }

    #[tokio::test]
    async fn create_inserts_once_with_current_user() {
        let (gateway, token) = gateway_with_session();
        let user = gateway.get_current_user(&token).await.unwrap().unwrap();
        let form = ProjectForm::new(gateway.clone(), None, SubmitGuard::new());
        assert_eq!(form.mode(), &FormMode::Create);
        assert_eq!(form.defaults(), &ProjectInput::default());

        let saved = form.submit(&token, &input("Folio")).await.unwrap();

        assert_eq!(gateway.calls(Operation::InsertProject), 1);
        assert_eq!(gateway.calls(Operation::UpdateProject), 0);
        assert_eq!(saved.user_id.as_deref(), Some(user.id.as_str()));
        assert_eq!(saved.tags, vec!["Rust", "axum", "askama"]);
    }

    #[tokio::test]
    async fn update_targets_existing_id_without_inserting() {
        let (gateway, token) = gateway_with_session();
        let creator = ProjectForm::new(gateway.clone(), None, SubmitGuard::new());
        let original = creator.submit(&token, &input("Folio")).await.unwrap();

        let editor = ProjectForm::new(gateway.clone(), Some(&original), SubmitGuard::new());
        assert_eq!(editor.defaults().title, "Folio");
        assert_eq!(editor.defaults().tags, "Rust, axum, askama");
        assert_eq!(editor.submit_label(), "Update Project");

        let updated = editor.submit(&token, &input("Folio v2")).await.unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.title, "Folio v2");
        assert!(updated.updated_at.is_some());
        assert_eq!(gateway.calls(Operation::UpdateProject), 1);
        assert_eq!(gateway.calls(Operation::InsertProject), 1);
        assert_eq!(gateway.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn invalid_input_makes_no_gateway_call() {
        let (gateway, token) = gateway_with_session();
        let form = ProjectForm::new(gateway.clone(), None, SubmitGuard::new());

        let result = form.submit(&token, &input("F")).await;

        assert_matches!(result, Err(SubmitError::Invalid(errors)) => {
            assert_eq!(errors.first("title"), Some("Title must be at least 2 characters"));
        });
        assert_eq!(gateway.calls(Operation::GetCurrentUser), 0);
        assert_eq!(gateway.calls(Operation::InsertProject), 0);
    }

    #[tokio::test]
    async fn create_without_user_is_unauthenticated() {
        let gateway = Arc::new(InMemoryGateway::new());
        let form = ProjectForm::new(gateway.clone(), None, SubmitGuard::new());

        let result = form
            .submit(&AccessToken::new("expired"), &input("Folio"))
            .await;

        assert_matches!(result, Err(SubmitError::Unauthenticated));
        assert_eq!(gateway.calls(Operation::InsertProject), 0);
    }

    #[tokio::test]
    async fn gateway_failure_is_reported_and_releases_guard() {
        let (gateway, token) = gateway_with_session();
        gateway.fail(Operation::InsertProject);
        let guard = SubmitGuard::new();
        let form = ProjectForm::new(gateway.clone(), None, guard.clone());

        let result = form.submit(&token, &input("Folio")).await;

        assert_matches!(result, Err(SubmitError::Gateway(GatewayError::Unavailable(_))));
        assert!(!guard.is_held(&form.guard_key(&token)));
        assert!(gateway.snapshot().is_empty());
    }

    #[tokio::test]
    async fn second_submit_while_saving_is_refused() {
        let (gateway, token) = gateway_with_session();
        let gate = gateway.hold_writes();
        let form = Arc::new(ProjectForm::new(gateway.clone(), None, SubmitGuard::new()));

        let first = tokio::spawn({
            let form = Arc::clone(&form);
            let token = token.clone();
            async move { form.submit(&token, &input("Folio")).await }
        });
        while gateway.calls(Operation::InsertProject) == 0 {
            tokio::task::yield_now().await;
        }

        let second = form.submit(&token, &input("Folio")).await;
        assert_matches!(second, Err(SubmitError::InFlight));

        gate.add_permits(1);
        first.await.unwrap().unwrap();
        assert_eq!(gateway.calls(Operation::InsertProject), 1);
        assert_eq!(gateway.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn guard_is_scoped_per_session() {
        let (gateway, token) = gateway_with_session();
        let other = gateway.open_session("second@example.com");
        let guard = SubmitGuard::new();
        let form = ProjectForm::new(gateway.clone(), None, guard.clone());

        let _held = guard.try_acquire(form.guard_key(&token)).unwrap();

        assert_matches!(
            form.submit(&token, &input("Folio")).await,
            Err(SubmitError::InFlight)
        );
        assert!(form.submit(&other, &input("Folio")).await.is_ok());
    }
}
