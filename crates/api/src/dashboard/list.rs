//! The owner's project list view.
//!
//! Mounting checks the session first and only then fetches projects. Every
//! gateway call races the view's lifetime token: once the view is torn down
//! (explicitly, by drop, or by server shutdown when mounted under it) pending
//! calls resolve to [`ListError::Cancelled`] and never touch the view's state.

use std::future::Future;

use folio_core::project::Project;
use folio_gateway::{AccessToken, GatewayError, Session, SharedGateway};
use tokio_util::sync::CancellationToken;

use super::notice::Notice;

#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("No active session")]
    NoSession,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("List view was torn down while mounting")]
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("List view was torn down")]
    Cancelled,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Run `fut` unless `lifetime` is cancelled first.
async fn guarded<F: Future>(lifetime: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = lifetime.cancelled() => None,
        out = fut => Some(out),
    }
}

pub struct ProjectList {
    gateway: SharedGateway,
    session: Session,
    projects: Vec<Project>,
    notice: Option<Notice>,
    lifetime: CancellationToken,
}

impl std::fmt::Debug for ProjectList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectList")
            .field("session", &self.session)
            .field("projects", &self.projects)
            .field("notice", &self.notice)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl ProjectList {
    /// Mount with a lifetime of its own.
    pub async fn mount(gateway: SharedGateway, token: AccessToken) -> Result<Self, MountError> {
        Self::mount_within(gateway, token, CancellationToken::new()).await
    }

    /// Mount under `lifetime`; cancelling it tears the view down.
    ///
    /// A failed project fetch does not fail the mount: the view starts empty
    /// with an error notice.
    pub async fn mount_within(
        gateway: SharedGateway,
        token: AccessToken,
        lifetime: CancellationToken,
    ) -> Result<Self, MountError> {
        let session = guarded(&lifetime, gateway.get_session(&token))
            .await
            .ok_or(MountError::Cancelled)??
            .ok_or(MountError::NoSession)?;

        let mut list = Self {
            gateway,
            session,
            projects: Vec::new(),
            notice: None,
            lifetime,
        };
        if let Err(ListError::Cancelled) = list.refresh().await {
            return Err(MountError::Cancelled);
        }
        Ok(list)
    }

    /// Replace the list with a fresh fetch. On failure the current list stays
    /// and an error notice is set.
    pub async fn refresh(&mut self) -> Result<(), ListError> {
        let fetched = guarded(
            &self.lifetime,
            self.gateway.list_projects(Some(&self.session.access_token)),
        )
        .await
        .ok_or(ListError::Cancelled)?;

        match fetched {
            Ok(projects) => {
                tracing::debug!(count = projects.len(), "Project list refreshed");
                self.projects = projects;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch projects");
                self.notice = Some(Notice::error(format!("Could not load projects: {e}")));
                Err(e.into())
            }
        }
    }

    /// Delete one record. On success it is dropped from the local list without
    /// a refetch; on failure the list is left as it was.
    pub async fn delete(&mut self, id: &str) -> Result<(), ListError> {
        let deleted = guarded(
            &self.lifetime,
            self.gateway.delete_project(&self.session.access_token, id),
        )
        .await
        .ok_or(ListError::Cancelled)?;

        match deleted {
            Ok(()) => {
                tracing::info!(project_id = %id, "Project deleted");
                self.projects.retain(|p| p.id != id);
                self.notice = Some(Notice::success("Project deleted"));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, project_id = %id, "Failed to delete project");
                self.notice = Some(Notice::error(format!("Could not delete project: {e}")));
                Err(e.into())
            }
        }
    }

    /// Called after the form saved `project`: refetch, then confirm.
    pub async fn after_save(&mut self, project: &Project) -> Result<(), ListError> {
        self.refresh().await?;
        self.notice = Some(Notice::success(format!("Saved {}", project.title)));
        Ok(())
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn find(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> &AccessToken {
        &self.session.access_token
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Handle to the view's lifetime token.
    pub fn lifetime(&self) -> CancellationToken {
        self.lifetime.clone()
    }

    pub fn teardown(&self) {
        self.lifetime.cancel();
    }

    pub fn is_torn_down(&self) -> bool {
        self.lifetime.is_cancelled()
    }
}

impl Drop for ProjectList {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};
    use folio_gateway::memory::Operation;
    use folio_gateway::InMemoryGateway;

    use crate::dashboard::notice::NoticeKind;

    fn project(id: &str, title: &str, age_minutes: i64) -> Project {
        Project {
            id: id.to_string(),
            title: title.to_string(),
            description: "A project worth showing".to_string(),
            image_url: "https://example.com/a.png".to_string(),
            link: "https://example.com".to_string(),
            tags: vec!["Rust".to_string()],
            user_id: None,
            created_at: Utc::now() - Duration::minutes(age_minutes),
            updated_at: None,
        }
    }

    /// Gateway holding `[{1, A}, {2, B}]` (newest first) and a live session.
    fn seeded() -> (Arc<InMemoryGateway>, AccessToken) {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway.seed(project("2", "B", 10));
        gateway.seed(project("1", "A", 1));
        let token = gateway.open_session("owner@example.com");
        (gateway, token)
    }

    fn ids(list: &ProjectList) -> Vec<&str> {
        list.projects().iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn mount_checks_session_before_fetching() {
        let (gateway, _) = seeded();

        let result = ProjectList::mount(gateway.clone(), AccessToken::new("nope")).await;

        assert_matches!(result, Err(MountError::NoSession));
        assert_eq!(gateway.calls(Operation::GetSession), 1);
        assert_eq!(gateway.calls(Operation::ListProjects), 0);
    }

    #[tokio::test]
    async fn mount_loads_projects_newest_first() {
        let (gateway, token) = seeded();

        let list = ProjectList::mount(gateway, token).await.unwrap();

        assert_eq!(ids(&list), vec!["1", "2"]);
        assert!(list.notice().is_none());
        assert_eq!(list.session().user.email.as_deref(), Some("owner@example.com"));
    }

    #[tokio::test]
    async fn failed_fetch_still_mounts_with_error_notice() {
        let (gateway, token) = seeded();
        gateway.fail(Operation::ListProjects);

        let list = ProjectList::mount(gateway, token).await.unwrap();

        assert!(list.projects().is_empty());
        assert_matches!(list.notice(), Some(n) if n.is_error());
    }

    #[tokio::test]
    async fn delete_removes_only_that_entry() {
        let (gateway, token) = seeded();
        let mut list = ProjectList::mount(gateway.clone(), token).await.unwrap();

        list.delete("1").await.unwrap();

        assert_eq!(list.projects().len(), 1);
        assert_eq!(list.projects()[0].id, "2");
        assert_eq!(list.projects()[0].title, "B");
        assert_eq!(list.notice().map(|n| n.kind), Some(NoticeKind::Success));
        // Local filter, no refetch.
        assert_eq!(gateway.calls(Operation::ListProjects), 1);
    }

    #[tokio::test]
    async fn failed_delete_leaves_list_unchanged() {
        let (gateway, token) = seeded();
        let mut list = ProjectList::mount(gateway.clone(), token).await.unwrap();
        gateway.fail(Operation::DeleteProject);

        let result = list.delete("1").await;

        assert_matches!(result, Err(ListError::Gateway(_)));
        assert_eq!(ids(&list), vec!["1", "2"]);
        assert_matches!(list.notice(), Some(n) if n.is_error());
    }

    #[tokio::test]
    async fn deleting_missing_id_is_reported() {
        let (gateway, token) = seeded();
        let mut list = ProjectList::mount(gateway, token).await.unwrap();

        let result = list.delete("missing").await;

        assert_matches!(result, Err(ListError::Gateway(GatewayError::NotFound { .. })));
        assert_eq!(ids(&list), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_list() {
        let (gateway, token) = seeded();
        let mut list = ProjectList::mount(gateway.clone(), token).await.unwrap();
        gateway.seed(project("3", "C", 0));
        gateway.fail(Operation::ListProjects);

        assert!(list.refresh().await.is_err());
        assert_eq!(ids(&list), vec!["1", "2"]);

        gateway.recover(Operation::ListProjects);
        list.dismiss_notice();
        list.refresh().await.unwrap();
        assert_eq!(ids(&list), vec!["3", "1", "2"]);
        assert!(list.notice().is_none());
    }

    #[tokio::test]
    async fn after_save_refetches_and_confirms() {
        let (gateway, token) = seeded();
        let mut list = ProjectList::mount(gateway.clone(), token).await.unwrap();
        let saved = project("3", "C", 0);
        gateway.seed(saved.clone());

        list.after_save(&saved).await.unwrap();

        assert_eq!(list.projects().len(), 3);
        assert_eq!(list.notice().map(|n| n.message.as_str()), Some("Saved C"));
    }

    #[tokio::test]
    async fn torn_down_view_ignores_pending_delete() {
        let (gateway, token) = seeded();
        let mut list = ProjectList::mount(gateway.clone(), token).await.unwrap();
        let lifetime = list.lifetime();
        let _gate = gateway.hold_writes();

        let cancel = async {
            while gateway.calls(Operation::DeleteProject) == 0 {
                tokio::task::yield_now().await;
            }
            lifetime.cancel();
        };
        let (result, ()) = tokio::join!(list.delete("1"), cancel);

        assert_matches!(result, Err(ListError::Cancelled));
        assert!(list.is_torn_down());
        assert_eq!(ids(&list), vec!["1", "2"]);
        assert!(list.notice().is_none());
    }

    #[tokio::test]
    async fn mount_under_cancelled_lifetime_makes_no_calls() {
        let (gateway, token) = seeded();
        let lifetime = CancellationToken::new();
        lifetime.cancel();

        let result = ProjectList::mount_within(gateway.clone(), token, lifetime).await;

        assert_matches!(result, Err(MountError::Cancelled));
        assert_eq!(gateway.calls(Operation::GetSession), 0);
    }

    #[tokio::test]
    async fn dropping_the_view_cancels_its_lifetime() {
        let (gateway, token) = seeded();
        let parent = CancellationToken::new();
        let list = ProjectList::mount_within(gateway, token, parent.child_token())
            .await
            .unwrap();
        let lifetime = list.lifetime();

        drop(list);

        assert!(lifetime.is_cancelled());
        assert!(!parent.is_cancelled());
    }
}
