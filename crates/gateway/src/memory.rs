//! In-memory gateway with the same contract as the REST adapter.
//!
//! Used by the test suites and by `GATEWAY_MODE=memory` for local runs without
//! a hosted backend. Besides storage it keeps per-operation call counts, can
//! be told to fail chosen operations, and can hold mutating calls behind a
//! gate so tests can observe requests that are still in flight.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use folio_core::project::{NewProject, Project, ProjectChanges};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::error::GatewayError;
use crate::models::{AccessToken, Credentials, Session, User};
use crate::Gateway;

/// Lifetime reported for sessions issued by [`InMemoryGateway::sign_in`].
const SESSION_EXPIRES_IN_SECS: i64 = 3600;

/// Gateway operations, used to count calls and inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    HealthCheck,
    ListProjects,
    FindProject,
    InsertProject,
    UpdateProject,
    DeleteProject,
    SignIn,
    GetSession,
    GetCurrentUser,
    SignOut,
}

impl Operation {
    fn is_write(self) -> bool {
        matches!(
            self,
            Operation::InsertProject | Operation::UpdateProject | Operation::DeleteProject
        )
    }
}

struct Account {
    email: String,
    password: String,
    user: User,
}

#[derive(Default)]
struct MemoryState {
    /// Rows in insertion order.
    projects: Vec<Project>,
    accounts: Vec<Account>,
    sessions: HashMap<String, User>,
    calls: HashMap<Operation, usize>,
    failing: HashSet<Operation>,
    write_gate: Option<Arc<Semaphore>>,
}

impl MemoryState {
    /// Count the call and apply any injected failure.
    fn record(&mut self, op: Operation) -> Result<(), GatewayError> {
        *self.calls.entry(op).or_default() += 1;
        if self.failing.contains(&op) {
            return Err(GatewayError::Unavailable(format!("{op:?} failure injected")));
        }
        Ok(())
    }

    fn user_for(&self, token: &AccessToken) -> Option<User> {
        self.sessions.get(token.as_str()).cloned()
    }

    fn require_user(&self, token: &AccessToken) -> Result<User, GatewayError> {
        self.user_for(token).ok_or(GatewayError::Unauthorized)
    }

    fn account_mut(&mut self, email: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.email == email)
    }
}

/// Process-local stand-in for the hosted backend.
#[derive(Default)]
pub struct InMemoryGateway {
    state: Mutex<MemoryState>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a password account, replacing the password if the email exists.
    pub fn add_account(&self, email: &str, password: &str) -> User {
        let mut state = self.lock();
        if let Some(account) = state.account_mut(email) {
            account.password = password.to_string();
            return account.user.clone();
        }
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
        };
        state.accounts.push(Account {
            email: email.to_string(),
            password: password.to_string(),
            user: user.clone(),
        });
        user
    }

    /// Open a session for `email` without a sign-in call, creating the account if needed.
    pub fn open_session(&self, email: &str) -> AccessToken {
        let user = {
            let mut state = self.lock();
            state.account_mut(email).map(|a| a.user.clone())
        };
        let user = match user {
            Some(user) => user,
            None => self.add_account(email, &Uuid::new_v4().to_string()),
        };
        let token = Uuid::new_v4().to_string();
        self.lock().sessions.insert(token.clone(), user);
        AccessToken::new(token)
    }

    /// Insert a row as-is, bypassing call counting.
    pub fn seed(&self, project: Project) {
        self.lock().projects.push(project);
    }

    /// Current rows in insertion order.
    pub fn snapshot(&self) -> Vec<Project> {
        self.lock().projects.clone()
    }

    /// Number of times `op` has been called.
    pub fn calls(&self, op: Operation) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Make every subsequent `op` call fail with [`GatewayError::Unavailable`].
    pub fn fail(&self, op: Operation) {
        self.lock().failing.insert(op);
    }

    /// Undo [`InMemoryGateway::fail`].
    pub fn recover(&self, op: Operation) {
        self.lock().failing.remove(&op);
    }

    /// Hold insert/update/delete calls until permits are added to the returned
    /// semaphore. Calls are counted before they block.
    pub fn hold_writes(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.lock().write_gate = Some(Arc::clone(&gate));
        gate
    }

    async fn enter(&self, op: Operation) -> Result<(), GatewayError> {
        let gate = {
            let mut state = self.lock();
            state.record(op)?;
            if op.is_write() {
                state.write_gate.clone()
            } else {
                None
            }
        };
        if let Some(gate) = gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| GatewayError::Unavailable(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl Gateway for InMemoryGateway {
    async fn health_check(&self) -> Result<(), GatewayError> {
        self.enter(Operation::HealthCheck).await
    }

    async fn list_projects(
        &self,
        _token: Option<&AccessToken>,
    ) -> Result<Vec<Project>, GatewayError> {
        self.enter(Operation::ListProjects).await?;
        let state = self.lock();
        // Reverse first so the stable sort keeps later inserts ahead on equal timestamps.
        let mut rows: Vec<Project> = state.projects.iter().rev().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_project(
        &self,
        token: &AccessToken,
        id: &str,
    ) -> Result<Option<Project>, GatewayError> {
        self.enter(Operation::FindProject).await?;
        let state = self.lock();
        state.require_user(token)?;
        Ok(state.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_project(
        &self,
        token: &AccessToken,
        record: &NewProject,
    ) -> Result<Project, GatewayError> {
        self.enter(Operation::InsertProject).await?;
        let mut state = self.lock();
        state.require_user(token)?;
        let project = Project {
            id: Uuid::new_v4().to_string(),
            title: record.title.clone(),
            description: record.description.clone(),
            image_url: record.image_url.clone(),
            link: record.link.clone(),
            tags: record.tags.clone(),
            user_id: Some(record.user_id.clone()),
            created_at: Utc::now(),
            updated_at: None,
        };
        state.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        token: &AccessToken,
        id: &str,
        changes: &ProjectChanges,
    ) -> Result<Project, GatewayError> {
        self.enter(Operation::UpdateProject).await?;
        let mut state = self.lock();
        state.require_user(token)?;
        let project = state
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| GatewayError::NotFound { id: id.to_string() })?;
        project.title = changes.title.clone();
        project.description = changes.description.clone();
        project.image_url = changes.image_url.clone();
        project.link = changes.link.clone();
        project.tags = changes.tags.clone();
        project.updated_at = Some(changes.updated_at);
        Ok(project.clone())
    }

    async fn delete_project(&self, token: &AccessToken, id: &str) -> Result<(), GatewayError> {
        self.enter(Operation::DeleteProject).await?;
        let mut state = self.lock();
        state.require_user(token)?;
        let before = state.projects.len();
        state.projects.retain(|p| p.id != id);
        if state.projects.len() == before {
            return Err(GatewayError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, GatewayError> {
        self.enter(Operation::SignIn).await?;
        let mut state = self.lock();
        let user = state
            .accounts
            .iter()
            .find(|a| a.email == credentials.email && a.password == credentials.password)
            .map(|a| a.user.clone())
            .ok_or(GatewayError::Unauthorized)?;
        let token = Uuid::new_v4().to_string();
        state.sessions.insert(token.clone(), user.clone());
        Ok(Session {
            access_token: AccessToken::new(token),
            refresh_token: Some(Uuid::new_v4().to_string()),
            expires_in: Some(SESSION_EXPIRES_IN_SECS),
            user,
        })
    }

    async fn get_session(&self, token: &AccessToken) -> Result<Option<Session>, GatewayError> {
        self.enter(Operation::GetSession).await?;
        Ok(self.lock().user_for(token).map(|user| Session {
            access_token: token.clone(),
            refresh_token: None,
            expires_in: None,
            user,
        }))
    }

    async fn get_current_user(&self, token: &AccessToken) -> Result<Option<User>, GatewayError> {
        self.enter(Operation::GetCurrentUser).await?;
        Ok(self.lock().user_for(token))
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), GatewayError> {
        self.enter(Operation::SignOut).await?;
        self.lock().sessions.remove(token.as_str());
        Ok(())
    }
}
