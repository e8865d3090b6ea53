//! Persistence gateway for the hosted backend.
//!
//! The [`Gateway`] trait is the only way the rest of the service reaches the
//! `projects` table or the auth service. Two adapters implement it:
//!
//! - [`rest::RestGateway`] -- PostgREST/GoTrue over HTTP via [`reqwest`].
//! - [`memory::InMemoryGateway`] -- process-local table for tests and local runs.

use std::sync::Arc;

use async_trait::async_trait;
use folio_core::project::{NewProject, Project, ProjectChanges};

pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod rest;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use memory::InMemoryGateway;
pub use models::{AccessToken, Credentials, Session, User};
pub use rest::RestGateway;

/// Shared handle passed to every component that talks to the backend.
pub type SharedGateway = Arc<dyn Gateway>;

/// Table-scoped CRUD plus session queries against the hosted backend.
///
/// Table operations run as the caller identified by `token`; `list_projects`
/// also accepts `None` for an anonymous read.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Cheap reachability check.
    async fn health_check(&self) -> Result<(), GatewayError>;

    /// All project rows, newest `created_at` first.
    async fn list_projects(
        &self,
        token: Option<&AccessToken>,
    ) -> Result<Vec<Project>, GatewayError>;

    async fn find_project(
        &self,
        token: &AccessToken,
        id: &str,
    ) -> Result<Option<Project>, GatewayError>;

    async fn insert_project(
        &self,
        token: &AccessToken,
        record: &NewProject,
    ) -> Result<Project, GatewayError>;

    /// Update the row whose id equals `id`. Missing rows yield [`GatewayError::NotFound`].
    async fn update_project(
        &self,
        token: &AccessToken,
        id: &str,
        changes: &ProjectChanges,
    ) -> Result<Project, GatewayError>;

    /// Delete the row whose id equals `id`. Missing rows yield [`GatewayError::NotFound`].
    async fn delete_project(&self, token: &AccessToken, id: &str) -> Result<(), GatewayError>;

    /// Password sign-in. Bad credentials yield [`GatewayError::Unauthorized`].
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, GatewayError>;

    /// The session behind `token`, or `None` if the token is not (or no longer) valid.
    async fn get_session(&self, token: &AccessToken) -> Result<Option<Session>, GatewayError>;

    async fn get_current_user(&self, token: &AccessToken) -> Result<Option<User>, GatewayError>;

    async fn sign_out(&self, token: &AccessToken) -> Result<(), GatewayError>;
}
