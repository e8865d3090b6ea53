//! REST adapter for a PostgREST + GoTrue backend.
//!
//! Table operations go to `/rest/v1/{table}`, auth operations to `/auth/v1/...`.
//! Every request carries the `apikey` header; table requests authenticate as the
//! session token when one is given and as the anon key otherwise.

use std::time::Duration;

use async_trait::async_trait;
use folio_core::project::{NewProject, Project, ProjectChanges};
use reqwest::{Method, RequestBuilder, StatusCode};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::models::{AccessToken, Credentials, Session, User};
use crate::Gateway;

/// Ask PostgREST to echo affected rows so inserts and updates return the record.
const PREFER_REPRESENTATION: &str = "return=representation";

/// HTTP client for the hosted backend.
pub struct RestGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl RestGateway {
    /// Build a client with the configured timeout.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Create a gateway reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: GatewayConfig) -> Self {
        Self { client, config }
    }

    // ---- private helpers ----

    fn table_request(&self, method: Method, token: Option<&AccessToken>) -> RequestBuilder {
        let bearer = token
            .map(AccessToken::as_str)
            .unwrap_or(self.config.anon_key.as_str());
        self.client
            .request(
                method,
                format!("{}/rest/v1/{}", self.config.url, self.config.table),
            )
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
    }

    fn auth_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/auth/v1/{path}", self.config.url))
            .header("apikey", &self.config.anon_key)
    }

    /// Map 401/403 to [`GatewayError::Unauthorized`] and any other non-2xx
    /// status to [`GatewayError::Api`] carrying the body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GatewayError::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Rows echoed by a mutating request; an empty list means no row matched `id`.
    async fn single_row(response: reqwest::Response, id: &str) -> Result<Project, GatewayError> {
        let rows: Vec<Project> = Self::parse_response(response).await?;
        rows.into_iter().next().ok_or_else(|| GatewayError::NotFound {
            id: id.to_string(),
        })
    }
}

#[async_trait]
impl Gateway for RestGateway {
    async fn health_check(&self) -> Result<(), GatewayError> {
        let response = self.auth_request(Method::GET, "health").send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn list_projects(
        &self,
        token: Option<&AccessToken>,
    ) -> Result<Vec<Project>, GatewayError> {
        tracing::debug!(table = %self.config.table, anonymous = token.is_none(), "Listing projects");
        let response = self
            .table_request(Method::GET, token)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn find_project(
        &self,
        token: &AccessToken,
        id: &str,
    ) -> Result<Option<Project>, GatewayError> {
        let response = self
            .table_request(Method::GET, Some(token))
            .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))])
            .send()
            .await?;
        let rows: Vec<Project> = Self::parse_response(response).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_project(
        &self,
        token: &AccessToken,
        record: &NewProject,
    ) -> Result<Project, GatewayError> {
        let response = self
            .table_request(Method::POST, Some(token))
            .header("Prefer", PREFER_REPRESENTATION)
            .json(record)
            .send()
            .await?;
        let rows: Vec<Project> = Self::parse_response(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| GatewayError::Decode("insert returned no rows".to_string()))
    }

    async fn update_project(
        &self,
        token: &AccessToken,
        id: &str,
        changes: &ProjectChanges,
    ) -> Result<Project, GatewayError> {
        let response = self
            .table_request(Method::PATCH, Some(token))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", PREFER_REPRESENTATION)
            .json(changes)
            .send()
            .await?;
        Self::single_row(response, id).await
    }

    async fn delete_project(&self, token: &AccessToken, id: &str) -> Result<(), GatewayError> {
        let response = self
            .table_request(Method::DELETE, Some(token))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", PREFER_REPRESENTATION)
            .send()
            .await?;
        Self::single_row(response, id).await?;
        Ok(())
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, GatewayError> {
        let response = self
            .auth_request(Method::POST, "token")
            .query(&[("grant_type", "password")])
            .json(credentials)
            .send()
            .await?;
        // GoTrue answers bad credentials with 400 rather than 401.
        if response.status() == StatusCode::BAD_REQUEST {
            return Err(GatewayError::Unauthorized);
        }
        Self::parse_response(response).await
    }

    async fn get_session(&self, token: &AccessToken) -> Result<Option<Session>, GatewayError> {
        let user = self.get_current_user(token).await?;
        Ok(user.map(|user| Session {
            access_token: token.clone(),
            refresh_token: None,
            expires_in: None,
            user,
        }))
    }

    async fn get_current_user(&self, token: &AccessToken) -> Result<Option<User>, GatewayError> {
        let response = self
            .auth_request(Method::GET, "user")
            .bearer_auth(token.as_str())
            .send()
            .await?;
        match Self::parse_response(response).await {
            Ok(user) => Ok(Some(user)),
            Err(GatewayError::Unauthorized) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), GatewayError> {
        let response = self
            .auth_request(Method::POST, "logout")
            .bearer_auth(token.as_str())
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}
