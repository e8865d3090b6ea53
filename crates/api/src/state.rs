use std::sync::Arc;

use folio_gateway::SharedGateway;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::dashboard::form::SubmitGuard;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Backend gateway (REST adapter in production, in-memory in tests).
    pub gateway: SharedGateway,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// In-flight project submissions, shared across requests.
    pub submit_guard: SubmitGuard,
    /// Cancelled when the server shuts down. List views mount under a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(gateway: SharedGateway, config: ServerConfig) -> Self {
        Self {
            gateway,
            config: Arc::new(config),
            submit_guard: SubmitGuard::new(),
            shutdown: CancellationToken::new(),
        }
    }
}
