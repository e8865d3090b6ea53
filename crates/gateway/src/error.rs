/// Errors from the persistence gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Gateway API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The token or credentials were rejected.
    #[error("Gateway rejected the credentials")]
    Unauthorized,

    /// No row matched the given id.
    #[error("Project {id} not found")]
    NotFound { id: String },

    /// The backend answered with a body we could not interpret.
    #[error("Unexpected gateway response: {0}")]
    Decode(String),

    /// The backend is not reachable (used by the in-memory adapter).
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    /// Whether the failure means the caller has no valid session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Unauthorized)
    }
}
