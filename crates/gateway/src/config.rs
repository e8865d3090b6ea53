/// Default per-request timeout for backend calls.
const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default table holding project rows.
const DEFAULT_TABLE: &str = "projects";

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Backend base URL, e.g. `https://abc.supabase.co`. No trailing slash.
    pub url: String,
    /// Public (anon) API key sent as `apikey` on every request.
    pub anon_key: String,
    /// HTTP timeout in seconds (default: `10`).
    pub timeout_secs: u64,
    /// Table name (default: `projects`).
    pub table: String,
}

impl GatewayConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            table: DEFAULT_TABLE.to_string(),
        }
    }

    /// Load gateway configuration from environment variables.
    ///
    /// | Env Var                | Required | Default    |
    /// |------------------------|----------|------------|
    /// | `GATEWAY_URL`          | **yes**  | --         |
    /// | `GATEWAY_ANON_KEY`     | **yes**  | --         |
    /// | `GATEWAY_TIMEOUT_SECS` | no       | `10`       |
    /// | `GATEWAY_TABLE`        | no       | `projects` |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing or a number does not parse.
    pub fn from_env() -> Self {
        let url = std::env::var("GATEWAY_URL").expect("GATEWAY_URL must be set in the environment");
        let anon_key = std::env::var("GATEWAY_ANON_KEY")
            .expect("GATEWAY_ANON_KEY must be set in the environment");
        assert!(!anon_key.is_empty(), "GATEWAY_ANON_KEY must not be empty");

        let timeout_secs: u64 = std::env::var("GATEWAY_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("GATEWAY_TIMEOUT_SECS must be a valid u64");

        let table = std::env::var("GATEWAY_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.into());

        Self {
            timeout_secs,
            table,
            ..Self::new(url, anon_key)
        }
    }
}
