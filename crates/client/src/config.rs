/// Default API base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                     |
    /// |---------------------------------|-----------------------------|
    /// | `CLUBDESK_API_URL`              | `http://localhost:3000/api` |
    /// | `CLUBDESK_REQUEST_TIMEOUT_SECS` | `30`                        |
    ///
    /// Unparseable numbers fall back to the default with a warning.
    pub fn from_env() -> Self {
        let base_url = std::env::var("CLUBDESK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let request_timeout_secs = env_number(
            "CLUBDESK_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        );
        Self::new(base_url, request_timeout_secs)
    }

    pub fn new(base_url: impl Into<String>, request_timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout_secs,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS)
    }
}

/// Read a numeric environment variable, falling back to `default`.
pub fn env_number<T: std::str::FromStr + std::fmt::Display + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(var = name, value = %raw, %default, "Invalid number, using default");
            default
        }),
        Err(_) => default,
    }
}
