use std::path::PathBuf;

use clubdesk_client::config::{DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use clubdesk_client::ClientConfig;
use clubdesk_core::list::{clamp_limit, DEFAULT_PAGE_SIZE};

/// Default location of the persisted session, relative to the working directory.
pub const DEFAULT_SESSION_FILE: &str = ".clubdesk/session.json";

/// Console configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub client: ClientConfig,
    /// Where the signed-in session is persisted.
    pub session_file: PathBuf,
    /// Rows per page for list commands (default: `10`).
    pub page_size: u32,
}

impl ConsoleConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                     |
    /// |---------------------------------|-----------------------------|
    /// | `CLUBDESK_API_URL`              | `http://localhost:3000/api` |
    /// | `CLUBDESK_SESSION_FILE`         | `.clubdesk/session.json`    |
    /// | `CLUBDESK_REQUEST_TIMEOUT_SECS` | `30`                        |
    /// | `CLUBDESK_PAGE_SIZE`            | `10`                        |
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Invalid numbers fall back
    /// to their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("CLUBDESK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let request_timeout_secs = number(
            &lookup,
            "CLUBDESK_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        );
        let session_file = lookup("CLUBDESK_SESSION_FILE")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_FILE.into())
            .into();
        let page_size = clamp_limit(number(&lookup, "CLUBDESK_PAGE_SIZE", DEFAULT_PAGE_SIZE));

        Self {
            client: ClientConfig::new(base_url, request_timeout_secs),
            session_file,
            page_size,
        }
    }
}

fn number<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(var = name, value = %raw, %default, "Invalid number, using default");
            default
        }),
        None => default,
    }
}
