use clubdesk_core::error::CoreError;
use clubdesk_core::form::{FieldErrors, ServerErrorBody};

/// Errors from the REST client layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Top-level message, or the status reason when the body had none.
        message: String,
        /// Per-field messages keyed by wire field name.
        field_errors: FieldErrors,
    },

    /// A 2xx body did not match the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    /// HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The rejection as a [`ServerErrorBody`] for form routing.
    ///
    /// Non-API errors carry only their display text as the message.
    pub fn server_body(&self) -> ServerErrorBody {
        match self {
            Self::Api {
                message,
                field_errors,
                ..
            } => ServerErrorBody {
                message: Some(message.clone()),
                field_errors: field_errors.clone(),
            },
            other => ServerErrorBody {
                message: Some(other.to_string()),
                field_errors: FieldErrors::new(),
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Core(CoreError::NotFound { .. })) || self.status() == Some(404)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
