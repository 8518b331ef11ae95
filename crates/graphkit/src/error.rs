//! Error types for Microsoft Graph operations.
//!
//! Errors are categorized to enable retry logic and appropriate user
//! feedback: throttling and network failures are transient, everything
//! else is not.

use thiserror::Error;

/// Result type for Graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of Graph errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-related errors (transient, retryable)
    Network,
    /// Authentication or authorization failure (bad credentials, missing
    /// application permission)
    Auth,
    /// Mailbox, user, or group not found
    NotFound,
    /// Request throttled by the service (transient, retryable)
    Throttled,
    /// Any other API-level failure
    Api,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::Throttled)
    }

    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Auth => "Authentication failed",
            Self::NotFound => "Resource not found",
            Self::Throttled => "Request throttled",
            Self::Api => "Graph API error",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your internet connection and try again",
            Self::Auth => {
                "Verify the tenant id, client id, secret, and granted application permissions"
            }
            Self::NotFound => "Verify the mailbox, user, or group name",
            Self::Throttled => "Wait a moment and retry; reduce batch size if it persists",
            Self::Api => "Check the error details for more information",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur during Graph operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network-related error (connection, timeout, DNS, TLS)
    #[error("network error: {message}")]
    Network { message: String },

    /// Authentication or authorization failure
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// The addressed resource does not exist
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// The service throttled the request (HTTP 429 or 503)
    #[error("throttled by the service (HTTP {status})")]
    Throttled { status: u16 },

    /// Any other API-level failure
    #[error("Graph API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Get the error category for retry logic.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Network { .. } => ErrorCategory::Network,
            Error::Auth { .. } => ErrorCategory::Auth,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Throttled { .. } => ErrorCategory::Throttled,
            Error::Api { .. } => ErrorCategory::Api,
            _ => ErrorCategory::Other,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Classify an HTTP error status against a resource being addressed.
    pub fn from_status(status: u16, resource: &str) -> Self {
        match status {
            401 | 403 => Error::Auth {
                message: format!("HTTP {status} for {resource}"),
            },
            404 => Error::NotFound {
                resource: resource.to_string(),
            },
            429 | 503 => Error::Throttled { status },
            _ => Error::Api {
                status,
                message: format!("request for {resource} failed"),
            },
        }
    }

    /// Classify a transport-level error against a resource being addressed.
    pub fn from_transport(err: &ureq::Error, resource: &str) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::from_status(*code, resource),
            other => Error::Network {
                message: format!("{other} ({resource})"),
            },
        }
    }
}
