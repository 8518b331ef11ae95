//! Error taxonomy for bulk runs.
//!
//! Fatal errors (empty batch, bad source, session open failure) escape the
//! run because it cannot meaningfully proceed. Per-identity errors are
//! captured into the summary by default and only escape - carrying the
//! partial summary with them - when the caller disables isolation.

use crate::identity::Identity;
use crate::types::RunSummary;
use thiserror::Error;

/// Errors raised while loading identities from a source.
///
/// Always fatal: the driver never repairs or partially uses a malformed
/// source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source could be read but its shape is wrong (missing column,
    /// malformed row).
    #[error("invalid source format: {message}")]
    Format { message: String },

    /// The source itself could not be resolved (unreadable file,
    /// unresolvable group).
    #[error("target lookup failed: {message}")]
    Lookup { message: String },
}

impl SourceError {
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup {
            message: message.into(),
        }
    }
}

/// Errors raised by session open/close.
///
/// Open failures are fatal - the batch never starts. Close failures are
/// logged by the session guard and never discard a computed summary.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to open session: {0}")]
    Open(String),

    #[error("failed to close session: {0}")]
    Close(String),
}

/// Errors escaping a bulk run.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The batch is empty. Reported before any session work begins: an
    /// empty batch almost always means an upstream mistake (bad file path,
    /// empty group) that a human must see before anything destructive runs.
    #[error("no targets to process: the batch is empty")]
    NoTargets,

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// The run was aborted by a per-identity failure with isolation
    /// disabled. Carries the summary of everything processed up to and
    /// including the failing identity, so the partial result is never
    /// masked.
    #[error("batch aborted at '{identity}': {error}")]
    Aborted {
        identity: Identity,
        error: String,
        summary: RunSummary,
    },
}

impl BatchError {
    /// The partial summary carried by an abort, if any.
    pub fn partial_summary(&self) -> Option<&RunSummary> {
        match self {
            Self::Aborted { summary, .. } => Some(summary),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_display() {
        let err = SourceError::format("column 'upn' not found");
        assert_eq!(
            err.to_string(),
            "invalid source format: column 'upn' not found"
        );

        let err = SourceError::lookup("group 'Sales' not found");
        assert_eq!(err.to_string(), "target lookup failed: group 'Sales' not found");
    }

    #[test]
    fn no_targets_has_no_partial_summary() {
        assert!(BatchError::NoTargets.partial_summary().is_none());
    }
}
