//! Error types for MentionWatch operations

use thiserror::Error;

/// Read-path failures (mention fetch, stats, health).
///
/// None of these are cached. The feed layer recovers from them by serving the
/// last known-good entry when one exists.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Request to {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("HTTP {status} from {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
}

impl FetchError {
    /// The endpoint the failing request was sent to.
    pub fn endpoint(&self) -> &str {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Timeout { endpoint }
            | FetchError::Status { endpoint, .. }
            | FetchError::MalformedResponse { endpoint, .. } => endpoint,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}

/// Failures of mutating or on-demand actions (flag, match, ingest).
///
/// Surfaced verbatim. Nothing at this layer retries them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("Invalid {action} request: {reason}")]
    InvalidRequest { action: &'static str, reason: String },

    #[error("{action} request failed: {reason}")]
    Transport { action: &'static str, reason: String },

    #[error("{action} request timed out")]
    Timeout { action: &'static str },

    #[error("{action} returned HTTP {status}: {body}")]
    Status {
        action: &'static str,
        status: u16,
        body: String,
    },

    #[error("{action} rejected: {message}")]
    Rejected { action: &'static str, message: String },

    #[error("Malformed {action} response: {reason}")]
    MalformedResponse { action: &'static str, reason: String },
}

impl ActionError {
    pub fn action(&self) -> &'static str {
        match self {
            ActionError::InvalidRequest { action, .. }
            | ActionError::Transport { action, .. }
            | ActionError::Timeout { action }
            | ActionError::Status { action, .. }
            | ActionError::Rejected { action, .. }
            | ActionError::MalformedResponse { action, .. } => *action,
        }
    }
}
