//! Error types for Shipguard reconciliation

use thiserror::Error;

/// Result type alias for reconciliation operations
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Reconciliation error taxonomy.
///
/// `Transport` is always "retry on the next pass" and is never surfaced to
/// an operator. `RemoteRejection` carries enough request context to diagnose
/// the failure from logs alone. Remote and database failures are carried as
/// strings so this crate stays free of reqwest/sqlx.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("remote rejected {method} {endpoint} with status {status}")]
    RemoteRejection {
        method: String,
        endpoint: String,
        status: u16,
        payload: serde_json::Value,
    },

    #[error("inconsistent local data: {0}")]
    LocalInconsistency(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    /// Whether the failure should be retried on the next scheduled pass
    /// rather than reported.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Transport(_) | SyncError::RemoteRejection { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_rejection_are_retryable() {
        assert!(SyncError::Transport("timed out".into()).is_retryable());
        assert!(SyncError::RemoteRejection {
            method: "POST".into(),
            endpoint: "orders".into(),
            status: 500,
            payload: serde_json::Value::Null,
        }
        .is_retryable());
        assert!(!SyncError::Validation("missing range".into()).is_retryable());
    }
}
