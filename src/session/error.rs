use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Errors surfaced by session actions. Each carries a message fit for
/// showing to the user; the underlying cause is kept as `source`.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A registration, login or profile call failed.
    #[error("{message}")]
    Auth {
        message: String,
        #[source]
        source: Option<ApiError>,
    },
    /// Persisted credentials were rejected; the session has been cleared.
    #[error("{message}")]
    SessionInvalid {
        message: String,
        #[source]
        source: Option<ApiError>,
    },
    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl SessionError {
    pub(crate) fn auth(source: ApiError, fallback: &str) -> Self {
        SessionError::Auth {
            message: source.user_message(fallback),
            source: Some(source),
        }
    }

    pub(crate) fn invalid(source: ApiError, fallback: &str) -> Self {
        SessionError::SessionInvalid {
            message: source.user_message(fallback),
            source: Some(source),
        }
    }

    /// The user-facing message.
    pub fn message(&self) -> String {
        match self {
            SessionError::Auth { message, .. } | SessionError::SessionInvalid { message, .. } => {
                message.clone()
            }
            SessionError::Storage(e) => e.to_string(),
        }
    }
}
