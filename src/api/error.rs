use thiserror::Error;

/// Failures of a single backend call.
///
/// Callers decide how to present these; the session layer collapses every
/// variant into one user-facing message, so an unreachable backend and a
/// rejected credential look the same to the user.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("unable to reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} failed ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Http {
        url: String,
        status: u16,
        message: Option<String>,
    },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// HTTP status of a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The message the server put in its error body, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// The server-provided detail, or `fallback` when there is none.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }
}
