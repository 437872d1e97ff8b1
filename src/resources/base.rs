use std::future::Future;
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

use crate::api::{ApiError, CredentialSource};
use crate::session::SessionHandle;

#[derive(Debug, Error)]
pub enum ResourceError {
    /// The action needs a logged-in session and there is none. No request
    /// was sent.
    #[error("Authentication token not found.")]
    MissingToken,
    #[error("{message}")]
    Api {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl ResourceError {
    pub(crate) fn api(source: ApiError, fallback: &str) -> Self {
        ResourceError::Api {
            message: source.user_message(fallback),
            source,
        }
    }
}

/// Loading flag and last error of a resource store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStatus {
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct StatusCell(RwLock<LoadStatus>);

impl StatusCell {
    pub(crate) fn get(&self) -> LoadStatus {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn update(&self, f: impl FnOnce(&mut LoadStatus)) {
        f(&mut self.0.write().unwrap_or_else(PoisonError::into_inner));
    }

    /// Runs `action` with `loading` set. A failure is recorded as the
    /// store's error; success clears it when `clear_on_success` is set.
    pub(crate) async fn track<T, F>(
        &self,
        clear_on_success: bool,
        action: F,
    ) -> Result<T, ResourceError>
    where
        F: Future<Output = Result<T, ResourceError>>,
    {
        self.update(|s| s.loading = true);
        let result = action.await;
        self.update(|s| {
            s.loading = false;
            match &result {
                Err(e) => s.error = Some(e.to_string()),
                Ok(_) if clear_on_success => s.error = None,
                Ok(_) => {}
            }
        });
        result
    }

    /// Records an error without touching `loading`.
    pub(crate) fn record<T>(&self, result: Result<T, ResourceError>) -> Result<T, ResourceError> {
        if let Err(e) = &result {
            let message = e.to_string();
            self.update(|s| s.error = Some(message));
        }
        result
    }
}

pub(crate) fn require_token(session: &SessionHandle) -> Result<(), ResourceError> {
    match session.access_token() {
        Some(_) => Ok(()),
        None => Err(ResourceError::MissingToken),
    }
}

pub(crate) fn read<T: Clone>(lock: &RwLock<T>) -> T {
    lock.read().unwrap_or_else(PoisonError::into_inner).clone()
}

pub(crate) fn write<T>(lock: &RwLock<T>, f: impl FnOnce(&mut T)) {
    f(&mut lock.write().unwrap_or_else(PoisonError::into_inner));
}
