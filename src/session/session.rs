use std::sync::{Arc, PoisonError, RwLock};

use crate::api::CredentialSource;
use crate::guard::AccessSnapshot;
use crate::models::{TokenPair, User};

/// Tokens and profile of a logged-in user. They only ever exist together.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedSession {
    pub tokens: TokenPair,
    pub user: User,
}

/// The in-memory login state.
///
/// A session is logged in exactly when it holds an [`AuthenticatedSession`];
/// a token without a profile (or the reverse) cannot be represented.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    auth: Option<AuthenticatedSession>,
}

impl Session {
    pub fn empty() -> Self {
        Session::default()
    }

    pub fn authenticated(tokens: TokenPair, user: User) -> Self {
        Session {
            auth: Some(AuthenticatedSession { tokens, user }),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.auth.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.user.username.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.auth.as_ref().is_some_and(|a| a.user.is_admin)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.tokens.access.as_str())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.tokens.refresh.as_str())
    }

    pub fn current_user(&self) -> Option<&User> {
        self.auth.as_ref().map(|a| &a.user)
    }

    pub fn tokens(&self) -> Option<&TokenPair> {
        self.auth.as_ref().map(|a| &a.tokens)
    }

    /// The two facts the route guard decides on.
    pub fn access(&self) -> AccessSnapshot {
        AccessSnapshot {
            is_logged_in: self.is_logged_in(),
            is_admin: self.is_admin(),
        }
    }
}

/// Shared handle to the process-wide session.
///
/// Readers get clones; writers replace the whole value, so overlapping
/// actions resolve as last-writer-wins.
#[derive(Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        SessionHandle::default()
    }

    pub fn snapshot(&self) -> Session {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn access(&self) -> AccessSnapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .access()
    }

    pub(crate) fn replace(&self, session: Session) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// Applies `f` to the logged-in record, if there is one.
    pub(crate) fn update_authenticated<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut AuthenticatedSession),
    {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match guard.auth.as_mut() {
            Some(auth) => {
                f(auth);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&self) {
        self.replace(Session::empty());
    }
}

impl CredentialSource for SessionHandle {
    fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .access_token()
            .map(str::to_string)
    }
}
