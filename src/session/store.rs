use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use super::error::SessionError;
use super::persist::{self, Persisted};
use super::session::{Session, SessionHandle};
use crate::api::{endpoints, ApiClient, ApiError};
use crate::config::ApiConfig;
use crate::guard::AccessSnapshot;
use crate::models::{Credentials, RefreshedAccess, Registration, TokenPair, User};
use crate::storage::TokenStorage;

const REGISTER_FAILED: &str = "Registration failed";
const LOGIN_FAILED: &str = "Login failed";
const PROFILE_FAILED: &str = "Failed to load user profile";
const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
const NOT_LOGGED_IN: &str = "Not logged in";

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub tokens: TokenPair,
}

/// What `check_auth` found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rehydration {
    /// Stored tokens were accepted and the session is live again.
    Restored,
    /// Nothing usable was stored; the session stays empty.
    NoSession,
}

/// Single source of truth for who is logged in and what they may do.
///
/// The store owns the session handle and writes through to `storage`. Every
/// action builds its new state completely before swapping it in, so a failed
/// action never leaves a half-updated session behind.
pub struct SessionStore {
    session: SessionHandle,
    storage: Arc<dyn TokenStorage>,
    api: ApiClient,
}

impl SessionStore {
    /// `api` must draw its credentials from `session`; [`SessionStore::connect`]
    /// wires that up.
    pub fn new(session: SessionHandle, storage: Arc<dyn TokenStorage>, api: ApiClient) -> Self {
        SessionStore {
            session,
            storage,
            api,
        }
    }

    /// Creates an empty session and an API client that authenticates with it.
    pub fn connect(config: &ApiConfig, storage: Arc<dyn TokenStorage>) -> Result<Self, ApiError> {
        let session = SessionHandle::new();
        let api = ApiClient::new(config, Arc::new(session.clone()))?;
        Ok(SessionStore::new(session, storage, api))
    }

    /// Handle for components that need to read the session (resource stores).
    pub fn handle(&self) -> SessionHandle {
        self.session.clone()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // --- Derived getters

    pub fn snapshot(&self) -> Session {
        self.session.snapshot()
    }

    pub fn access(&self) -> AccessSnapshot {
        self.session.access()
    }

    pub fn is_logged_in(&self) -> bool {
        self.access().is_logged_in
    }

    pub fn is_admin(&self) -> bool {
        self.access().is_admin
    }

    pub fn username(&self) -> Option<String> {
        self.snapshot().username().map(str::to_string)
    }

    pub fn access_token(&self) -> Option<String> {
        self.snapshot().access_token().map(str::to_string)
    }

    pub fn current_user(&self) -> Option<User> {
        self.snapshot().current_user().cloned()
    }

    // --- Actions

    /// Creates an account. Does not log in.
    pub async fn register(&self, registration: &Registration) -> Result<User, SessionError> {
        debug!(
            event_name = "session.register.start",
            event_domain = "session",
            username = registration.username.as_str(),
            "registering account"
        );
        let account: User = self
            .api
            .post_json_anonymous(endpoints::AUTH_REGISTER, registration)
            .await
            .map_err(|e| {
                warn!("Registration for '{}' failed: {}", registration.username, e);
                SessionError::auth(e, REGISTER_FAILED)
            })?;

        info!(
            event_name = "session.register.success",
            event_domain = "session",
            username = account.username.as_str(),
            "account registered"
        );
        Ok(account)
    }

    /// Exchanges credentials for a token pair, loads the profile with the new
    /// access token, persists both and only then swaps in the new session.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, SessionError> {
        let tokens: TokenPair = self
            .api
            .post_json_anonymous(endpoints::AUTH_LOGIN, credentials)
            .await
            .map_err(|e| {
                warn!("Login for '{}' failed: {}", credentials.username, e);
                SessionError::auth(e, LOGIN_FAILED)
            })?;

        let user: User = self
            .api
            .get_json_with_token(endpoints::AUTH_USER, &tokens.access)
            .await
            .map_err(|e| {
                warn!(
                    "Profile fetch after login for '{}' failed: {}",
                    credentials.username, e
                );
                SessionError::auth(e, PROFILE_FAILED)
            })?;

        if let Err(e) = persist::save(self.storage.as_ref(), &tokens, &user) {
            warn!("Could not persist session for '{}': {}", user.username, e);
            self.restore_persisted();
            return Err(e.into());
        }
        self.session
            .replace(Session::authenticated(tokens.clone(), user.clone()));

        info!(
            event_name = "session.login.success",
            event_domain = "session",
            username = user.username.as_str(),
            is_admin = user.is_admin,
            "user logged in"
        );
        Ok(LoginOutcome { user, tokens })
    }

    /// Forgets the session locally. Never fails and may be called repeatedly.
    pub fn logout(&self) {
        let was_logged_in = self.is_logged_in();
        let failures = persist::clear(self.storage.as_ref());
        self.session.clear();

        if was_logged_in {
            info!(
                event_name = "session.logout",
                event_domain = "session",
                storage_failures = failures,
                "user logged out"
            );
        } else {
            debug!("Logout on an empty session");
        }
    }

    /// Asks the backend to revoke the refresh token, then logs out locally.
    /// Remote failures are logged and otherwise ignored.
    pub async fn sign_out(&self) {
        if let Some(tokens) = self.snapshot().tokens().cloned() {
            let body = json!({ "refresh": tokens.refresh });
            if let Err(e) = self
                .api
                .post_json_with_token(endpoints::AUTH_LOGOUT, &body, &tokens.access)
                .await
            {
                warn!("Server-side logout failed, clearing locally anyway: {}", e);
            }
        }
        self.logout();
    }

    /// Restores the session from storage at startup.
    ///
    /// With nothing stored this is a no-op that makes no request. Stored
    /// tokens are validated by fetching the profile; if that fails for any
    /// reason the session is logged out and `SessionInvalid` is returned.
    pub async fn check_auth(&self) -> Result<Rehydration, SessionError> {
        let persisted = match persist::load(self.storage.as_ref()) {
            Ok(p) => p,
            Err(e) => {
                warn!("Could not read persisted session: {}", e);
                self.logout();
                return Err(e.into());
            }
        };

        let (tokens, stored_user) = match persisted {
            Persisted::Nothing => {
                debug!("No persisted session found");
                return Ok(Rehydration::NoSession);
            }
            Persisted::Partial => {
                warn!("Persisted session is incomplete; discarding it");
                self.logout();
                return Ok(Rehydration::NoSession);
            }
            Persisted::Tokens { tokens, user } => (tokens, user),
        };

        let user: User = match self
            .api
            .get_json_with_token(endpoints::AUTH_USER, &tokens.access)
            .await
        {
            Ok(user) => user,
            Err(e) => {
                warn!(
                    event_name = "session.rehydrate.rejected",
                    event_domain = "session",
                    status = e.status().unwrap_or(0),
                    "stored session rejected: {}",
                    e
                );
                self.logout();
                return Err(SessionError::invalid(e, SESSION_EXPIRED));
            }
        };

        if stored_user.as_ref() != Some(&user) {
            if let Err(e) = persist::save_user(self.storage.as_ref(), &user) {
                warn!("Could not persist refreshed profile: {}", e);
            }
        }
        self.session
            .replace(Session::authenticated(tokens, user.clone()));

        info!(
            event_name = "session.rehydrate.success",
            event_domain = "session",
            username = user.username.as_str(),
            is_admin = user.is_admin,
            "session restored"
        );
        Ok(Rehydration::Restored)
    }

    /// Writes the in-memory session back to storage after a failed save, so
    /// disk and memory agree again.
    fn restore_persisted(&self) {
        let current = self.snapshot();
        match (current.tokens(), current.current_user()) {
            (Some(tokens), Some(user)) => {
                if let Err(e) = persist::save(self.storage.as_ref(), tokens, user) {
                    warn!("Could not restore persisted session: {}", e);
                }
            }
            _ => {
                persist::clear(self.storage.as_ref());
            }
        }
    }

    /// Trades the refresh token for a new access token.
    ///
    /// A rejected refresh token ends the session like a failed rehydration.
    pub async fn refresh_access_token(&self) -> Result<String, SessionError> {
        let refresh = match self.snapshot().refresh_token() {
            Some(refresh) => refresh.to_string(),
            None => {
                return Err(SessionError::Auth {
                    message: NOT_LOGGED_IN.to_string(),
                    source: None,
                })
            }
        };

        let refreshed: RefreshedAccess = match self
            .api
            .post_json_anonymous(endpoints::AUTH_REFRESH, &json!({ "refresh": refresh }))
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("Token refresh rejected: {}", e);
                self.logout();
                return Err(SessionError::invalid(e, SESSION_EXPIRED));
            }
        };

        persist::save_access(self.storage.as_ref(), &refreshed.access)?;
        let applied = self.session.update_authenticated(|auth| {
            auth.tokens.access = refreshed.access.clone();
        });
        if !applied {
            // A logout raced the refresh; do not resurrect the token on disk.
            persist::clear(self.storage.as_ref());
            return Err(SessionError::Auth {
                message: NOT_LOGGED_IN.to_string(),
                source: None,
            });
        }

        info!(
            event_name = "session.refresh.success",
            event_domain = "session",
            "access token refreshed"
        );
        Ok(refreshed.access)
    }
}
