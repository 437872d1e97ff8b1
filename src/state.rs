//! Shared application state.
//!
//! Holds the session, the resource stores and the route guard. All of them
//! share one session handle and one API client.

use std::sync::Arc;

use crate::config::ConfigV1;
use crate::guard::{Navigation, RouteGuard};
use crate::resources::{ListingsStore, MessagesStore, WatchlistStore};
use crate::session::SessionStore;

/// Application state shared by every view. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Login state and the actions that change it.
    pub session: Arc<SessionStore>,
    pub listings: Arc<ListingsStore>,
    pub watchlist: Arc<WatchlistStore>,
    pub messages: Arc<MessagesStore>,
    /// Navigation checks against the configured route table.
    pub guard: Arc<RouteGuard>,
}

impl AppState {
    /// Checks a navigation against the current session.
    pub fn navigate(&self, target: &str) -> Navigation {
        self.guard.check(target, self.session.access())
    }
}
