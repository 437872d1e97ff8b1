//! Application startup.
//!
//! Wires storage, session, API client, resource stores and route guard
//! together, then restores any persisted session.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::api::ApiError;
use crate::config::ConfigV1;
use crate::guard::{RouteGuard, RouteTable};
use crate::resources::{ListingsStore, MessagesStore, WatchlistStore};
use crate::session::{Rehydration, SessionStore};
use crate::state::AppState;
use crate::storage::{create_storage, TokenStorage};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to set up the API client: {0}")]
    Api(#[from] ApiError),
}

/// Builds the application state without touching the network.
pub fn build(config: Arc<ConfigV1>) -> Result<AppState, StartupError> {
    build_with_storage(config.clone(), create_storage(&config.storage))
}

/// Like [`build`], with a caller-supplied storage backend.
pub fn build_with_storage(
    config: Arc<ConfigV1>,
    storage: Arc<dyn TokenStorage>,
) -> Result<AppState, StartupError> {
    if !storage.is_persistent() {
        warn!("Session storage is not persistent; logins are lost on restart.");
    }

    let session = SessionStore::connect(&config.api, storage)?;
    let handle = session.handle();
    let api = session.api().clone();

    let table = match &config.routes {
        Some(routes) => {
            info!("Using {} configured routes", routes.len());
            RouteTable::new(routes.clone())
        }
        None => RouteTable::marketplace(),
    };

    Ok(AppState {
        config,
        listings: Arc::new(ListingsStore::new(api.clone(), handle.clone())),
        watchlist: Arc::new(WatchlistStore::new(api.clone(), handle.clone())),
        messages: Arc::new(MessagesStore::new(api, handle)),
        session: Arc::new(session),
        guard: Arc::new(RouteGuard::new(table)),
    })
}

/// Builds the application and restores the persisted session.
///
/// A rejected or unreadable persisted session is not fatal: it is logged and
/// the application starts logged out.
pub async fn run(config: Arc<ConfigV1>) -> Result<AppState, StartupError> {
    let state = build(config)?;

    match state.session.check_auth().await {
        Ok(Rehydration::Restored) => info!(
            event_name = "startup.session.restored",
            event_domain = "startup",
            "Starting with a restored session"
        ),
        Ok(Rehydration::NoSession) => info!("Starting without a session"),
        Err(e) => warn!(
            event_name = "startup.session.discarded",
            event_domain = "startup",
            "Starting logged out: {}",
            e
        ),
    }

    Ok(state)
}
