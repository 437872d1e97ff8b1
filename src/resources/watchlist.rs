use std::sync::RwLock;

use serde_json::json;
use tracing::info;

use super::base::{read, require_token, write, LoadStatus, ResourceError, StatusCell};
use crate::api::{endpoints, ApiClient};
use crate::models::{Listing, WatchlistItem};
use crate::session::SessionHandle;

const FETCH_FAILED: &str = "Failed to load the watchlist.";
const ADD_FAILED: &str = "Failed to add the listing to the watchlist.";
const REMOVE_FAILED: &str = "Failed to remove the listing from the watchlist.";

/// The listings the current user watches. Every action needs a session.
pub struct WatchlistStore {
    api: ApiClient,
    session: SessionHandle,
    listings: RwLock<Vec<Listing>>,
    status: StatusCell,
}

impl WatchlistStore {
    pub fn new(api: ApiClient, session: SessionHandle) -> Self {
        WatchlistStore {
            api,
            session,
            listings: RwLock::default(),
            status: StatusCell::default(),
        }
    }

    pub fn listings(&self) -> Vec<Listing> {
        read(&self.listings)
    }

    pub fn contains(&self, listing_id: i64) -> bool {
        read(&self.listings).iter().any(|l| l.id == listing_id)
    }

    pub fn status(&self) -> LoadStatus {
        self.status.get()
    }

    pub async fn fetch_watchlist(&self) -> Result<Vec<WatchlistItem>, ResourceError> {
        self.status
            .track(true, async {
                require_token(&self.session)?;
                let items: Vec<WatchlistItem> = self
                    .api
                    .get_json(endpoints::WATCHLIST_ITEMS)
                    .await
                    .map_err(|e| ResourceError::api(e, FETCH_FAILED))?;
                let listings = items.iter().map(|item| item.listing.clone()).collect();
                write(&self.listings, |l| *l = listings);
                Ok(items)
            })
            .await
    }

    /// Adds a listing. Adding one that is already watched leaves the list as is.
    pub async fn add_listing(&self, listing_id: i64) -> Result<Listing, ResourceError> {
        self.status
            .track(true, async {
                require_token(&self.session)?;
                let item: WatchlistItem = self
                    .api
                    .post_json(
                        endpoints::WATCHLIST_ITEMS,
                        &json!({ "listing_id": listing_id }),
                    )
                    .await
                    .map_err(|e| ResourceError::api(e, ADD_FAILED))?;
                let listing = item.listing;
                write(&self.listings, |l| {
                    if !l.iter().any(|x| x.id == listing.id) {
                        l.push(listing.clone());
                    }
                });
                info!(
                    event_name = "watchlist.add.success",
                    event_domain = "watchlist",
                    listing_id = listing.id,
                    "listing watched"
                );
                Ok(listing)
            })
            .await
    }

    pub async fn remove_listing(&self, listing_id: i64) -> Result<(), ResourceError> {
        self.status
            .track(true, async {
                require_token(&self.session)?;
                self.api
                    .delete(&endpoints::watchlist_remove(listing_id))
                    .await
                    .map_err(|e| ResourceError::api(e, REMOVE_FAILED))?;
                write(&self.listings, |l| l.retain(|x| x.id != listing_id));
                info!(
                    event_name = "watchlist.remove.success",
                    event_domain = "watchlist",
                    listing_id = listing_id,
                    "listing unwatched"
                );
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::base::test_support::client;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_actions_without_session_make_no_request() {
        let mut server = Server::new_async().await;
        let any = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let (api, session) = client(server.url(), None);
        let store = WatchlistStore::new(api, session);

        assert!(matches!(
            store.fetch_watchlist().await,
            Err(ResourceError::MissingToken)
        ));
        assert!(matches!(
            store.add_listing(1).await,
            Err(ResourceError::MissingToken)
        ));
        assert!(matches!(
            store.remove_listing(1).await,
            Err(ResourceError::MissingToken)
        ));
        any.assert_async().await;
    }

    #[tokio::test]
    async fn test_add_is_idempotent_and_remove_filters() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/watchlist/items/")
            .with_status(200)
            .with_body(r#"[{"id": 10, "listing": {"id": 1, "title": "Bike"}}]"#)
            .create_async()
            .await;
        let add = server
            .mock("POST", "/api/watchlist/items/")
            .match_body(Matcher::Json(serde_json::json!({"listing_id": 1})))
            .with_status(201)
            .with_body(r#"{"id": 11, "listing": {"id": 1, "title": "Bike"}}"#)
            .create_async()
            .await;
        let remove = server
            .mock("DELETE", "/api/watchlist/items/1/remove/")
            .with_status(204)
            .create_async()
            .await;

        let (api, session) = client(server.url(), Some("acc"));
        let store = WatchlistStore::new(api, session);

        store.fetch_watchlist().await.unwrap();
        store.add_listing(1).await.unwrap();
        assert_eq!(store.listings().len(), 1);
        assert!(store.contains(1));

        store.remove_listing(1).await.unwrap();
        assert!(!store.contains(1));

        add.assert_async().await;
        remove.assert_async().await;
    }

    #[tokio::test]
    async fn test_success_clears_previous_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/watchlist/items/")
            .with_status(400)
            .with_body(r#"{"detail": "Listing does not exist."}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/watchlist/items/")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let (api, session) = client(server.url(), Some("acc"));
        let store = WatchlistStore::new(api, session);

        store.add_listing(99).await.unwrap_err();
        assert_eq!(
            store.status().error.as_deref(),
            Some("Listing does not exist.")
        );

        store.fetch_watchlist().await.unwrap();
        assert_eq!(store.status().error, None);
    }
}
