use std::sync::RwLock;

use serde::Serialize;
use tracing::info;

use super::base::{read, require_token, write, LoadStatus, ResourceError, StatusCell};
use crate::api::{endpoints, ApiClient};
use crate::models::Listing;
use crate::session::SessionHandle;

const FETCH_FAILED: &str = "Failed to fetch listings";
const FETCH_ONE_FAILED: &str = "Failed to fetch listing";
const CREATE_FAILED: &str = "Failed to create listing";
const UPDATE_FAILED: &str = "Failed to update listing";
const DELETE_FAILED: &str = "Failed to delete listing";

/// Public listings plus the current user's own listings.
pub struct ListingsStore {
    api: ApiClient,
    session: SessionHandle,
    listings: RwLock<Vec<Listing>>,
    my_listings: RwLock<Vec<Listing>>,
    status: StatusCell,
}

impl ListingsStore {
    pub fn new(api: ApiClient, session: SessionHandle) -> Self {
        ListingsStore {
            api,
            session,
            listings: RwLock::default(),
            my_listings: RwLock::default(),
            status: StatusCell::default(),
        }
    }

    pub fn listings(&self) -> Vec<Listing> {
        read(&self.listings)
    }

    pub fn my_listings(&self) -> Vec<Listing> {
        read(&self.my_listings)
    }

    pub fn status(&self) -> LoadStatus {
        self.status.get()
    }

    pub async fn fetch_listings(&self) -> Result<Vec<Listing>, ResourceError> {
        self.status
            .track(false, async {
                let listings: Vec<Listing> = self
                    .api
                    .get_json(endpoints::LISTINGS)
                    .await
                    .map_err(|e| ResourceError::api(e, FETCH_FAILED))?;
                write(&self.listings, |l| *l = listings.clone());
                Ok(listings)
            })
            .await
    }

    pub async fn fetch_my_listings(&self) -> Result<Vec<Listing>, ResourceError> {
        self.status
            .track(false, async {
                require_token(&self.session)?;
                let listings: Vec<Listing> = self
                    .api
                    .get_json(endpoints::MY_LISTINGS)
                    .await
                    .map_err(|e| ResourceError::api(e, FETCH_FAILED))?;
                write(&self.my_listings, |l| *l = listings.clone());
                Ok(listings)
            })
            .await
    }

    /// Loads one listing and refreshes any cached copy of it.
    pub async fn fetch_listing(&self, id: i64) -> Result<Listing, ResourceError> {
        self.status
            .track(false, async {
                let listing: Listing = self
                    .api
                    .get_json(&endpoints::listing(id))
                    .await
                    .map_err(|e| ResourceError::api(e, FETCH_ONE_FAILED))?;
                self.replace_cached(&listing);
                Ok(listing)
            })
            .await
    }

    /// Creates a listing; the new one goes to the front of the list.
    pub async fn create_listing<B>(&self, payload: &B) -> Result<Listing, ResourceError>
    where
        B: Serialize + ?Sized,
    {
        self.status
            .track(false, async {
                require_token(&self.session)?;
                let listing: Listing = self
                    .api
                    .post_json(endpoints::LISTINGS, payload)
                    .await
                    .map_err(|e| ResourceError::api(e, CREATE_FAILED))?;
                write(&self.listings, |l| l.insert(0, listing.clone()));
                write(&self.my_listings, |l| l.insert(0, listing.clone()));
                info!(
                    event_name = "listings.create.success",
                    event_domain = "listings",
                    listing_id = listing.id,
                    "listing created"
                );
                Ok(listing)
            })
            .await
    }

    pub async fn update_listing<B>(&self, id: i64, payload: &B) -> Result<Listing, ResourceError>
    where
        B: Serialize + ?Sized,
    {
        self.status
            .track(false, async {
                require_token(&self.session)?;
                let listing: Listing = self
                    .api
                    .patch_json(&endpoints::listing(id), payload)
                    .await
                    .map_err(|e| ResourceError::api(e, UPDATE_FAILED))?;
                self.replace_cached(&listing);
                Ok(listing)
            })
            .await
    }

    pub async fn delete_listing(&self, id: i64) -> Result<(), ResourceError> {
        self.status
            .track(false, async {
                require_token(&self.session)?;
                self.api
                    .delete(&endpoints::listing(id))
                    .await
                    .map_err(|e| ResourceError::api(e, DELETE_FAILED))?;
                write(&self.listings, |l| l.retain(|x| x.id != id));
                write(&self.my_listings, |l| l.retain(|x| x.id != id));
                info!(
                    event_name = "listings.delete.success",
                    event_domain = "listings",
                    listing_id = id,
                    "listing deleted"
                );
                Ok(())
            })
            .await
    }

    fn replace_cached(&self, listing: &Listing) {
        for lock in [&self.listings, &self.my_listings] {
            write(lock, |list| {
                if let Some(slot) = list.iter_mut().find(|x| x.id == listing.id) {
                    *slot = listing.clone();
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::base::test_support::client;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_then_create_prepends() {
        let mut server = Server::new_async().await;
        let list = server
            .mock("GET", "/api/listings/")
            .with_status(200)
            .with_body(r#"[{"id": 1, "title": "Bike"}]"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/listings/")
            .match_header("authorization", "Bearer acc")
            .match_body(Matcher::Json(json!({"title": "Lamp"})))
            .with_status(201)
            .with_body(r#"{"id": 2, "title": "Lamp"}"#)
            .create_async()
            .await;

        let (api, session) = client(server.url(), Some("acc"));
        let store = ListingsStore::new(api, session);

        store.fetch_listings().await.unwrap();
        let created = store.create_listing(&json!({"title": "Lamp"})).await.unwrap();

        list.assert_async().await;
        create.assert_async().await;
        assert_eq!(created.title(), Some("Lamp"));
        let ids: Vec<i64> = store.listings().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(!store.status().loading);
    }

    #[tokio::test]
    async fn test_create_without_session_sends_nothing() {
        let mut server = Server::new_async().await;
        let create = server
            .mock("POST", "/api/listings/")
            .expect(0)
            .create_async()
            .await;

        let (api, session) = client(server.url(), None);
        let store = ListingsStore::new(api, session);
        let err = store.create_listing(&json!({"title": "Lamp"})).await.unwrap_err();

        create.assert_async().await;
        assert!(matches!(err, ResourceError::MissingToken));
        assert_eq!(
            store.status().error.as_deref(),
            Some("Authentication token not found.")
        );
    }

    #[tokio::test]
    async fn test_failure_records_server_detail_or_fallback() {
        let mut server = Server::new_async().await;
        server
            .mock("DELETE", "/api/listings/4/")
            .with_status(403)
            .with_body(r#"{"detail": "Not your listing."}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/listings/")
            .with_status(500)
            .create_async()
            .await;

        let (api, session) = client(server.url(), Some("acc"));
        let store = ListingsStore::new(api, session);

        let err = store.delete_listing(4).await.unwrap_err();
        assert_eq!(err.to_string(), "Not your listing.");
        assert_eq!(store.status().error.as_deref(), Some("Not your listing."));

        store.fetch_listings().await.unwrap_err();
        assert_eq!(store.status().error.as_deref(), Some(FETCH_FAILED));
    }

    #[tokio::test]
    async fn test_update_and_delete_keep_cache_in_sync() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/listings/my/")
            .with_status(200)
            .with_body(r#"[{"id": 1, "title": "Bike"}, {"id": 2, "title": "Lamp"}]"#)
            .create_async()
            .await;
        server
            .mock("PATCH", "/api/listings/1/")
            .with_status(200)
            .with_body(r#"{"id": 1, "title": "Red bike"}"#)
            .create_async()
            .await;
        server
            .mock("DELETE", "/api/listings/2/")
            .with_status(204)
            .create_async()
            .await;

        let (api, session) = client(server.url(), Some("acc"));
        let store = ListingsStore::new(api, session);

        store.fetch_my_listings().await.unwrap();
        store
            .update_listing(1, &json!({"title": "Red bike"}))
            .await
            .unwrap();
        store.delete_listing(2).await.unwrap();

        let mine = store.my_listings();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title(), Some("Red bike"));
    }
}
