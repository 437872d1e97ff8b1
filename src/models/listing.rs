use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A marketplace listing. Only the id is interpreted; the rest is passed
/// through as the backend sends it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Listing {
    /// The listing title, whichever of the backend's field names carries it.
    pub fn title(&self) -> Option<&str> {
        self.fields
            .get("title")
            .or_else(|| self.fields.get("titel"))
            .and_then(Value::as_str)
    }
}

/// A watchlist entry wrapping the listing it points to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WatchlistItem {
    pub id: i64,
    pub listing: Listing,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}
