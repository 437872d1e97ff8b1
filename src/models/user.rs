use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The User struct represents the profile returned by the current-user endpoint.
///
/// Only `username` and the admin flag are interpreted; every other field the
/// backend sends (email, names, phone, ...) is kept verbatim in `profile` so it
/// survives a round trip through persisted storage.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct User {
    pub username: String,
    /// Accepts both `isAdmin` and the backend's `is_admin`; null or absent means false.
    #[serde(
        rename = "isAdmin",
        alias = "is_admin",
        default,
        deserialize_with = "lenient_bool"
    )]
    pub is_admin: bool,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl User {
    /// Construct a new User without extra profile fields.
    pub fn new(username: impl Into<String>, is_admin: bool) -> Self {
        User {
            username: username.into(),
            is_admin,
            profile: Map::new(),
        }
    }

    /// Returns a profile field as a string, if the backend sent one.
    pub fn profile_str(&self, key: &str) -> Option<&str> {
        self.profile.get(key).and_then(Value::as_str)
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}
