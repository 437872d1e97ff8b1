use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Access flags attached to a route. Missing or malformed flags mean
/// "no restriction".
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
pub struct RouteMeta {
    #[serde(
        rename = "requiresAuth",
        alias = "requires_auth",
        default,
        deserialize_with = "lenient_flag"
    )]
    pub requires_auth: bool,
    #[serde(
        rename = "requiresAdmin",
        alias = "requires_admin",
        default,
        deserialize_with = "lenient_flag"
    )]
    pub requires_admin: bool,
    #[serde(
        rename = "requiresGuest",
        alias = "requires_guest",
        default,
        deserialize_with = "lenient_flag"
    )]
    pub requires_guest: bool,
}

/// Only a literal `true` sets a flag.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

impl RouteMeta {
    pub fn public() -> Self {
        RouteMeta::default()
    }

    pub fn auth() -> Self {
        RouteMeta {
            requires_auth: true,
            ..RouteMeta::default()
        }
    }

    /// Login plus admin; anonymous visitors are sent to the login page first.
    pub fn admin() -> Self {
        RouteMeta {
            requires_auth: true,
            requires_admin: true,
            ..RouteMeta::default()
        }
    }

    pub fn guest() -> Self {
        RouteMeta {
            requires_guest: true,
            ..RouteMeta::default()
        }
    }
}

/// One entry of the route table. `path` may contain `:param` segments.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct Route {
    pub path: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub meta: RouteMeta,
}

impl Route {
    pub fn new(path: impl Into<String>, name: impl Into<String>, meta: RouteMeta) -> Self {
        Route {
            path: path.into(),
            name: Some(name.into()),
            meta,
        }
    }

    fn matches(&self, segments: &[&str]) -> bool {
        let pattern = path_segments(&self.path);
        pattern.len() == segments.len()
            && pattern
                .iter()
                .zip(segments)
                .all(|(p, s)| p.starts_with(':') || p == s)
    }
}

/// Ordered route list; the first matching entry wins.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        RouteTable { routes }
    }

    /// The marketplace's built-in routes.
    pub fn marketplace() -> Self {
        RouteTable::new(vec![
            Route::new("/", "Home", RouteMeta::public()),
            Route::new("/login", "Login", RouteMeta::guest()),
            Route::new("/register", "Register", RouteMeta::guest()),
            Route::new("/create-listing", "CreateListing", RouteMeta::auth()),
            Route::new("/my-messages", "MyMessages", RouteMeta::auth()),
            Route::new(
                "/my-messages/:conversationId",
                "Conversation",
                RouteMeta::auth(),
            ),
            Route::new("/my-watchlist", "MyWatchlist", RouteMeta::auth()),
            Route::new("/my-listings", "MyListings", RouteMeta::auth()),
            Route::new("/edit-listing/:id", "EditListing", RouteMeta::auth()),
            Route::new("/listing/:id", "ListingDetail", RouteMeta::public()),
            Route::new("/about", "About", RouteMeta::public()),
            Route::new("/admin", "Admin", RouteMeta::admin()),
        ])
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Finds the route for a navigation target. Query string, fragment and
    /// trailing slashes are ignored.
    pub fn resolve(&self, target: &str) -> Option<&Route> {
        let segments = path_segments(strip_query(target));
        self.routes.iter().find(|route| route.matches(&segments))
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        RouteTable::marketplace()
    }
}

fn strip_query(target: &str) -> &str {
    match target.find(|c: char| c == '?' || c == '#') {
        Some(idx) => &target[..idx],
        None => target,
    }
}

fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
