//! Backend paths, relative to the configured base URL.

pub const AUTH_REGISTER: &str = "/api/auth/register/";
pub const AUTH_LOGIN: &str = "/api/auth/login/";
pub const AUTH_REFRESH: &str = "/api/auth/refresh/";
pub const AUTH_LOGOUT: &str = "/api/auth/logout/";
pub const AUTH_USER: &str = "/api/auth/user/";

pub const LISTINGS: &str = "/api/listings/";
pub const MY_LISTINGS: &str = "/api/listings/my/";

pub const WATCHLIST_ITEMS: &str = "/api/watchlist/items/";

pub const CONVERSATIONS: &str = "/api/messages/conversations/";

pub fn listing(id: i64) -> String {
    format!("{}{}/", LISTINGS, id)
}

pub fn watchlist_remove(listing_id: i64) -> String {
    format!("{}{}/remove/", WATCHLIST_ITEMS, listing_id)
}

pub fn conversation(id: i64) -> String {
    format!("{}{}/", CONVERSATIONS, id)
}

pub fn conversation_messages(id: i64) -> String {
    format!("{}{}/messages/", CONVERSATIONS, id)
}

pub fn conversation_mark_as_read(id: i64) -> String {
    format!("{}{}/mark_as_read/", CONVERSATIONS, id)
}
