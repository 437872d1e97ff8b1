pub mod base;
pub mod listings;
pub mod messages;
pub mod watchlist;

pub use base::{LoadStatus, ResourceError};
pub use listings::ListingsStore;
pub use messages::MessagesStore;
pub use watchlist::WatchlistStore;
