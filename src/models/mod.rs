pub mod conversation;
pub mod credentials;
pub mod listing;
pub mod token;
pub mod user;

pub use conversation::{Conversation, Message};
pub use credentials::{Credentials, Registration};
pub use listing::{Listing, WatchlistItem};
pub use token::{RefreshedAccess, TokenPair};
pub use user::User;
