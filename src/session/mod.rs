pub mod error;
mod persist;
#[allow(clippy::module_inception)]
pub mod session;
pub mod store;

pub use error::SessionError;
pub use session::{AuthenticatedSession, Session, SessionHandle};
pub use store::{LoginOutcome, Rehydration, SessionStore};
