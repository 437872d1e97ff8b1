pub mod client;
pub mod endpoints;
pub mod error;

pub use client::{ApiClient, CredentialSource};
pub use error::ApiError;
