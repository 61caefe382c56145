pub mod cache;
pub mod error;

pub use cache::{AccessToken, Credential, CredentialCache, TokenProvider};
pub use error::CredentialError;
