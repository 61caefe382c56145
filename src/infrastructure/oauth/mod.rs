pub mod google;

pub use google::{ClientSecrets, GoogleTokenProvider};
