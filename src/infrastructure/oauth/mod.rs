pub mod google;

pub use google::{GoogleOAuthClient, GoogleUser};
