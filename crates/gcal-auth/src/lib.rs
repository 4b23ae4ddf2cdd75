//! ClientLogin authentication for Google Calendar feeds.
//!
//! Exchanges an account's email and password for a [`Session`] whose auth
//! token is attached to every calendar request.

pub mod client_login;
pub mod credentials;
pub mod error;
pub mod session;

pub use client_login::{ClientLogin, CLIENT_LOGIN_URL, DEFAULT_SOURCE, SERVICE};
pub use credentials::Credentials;
pub use error::LoginError;
pub use session::Session;

/// GData protocol version sent with every request.
pub const GDATA_VERSION: &str = "2.1";
