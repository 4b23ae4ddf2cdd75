//! Login error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Email and password are both required")]
    MissingCredentials,

    #[error("Invalid credentials")]
    BadCredentials,

    #[error("Login failed with status {0}")]
    UnexpectedStatus(u16),

    #[error("Login response did not contain a {0} token")]
    MalformedResponse(&'static str),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl LoginError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredentials => "Please provide your Google account email and password".to_string(),
            Self::BadCredentials => "Sign-in failed. Check your email and password.".to_string(),
            Self::UnexpectedStatus(status) => format!("Sign-in failed (HTTP {}).", status),
            Self::MalformedResponse(_) => "Sign-in returned an unexpected response.".to_string(),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
        }
    }

    /// Whether the error was raised before anything was sent.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::MissingCredentials)
    }
}
