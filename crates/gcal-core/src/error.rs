//! Centralized error types for the gcal command line.
//!
//! Library crates keep their own error enums; the binary maps them into
//! [`AppError`] so every failure can be reported with a short, actionable
//! message while the full error goes to the log.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a message suitable for the terminal.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Calendar API error: {0}")]
    Calendar(#[from] CalendarApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Auth(e) => e.user_message(),
            AppError::Calendar(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Sign-in errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Sign-in failed: {0}")]
    LoginFailed(String),
}

impl AuthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => {
                "Email or password missing. Set GCAL_EMAIL and GCAL_PASSWORD."
            }
            AuthError::InvalidCredentials => "Invalid credentials. Please check and try again.",
            AuthError::NotAuthenticated => "Not signed in. Please authenticate.",
            AuthError::LoginFailed(_) => "Sign-in failed. Please try again.",
        }
    }
}

/// Calendar feed errors.
#[derive(Debug, Error)]
pub enum CalendarApiError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Entry was modified concurrently")]
    PreconditionFailed,

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
}

impl CalendarApiError {
    /// Classify a rejected request by status code.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => CalendarApiError::Unauthorized,
            404 => CalendarApiError::NotFound(message.into()),
            412 => CalendarApiError::PreconditionFailed,
            _ => CalendarApiError::ApiError {
                status,
                message: message.into(),
            },
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            CalendarApiError::InvalidArgument(_) => "Invalid input. Check the arguments.",
            CalendarApiError::NotFound(_) => "Calendar or event not found.",
            CalendarApiError::Unauthorized => {
                "Google Calendar rejected the request. Sign in again or check permissions."
            }
            CalendarApiError::PreconditionFailed => {
                "The event changed on the server. Fetch it again and retry."
            }
            CalendarApiError::ApiError { status, .. } if *status >= 500 => {
                "Google Calendar is experiencing issues. Please try again later."
            }
            CalendarApiError::ApiError { .. } => "Calendar request failed. Please try again.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() || self.is_body() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
