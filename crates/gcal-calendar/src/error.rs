//! Calendar-specific error types.

use gcal_auth::LoginError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Login failed: {0}")]
    Login(#[from] LoginError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl CalendarError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Please sign in to your Google account".to_string(),
            Self::Login(e) => e.user_message(),
            Self::InvalidArgument(msg) => format!("Invalid request: {}", msg),
            Self::UnexpectedStatus { status, .. } if *status >= 500 => {
                "Google Calendar is having problems. Please try again later.".to_string()
            }
            Self::UnexpectedStatus { status, .. } => {
                format!("Google Calendar rejected the request (HTTP {}).", status)
            }
            Self::InvalidResponse(_) => "Received an unexpected response.".to_string(),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
        }
    }

    /// The remote service answered, but not with the expected status.
    pub fn is_remote_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedStatus { .. }
                | Self::Login(LoginError::BadCredentials | LoginError::UnexpectedStatus(_))
        )
    }

    /// The error was raised before any request was sent.
    pub fn is_precondition(&self) -> bool {
        match self {
            Self::NotAuthenticated | Self::InvalidArgument(_) => true,
            Self::Login(e) => e.is_precondition(),
            _ => false,
        }
    }

    /// The remote could not be reached at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Login(LoginError::Network(_)))
    }

    /// HTTP status for rejections.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Login(LoginError::UnexpectedStatus(status)) => Some(*status),
            Self::Login(LoginError::BadCredentials) => Some(403),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_user_messages() {
        let err = CalendarError::NotAuthenticated;
        assert!(err.user_message().contains("sign in"));

        let err = CalendarError::UnexpectedStatus {
            status: 404,
            message: "Not found".into(),
        };
        assert!(err.user_message().contains("404"));

        let err = CalendarError::UnexpectedStatus {
            status: 503,
            message: String::new(),
        };
        assert!(err.user_message().contains("try again later"));
    }

    #[test]
    fn test_classification() {
        assert!(CalendarError::NotAuthenticated.is_precondition());
        assert!(CalendarError::invalid("x").is_precondition());
        assert!(CalendarError::Login(LoginError::MissingCredentials).is_precondition());

        let rejected = CalendarError::UnexpectedStatus {
            status: 412,
            message: String::new(),
        };
        assert!(rejected.is_remote_rejection());
        assert!(!rejected.is_precondition());
        assert!(!rejected.is_transport());
        assert_eq!(rejected.status(), Some(412));

        assert!(CalendarError::Login(LoginError::BadCredentials).is_remote_rejection());
        assert_eq!(CalendarError::NotAuthenticated.status(), None);
    }
}
