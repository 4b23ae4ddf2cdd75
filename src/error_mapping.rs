use gcal_auth::LoginError;
use gcal_calendar::CalendarError;
use gcal_core::{AppError, AuthError, CalendarApiError, NetworkError, ReqwestErrorExt};

/// Conversion of library errors into the binary's [`AppError`].
pub trait IntoAppError {
    fn into_app_error(self) -> AppError;
}

impl IntoAppError for LoginError {
    fn into_app_error(self) -> AppError {
        match self {
            LoginError::MissingCredentials => AppError::Auth(AuthError::MissingCredentials),
            LoginError::BadCredentials => AppError::Auth(AuthError::InvalidCredentials),
            LoginError::UnexpectedStatus(status) => {
                AppError::Auth(AuthError::LoginFailed(format!("HTTP {}", status)))
            }
            LoginError::MalformedResponse(token) => {
                AppError::Auth(AuthError::LoginFailed(format!("no {} token in response", token)))
            }
            LoginError::Network(e) => AppError::Network(e.into_network_error()),
        }
    }
}

impl IntoAppError for CalendarError {
    fn into_app_error(self) -> AppError {
        match self {
            CalendarError::NotAuthenticated => AppError::Auth(AuthError::NotAuthenticated),
            CalendarError::Login(e) => e.into_app_error(),
            CalendarError::InvalidArgument(msg) => {
                AppError::Calendar(CalendarApiError::InvalidArgument(msg))
            }
            CalendarError::UnexpectedStatus { status, message } => {
                AppError::Calendar(CalendarApiError::from_status(status, message))
            }
            CalendarError::InvalidResponse(msg) => {
                AppError::Network(NetworkError::InvalidResponse(msg))
            }
            CalendarError::Network(e) => AppError::Network(e.into_network_error()),
        }
    }
}
