//! ClientLogin request against the Google accounts endpoint.

use reqwest::StatusCode;
use tracing::instrument;

use crate::credentials::Credentials;
use crate::error::LoginError;
use crate::session::Session;
use crate::GDATA_VERSION;

pub const CLIENT_LOGIN_URL: &str = "https://www.google.com/accounts/ClientLogin";

/// Client identifier sent as the `source` field.
pub const DEFAULT_SOURCE: &str = "gcal-rs-1.0";

/// Service name for Google Calendar.
pub const SERVICE: &str = "cl";

pub struct ClientLogin {
    client: reqwest::Client,
    url: String,
    source: String,
}

impl ClientLogin {
    pub fn new(client: reqwest::Client, url: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            source: source.into(),
        }
    }

    /// Exchange credentials for a session.
    ///
    /// Nothing is sent when either credential is empty.
    #[instrument(skip(self, credentials), level = "info")]
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, LoginError> {
        if !credentials.is_complete() {
            return Err(LoginError::MissingCredentials);
        }

        let response = self
            .client
            .post(&self.url)
            .header("GData-Version", GDATA_VERSION)
            .form(&[
                ("Email", credentials.email()),
                ("Passwd", credentials.password()),
                ("source", self.source.as_str()),
                ("service", SERVICE),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "login response");

        match status {
            StatusCode::OK => {
                let body = response.text().await?;
                let session = Session::from_login_body(&body)?;
                tracing::info!("login succeeded");
                Ok(session)
            }
            StatusCode::FORBIDDEN => Err(LoginError::BadCredentials),
            other => Err(LoginError::UnexpectedStatus(other.as_u16())),
        }
    }
}
