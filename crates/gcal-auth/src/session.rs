//! Session tokens returned by a successful ClientLogin.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::LoginError;

// `\b` keeps `SID=` from matching inside `LSID=`.
static SID_RE: LazyLock<Regex> = LazyLock::new(|| token_regex("SID"));
static LSID_RE: LazyLock<Regex> = LazyLock::new(|| token_regex("LSID"));
static AUTH_RE: LazyLock<Regex> = LazyLock::new(|| token_regex("Auth"));

#[allow(clippy::expect_used)]
fn token_regex(name: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}=([a-z0-9_-]+)", name)).expect("token pattern is valid")
}

/// Tokens extracted from the login response body.
///
/// Fixed once created. Only the auth token is sent on later requests.
#[derive(Clone)]
pub struct Session {
    sid: String,
    lsid: String,
    auth: String,
}

impl Session {
    /// Parse the `SID=`, `LSID=` and `Auth=` lines of a login response.
    pub fn from_login_body(body: &str) -> Result<Self, LoginError> {
        Ok(Self {
            sid: capture(&SID_RE, body, "SID")?,
            lsid: capture(&LSID_RE, body, "LSID")?,
            auth: capture(&AUTH_RE, body, "Auth")?,
        })
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    pub fn lsid(&self) -> &str {
        &self.lsid
    }

    pub fn auth_token(&self) -> &str {
        &self.auth
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("GoogleLogin auth={}", self.auth)
    }
}

fn capture(re: &Regex, body: &str, name: &'static str) -> Result<String, LoginError> {
    re.captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or(LoginError::MalformedResponse(name))
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}
