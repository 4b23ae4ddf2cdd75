//! Endpoint and transport settings for [`CalendarClient`](crate::CalendarClient).

use std::time::Duration;

use chrono_tz::Tz;
use gcal_auth::{CLIENT_LOGIN_URL, DEFAULT_SOURCE};

pub const CALENDAR_FEEDS_BASE: &str = "https://www.google.com/calendar/feeds";
pub const DEFAULT_MAX_RESULTS: u32 = 25;

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// ClientLogin endpoint.
    pub login_url: String,
    /// Base of every calendar feed URL, without a trailing slash.
    pub feeds_url: String,
    /// Client identifier sent at login.
    pub source: String,
    /// Per-request timeout. `None` leaves it to the transport.
    pub timeout: Option<Duration>,
    /// Skip TLS certificate verification (legacy endpoints only).
    pub accept_invalid_certs: bool,
    /// Page size when the caller does not give one.
    pub default_max_results: u32,
    /// Zone used for date strings without an offset.
    pub timezone: Tz,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            login_url: CLIENT_LOGIN_URL.to_string(),
            feeds_url: CALENDAR_FEEDS_BASE.to_string(),
            source: DEFAULT_SOURCE.to_string(),
            timeout: None,
            accept_invalid_certs: false,
            default_max_results: DEFAULT_MAX_RESULTS,
            timezone: chrono_tz::Europe::Stockholm,
        }
    }
}

impl ClientOptions {
    /// Point both endpoints at another host (used against mock servers).
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            login_url: format!("{}/accounts/ClientLogin", base),
            feeds_url: format!("{}/calendar/feeds", base),
            ..Self::default()
        }
    }
}
