//! Google Calendar feed client.
//!
//! Lists, creates and deletes calendars, reads and writes events, and adds
//! ACL entries over the GData 2.1 JSON-C API after a ClientLogin sign-in.

pub mod client;
pub mod error;
pub mod etag;
pub mod options;
mod request;
pub mod time;
pub mod types;

pub use client::CalendarClient;
pub use error::CalendarError;
pub use gcal_auth::Credentials;
pub use options::{ClientOptions, CALENDAR_FEEDS_BASE, DEFAULT_MAX_RESULTS};
pub use types::{
    AclRole, AclRule, CalendarSummary, EventDraft, EventResponse, NewCalendar, NewEvent, ScopeType,
};
