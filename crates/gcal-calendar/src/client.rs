//! Google Calendar (GData 2.1) feed client.

use chrono_tz::Tz;
use gcal_auth::{ClientLogin, Credentials, Session};
use reqwest::header::{IF_MATCH, IF_NONE_MATCH};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::CalendarError;
use crate::etag::{if_match_value, quote_etag};
use crate::options::{ClientOptions, CALENDAR_FEEDS_BASE};
use crate::request::{decode_json, Transport};
use crate::time::to_iso8601;
use crate::types::*;

const DEFAULT_HANDLE: &str = "default";
const PRIVATE_FULL: &str = "/private/full";

pub struct CalendarClient {
    transport: Transport,
    login: ClientLogin,
    credentials: Credentials,
    session: Option<Session>,
    feeds_url: String,
    default_max_results: u32,
    timezone: Tz,
}

impl CalendarClient {
    /// Client against the public Google endpoints.
    pub fn new(credentials: Credentials) -> Result<Self, CalendarError> {
        Self::with_options(credentials, ClientOptions::default())
    }

    pub fn with_options(
        credentials: Credentials,
        options: ClientOptions,
    ) -> Result<Self, CalendarError> {
        let transport = Transport::new(&options)?;
        let login = ClientLogin::new(transport.login_client(), options.login_url, options.source);

        Ok(Self {
            transport,
            login,
            credentials,
            session: None,
            feeds_url: options.feeds_url.trim_end_matches('/').to_string(),
            default_max_results: options.default_max_results,
            timezone: options.timezone,
        })
    }

    /// Log in once. Later calls return immediately without a request.
    #[instrument(skip(self), level = "info")]
    pub async fn authenticate(&mut self) -> Result<(), CalendarError> {
        if self.session.is_some() {
            return Ok(());
        }
        let session = self.login.login(&self.credentials).await?;
        self.session = Some(session);
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    fn session(&self) -> Result<&Session, CalendarError> {
        self.session.as_ref().ok_or(CalendarError::NotAuthenticated)
    }

    /// List every calendar visible to the account.
    #[instrument(skip(self), level = "info")]
    pub async fn get_all_calendars(&self) -> Result<Vec<CalendarSummary>, CalendarError> {
        self.list_calendars("allcalendars").await
    }

    /// List the calendars owned by the account.
    #[instrument(skip(self), level = "info")]
    pub async fn get_own_calendars(&self) -> Result<Vec<CalendarSummary>, CalendarError> {
        self.list_calendars("owncalendars").await
    }

    async fn list_calendars(&self, feed: &str) -> Result<Vec<CalendarSummary>, CalendarError> {
        let session = self.session()?;
        let url = format!("{}/default/{}/full?alt=jsonc", self.feeds_url, feed);

        let reply = self
            .transport
            .get(session, &url, &[])
            .await?
            .expect(StatusCode::OK)?;

        let resp: CalendarFeedResponse = serde_json::from_str(&reply.body)
            .map_err(|e| CalendarError::InvalidResponse(format!("calendar feed: {}", e)))?;

        Ok(resp
            .data
            .items
            .into_iter()
            .map(|item| CalendarSummary {
                handle: handle_from_feed_link(&item.event_feed_link, &self.feeds_url),
                title: item.title,
            })
            .collect())
    }

    /// Create a calendar. Returns the server's JSON for it.
    #[instrument(skip(self, calendar), fields(title = %calendar.title), level = "info")]
    pub async fn create_calendar(&self, calendar: &NewCalendar) -> Result<Value, CalendarError> {
        let session = self.session()?;
        require(&calendar.title, "title")?;
        require(&calendar.timezone, "timezone")?;
        require(&calendar.color, "color")?;
        require(&calendar.location, "location")?;

        let body = to_body(&Envelope {
            data: CalendarPayload {
                title: &calendar.title,
                details: &calendar.details,
                time_zone: &calendar.timezone,
                hidden: calendar.hidden,
                color: &calendar.color,
                location: &calendar.location,
            },
        })?;

        let url = format!("{}/default/owncalendars/full", self.feeds_url);
        self.transport
            .submit(session, Method::POST, &url, body, &[])
            .await?
            .json(StatusCode::CREATED)
    }

    /// Delete one of the account's own calendars.
    #[instrument(skip(self), level = "info")]
    pub async fn delete_calendar(&self, handle: &str) -> Result<(), CalendarError> {
        let session = self.session()?;
        require(handle, "handle")?;

        let url = format!("{}/default/owncalendars/full/{}", self.feeds_url, handle);
        self.transport
            .delete(session, &url, &[])
            .await?
            .expect(StatusCode::OK)?;
        Ok(())
    }

    /// Fetch events from a calendar, optionally limited to a start window.
    ///
    /// `from` and `to` are date strings; see [`crate::time::parse_datetime`].
    #[instrument(skip(self), level = "info")]
    pub async fn get_events(
        &self,
        handle: &str,
        max: Option<u32>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Value, CalendarError> {
        let session = self.session()?;
        require(handle, "handle")?;

        let mut url = format!(
            "{}?alt=jsonc&max-results={}",
            self.event_feed_url(handle),
            max.unwrap_or(self.default_max_results),
        );
        if let Some(from) = from.filter(|s| !s.is_empty()) {
            let start_min = to_iso8601(from, self.timezone)?;
            url.push_str(&format!("&start-min={}", urlencoding::encode(&start_min)));
        }
        if let Some(to) = to.filter(|s| !s.is_empty()) {
            let start_max = to_iso8601(to, self.timezone)?;
            url.push_str(&format!("&start-max={}", urlencoding::encode(&start_max)));
        }

        self.transport
            .get(session, &url, &[])
            .await?
            .json(StatusCode::OK)
    }

    /// Fetch a single event by its entry id.
    #[instrument(skip(self), level = "info")]
    pub async fn get_event_by_id(
        &self,
        handle: &str,
        id: &str,
    ) -> Result<EventResponse, CalendarError> {
        let session = self.session()?;
        require(handle, "handle")?;
        require(id, "id")?;

        let url = format!("{}?alt=jsonc", self.entry_url(handle, id));
        let reply = self
            .transport
            .get(session, &url, &[])
            .await?
            .expect(StatusCode::OK)?;

        if reply.body.trim().is_empty() {
            return Ok(EventResponse::Empty);
        }
        let event = decode_json(&reply.body)?;
        if is_blank(&event) {
            Ok(EventResponse::Empty)
        } else {
            Ok(EventResponse::Data(event))
        }
    }

    /// Re-fetch an event only if it changed since `etag`.
    #[instrument(skip(self), level = "info")]
    pub async fn get_event(
        &self,
        handle: &str,
        id: &str,
        etag: &str,
    ) -> Result<EventResponse, CalendarError> {
        let session = self.session()?;
        require(id, "id")?;
        require(etag, "etag")?;

        let url = format!("{}?alt=jsonc", self.entry_url(or_default(handle), id));
        let reply = self
            .transport
            .get(session, &url, &[(IF_NONE_MATCH, quote_etag(etag))])
            .await?;

        match reply.status {
            StatusCode::OK => decode_json(&reply.body).map(EventResponse::Data),
            StatusCode::NOT_MODIFIED | StatusCode::PRECONDITION_FAILED => {
                tracing::debug!("event unchanged");
                Ok(EventResponse::Unchanged)
            }
            _ => Err(reply.rejected()),
        }
    }

    /// Free-text search within a calendar.
    #[instrument(skip(self), level = "info")]
    pub async fn find_event(
        &self,
        handle: &str,
        query: &str,
        max: Option<u32>,
    ) -> Result<Value, CalendarError> {
        let session = self.session()?;
        require(query, "query")?;

        let url = format!(
            "{}?q={}&alt=jsonc&max-results={}",
            self.event_feed_url(or_default(handle)),
            urlencoding::encode(query),
            max.unwrap_or(self.default_max_results),
        );

        self.transport
            .get(session, &url, &[])
            .await?
            .json(StatusCode::OK)
    }

    /// Create an event, either quick-add text or a full draft.
    #[instrument(skip(self, event), level = "info")]
    pub async fn create_event(&self, handle: &str, event: &NewEvent) -> Result<Value, CalendarError> {
        let session = self.session()?;

        let body = match event {
            NewEvent::Quick { details } => {
                require(details, "details")?;
                to_body(&Envelope {
                    data: QuickAddPayload {
                        details,
                        quick_add: true,
                    },
                })?
            }
            NewEvent::Full(draft) => {
                require(&draft.title, "title")?;
                require(&draft.transparency, "transparency")?;
                require(&draft.status, "status")?;
                require(&draft.location, "location")?;
                require(&draft.start, "start")?;
                require(&draft.end, "end")?;

                let when = When {
                    start: to_iso8601(&draft.start, self.timezone)?,
                    end: to_iso8601(&draft.end, self.timezone)?,
                };
                to_body(&Envelope {
                    data: EventPayload {
                        title: &draft.title,
                        details: &draft.details,
                        transparency: &draft.transparency,
                        status: &draft.status,
                        location: &draft.location,
                        when: [when],
                    },
                })?
            }
        };

        let url = self.event_feed_url(or_default(handle));
        self.transport
            .submit(session, Method::POST, &url, body, &[])
            .await?
            .json(StatusCode::CREATED)
    }

    /// Replace an event with `event_json`.
    ///
    /// Without an ETag the update is unconditional (`If-Match: *`).
    #[instrument(skip(self, event_json), level = "info")]
    pub async fn update_event(
        &self,
        handle: &str,
        id: &str,
        etag: Option<&str>,
        event_json: &str,
    ) -> Result<Value, CalendarError> {
        let session = self.session()?;
        require(handle, "handle")?;
        require(id, "id")?;
        require(event_json, "event")?;

        let event: Value = serde_json::from_str(event_json)
            .map_err(|e| CalendarError::invalid(format!("event is not valid JSON: {}", e)))?;
        if !event.is_object() {
            return Err(CalendarError::invalid("event must be a JSON object"));
        }

        let headers = [(IF_MATCH, if_match_value(etag))];
        self.transport
            .submit(session, Method::PUT, &self.entry_url(handle, id), event.to_string(), &headers)
            .await?
            .json(StatusCode::OK)
    }

    /// Delete an event. With an ETag, only if it has not changed since.
    #[instrument(skip(self), level = "info")]
    pub async fn delete_event(
        &self,
        handle: &str,
        id: &str,
        etag: Option<&str>,
    ) -> Result<(), CalendarError> {
        let session = self.session()?;
        require(handle, "handle")?;
        require(id, "id")?;

        let headers = [(IF_MATCH, if_match_value(etag))];
        self.transport
            .delete(session, &self.entry_url(handle, id), &headers)
            .await?
            .expect(StatusCode::OK)?;
        Ok(())
    }

    /// Grant access to a calendar.
    #[instrument(skip(self), level = "info")]
    pub async fn add_user_to_acl(&self, handle: &str, rule: &AclRule) -> Result<Value, CalendarError> {
        let session = self.session()?;

        let body = to_body(&Envelope {
            data: AclPayload {
                scope_type: rule.scope_type,
                role: rule.role,
                scope: rule.scope.as_deref().filter(|s| !s.is_empty()),
            },
        })?;

        let url = format!("{}/{}/acl/full/", self.feeds_url, or_default(handle));
        self.transport
            .submit(session, Method::POST, &url, body, &[])
            .await?
            .json(StatusCode::CREATED)
    }

    fn event_feed_url(&self, handle: &str) -> String {
        format!("{}/{}{}", self.feeds_url, handle, PRIVATE_FULL)
    }

    fn entry_url(&self, handle: &str, id: &str) -> String {
        format!("{}/{}", self.event_feed_url(handle), id)
    }
}

fn require(value: &str, name: &str) -> Result<(), CalendarError> {
    if value.is_empty() {
        Err(CalendarError::invalid(format!("{} is required", name)))
    } else {
        Ok(())
    }
}

/// `null`, `false`, `0`, `""` and `[]` carry no event.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(_) => false,
    }
}

fn or_default(handle: &str) -> &str {
    if handle.is_empty() {
        DEFAULT_HANDLE
    } else {
        handle
    }
}

fn to_body<T: Serialize>(payload: &T) -> Result<String, CalendarError> {
    serde_json::to_string(payload)
        .map_err(|e| CalendarError::invalid(format!("could not encode request: {}", e)))
}

/// Strip the feeds prefix and `/private/full` suffix from an event feed link.
pub(crate) fn handle_from_feed_link(link: &str, feeds_url: &str) -> String {
    let rest = [feeds_url, CALENDAR_FEEDS_BASE]
        .iter()
        .find_map(|base| link.strip_prefix(base).and_then(|r| r.strip_prefix('/')))
        .unwrap_or(link);
    rest.strip_suffix(PRIVATE_FULL).unwrap_or(rest).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_handle_from_google_link() {
        assert_eq!(
            handle_from_feed_link(
                "https://www.google.com/calendar/feeds/foo@x.com/private/full",
                CALENDAR_FEEDS_BASE
            ),
            "foo@x.com"
        );
    }

    #[test]
    fn test_handle_from_custom_base() {
        assert_eq!(
            handle_from_feed_link(
                "http://127.0.0.1:8080/calendar/feeds/abc%40group.calendar.google.com/private/full",
                "http://127.0.0.1:8080/calendar/feeds"
            ),
            "abc%40group.calendar.google.com"
        );
    }

    #[test]
    fn test_handle_from_unknown_link_is_kept() {
        assert_eq!(
            handle_from_feed_link("https://elsewhere/x", CALENDAR_FEEDS_BASE),
            "https://elsewhere/x"
        );
    }

    #[test]
    fn test_is_blank() {
        for value in [json!(null), json!(false), json!(0), json!(""), json!([])] {
            assert!(is_blank(&value), "{value} should be blank");
        }
        for value in [json!({}), json!([1]), json!(true), json!("x"), json!({"data": {}})] {
            assert!(!is_blank(&value), "{value} should not be blank");
        }
    }

    #[test]
    fn test_or_default() {
        assert_eq!(or_default(""), "default");
        assert_eq!(or_default("me@x.com"), "me@x.com");
    }

    #[test]
    fn test_require() {
        assert!(require("x", "title").is_ok());
        assert!(matches!(
            require("", "title"),
            Err(CalendarError::InvalidArgument(msg)) if msg.contains("title")
        ));
    }
}
