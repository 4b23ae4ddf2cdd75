//! Calendar API types and data structures.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A calendar returned by the listing feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSummary {
    pub title: String,
    /// Identifier used to address the calendar's event feed.
    pub handle: String,
}

/// Result of a single-event read.
#[derive(Debug, Clone, PartialEq)]
pub enum EventResponse {
    /// The event as returned by the server.
    Data(Value),
    /// The server reported no change since the given ETag (304 or 412).
    Unchanged,
    /// The server answered 200 with nothing in the body.
    Empty,
}

impl EventResponse {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    pub fn into_data(self) -> Option<Value> {
        match self {
            Self::Data(v) => Some(v),
            _ => None,
        }
    }
}

/// Calendar to be created in the account's own calendars.
///
/// Valid colors are the provider's palette, e.g. `#A32929`, `#2952A3`,
/// `#0D7813`, `#528800`, `#AB8B00`, `#BE6D00`, `#5A6986`, `#333333`.
#[derive(Debug, Clone, Default)]
pub struct NewCalendar {
    pub title: String,
    pub details: String,
    pub timezone: String,
    pub hidden: bool,
    pub color: String,
    pub location: String,
}

/// Event to be created.
#[derive(Debug, Clone)]
pub enum NewEvent {
    /// The server parses title and time out of free text.
    Quick { details: String },
    Full(EventDraft),
}

impl NewEvent {
    pub fn quick(details: impl Into<String>) -> Self {
        Self::Quick {
            details: details.into(),
        }
    }
}

/// Fully specified event. `start` and `end` are date strings, normalised
/// to ISO-8601 before sending.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub title: String,
    pub details: String,
    pub transparency: String,
    pub status: String,
    pub location: String,
    pub start: String,
    pub end: String,
}

/// Access level granted by an ACL rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclRole {
    Root,
    Owner,
    Editor,
    Freebusy,
    #[default]
    Read,
    None,
}

/// Who an ACL rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeType {
    User,
    Domain,
    #[default]
    Default,
}

/// ACL entry to add to a calendar.
#[derive(Debug, Clone, Default)]
pub struct AclRule {
    pub role: AclRole,
    /// Email address or domain name; omitted for the default scope.
    pub scope: Option<String>,
    pub scope_type: ScopeType,
}

impl AclRule {
    pub fn user(email: impl Into<String>, role: AclRole) -> Self {
        Self {
            role,
            scope: Some(email.into()),
            scope_type: ScopeType::User,
        }
    }

    pub fn domain(domain: impl Into<String>, role: AclRole) -> Self {
        Self {
            role,
            scope: Some(domain.into()),
            scope_type: ScopeType::Domain,
        }
    }
}

// Wire payloads. Every request body is wrapped in `{"data": ...}`.

#[derive(Debug, Serialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalendarPayload<'a> {
    pub title: &'a str,
    pub details: &'a str,
    pub time_zone: &'a str,
    pub hidden: bool,
    pub color: &'a str,
    pub location: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuickAddPayload<'a> {
    pub details: &'a str,
    pub quick_add: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct EventPayload<'a> {
    pub title: &'a str,
    pub details: &'a str,
    pub transparency: &'a str,
    pub status: &'a str,
    pub location: &'a str,
    pub when: [When; 1],
}

#[derive(Debug, Serialize)]
pub(crate) struct When {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AclPayload<'a> {
    pub scope_type: ScopeType,
    pub role: AclRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<&'a str>,
}

// API Response Types

#[derive(Debug, Deserialize)]
pub(crate) struct CalendarFeedResponse {
    pub data: CalendarFeed,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CalendarFeed {
    #[serde(default)]
    pub items: Vec<ApiCalendar>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiCalendar {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub event_feed_link: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_calendar_payload_shape() {
        let payload = Envelope {
            data: CalendarPayload {
                title: "Team",
                details: "",
                time_zone: "Europe/Stockholm",
                hidden: false,
                color: "#2952A3",
                location: "Stockholm",
            },
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            json,
            r##"{"data":{"title":"Team","details":"","timeZone":"Europe/Stockholm","hidden":false,"color":"#2952A3","location":"Stockholm"}}"##
        );
    }

    #[test]
    fn test_quick_add_payload_shape() {
        let payload = Envelope {
            data: QuickAddPayload {
                details: "Lunch with Bob",
                quick_add: true,
            },
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"data":{"details":"Lunch with Bob","quickAdd":true}}"#);
    }

    #[test]
    fn test_event_payload_escapes_user_text() {
        let payload = Envelope {
            data: EventPayload {
                title: r#"Say "hi""#,
                details: "line\nbreak",
                transparency: "opaque",
                status: "confirmed",
                location: "Room 1",
                when: [When {
                    start: "2024-02-01T10:00:00+00:00".into(),
                    end: "2024-02-01T11:00:00+00:00".into(),
                }],
            },
        };
        let value: Value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["data"]["title"], r#"Say "hi""#);
        assert_eq!(value["data"]["when"][0]["end"], "2024-02-01T11:00:00+00:00");
    }

    #[test]
    fn test_acl_payload_omits_empty_scope() {
        let payload = Envelope {
            data: AclPayload {
                scope_type: ScopeType::Default,
                role: AclRole::Read,
                scope: None,
            },
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"data":{"scopeType":"default","role":"read"}}"#);

        let payload = Envelope {
            data: AclPayload {
                scope_type: ScopeType::User,
                role: AclRole::Freebusy,
                scope: Some("bob@example.com"),
            },
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            json,
            r#"{"data":{"scopeType":"user","role":"freebusy","scope":"bob@example.com"}}"#
        );
    }

    #[test]
    fn test_calendar_feed_parsing() {
        let json = r#"{
            "apiVersion": "2.1",
            "data": {
                "items": [
                    {"title": "Work", "eventFeedLink": "https://www.google.com/calendar/feeds/foo%40x.com/private/full"}
                ]
            }
        }"#;
        let feed: CalendarFeedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(feed.data.items.len(), 1);
        assert_eq!(feed.data.items[0].title, "Work");
    }

    #[test]
    fn test_calendar_feed_without_items() {
        let feed: CalendarFeedResponse = serde_json::from_str(r#"{"data": {}}"#).unwrap();
        assert!(feed.data.items.is_empty());
    }

    #[test]
    fn test_acl_defaults() {
        let rule = AclRule::default();
        assert_eq!(rule.role, AclRole::Read);
        assert_eq!(rule.scope_type, ScopeType::Default);
        assert!(rule.scope.is_none());
    }

    #[test]
    fn test_event_response_helpers() {
        assert!(EventResponse::Unchanged.is_unchanged());
        assert!(EventResponse::Empty.into_data().is_none());
        let data = EventResponse::Data(serde_json::json!({"id": "e1"}));
        assert!(!data.is_unchanged());
        assert_eq!(data.into_data().unwrap()["id"], "e1");
    }
}
