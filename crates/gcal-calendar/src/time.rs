//! Date strings to ISO-8601 timestamps.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::CalendarError;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a user-supplied date or date-time.
///
/// Accepts RFC 3339, `YYYY-MM-DD[ T]hh:mm[:ss]`, `YYYY-MM-DD`, and the words
/// `now`, `today` and `tomorrow`. Values without an offset are taken to be
/// local time in `tz`.
pub fn parse_datetime(input: &str, tz: Tz) -> Result<DateTime<FixedOffset>, CalendarError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt);
    }

    let today = || Utc::now().with_timezone(&tz).date_naive();
    let naive = match input.to_ascii_lowercase().as_str() {
        "now" => return Ok(Utc::now().with_timezone(&tz).fixed_offset()),
        "today" => Some(midnight(today())),
        "tomorrow" => today().checked_add_days(Days::new(1)).map(midnight),
        _ => DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(input, "%Y-%m-%d")
                    .ok()
                    .map(midnight)
            }),
    };

    let naive = naive.ok_or_else(|| CalendarError::invalid(format!("unrecognised date: {input:?}")))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| CalendarError::invalid(format!("{input:?} does not exist in {tz}")))
}

/// Parse and render as `YYYY-MM-DDThh:mm:ss±hh:mm`.
pub fn to_iso8601(input: &str, tz: Tz) -> Result<String, CalendarError> {
    Ok(parse_datetime(input, tz)?.to_rfc3339_opts(SecondsFormat::Secs, false))
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}
