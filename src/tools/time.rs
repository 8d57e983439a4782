use chrono::{
    DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::{validation_error, ToolError};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(input: &str, name: &str) -> Result<NaiveDate, ToolError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| {
        validation_error(format!("Invalid {name} \"{input}\": expected YYYY-MM-DD"))
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Accepts `HH:MM` (24h) and `HH:MM:SS`.
pub fn parse_time(input: &str, name: &str) -> Result<NaiveTime, ToolError> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .map_err(|_| validation_error(format!("Invalid {name} \"{input}\": expected HH:MM")))
}

/// Interprets a wall-clock time in `zone`, or in the system zone when none is
/// configured. Ambiguous times resolve to the earlier instant.
pub fn local_to_utc(naive: NaiveDateTime, zone: Option<Tz>) -> Result<DateTime<Utc>, ToolError> {
    let resolved = match zone {
        Some(tz) => tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
        None => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
    };

    resolved.ok_or_else(|| validation_error(format!("{naive} does not exist in the local time zone")))
}

/// Parses the loose ISO forms callers send: a full RFC 3339 timestamp, a
/// local date-time, or a bare date meaning local midnight.
pub fn parse_instant(input: &str, name: &str, zone: Option<Tz>) -> Result<DateTime<Utc>, ToolError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return local_to_utc(naive, zone);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, DATE_FORMAT) {
        return local_to_utc(date.and_time(NaiveTime::default()), zone);
    }

    Err(validation_error(format!(
        "Invalid {name} \"{input}\": expected an ISO 8601 date or date-time"
    )))
}

pub fn to_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
