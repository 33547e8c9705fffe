//! Textual date representations used in receipt JSON.
//!
//! Every date in a verification result is rendered three ways: a GMT string,
//! a millisecond epoch string and a Pacific-time string. An absent date is a
//! JSON `null` in every representation, never an empty string.
//!
//! The Pacific representation needs the `America/Los_Angeles` zone rules.
//! They are compiled into the binary through `chrono-tz`, so a missing zone
//! database cannot surface as a decode error at runtime.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::America::Los_Angeles;

use crate::errors::DateFormatError;

pub const GMT_FORMAT: &str = "%Y-%m-%d %H:%M:%S Etc/GMT";
pub const PACIFIC_FORMAT: &str = "%Y-%m-%d %H:%M:%S America/Los_Angeles";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRepresentation {
    /// `2017-08-24 03:17:15 Etc/GMT`
    Gmt,
    /// `1503544635000`, whole seconds scaled to milliseconds.
    Millis,
    /// `2017-08-23 20:17:15 America/Los_Angeles`
    Pacific,
}

impl fmt::Display for DateRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DateRepresentation::Gmt => "GMT",
            DateRepresentation::Millis => "millisecond",
            DateRepresentation::Pacific => "Pacific",
        })
    }
}

/// Renders `instant` in the given representation. `None` is the null marker.
pub fn encode(instant: Option<DateTime<Utc>>, representation: DateRepresentation) -> Option<String> {
    let instant = instant?;
    Some(match representation {
        DateRepresentation::Gmt => instant.format(GMT_FORMAT).to_string(),
        DateRepresentation::Millis => (instant.timestamp() * 1000).to_string(),
        DateRepresentation::Pacific => instant
            .with_timezone(&Los_Angeles)
            .format(PACIFIC_FORMAT)
            .to_string(),
    })
}

/// Parses text produced by [`encode`]. The null marker decodes to `None` in
/// every representation.
///
/// Millisecond input is truncated to the whole second. Pacific wall-clock
/// times that occur twice at the end of daylight saving time resolve to the
/// earlier instant.
pub fn decode(
    text: Option<&str>,
    representation: DateRepresentation,
) -> Result<Option<DateTime<Utc>>, DateFormatError> {
    let Some(text) = text else {
        return Ok(None);
    };
    let invalid = || DateFormatError {
        representation,
        value: text.to_owned(),
    };
    let instant = match representation {
        DateRepresentation::Gmt => NaiveDateTime::parse_from_str(text, GMT_FORMAT)
            .map_err(|_| invalid())?
            .and_utc(),
        DateRepresentation::Millis => {
            let millis: i64 = text.parse().map_err(|_| invalid())?;
            DateTime::from_timestamp(millis / 1000, 0).ok_or_else(invalid)?
        }
        DateRepresentation::Pacific => {
            let local =
                NaiveDateTime::parse_from_str(text, PACIFIC_FORMAT).map_err(|_| invalid())?;
            Los_Angeles
                .from_local_datetime(&local)
                .earliest()
                .ok_or_else(invalid)?
                .with_timezone(&Utc)
        }
    };
    Ok(Some(instant))
}
