//! OAI-PMH datestamps.
//!
//! The protocol fixes one UTC representation for datestamps
//! (`YYYY-MM-DDThh:mm:ssZ`) and allows harvesters to send selective-harvesting
//! bounds at either day or seconds granularity. Timestamps in any offset are
//! normalized to UTC before formatting; sub-second precision is dropped.
//!
//! # Examples
//!
//! ```
//! use chrono::{FixedOffset, TimeZone};
//! use oai_records::date::{format_datestamp, parse_datestamp};
//!
//! let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
//! let local = plus_two.with_ymd_and_hms(2020, 1, 2, 5, 4, 5).unwrap();
//! assert_eq!(format_datestamp(&local)?, "2020-01-02T03:04:05Z");
//!
//! let parsed = parse_datestamp("2020-01-02T03:04:05Z")?;
//! assert_eq!(parsed, local);
//! # Ok::<(), oai_records::OaiError>(())
//! ```

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{OaiError, Result};

lazy_static! {
    static ref DAY_SHAPE: Regex =
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("day datestamp pattern is valid");
    static ref SECONDS_SHAPE: Regex =
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}Z$")
            .expect("seconds datestamp pattern is valid");
}

/// Earliest year a four-digit datestamp can carry.
pub const MIN_DATESTAMP_YEAR: i32 = 0;

/// Latest year a four-digit datestamp can carry.
pub const MAX_DATESTAMP_YEAR: i32 = 9999;

/// `strftime` pattern of a seconds-granularity datestamp.
pub const OAI_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// `strftime` pattern of a day-granularity datestamp.
pub const OAI_DAY_FORMAT: &str = "%Y-%m-%d";

/// Datestamp granularity supported by the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    /// `YYYY-MM-DD`
    Day,
    /// `YYYY-MM-DDThh:mm:ssZ`
    #[default]
    Seconds,
}

impl Granularity {
    /// Protocol string advertised in `Identify` responses.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "YYYY-MM-DD",
            Self::Seconds => "YYYY-MM-DDThh:mm:ssZ",
        }
    }

    /// Detect the granularity of a datestamp string by its exact shape:
    /// `YYYY-MM-DD` or `YYYY-MM-DDThh:mm:ssZ`, ASCII digits only.
    ///
    /// Returns `None` when the string has neither shape.
    #[must_use]
    pub fn detect(value: &str) -> Option<Self> {
        if DAY_SHAPE.is_match(value) {
            Some(Self::Day)
        } else if SECONDS_SHAPE.is_match(value) {
            Some(Self::Seconds)
        } else {
            None
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a timestamp as an OAI datestamp in UTC.
///
/// # Errors
///
/// Returns [`OaiError::InvalidDate`] if the UTC year falls outside
/// `0000`-`9999` and so cannot be written in the fixed four-digit pattern.
pub fn format_datestamp<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> Result<String> {
    let utc = timestamp.with_timezone(&Utc);
    if !(MIN_DATESTAMP_YEAR..=MAX_DATESTAMP_YEAR).contains(&utc.year()) {
        return Err(OaiError::InvalidDate(format!(
            "year {} cannot be written as a datestamp",
            utc.year()
        )));
    }
    Ok(utc.format(OAI_DATE_FORMAT).to_string())
}

/// Parse a datestamp of either granularity. Day values denote midnight UTC.
///
/// # Errors
///
/// Returns [`OaiError::InvalidDate`] if the string matches neither granularity.
pub fn parse_datestamp(value: &str) -> Result<DateTime<Utc>> {
    parse_datestamp_with_granularity(value).map(|(timestamp, _)| timestamp)
}

/// Parse a datestamp and report which granularity it was written in.
///
/// # Errors
///
/// Returns [`OaiError::InvalidDate`] if the string matches neither granularity.
pub fn parse_datestamp_with_granularity(value: &str) -> Result<(DateTime<Utc>, Granularity)> {
    let invalid = || OaiError::InvalidDate(value.to_string());
    match Granularity::detect(value).ok_or_else(invalid)? {
        Granularity::Day => {
            let date = NaiveDate::parse_from_str(value, OAI_DAY_FORMAT).map_err(|_| invalid())?;
            Ok((
                Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
                Granularity::Day,
            ))
        },
        Granularity::Seconds => {
            let naive =
                NaiveDateTime::parse_from_str(value, OAI_DATE_FORMAT).map_err(|_| invalid())?;
            Ok((Utc.from_utc_datetime(&naive), Granularity::Seconds))
        },
    }
}

/// Inclusive selective-harvesting window built from `from` / `until` arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    /// Lower bound, inclusive
    pub from: Option<DateTime<Utc>>,
    /// Upper bound, inclusive
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Build a range from optional request arguments.
    ///
    /// A day-granularity `until` covers the whole day (up to `23:59:59`).
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::InvalidDate`] when either bound is malformed, the two
    /// bounds use different granularities, or `from` is later than `until`.
    pub fn from_arguments(from: Option<&str>, until: Option<&str>) -> Result<Self> {
        let from = from.map(parse_datestamp_with_granularity).transpose()?;
        let until = until.map(parse_datestamp_with_granularity).transpose()?;

        if let (Some((_, from_granularity)), Some((_, until_granularity))) = (&from, &until) {
            if from_granularity != until_granularity {
                return Err(OaiError::InvalidDate(
                    "from and until must share the same granularity".to_string(),
                ));
            }
        }

        let until = until.map(|(timestamp, granularity)| match granularity {
            Granularity::Day => end_of_day(timestamp),
            Granularity::Seconds => timestamp,
        });
        let from = from.map(|(timestamp, _)| timestamp);

        if let (Some(lower), Some(upper)) = (from, until) {
            if lower > upper {
                return Err(OaiError::InvalidDate(format!(
                    "from ({}) is later than until ({})",
                    lower.format(OAI_DATE_FORMAT),
                    upper.format(OAI_DATE_FORMAT)
                )));
            }
        }

        Ok(DateRange { from, until })
    }

    /// True if `timestamp`, truncated to whole seconds, lies inside the window.
    #[must_use]
    pub fn contains<Tz: TimeZone>(&self, timestamp: &DateTime<Tz>) -> bool {
        let seconds = timestamp.with_timezone(&Utc).timestamp();
        self.from.map_or(true, |from| seconds >= from.timestamp())
            && self.until.map_or(true, |until| seconds <= until.timestamp())
    }
}

fn end_of_day(midnight: DateTime<Utc>) -> DateTime<Utc> {
    midnight + chrono::Duration::seconds(86_399)
}
