//! Timestamp value object.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Wraps an existing chrono value.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner chrono value.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns a timestamp `hours` later.
    pub fn plus_hours(&self, hours: i64) -> Self {
        Self(self.0 + Duration::hours(hours))
    }

    /// Returns a timestamp `hours` earlier.
    pub fn minus_hours(&self, hours: i64) -> Self {
        Self(self.0 - Duration::hours(hours))
    }

    /// RFC 3339 rendering with second precision, e.g. `2026-01-02T03:04:05Z`.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Parses an RFC 3339 string.
    pub fn parse_rfc3339(s: &str) -> Result<Self, chrono::ParseError> {
        Ok(Self(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc)))
    }

    /// Calendar date, e.g. `2026-01-02`.
    pub fn date_string(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rfc3339_round_trip_keeps_second_precision() {
        let ts = Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap());
        let rendered = ts.to_rfc3339();
        assert_eq!(rendered, "2026-03-04T05:06:07Z");
        assert_eq!(Timestamp::parse_rfc3339(&rendered).unwrap(), ts);
    }

    #[test]
    fn plus_hours_moves_forward() {
        let ts = Timestamp::now();
        assert!(ts.plus_hours(24) > ts);
        assert_eq!(ts.plus_hours(2).minus_hours(2), ts);
    }
}
