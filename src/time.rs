use chrono::{DateTime, TimeZone, Utc};
use std::ops::Deref;

/// Point-in-time parameter value. Encoded in query strings as milliseconds
/// since the Unix epoch, which is the format the HubSpot API expects for
/// timestamps such as `created` or `since`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Time(pub DateTime<Utc>);

impl Time {
    /// Create a new Time from a DateTime
    pub fn new(dt: DateTime<Utc>) -> Self {
        Time(dt)
    }

    /// Create a Time from a unix timestamp in seconds.
    /// Returns None when the timestamp is out of range.
    pub fn from_unix(unix: i64) -> Option<Self> {
        Utc.timestamp_opt(unix, 0).single().map(Time)
    }

    /// Get the unix timestamp in seconds
    pub fn unix(&self) -> i64 {
        self.0.timestamp()
    }

    /// Query-string form: whole seconds scaled to milliseconds.
    /// Sub-second precision is dropped.
    pub fn to_param_millis(&self) -> i64 {
        self.unix() * 1000
    }
}

impl Deref for Time {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DateTime<Utc>> for Time {
    fn from(dt: DateTime<Utc>) -> Self {
        Time(dt)
    }
}

impl From<Time> for DateTime<Utc> {
    fn from(t: Time) -> Self {
        t.0
    }
}
