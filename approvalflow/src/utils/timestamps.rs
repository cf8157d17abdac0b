//! Timestamps and clocks for audit fields.

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use thiserror::Error;

/// Represents a timestamp that can be serialized/deserialized.
pub type Timestamp = DateTime<Utc>;

/// Errors that can occur when converting stored timestamps.
#[derive(Debug, Error)]
pub enum TimestampError {
    /// The Unix seconds value is outside the representable range.
    #[error("Unix timestamp out of range: {0}")]
    OutOfRange(i64),
}

/// Returns the current UTC time as an ISO 8601 formatted string.
///
/// # Examples
///
/// ```
/// use approvalflow::utils::iso_timestamp;
///
/// let ts = iso_timestamp();
/// assert!(ts.contains('T'));
/// assert!(ts.ends_with("+00:00"));
/// ```
#[must_use]
pub fn iso_timestamp() -> String {
    format_iso8601(&Utc::now())
}

/// Formats a timestamp as ISO 8601 string.
#[must_use]
pub fn format_iso8601(dt: &Timestamp) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

/// Converts to the whole Unix seconds request tables store in `timemodified`.
#[must_use]
pub fn to_unix_seconds(dt: &Timestamp) -> i64 {
    dt.timestamp()
}

/// Converts stored Unix seconds back to a timestamp.
///
/// # Errors
///
/// Returns `TimestampError::OutOfRange` if chrono cannot represent the value.
pub fn from_unix_seconds(seconds: i64) -> Result<Timestamp, TimestampError> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or(TimestampError::OutOfRange(seconds))
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<Timestamp>,
}

impl FixedClock {
    /// Creates a clock frozen at `now`.
    #[must_use]
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Creates a clock frozen at the given Unix seconds.
    ///
    /// # Errors
    ///
    /// Returns `TimestampError::OutOfRange` for unrepresentable values.
    pub fn at_unix_seconds(seconds: i64) -> Result<Self, TimestampError> {
        from_unix_seconds(seconds).map(Self::new)
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}
