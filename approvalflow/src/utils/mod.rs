//! Utility functions for timestamps and clocks.

pub mod timestamps;

pub use timestamps::{
    format_iso8601, from_unix_seconds, iso_timestamp, to_unix_seconds, Clock, FixedClock,
    SystemClock, Timestamp, TimestampError,
};
