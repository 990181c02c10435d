//! Record timestamps.

use std::fmt;

/// Capture time of a record, split into whole seconds and microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    /// Seconds since the Unix epoch.
    pub secs: i64,
    /// Sub-second part in microseconds (0..1_000_000).
    pub micros: u32,
}

impl Timestamp {
    /// Create a timestamp, carrying any excess microseconds into seconds.
    pub fn new(secs: i64, micros: u32) -> Self {
        Self {
            secs: secs + i64::from(micros / 1_000_000),
            micros: micros % 1_000_000,
        }
    }

    /// Build a timestamp from a count of microseconds since the epoch.
    pub fn from_micros(total: i64) -> Self {
        Self {
            secs: total.div_euclid(1_000_000),
            micros: total.rem_euclid(1_000_000) as u32,
        }
    }

    /// Build a timestamp from a nanosecond-resolution fraction, truncating to
    /// microseconds.
    pub fn from_nanos_fraction(secs: i64, nanos: u32) -> Self {
        Self::new(secs, nanos / 1_000)
    }
}

/// Renders as `<seconds>.<microseconds>` with six fractional digits.
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.secs, self.micros)
    }
}
