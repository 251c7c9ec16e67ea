//! Fixed-width timestamp bucketing.
//!
//! A [`TimeBucket`] floors a timestamp to the latest boundary of a grid that
//! is anchored to the enclosing second (sub-second widths) or to the
//! minute/second fields of the timestamp (wider widths), never to an
//! arbitrary epoch. Three regimes are selected by width:
//!
//! - below one second: only the microsecond field is reduced
//! - one second up to one minute: microseconds are zeroed and the second
//!   field is reduced to a multiple of the width
//! - one minute and above: seconds and microseconds are zeroed and the
//!   minute field is reduced to a multiple of the width
//!
//! Widths are stored in whole microseconds. Nanoseconds below a microsecond
//! are always dropped.

use crate::error::{CoreError, Result};
use chrono::{DateTime, TimeDelta, Timelike, Utc};
use std::ops::Sub;

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;

/// A bucket width used to floor timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeBucket {
    width_micros: i64,
}

impl TimeBucket {
    /// One-second buckets, used for event timestamps.
    pub const SECOND: Self = Self {
        width_micros: MICROS_PER_SECOND,
    };

    /// One-minute buckets.
    pub const MINUTE: Self = Self {
        width_micros: MICROS_PER_MINUTE,
    };

    /// Creates a bucket from a width in minutes, which may be fractional
    /// (`1.0 / 60.0` is one second).
    ///
    /// # Errors
    /// Returns `CoreError::InvalidInterval` if the width is not finite,
    /// not positive, or rounds to less than one microsecond.
    pub fn from_minutes(minutes: f64) -> Result<Self> {
        if !minutes.is_finite() || minutes <= 0.0 {
            return Err(CoreError::InvalidInterval(minutes));
        }

        let width = (minutes * MICROS_PER_MINUTE as f64).round();
        if width < 1.0 || width >= i64::MAX as f64 {
            return Err(CoreError::InvalidInterval(minutes));
        }

        Ok(Self {
            width_micros: width as i64,
        })
    }

    /// Bucket width in microseconds.
    #[must_use]
    pub fn width_micros(&self) -> i64 {
        self.width_micros
    }

    /// Bucket width in minutes.
    #[must_use]
    pub fn minutes(&self) -> f64 {
        self.width_micros as f64 / MICROS_PER_MINUTE as f64
    }

    /// Floors a timestamp to the start of its bucket.
    #[must_use]
    pub fn floor<T>(&self, ts: T) -> T
    where
        T: Timelike + Sub<TimeDelta, Output = T>,
    {
        let nanos = i64::from(ts.nanosecond());
        let micros = nanos / 1_000;
        let sub_micro = nanos % 1_000;

        let excess_micros = if self.width_micros < MICROS_PER_SECOND {
            micros % self.width_micros
        } else if self.width_micros < MICROS_PER_MINUTE {
            (i64::from(ts.second()) * MICROS_PER_SECOND) % self.width_micros + micros
        } else {
            (i64::from(ts.minute()) * MICROS_PER_MINUTE) % self.width_micros
                + i64::from(ts.second()) * MICROS_PER_SECOND
                + micros
        };

        ts - (TimeDelta::microseconds(excess_micros) + TimeDelta::nanoseconds(sub_micro))
    }

    /// Floors the given timestamp, or the current time when absent.
    #[must_use]
    pub fn floor_or_now(&self, ts: Option<DateTime<Utc>>) -> DateTime<Utc> {
        self.floor(ts.unwrap_or_else(Utc::now))
    }

    /// Floors the current wall-clock time.
    #[must_use]
    pub fn floor_now(&self) -> DateTime<Utc> {
        self.floor(Utc::now())
    }
}

impl Default for TimeBucket {
    fn default() -> Self {
        Self::SECOND
    }
}
