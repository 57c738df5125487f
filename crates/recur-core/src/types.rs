//! Validated parameter types for recurrences.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minutes in a day.
pub(crate) const MINUTES_PER_DAY: u32 = 24 * 60;

/// Validation errors for recurrence parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The cutoff hour or minute was out of range.
    #[error("cutoff must be within 00:00..=23:59, got {hour:02}:{minute:02}")]
    CutoffOutOfRange { hour: u32, minute: u32 },

    /// The cutoff text was not in `HH:MM` form.
    #[error("invalid cutoff {value:?}, expected HH:MM")]
    InvalidCutoff { value: String },

    /// The latitude was outside \[-90, 90\] or not finite.
    #[error("latitude must be between -90 and 90, got {value}")]
    LatitudeOutOfRange { value: f64 },

    /// The longitude was outside \[-180, 180\] or not finite.
    #[error("longitude must be between -180 and 180, got {value}")]
    LongitudeOutOfRange { value: f64 },

    /// The minimum gap between random occurrences was not positive.
    #[error("minimum gap must be positive, got {seconds}s")]
    NonPositiveGap { seconds: i64 },

    /// A duration in seconds was too large to represent.
    #[error("duration of {seconds}s is out of range")]
    DurationOutOfRange { seconds: i64 },

    /// The expected random addition was negative or too large to represent.
    #[error("expected addition must be non-negative and under 292 years, got {seconds}s")]
    InvalidExpectedAddition { seconds: i64 },
}

/// A point on the earth's surface.
///
/// Latitude is north-positive and longitude is east-positive, both in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Creates coordinates after validating both components.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::LatitudeOutOfRange { value: latitude });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::LongitudeOutOfRange { value: longitude });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.longitude
    }
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = ValidationError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A daily `hour:minute` boundary.
///
/// Serialized as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cutoff {
    hour: u32,
    minute: u32,
}

impl Cutoff {
    /// Creates a cutoff after validating the hour and minute.
    pub const fn new(hour: u32, minute: u32) -> Result<Self, ValidationError> {
        if hour >= 24 || minute >= 60 {
            return Err(ValidationError::CutoffOutOfRange { hour, minute });
        }
        Ok(Self { hour, minute })
    }

    #[must_use]
    pub const fn hour(self) -> u32 {
        self.hour
    }

    #[must_use]
    pub const fn minute(self) -> u32 {
        self.minute
    }

    /// Minutes since midnight, in `0..1440`.
    #[must_use]
    pub const fn minute_of_day(self) -> u32 {
        60 * self.hour + self.minute
    }
}

impl fmt::Display for Cutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for Cutoff {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidCutoff {
            value: s.to_string(),
        };
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour = hour.parse().map_err(|_| invalid())?;
        let minute = minute.parse().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for Cutoff {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Cutoff> for String {
    fn from(cutoff: Cutoff) -> Self {
        cutoff.to_string()
    }
}

/// Parameters of a jittered random recurrence.
///
/// Each gap is `minimum_gap` plus an exponentially distributed addition whose
/// mean is `expected_addition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jitter {
    minimum_gap: Duration,
    expected_addition: Duration,
}

impl Jitter {
    /// Creates jitter parameters.
    ///
    /// `minimum_gap` must be positive so emissions strictly increase, and
    /// `expected_addition` must be non-negative and representable in
    /// nanoseconds.
    pub fn new(
        minimum_gap: Duration,
        expected_addition: Duration,
    ) -> Result<Self, ValidationError> {
        if minimum_gap <= Duration::zero() {
            return Err(ValidationError::NonPositiveGap {
                seconds: minimum_gap.num_seconds(),
            });
        }
        if expected_addition < Duration::zero() || expected_addition.num_nanoseconds().is_none() {
            return Err(ValidationError::InvalidExpectedAddition {
                seconds: expected_addition.num_seconds(),
            });
        }
        Ok(Self {
            minimum_gap,
            expected_addition,
        })
    }

    #[must_use]
    pub const fn minimum_gap(self) -> Duration {
        self.minimum_gap
    }

    #[must_use]
    pub const fn expected_addition(self) -> Duration {
        self.expected_addition
    }

    /// Mean distance between consecutive occurrences.
    #[must_use]
    pub fn expected_gap(self) -> Duration {
        self.minimum_gap + self.expected_addition
    }
}
