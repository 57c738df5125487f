//! Declarative schedule definitions.
//!
//! A [`ScheduleDef`] is the serializable form of a tree of recurrences, so
//! a schedule can live in configuration:
//!
//! ```toml
//! [schedule]
//! kind = "on_or_before"
//! cutoff = "22:00"
//!
//! [schedule.inner]
//! kind = "sunset"
//! latitude = 37.77
//! longitude = -122.42
//! ```

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::recurrence::{Recurrence, each_sunset, on_or_before, random};
use crate::sequence::Zone;
use crate::types::{Coordinates, Cutoff, Jitter, ValidationError};

/// A serializable recurrence spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleDef {
    /// Every sunset at a location.
    Sunset { latitude: f64, longitude: f64 },

    /// Random times with a minimum gap and an exponential addition.
    Random {
        minimum_gap_secs: i64,
        expected_addition_secs: i64,
        /// Fixes the generator seed so every preview repeats.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },

    /// Another schedule clamped onto a daily cutoff.
    OnOrBefore {
        cutoff: Cutoff,
        inner: Box<ScheduleDef>,
    },
}

impl ScheduleDef {
    /// Validates the definition and builds the recurrence it describes.
    pub fn build<Tz: Zone>(&self) -> Result<Box<dyn Recurrence<Tz>>, ValidationError> {
        match self {
            Self::Sunset {
                latitude,
                longitude,
            } => {
                let coordinates = Coordinates::new(*latitude, *longitude)?;
                Ok(Box::new(each_sunset(coordinates)))
            }
            Self::Random {
                minimum_gap_secs,
                expected_addition_secs,
                seed,
            } => {
                let jitter = Jitter::new(
                    seconds(*minimum_gap_secs)?,
                    seconds(*expected_addition_secs)?,
                )?;
                let spec = match seed {
                    Some(seed) => random(jitter).with_seed(*seed),
                    None => random(jitter),
                };
                Ok(Box::new(spec))
            }
            Self::OnOrBefore { cutoff, inner } => {
                Ok(Box::new(on_or_before(inner.build::<Tz>()?, *cutoff)))
            }
        }
    }
}

fn seconds(secs: i64) -> Result<Duration, ValidationError> {
    Duration::try_seconds(secs).ok_or(ValidationError::DurationOutOfRange { seconds: secs })
}

/// Formats whole seconds compactly, e.g. `1h30m` or `45s`.
fn format_secs(secs: i64) -> String {
    if secs == 0 {
        return "0s".to_string();
    }
    let sign = if secs < 0 { "-" } else { "" };
    let secs = secs.unsigned_abs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);

    let mut out = sign.to_string();
    if h > 0 {
        out.push_str(&format!("{h}h"));
    }
    if m > 0 {
        out.push_str(&format!("{m}m"));
    }
    if s > 0 {
        out.push_str(&format!("{s}s"));
    }
    out
}

impl fmt::Display for ScheduleDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sunset {
                latitude,
                longitude,
            } => write!(f, "every sunset at {latitude:.4}, {longitude:.4}"),
            Self::Random {
                minimum_gap_secs,
                expected_addition_secs,
                seed,
            } => {
                write!(
                    f,
                    "random, at least {} apart plus ~{}",
                    format_secs(*minimum_gap_secs),
                    format_secs(*expected_addition_secs)
                )?;
                if let Some(seed) = seed {
                    write!(f, " (seed {seed})")?;
                }
                Ok(())
            }
            Self::OnOrBefore { cutoff, inner } => write!(f, "{inner}, on or before {cutoff}"),
        }
    }
}
