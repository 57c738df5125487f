//! Jittered random sequences.
//!
//! Each gap is a fixed minimum plus an exponentially distributed addition,
//! so occurrences behave like a Poisson process with a hard floor.

use chrono::{DateTime, Duration};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::sequence::{Pull, RecurrenceError, TimeStream, Zone};
use crate::types::Jitter;

/// A source of uniform samples in `[0, 1)`.
pub trait UniformSource: Send {
    fn sample(&mut self) -> f64;
}

impl UniformSource for StdRng {
    fn sample(&mut self) -> f64 {
        self.gen_range(0.0..1.0)
    }
}

/// A fresh entropy-seeded generator.
pub(crate) fn entropy_source() -> Box<dyn UniformSource> {
    Box::new(StdRng::from_entropy())
}

/// A generator that replays the same samples for the same seed.
pub(crate) fn seeded_source(seed: u64) -> Box<dyn UniformSource> {
    Box::new(StdRng::seed_from_u64(seed))
}

/// Converts a uniform sample into an exponentially distributed duration with
/// mean `mean`, truncated to whole nanoseconds.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    reason = "nanosecond counts are converted through f64 and range-checked"
)]
fn exponential(sample: f64, mean: Duration) -> Result<Duration, RecurrenceError> {
    let mean_ns = mean.num_nanoseconds().ok_or(RecurrenceError::OutOfRange)?;
    let nanos = -(-sample).ln_1p() * mean_ns as f64;
    if !nanos.is_finite() || nanos >= i64::MAX as f64 {
        return Err(RecurrenceError::OutOfRange);
    }
    Ok(Duration::nanoseconds(nanos as i64))
}

pub(crate) struct RandomStream<Tz: Zone> {
    current: DateTime<Tz>,
    jitter: Jitter,
    source: Box<dyn UniformSource>,
}

impl<Tz: Zone> RandomStream<Tz> {
    pub(crate) fn new(
        anchor: &DateTime<Tz>,
        jitter: Jitter,
        source: Box<dyn UniformSource>,
    ) -> Self {
        tracing::debug!(
            minimum_gap_secs = jitter.minimum_gap().num_seconds(),
            expected_addition_secs = jitter.expected_addition().num_seconds(),
            "starting random sequence"
        );
        Self {
            current: anchor.clone(),
            jitter,
            source,
        }
    }
}

impl<Tz: Zone> TimeStream<Tz> for RandomStream<Tz> {
    fn next_time(&mut self) -> Pull<Tz> {
        let addition = exponential(self.source.sample(), self.jitter.expected_addition())?;
        let next = self
            .current
            .clone()
            .checked_add_signed(self.jitter.minimum_gap())
            .and_then(|t| t.checked_add_signed(addition))
            .ok_or(RecurrenceError::OutOfRange)?;
        self.current = next.clone();
        Ok(Some(next))
    }
}
