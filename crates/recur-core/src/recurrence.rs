//! Recurrences: reusable factories for time sequences.

use std::fmt;
use std::sync::Arc;

use chrono::DateTime;

use crate::cutoff::CutoffStream;
use crate::random::{self, RandomStream, UniformSource};
use crate::sequence::{Occurrences, Zone};
use crate::sunset::{SunriseCalculator, SunsetSource, SunsetStream};
use crate::types::{Coordinates, Cutoff, Jitter};

/// A reusable description of recurring times.
///
/// Each call to [`for_time`](Self::for_time) yields an independent sequence
/// of the times after `anchor`.
pub trait Recurrence<Tz: Zone>: Send + Sync {
    fn for_time(&self, anchor: &DateTime<Tz>) -> Occurrences<Tz>;
}

impl<Tz: Zone, R: Recurrence<Tz> + ?Sized> Recurrence<Tz> for Box<R> {
    fn for_time(&self, anchor: &DateTime<Tz>) -> Occurrences<Tz> {
        (**self).for_time(anchor)
    }
}

impl<Tz: Zone, R: Recurrence<Tz> + ?Sized> Recurrence<Tz> for Arc<R> {
    fn for_time(&self, anchor: &DateTime<Tz>) -> Occurrences<Tz> {
        (**self).for_time(anchor)
    }
}

/// A recurrence defined by a closure. See [`recurrence_fn`].
#[derive(Clone)]
pub struct RecurrenceFn<F>(F);

/// Builds a recurrence from a closure mapping an anchor to a sequence.
pub fn recurrence_fn<Tz, F>(f: F) -> RecurrenceFn<F>
where
    Tz: Zone,
    F: Fn(&DateTime<Tz>) -> Occurrences<Tz> + Send + Sync,
{
    RecurrenceFn(f)
}

impl<Tz, F> Recurrence<Tz> for RecurrenceFn<F>
where
    Tz: Zone,
    F: Fn(&DateTime<Tz>) -> Occurrences<Tz> + Send + Sync,
{
    fn for_time(&self, anchor: &DateTime<Tz>) -> Occurrences<Tz> {
        (self.0)(anchor)
    }
}

impl<F> fmt::Debug for RecurrenceFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecurrenceFn")
    }
}

/// Every sunset at a location. See [`each_sunset`].
#[derive(Clone)]
pub struct EachSunset {
    coordinates: Coordinates,
    source: Arc<dyn SunsetSource>,
}

/// The sunsets at `coordinates`, computed with [`SunriseCalculator`].
pub fn each_sunset(coordinates: Coordinates) -> EachSunset {
    each_sunset_with(coordinates, SunriseCalculator)
}

/// The sunsets at `coordinates`, computed with `source`.
pub fn each_sunset_with<S>(coordinates: Coordinates, source: S) -> EachSunset
where
    S: SunsetSource + 'static,
{
    EachSunset {
        coordinates,
        source: Arc::new(source),
    }
}

impl EachSunset {
    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        self.coordinates
    }
}

impl<Tz: Zone> Recurrence<Tz> for EachSunset {
    fn for_time(&self, anchor: &DateTime<Tz>) -> Occurrences<Tz> {
        Occurrences::from_stream(SunsetStream::new(
            self.coordinates,
            Arc::clone(&self.source),
            anchor,
        ))
    }
}

impl fmt::Debug for EachSunset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EachSunset")
            .field("coordinates", &self.coordinates)
            .finish_non_exhaustive()
    }
}

/// Another recurrence clamped onto a daily cutoff. See [`on_or_before`].
#[derive(Debug, Clone)]
pub struct OnOrBefore<R> {
    inner: R,
    cutoff: Cutoff,
}

/// Ensures the times of `inner` happen on or before `cutoff`.
///
/// A time in the 12 hours after the cutoff is moved back to the cutoff; a
/// time 12 hours or more after it counts as before the next day's cutoff and
/// is kept. Results at or before the anchor and consecutive duplicates are
/// dropped.
pub const fn on_or_before<R>(inner: R, cutoff: Cutoff) -> OnOrBefore<R> {
    OnOrBefore { inner, cutoff }
}

impl<R> OnOrBefore<R> {
    #[must_use]
    pub const fn cutoff(&self) -> Cutoff {
        self.cutoff
    }
}

impl<Tz: Zone, R: Recurrence<Tz>> Recurrence<Tz> for OnOrBefore<R> {
    fn for_time(&self, anchor: &DateTime<Tz>) -> Occurrences<Tz> {
        let inner = self.inner.for_time(anchor);
        Occurrences::from_stream(CutoffStream::new(inner, anchor, self.cutoff))
    }
}

type SourceFactory = Arc<dyn Fn() -> Box<dyn UniformSource> + Send + Sync>;

/// Random times at least `minimum_gap` apart. See [`random`].
#[derive(Clone)]
pub struct RandomRecurrence {
    jitter: Jitter,
    source: SourceFactory,
}

/// Random times at least `jitter.minimum_gap()` apart, with an expected gap
/// of `jitter.expected_gap()`.
///
/// Every sequence draws from its own entropy-seeded generator.
pub fn random(jitter: Jitter) -> RandomRecurrence {
    RandomRecurrence {
        jitter,
        source: Arc::new(random::entropy_source),
    }
}

impl RandomRecurrence {
    /// Seeds every sequence's generator with `seed`, making each sequence
    /// for the same anchor identical.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_source(move || random::seeded_source(seed))
    }

    /// Draws uniform samples for each new sequence from `factory()`.
    #[must_use]
    pub fn with_source<F>(self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn UniformSource> + Send + Sync + 'static,
    {
        Self {
            jitter: self.jitter,
            source: Arc::new(factory),
        }
    }

    #[must_use]
    pub const fn jitter(&self) -> Jitter {
        self.jitter
    }
}

impl<Tz: Zone> Recurrence<Tz> for RandomRecurrence {
    fn for_time(&self, anchor: &DateTime<Tz>) -> Occurrences<Tz> {
        Occurrences::from_stream(RandomStream::new(anchor, self.jitter, (self.source)()))
    }
}

impl fmt::Debug for RandomRecurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomRecurrence")
            .field("jitter", &self.jitter)
            .finish_non_exhaustive()
    }
}
