//! Lazy recurrence streams.
//!
//! This crate generates recurring points in time from declarative descriptions:
//! - Sunsets: every sunset at a location
//! - Random: jittered intervals with a hard minimum gap
//! - On or before: any recurrence clamped back onto a daily cutoff
//!
//! A [`Recurrence`] turns an anchor time into an [`Occurrences`] cursor that
//! produces the following times one pull at a time.

mod cutoff;
mod random;
mod recurrence;
pub mod schedule;
pub mod sequence;
pub mod sunset;
pub mod types;

pub use cutoff::adjust as adjust_to_cutoff;
pub use random::UniformSource;
pub use recurrence::{
    EachSunset, OnOrBefore, RandomRecurrence, Recurrence, RecurrenceFn, each_sunset,
    each_sunset_with, on_or_before, random, recurrence_fn,
};
pub use schedule::ScheduleDef;
pub use sequence::{Occurrences, Pull, RecurrenceError, TimeStream, Zone};
pub use sunset::{SunriseCalculator, SunsetSource};
pub use types::{Coordinates, Cutoff, Jitter, ValidationError};
