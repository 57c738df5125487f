//! The "on or before" combinator.
//!
//! Every time that falls in the 12 hours after a daily cutoff is moved back
//! onto that cutoff. A time in the 12 hours before the cutoff is already on
//! or before it and passes through untouched.
//!
//! # Banding
//!
//! With `hm` the minute of day of the incoming time and `C` the cutoff's:
//!
//! | `hm` | result |
//! |---|---|
//! | `C <= hm < C + 720` | `C` on the same date |
//! | `hm < C - 720` | `C` on the previous date (after yesterday's cutoff) |
//! | otherwise | unchanged |
//!
//! Both bands are half-open, so a time exactly 12 hours after a cutoff is
//! treated as on-or-before the next one and left alone.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, Offset, Timelike};

use crate::sequence::{Occurrences, Pull, RecurrenceError, TimeStream, Zone};
use crate::types::{Cutoff, MINUTES_PER_DAY};

const HALF_DAY_MINUTES: u32 = MINUTES_PER_DAY / 2;

/// Moves `time` back onto `cutoff` if it falls in the half day after it.
pub fn adjust<Tz: Zone>(
    time: &DateTime<Tz>,
    cutoff: Cutoff,
) -> Result<DateTime<Tz>, RecurrenceError> {
    let hm = time.hour() * 60 + time.minute();
    let c = cutoff.minute_of_day();

    let date = if (c..c + HALF_DAY_MINUTES).contains(&hm) {
        time.date_naive()
    } else if hm + HALF_DAY_MINUTES < c {
        time.date_naive().pred_opt().ok_or(RecurrenceError::OutOfRange)?
    } else {
        return Ok(time.clone());
    };

    at_cutoff(&time.timezone(), date, cutoff)
}

/// The instant `cutoff` on `date` in `zone`.
///
/// An ambiguous wall time resolves to the earlier instant. A wall time inside
/// a forward gap is read with the offset in force before the gap, landing
/// after it (02:30 in a 02:00→03:00 gap becomes 03:30).
fn at_cutoff<Tz: Zone>(
    zone: &Tz,
    date: NaiveDate,
    cutoff: Cutoff,
) -> Result<DateTime<Tz>, RecurrenceError> {
    let local = date
        .and_hms_opt(cutoff.hour(), cutoff.minute(), 0)
        .ok_or(RecurrenceError::OutOfRange)?;

    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt),
        LocalResult::None => {
            let before = offset_before(zone, &local)?;
            let utc = local
                .checked_sub_signed(Duration::seconds(i64::from(before)))
                .ok_or(RecurrenceError::OutOfRange)?;
            Ok(zone.from_utc_datetime(&utc))
        }
    }
}

/// UTC offset in seconds a day before `local`.
fn offset_before<Tz: Zone>(zone: &Tz, local: &NaiveDateTime) -> Result<i32, RecurrenceError> {
    let day_before = local
        .checked_sub_signed(Duration::days(1))
        .ok_or(RecurrenceError::OutOfRange)?;
    zone.offset_from_local_datetime(&day_before)
        .earliest()
        .map(|offset| offset.fix().local_minus_utc())
        .ok_or(RecurrenceError::OutOfRange)
}

/// Adjusts an inner sequence onto a cutoff, then drops results at or before
/// the anchor and collapses consecutive duplicates.
pub(crate) struct CutoffStream<Tz: Zone> {
    inner: Occurrences<Tz>,
    anchor: DateTime<Tz>,
    cutoff: Cutoff,
    past_anchor: bool,
    last: Option<DateTime<Tz>>,
}

impl<Tz: Zone> CutoffStream<Tz> {
    pub(crate) fn new(inner: Occurrences<Tz>, anchor: &DateTime<Tz>, cutoff: Cutoff) -> Self {
        tracing::debug!(%cutoff, "wrapping sequence with cutoff");
        Self {
            inner,
            anchor: anchor.clone(),
            cutoff,
            past_anchor: false,
            last: None,
        }
    }
}

impl<Tz: Zone> TimeStream<Tz> for CutoffStream<Tz> {
    fn next_time(&mut self) -> Pull<Tz> {
        while let Some(raw) = self.inner.next_time()? {
            let time = adjust(&raw, self.cutoff)?;

            if !self.past_anchor {
                if time <= self.anchor {
                    tracing::trace!(?raw, "dropping occurrence at or before anchor");
                    continue;
                }
                self.past_anchor = true;
            }

            if self.last.as_ref() == Some(&time) {
                continue;
            }
            self.last = Some(time.clone());
            return Ok(Some(time));
        }
        Ok(None)
    }

    fn close(&mut self) {
        self.inner.release();
    }
}
