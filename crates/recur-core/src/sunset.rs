//! Sunset sequences.
//!
//! The astronomy is delegated to a [`SunsetSource`]; this module only walks
//! a cursor across the location's solar days. The anchor's time zone is kept
//! for the emitted times but never picks the day.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::sequence::{Pull, RecurrenceError, TimeStream, Zone};
use crate::types::Coordinates;

/// Longest run of days without a sunset before the sequence gives up.
const MAX_DAYS_WITHOUT_SUNSET: u32 = 366;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Computes the sunset for a location on a calendar date.
pub trait SunsetSource: Send + Sync {
    /// Returns the sunset on `date` at `coordinates`, or `None` if the sun
    /// does not set that day.
    fn sunset_on(&self, coordinates: Coordinates, date: NaiveDate) -> Option<DateTime<Utc>>;
}

/// [`SunsetSource`] backed by the `sunrise` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SunriseCalculator;

impl SunsetSource for SunriseCalculator {
    fn sunset_on(&self, coordinates: Coordinates, date: NaiveDate) -> Option<DateTime<Utc>> {
        #[expect(
            deprecated,
            reason = "sunrise_sunset takes the plain date parts the cursor walks"
        )]
        let (_, sunset) = sunrise::sunrise_sunset(
            coordinates.latitude(),
            coordinates.longitude(),
            date.year(),
            date.month(),
            date.day(),
        );
        let sunset = DateTime::from_timestamp(sunset, 0)?;

        // Polar day and night come back as timestamps nowhere near the date.
        let noon = date.and_hms_opt(12, 0, 0)?.and_utc();
        ((sunset - noon).num_hours().abs() <= 36).then_some(sunset)
    }
}

/// Mean solar date at `longitude` for the instant `at`.
#[expect(
    clippy::cast_possible_truncation,
    reason = "the offset is within half a day of seconds"
)]
fn solar_date(at: NaiveDateTime, longitude: f64) -> NaiveDate {
    let offset = Duration::seconds((longitude / 360.0 * SECONDS_PER_DAY).round() as i64);
    at.checked_add_signed(offset).unwrap_or(at).date()
}

/// A sunset cursor positioned on one solar day at the location.
struct SunsetCursor<Tz: Zone> {
    coordinates: Coordinates,
    source: Arc<dyn SunsetSource>,
    zone: Tz,
    date: NaiveDate,
}

impl<Tz: Zone> SunsetCursor<Tz> {
    /// Positions the cursor on the solar day before the one containing the
    /// anchor, so a sunset just past local midnight is not missed.
    ///
    /// The anchor's zone only affects how emitted times are expressed.
    fn around(
        coordinates: Coordinates,
        source: Arc<dyn SunsetSource>,
        anchor: &DateTime<Tz>,
    ) -> Self {
        let today = solar_date(anchor.naive_utc(), coordinates.longitude());
        Self {
            coordinates,
            source,
            zone: anchor.timezone(),
            date: today.pred_opt().unwrap_or(today),
        }
    }

    /// Sunset on the cursor's date, moving forward over days without one.
    fn sunset(&mut self) -> Result<DateTime<Tz>, RecurrenceError> {
        let start = self.date;
        for _ in 0..MAX_DAYS_WITHOUT_SUNSET {
            if let Some(sunset) = self.source.sunset_on(self.coordinates, self.date) {
                return Ok(sunset.with_timezone(&self.zone));
            }
            tracing::trace!(date = %self.date, "no sunset, skipping day");
            self.add_days(1)?;
        }
        Err(RecurrenceError::NoSunset { date: start })
    }

    fn add_days(&mut self, days: u64) -> Result<(), RecurrenceError> {
        self.date = self
            .date
            .checked_add_days(Days::new(days))
            .ok_or(RecurrenceError::OutOfRange)?;
        Ok(())
    }
}

/// Emits one sunset per solar day, starting strictly after the anchor.
pub(crate) struct SunsetStream<Tz: Zone> {
    cursor: SunsetCursor<Tz>,
    /// Set until the cursor has been moved past the anchor.
    anchor: Option<DateTime<Tz>>,
}

impl<Tz: Zone> SunsetStream<Tz> {
    pub(crate) fn new(
        coordinates: Coordinates,
        source: Arc<dyn SunsetSource>,
        anchor: &DateTime<Tz>,
    ) -> Self {
        let cursor = SunsetCursor::around(coordinates, source, anchor);
        tracing::debug!(%coordinates, date = %cursor.date, "positioned sunset cursor");
        Self {
            cursor,
            anchor: Some(anchor.clone()),
        }
    }

    fn skip_past(&mut self, anchor: &DateTime<Tz>) -> Result<(), RecurrenceError> {
        while self.cursor.sunset()? <= *anchor {
            self.cursor.add_days(1)?;
        }
        Ok(())
    }
}

impl<Tz: Zone> TimeStream<Tz> for SunsetStream<Tz> {
    fn next_time(&mut self) -> Pull<Tz> {
        if let Some(anchor) = self.anchor.take() {
            self.skip_past(&anchor)?;
        }
        let sunset = self.cursor.sunset()?;
        self.cursor.add_days(1)?;
        Ok(Some(sunset))
    }
}
