//! Lazy time sequences.
//!
//! A [`TimeStream`] is the minimal pull contract: produce the next time,
//! signal exhaustion, or fail. [`Occurrences`] owns a boxed stream and adds
//! the guarantees consumers rely on:
//!
//! - once a pull reports exhaustion or an error, every later pull repeats it
//! - the stream is closed exactly once, on [`Occurrences::release`] or on drop

use std::collections::VecDeque;
use std::fmt;
use std::iter::FusedIterator;

use chrono::{DateTime, NaiveDate, TimeZone};
use thiserror::Error;

/// Time zones usable for anchors and emitted times.
///
/// Blanket-implemented for every thread-safe [`TimeZone`], including
/// `Utc`, `FixedOffset`, `Local` and `chrono_tz::Tz`.
pub trait Zone: TimeZone<Offset: Send + Sync> + Send + Sync + 'static {}

impl<Tz> Zone for Tz where Tz: TimeZone<Offset: Send + Sync> + Send + Sync + 'static {}

/// Errors produced while pulling from a sequence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    /// Time arithmetic left the range chrono can represent.
    #[error("occurrence is outside the representable time range")]
    OutOfRange,

    /// No sunset happens for a full year starting at `date` (polar latitudes).
    #[error("no sunset within a year of {date}")]
    NoSunset { date: NaiveDate },

    /// A caller-provided stream failed.
    #[error("{0}")]
    Source(String),
}

/// Result of a single pull: `Ok(None)` means the sequence is exhausted.
pub type Pull<Tz> = Result<Option<DateTime<Tz>>, RecurrenceError>;

/// The pull contract every sequence implements.
///
/// Implementations do not need to handle repeated pulls after exhaustion or
/// failure; [`Occurrences`] never calls `next_time` again after either.
pub trait TimeStream<Tz: Zone>: Send {
    /// Advances the stream and returns the next time.
    fn next_time(&mut self) -> Pull<Tz>;

    /// Releases any resource the stream holds. Called at most once.
    fn close(&mut self) {}
}

#[derive(Debug, Clone)]
enum Terminal {
    Exhausted,
    Failed(RecurrenceError),
}

/// An owned, single-consumer cursor over an ordered series of times.
///
/// Also an [`Iterator`] yielding `Ok(time)` values, then the error (if the
/// sequence failed) once, then `None`.
pub struct Occurrences<Tz: Zone> {
    stream: Box<dyn TimeStream<Tz>>,
    terminal: Option<Terminal>,
    released: bool,
    error_yielded: bool,
}

impl<Tz: Zone> Occurrences<Tz> {
    /// Wraps a stream.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: TimeStream<Tz> + 'static,
    {
        Self {
            stream: Box::new(stream),
            terminal: None,
            released: false,
            error_yielded: false,
        }
    }

    /// A sequence driven by a closure, like [`std::iter::from_fn`].
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut() -> Pull<Tz> + Send + 'static,
    {
        Self::from_stream(FromFn(f))
    }

    /// A sequence that is exhausted immediately.
    pub fn empty() -> Self {
        Self::from_results(Vec::new())
    }

    /// A finite sequence of the given times.
    pub fn from_times<I>(times: I) -> Self
    where
        I: IntoIterator<Item = DateTime<Tz>>,
    {
        Self::from_results(times.into_iter().map(Ok).collect())
    }

    /// A finite sequence replaying the given pulls in order.
    ///
    /// The first `Err` terminates the sequence.
    pub fn from_results(results: Vec<Result<DateTime<Tz>, RecurrenceError>>) -> Self {
        Self::from_stream(Scripted {
            pending: results.into(),
        })
    }

    /// A sequence whose first pull fails with `error`.
    pub fn failing(error: RecurrenceError) -> Self {
        Self::from_results(vec![Err(error)])
    }

    /// Pulls the next time.
    ///
    /// After exhaustion or failure this keeps returning the same outcome.
    /// Pulling from a released cursor reports exhaustion.
    pub fn next_time(&mut self) -> Pull<Tz> {
        match &self.terminal {
            Some(Terminal::Exhausted) => return Ok(None),
            Some(Terminal::Failed(err)) => return Err(err.clone()),
            None => {}
        }
        if self.released {
            self.terminal = Some(Terminal::Exhausted);
            return Ok(None);
        }

        match self.stream.next_time() {
            Ok(Some(time)) => Ok(Some(time)),
            Ok(None) => {
                tracing::trace!("sequence exhausted");
                self.terminal = Some(Terminal::Exhausted);
                Ok(None)
            }
            Err(err) => {
                tracing::debug!(error = %err, "sequence failed");
                self.terminal = Some(Terminal::Failed(err.clone()));
                Err(err)
            }
        }
    }

    /// Releases the underlying stream. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.stream.close();
        tracing::trace!("sequence released");
    }

    /// Whether [`release`](Self::release) has run.
    pub const fn is_released(&self) -> bool {
        self.released
    }
}

impl<Tz: Zone> Drop for Occurrences<Tz> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<Tz: Zone> fmt::Debug for Occurrences<Tz> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Occurrences")
            .field("terminal", &self.terminal)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl<Tz: Zone> Iterator for Occurrences<Tz> {
    type Item = Result<DateTime<Tz>, RecurrenceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.error_yielded {
            return None;
        }
        match self.next_time() {
            Ok(time) => time.map(Ok),
            Err(err) => {
                self.error_yielded = true;
                Some(Err(err))
            }
        }
    }
}

impl<Tz: Zone> FusedIterator for Occurrences<Tz> {}

struct FromFn<F>(F);

impl<Tz, F> TimeStream<Tz> for FromFn<F>
where
    Tz: Zone,
    F: FnMut() -> Pull<Tz> + Send,
{
    fn next_time(&mut self) -> Pull<Tz> {
        (self.0)()
    }
}

struct Scripted<Tz: Zone> {
    pending: VecDeque<Result<DateTime<Tz>, RecurrenceError>>,
}

impl<Tz: Zone> TimeStream<Tz> for Scripted<Tz> {
    fn next_time(&mut self) -> Pull<Tz> {
        self.pending.pop_front().transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use super::*;

    fn ts(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap() + chrono::Duration::minutes(minutes)
    }

    /// Counts pulls and closes so tests can observe what the cursor forwards.
    struct Counting {
        pulls: Arc<AtomicUsize>,
        closes: Arc<AtomicUsize>,
        remaining: usize,
        fail: bool,
    }

    impl TimeStream<Utc> for Counting {
        fn next_time(&mut self) -> Pull<Utc> {
            self.pulls.fetch_add(1, Ordering::SeqCst);
            if self.remaining == 0 {
                return if self.fail {
                    Err(RecurrenceError::Source("stream failed".to_string()))
                } else {
                    Ok(None)
                };
            }
            self.remaining -= 1;
            Ok(Some(ts(60)))
        }

        fn close(&mut self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counting(
        remaining: usize,
        fail: bool,
    ) -> (Occurrences<Utc>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let pulls = Arc::new(AtomicUsize::new(0));
        let closes = Arc::new(AtomicUsize::new(0));
        let occurrences = Occurrences::from_stream(Counting {
            pulls: Arc::clone(&pulls),
            closes: Arc::clone(&closes),
            remaining,
            fail,
        });
        (occurrences, pulls, closes)
    }

    #[test]
    fn from_times_yields_in_order_then_exhausts() {
        let mut seq = Occurrences::from_times([ts(1), ts(2)]);
        assert_eq!(seq.next_time(), Ok(Some(ts(1))));
        assert_eq!(seq.next_time(), Ok(Some(ts(2))));
        assert_eq!(seq.next_time(), Ok(None));
    }

    #[test]
    fn exhaustion_is_sticky() {
        let (mut seq, pulls, _) = counting(1, false);
        assert!(seq.next_time().unwrap().is_some());
        assert_eq!(seq.next_time(), Ok(None));
        assert_eq!(seq.next_time(), Ok(None));
        assert_eq!(seq.next_time(), Ok(None));
        assert_eq!(pulls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn error_is_sticky() {
        let (mut seq, pulls, _) = counting(0, true);
        let expected = Err(RecurrenceError::Source("stream failed".to_string()));
        assert_eq!(seq.next_time(), expected);
        assert_eq!(seq.next_time(), expected);
        assert_eq!(pulls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn scripted_error_stops_replay() {
        let mut seq = Occurrences::from_results(vec![
            Ok(ts(1)),
            Err(RecurrenceError::OutOfRange),
            Ok(ts(2)),
        ]);
        assert_eq!(seq.next_time(), Ok(Some(ts(1))));
        assert_eq!(seq.next_time(), Err(RecurrenceError::OutOfRange));
        assert_eq!(seq.next_time(), Err(RecurrenceError::OutOfRange));
    }

    #[test]
    fn release_is_idempotent() {
        let (mut seq, _, closes) = counting(3, false);
        seq.release();
        seq.release();
        assert!(seq.is_released());
        drop(seq);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_without_pulling() {
        let (mut seq, pulls, closes) = counting(3, false);
        seq.release();
        assert_eq!(pulls.load(Ordering::SeqCst), 0);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_releases() {
        let (mut seq, _, closes) = counting(3, true);
        let _ = seq.next_time();
        drop(seq);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn pull_after_release_reports_exhaustion() {
        let (mut seq, pulls, _) = counting(3, false);
        seq.release();
        assert_eq!(seq.next_time(), Ok(None));
        assert_eq!(pulls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn iterator_yields_error_once() {
        let seq = Occurrences::from_results(vec![Ok(ts(1)), Err(RecurrenceError::OutOfRange)]);
        let items: Vec<_> = seq.collect();
        assert_eq!(items, vec![Ok(ts(1)), Err(RecurrenceError::OutOfRange)]);
    }

    #[test]
    fn iterator_is_fused() {
        let mut seq = Occurrences::<Utc>::empty();
        assert_eq!(seq.next(), None);
        assert_eq!(seq.next(), None);
    }

    #[test]
    fn from_fn_counts_up() {
        let mut n = 0;
        let seq = Occurrences::from_fn(move || {
            n += 1;
            Ok((n <= 3).then(|| ts(n)))
        });
        let times: Vec<_> = seq.map(Result::unwrap).collect();
        assert_eq!(times, vec![ts(1), ts(2), ts(3)]);
    }

    #[test]
    fn failing_fails_first_pull() {
        let mut seq = Occurrences::<Utc>::failing(RecurrenceError::Source("boom".to_string()));
        assert_eq!(seq.next_time().unwrap_err().to_string(), "boom");
    }
}
