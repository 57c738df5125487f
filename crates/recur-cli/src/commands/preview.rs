//! Preview command for listing upcoming occurrences of the configured schedule.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::Config;
use crate::commands::util::parse_anchor;

/// Options for the preview command.
#[derive(Debug, Clone, Default)]
pub struct PreviewOptions {
    /// Overrides the configured count.
    pub count: Option<usize>,
    /// Anchor time; defaults to now.
    pub from: Option<String>,
    /// Emit JSON instead of text.
    pub json: bool,
}

/// JSON output shape.
#[derive(Debug, Serialize)]
struct PreviewReport {
    schedule: String,
    timezone: String,
    after: String,
    occurrences: Vec<String>,
    exhausted: bool,
}

const TIME_FORMAT: &str = "%a %Y-%m-%d %H:%M:%S %Z";

pub fn run<W: Write>(
    writer: &mut W,
    config: &Config,
    options: &PreviewOptions,
    now: DateTime<Utc>,
) -> Result<()> {
    let schedule = config.schedule()?;
    let tz = config.tz()?;
    let anchor = match &options.from {
        Some(from) => parse_anchor(from, now)?,
        None => now,
    }
    .with_timezone(&tz);
    let count = options.count.unwrap_or(config.count);

    let recurrence = schedule
        .build::<Tz>()
        .context("invalid schedule definition")?;

    tracing::debug!(%schedule, %anchor, count, "previewing schedule");

    let mut occurrences = recurrence.for_time(&anchor);
    let mut times = Vec::with_capacity(count);
    for index in 1..=count {
        let Some(next) = occurrences.next() else {
            break;
        };
        let time = next.with_context(|| format!("failed to compute occurrence {index}"))?;
        times.push(time);
    }
    let exhausted = times.len() < count;
    occurrences.release();

    if options.json {
        let report = PreviewReport {
            schedule: schedule.to_string(),
            timezone: tz.name().to_string(),
            after: anchor.to_rfc3339(),
            occurrences: times.iter().map(DateTime::to_rfc3339).collect(),
            exhausted,
        };
        serde_json::to_writer_pretty(&mut *writer, &report)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "Schedule:  {schedule}")?;
    writeln!(writer, "Time zone: {}", tz.name())?;
    writeln!(writer, "After:     {}", anchor.format(TIME_FORMAT))?;
    for (index, time) in times.iter().enumerate() {
        writeln!(writer, "{:>3}. {}", index + 1, time.format(TIME_FORMAT))?;
    }
    if exhausted {
        writeln!(writer, "No further occurrences.")?;
    }

    Ok(())
}
