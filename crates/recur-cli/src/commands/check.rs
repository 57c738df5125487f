//! Check command for validating the configured schedule.

use std::io::Write;

use anyhow::{Context, Result};
use chrono_tz::Tz;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let schedule = config.schedule()?;
    let tz = config.tz()?;
    schedule
        .build::<Tz>()
        .context("invalid schedule definition")?;

    writeln!(writer, "Schedule OK")?;
    writeln!(writer, "Schedule:  {schedule}")?;
    writeln!(writer, "Time zone: {}", tz.name())?;
    writeln!(writer, "Count:     {}", config.count)?;

    Ok(())
}
