//! Recurrence preview CLI library.
//!
//! This crate provides the CLI interface for previewing recurrence schedules.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
