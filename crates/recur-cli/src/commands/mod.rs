//! CLI command implementations.

pub mod check;
pub mod preview;
pub mod util;
