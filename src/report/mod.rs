//! Formatted terminal output for stage estimates and forecasts.

pub mod format;

pub use format::*;
