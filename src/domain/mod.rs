//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - model state and parameters (`SirState`, `Coefficients`)
//! - immutable daily observations (`Observation`)
//! - run configuration (`EpiConfig`, `RatioPolicy`)
//! - estimation and forecast outputs (`StageEstimate`, `Forecast`)

pub mod types;

pub use types::*;
