//! Input/output helpers.
//!
//! - CSV observation ingest + validation (`ingest`)
//! - trajectory CSV and forecast JSON exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
