//! Mathematical utilities: the least-squares solver behind the trend fit.

pub mod lsq;

pub use lsq::*;
