//! Stage estimation.
//!
//! Responsibilities:
//!
//! - partition the day axis into stage windows (`segments`)
//! - fit the exponential trend per window (`trend_fit`, parallel grid +
//!   Gauss–Newton refinement)
//! - reconstruct SIR trajectories and back-solve beta/gamma per stage
//!   (`estimator`)

pub mod estimator;
pub mod segments;
pub mod trend_fit;

pub use estimator::*;
pub use segments::*;
pub use trend_fit::*;
