//! Model evaluation.
//!
//! The pipeline relies on two primitives:
//!
//! - the discrete SIR integrator and trajectory generator (`sir`)
//! - the exponential trend model fitted to noisy infected counts (`trend`)

pub mod sir;
pub mod trend;

pub use sir::*;
pub use trend::*;
