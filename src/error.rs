//! Error types.
//!
//! Two layers, mirroring how the pipeline is used:
//!
//! - [`EstimateError`]: model/data-quality failures tied to a specific stage's
//!   day range. These are deterministic — retrying reproduces them — so the
//!   only recovery is better input data or adjusted stage boundaries.
//! - [`AppError`]: process-boundary error carrying an exit code for the `epi`
//!   binary.

use crate::domain::DayRange;

/// Which averaged quantity ran out of valid sample pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Beta,
    Gamma,
    BetaRatio,
}

impl Quantity {
    pub fn display_name(self) -> &'static str {
        match self {
            Quantity::Beta => "beta",
            Quantity::Gamma => "gamma",
            Quantity::BetaRatio => "beta ratio",
        }
    }
}

/// A stage-level estimation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimateError {
    /// A coefficient average had zero valid sample pairs (e.g. every
    /// consecutive pair in the stage had `S·I = 0`).
    InsufficientData { quantity: Quantity, days: DayRange },
    /// The exponential trend fit failed on a degenerate window or produced no
    /// finite candidate.
    FitDidNotConverge { days: DayRange, reason: String },
    /// `gamma = 0` makes the reproduction number undefined.
    UndefinedReproduction { days: DayRange },
}

impl std::fmt::Display for EstimateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimateError::InsufficientData { quantity, days } => write!(
                f,
                "insufficient data to estimate {} for {days}: no valid sample pairs",
                quantity.display_name()
            ),
            EstimateError::FitDidNotConverge { days, reason } => {
                write!(f, "trend fit did not converge for {days}: {reason}")
            }
            EstimateError::UndefinedReproduction { days } => {
                write!(f, "reproduction number undefined for {days}: gamma = 0")
            }
        }
    }
}

impl std::error::Error for EstimateError {}

/// Process-boundary error with an exit code for the binary.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EstimateError> for AppError {
    fn from(err: EstimateError) -> Self {
        AppError::new(4, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
