//! Shared domain types.
//!
//! These types are intentionally lightweight value types (no identity, no
//! interior mutation) so they can be:
//!
//! - used in-memory during estimation
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EstimateError;

/// One day's compartment state of the SIR model.
///
/// Conceptually `s + i + r = N`, but no step enforces that: callers are
/// responsible for supplying a consistent population size. Values are not
/// clamped and may leave `[0, N]` under pathological coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SirState {
    /// Susceptible.
    pub s: f64,
    /// Currently infected.
    pub i: f64,
    /// Recovered.
    pub r: f64,
}

impl SirState {
    pub fn new(s: f64, i: f64, r: f64) -> Self {
        Self { s, i, r }
    }
}

/// Transmission/recovery parameters for one stage, plus the derived
/// reproduction number.
///
/// `r0` is always `beta / gamma`; construct via [`Coefficients::from_rates`]
/// so that `gamma = 0` surfaces as an explicit error instead of a silent
/// infinity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub beta: f64,
    pub gamma: f64,
    /// Reproduction number `beta / gamma`.
    pub r0: f64,
}

impl Coefficients {
    /// Derive the coefficient triple from transmission and recovery rates.
    pub fn from_rates(beta: f64, gamma: f64, days: DayRange) -> Result<Self, EstimateError> {
        if gamma == 0.0 {
            return Err(EstimateError::UndefinedReproduction { days });
        }
        Ok(Self {
            beta,
            gamma,
            r0: beta / gamma,
        })
    }
}

/// A contiguous 1-based day-index window (inclusive on both ends).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub start: u32,
    pub end: u32,
}

impl DayRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Build the range covering an ordered day-index window.
    ///
    /// # Panics
    /// Panics if `days` is empty; stage windows are validated non-empty
    /// before estimation.
    pub fn from_days(days: &[u32]) -> Self {
        Self {
            start: days[0],
            end: *days.last().expect("non-empty day window"),
        }
    }

    pub fn len(&self) -> usize {
        (self.end.saturating_sub(self.start) + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

impl std::fmt::Display for DayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "days {}-{}", self.start, self.end)
    }
}

/// One reported daily record. Immutable input; day index is positional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    /// Newly reported cases on this day.
    pub new_cases: u64,
    /// Cumulative reported cases up to and including this day.
    pub total_cases: u64,
}

/// How future per-stage beta change ratios are derived.
///
/// The schedule always starts with `1.0` (the first future stage continues
/// the present regime); this policy produces the ratio applied to every
/// later future stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatioPolicy {
    /// Reuse the beta step observed around a historical intervention: the
    /// ratio between the stage just before `event_index` and the stage at
    /// `event_index`.
    FromHistory { event_index: usize },
    /// Apply a fixed multiplicative factor.
    Fixed(f64),
}

/// A full run's configuration as understood by the pipeline.
///
/// Always passed explicitly into core functions — never ambient state — so
/// the estimation code stays testable in isolation.
#[derive(Debug, Clone)]
pub struct EpiConfig {
    /// Total population size `N`.
    pub population: u64,
    /// Assumed time-to-recovery in days (the reporting lag between a case
    /// being counted and being counted as recovered).
    pub recovery_lag: usize,
    /// Historical stage boundaries: 0-based cut points over the observed day
    /// axis, including `0` and the observed day count.
    pub stage_bounds: Vec<usize>,
    /// Future stage boundaries: cut points from the observed day count up to
    /// the forecast horizon (inclusive of both ends).
    pub future_bounds: Vec<usize>,
    /// Policy for deriving future beta change ratios.
    pub ratio_policy: RatioPolicy,
}

impl EpiConfig {
    pub fn population_f64(&self) -> f64 {
        self.population as f64
    }
}

/// Resolved facts about the ingested observation series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSpec {
    /// Calendar date of day 1.
    pub start_date: NaiveDate,
    /// Number of observed days.
    pub n_days: usize,
}

impl RunSpec {
    /// Calendar date for a 1-based day index.
    pub fn date_of(&self, day: u32) -> NaiveDate {
        self.start_date + chrono::Duration::days(i64::from(day) - 1)
    }
}

/// Everything estimated for one historical stage.
#[derive(Debug, Clone)]
pub struct StageEstimate {
    pub days: DayRange,
    /// Fitted exponential trend for the stage's infected counts.
    pub trend: crate::models::ExpTrend,
    /// Reconstructed per-day SIR triples over the stage window.
    pub sir: Vec<SirState>,
    /// Back-solved averaged coefficients.
    pub coefficients: Coefficients,
}

/// One projected future stage.
#[derive(Debug, Clone)]
pub struct ForecastStage {
    pub days: DayRange,
    pub coefficients: Coefficients,
    /// Projected infected counts, one per day in the window.
    pub infected: Vec<f64>,
    /// SIR state after the stage's last day; start state of the next stage.
    pub final_state: SirState,
}

/// Full forward projection across all future stages.
#[derive(Debug, Clone)]
pub struct Forecast {
    pub stages: Vec<ForecastStage>,
    /// All stages' infected trajectories concatenated in day order.
    pub infected: Vec<f64>,
}

/// A saved forecast file (JSON), reloadable by `epi plot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    pub start_date: NaiveDate,
    pub population: u64,
    pub stages: Vec<ForecastFileStage>,
    pub grid: ForecastGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFileStage {
    pub days: DayRange,
    pub coefficients: Coefficients,
}

/// The projected infected trajectory on its day axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastGrid {
    pub day: Vec<u32>,
    pub infected: Vec<f64>,
}
