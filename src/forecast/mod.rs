//! Forward projection under hypothesized beta step changes.
//!
//! The ratio schedule starts with `1.0` (the first future stage continues the
//! present regime); later stages apply the configured [`RatioPolicy`]. Each
//! future stage derives `beta' = last-known-beta × ratio` with gamma
//! unchanged, then simulates forward; the ending SIR state of one stage is
//! the starting state of the next, and the first stage continues directly
//! from the final historical state. That chaining is a deliberate sequential
//! dependency.

use crate::domain::{
    Coefficients, DayRange, Forecast, ForecastStage, RatioPolicy, SirState, StageEstimate,
};
use crate::error::{EstimateError, Quantity};
use crate::models::{Compartment, trajectory};

/// Multiplicative beta factors, one per future stage.
///
/// The first factor is always `1.0`. `FromHistory` reuses the beta step
/// observed across a named historical stage transition as a proxy for future
/// step changes; `Fixed` applies an explicit factor.
pub fn beta_ratio_schedule(
    stages: &[StageEstimate],
    policy: RatioPolicy,
    future_count: usize,
) -> Result<Vec<f64>, EstimateError> {
    if future_count == 0 {
        return Ok(Vec::new());
    }

    let overall = DayRange::new(
        stages.first().map_or(1, |s| s.days.start),
        stages.last().map_or(1, |s| s.days.end),
    );

    let ratio = match policy {
        RatioPolicy::Fixed(r) => r,
        RatioPolicy::FromHistory { event_index } => {
            if event_index == 0 || event_index >= stages.len() {
                return Err(EstimateError::InsufficientData {
                    quantity: Quantity::BetaRatio,
                    days: overall,
                });
            }
            let before = stages[event_index - 1].coefficients.beta;
            let after = stages[event_index].coefficients.beta;
            if after == 0.0 || !(before / after).is_finite() {
                return Err(EstimateError::InsufficientData {
                    quantity: Quantity::BetaRatio,
                    days: stages[event_index].days,
                });
            }
            before / after
        }
    };

    let mut ratios = Vec::with_capacity(future_count);
    ratios.push(1.0);
    ratios.resize(future_count, ratio);
    Ok(ratios)
}

/// Derive one coefficient triple per future stage from the most recent
/// historical estimate.
pub fn future_coefficients(
    last: Coefficients,
    ratios: &[f64],
    future_windows: &[Vec<u32>],
) -> Result<Vec<Coefficients>, EstimateError> {
    ratios
        .iter()
        .zip(future_windows.iter())
        .map(|(&ratio, window)| {
            Coefficients::from_rates(last.beta * ratio, last.gamma, DayRange::from_days(window))
        })
        .collect()
}

/// Simulate all future stages, chaining SIR state across stage boundaries.
pub fn project(
    future_windows: &[Vec<u32>],
    start_state: SirState,
    coefficients: &[Coefficients],
    n: f64,
) -> Forecast {
    let mut stages = Vec::with_capacity(future_windows.len());
    let mut infected = Vec::new();
    let mut state = start_state;

    for (window, &c) in future_windows.iter().zip(coefficients.iter()) {
        let y_s = trajectory(Compartment::Susceptible, window, state.s, n, state, c);
        let y_i = trajectory(Compartment::Infected, window, state.i, n, state, c);
        let y_r = trajectory(Compartment::Recovered, window, state.r, n, state, c);

        let final_state = SirState::new(
            *y_s.last().unwrap_or(&state.s),
            *y_i.last().unwrap_or(&state.i),
            *y_r.last().unwrap_or(&state.r),
        );

        infected.extend_from_slice(&y_i);
        stages.push(ForecastStage {
            days: DayRange::from_days(window),
            coefficients: c,
            infected: y_i,
            final_state,
        });
        state = final_state;
    }

    Forecast { stages, infected }
}

/// Full forecast from the historical stage estimates.
///
/// The first future stage continues from the final historical SIR state;
/// state continuity across the historical/future boundary is mandatory.
pub fn forecast(
    stages: &[StageEstimate],
    policy: RatioPolicy,
    future_windows: &[Vec<u32>],
    n: f64,
) -> Result<Forecast, EstimateError> {
    let Some(last_stage) = stages.last() else {
        return Err(EstimateError::InsufficientData {
            quantity: Quantity::BetaRatio,
            days: DayRange::new(1, 1),
        });
    };

    let ratios = beta_ratio_schedule(stages, policy, future_windows.len())?;
    let coefficients = future_coefficients(last_stage.coefficients, &ratios, future_windows)?;

    let Some(&start_state) = last_stage.sir.last() else {
        return Err(EstimateError::InsufficientData {
            quantity: Quantity::BetaRatio,
            days: last_stage.days,
        });
    };

    Ok(project(future_windows, start_state, &coefficients, n))
}
