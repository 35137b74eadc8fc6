//! Per-stage SIR reconstruction and coefficient back-solving.
//!
//! For each historical stage window:
//!
//! 1. fit the exponential trend to the stage's observed infected counts
//! 2. extend the running lagged recovered series with the smoothed values
//! 3. derive `S = N − I − R` per day and zip the SIR triples
//! 4. back-solve effective beta and gamma from consecutive pairs, averaging
//!    only the valid ones
//!
//! Pairs with `S·I = 0` (beta) or `I = 0` (gamma) are excluded, not
//! zero-filled; a stage with zero valid pairs is an explicit
//! [`EstimateError::InsufficientData`], never a NaN average.
//!
//! Stages are estimated sequentially on purpose: the running recovered series
//! carries smoothed values across stage boundaries.

use crate::domain::{Coefficients, DayRange, EpiConfig, Observation, SirState, StageEstimate};
use crate::error::{EstimateError, Quantity};
use crate::fit::trend_fit::fit_exp_trend;
use crate::models::{Compartment, trajectory};

/// Lagged cumulative recovered counts from raw daily new cases.
///
/// The recovered count for day `d` (0-based) is the cumulative case count
/// from `lag` days earlier; the first `lag` days are zero.
pub fn cumulative_recovered(new_cases: &[u64], lag: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(new_cases.len());
    let mut sum = 0.0;
    for d in 0..new_cases.len() {
        if d >= lag {
            sum += new_cases[d - lag] as f64;
        }
        out.push(sum);
    }
    out
}

/// Currently-infected observation series: total cases minus lagged recovered.
pub fn currently_infected(observations: &[Observation], lag: usize) -> Vec<f64> {
    let new_cases: Vec<u64> = observations.iter().map(|o| o.new_cases).collect();
    let recovered = cumulative_recovered(&new_cases, lag);
    observations
        .iter()
        .zip(recovered.iter())
        .map(|(o, r)| o.total_cases as f64 - r)
        .collect()
}

/// Average effective beta over a stage's consecutive SIR pairs.
///
/// `beta_t = N·(S_t − S_{t+1}) / (S_t·I_t)` for pairs where `S_t·I_t ≠ 0`.
pub fn count_beta(sirs: &[SirState], n: f64, days: DayRange) -> Result<f64, EstimateError> {
    let mut betas = Vec::new();
    for pair in sirs.windows(2) {
        let (last, curr) = (pair[0], pair[1]);
        if last.s * last.i != 0.0 {
            betas.push(n * (last.s - curr.s) / (last.s * last.i));
        }
    }
    if betas.is_empty() {
        return Err(EstimateError::InsufficientData {
            quantity: Quantity::Beta,
            days,
        });
    }
    Ok(betas.iter().sum::<f64>() / betas.len() as f64)
}

/// Average effective gamma over a stage's consecutive SIR pairs.
///
/// `gamma_t = (S_t + I_t − S_{t+1} − I_{t+1}) / I_t` for pairs where `I_t ≠ 0`.
pub fn count_gamma(sirs: &[SirState], days: DayRange) -> Result<f64, EstimateError> {
    let mut gammas = Vec::new();
    for pair in sirs.windows(2) {
        let (last, curr) = (pair[0], pair[1]);
        if last.i != 0.0 {
            gammas.push((last.s + last.i - curr.s - curr.i) / last.i);
        }
    }
    if gammas.is_empty() {
        return Err(EstimateError::InsufficientData {
            quantity: Quantity::Gamma,
            days,
        });
    }
    Ok(gammas.iter().sum::<f64>() / gammas.len() as f64)
}

/// Back-solve the averaged coefficient triple for one stage.
pub fn stage_coefficients(
    sirs: &[SirState],
    n: f64,
    days: DayRange,
) -> Result<Coefficients, EstimateError> {
    let beta = count_beta(sirs, n, days)?;
    let gamma = count_gamma(sirs, days)?;
    Coefficients::from_rates(beta, gamma, days)
}

/// Estimate every historical stage.
///
/// `curr_i` is the full currently-infected series (one entry per observed
/// day); `stage_windows` partition the observed 1-based day axis.
pub fn estimate_stages(
    config: &EpiConfig,
    curr_i: &[f64],
    stage_windows: &[Vec<u32>],
) -> Result<Vec<StageEstimate>, EstimateError> {
    let n = config.population_f64();

    // Running smoothed-recovered series: `lag` zero-days, then each stage's
    // smoothed infected values in day order. Recovered on day d reads the
    // smoothed value from `lag` days earlier.
    let mut recovered_trend = vec![0.0; config.recovery_lag];
    let mut stages = Vec::with_capacity(stage_windows.len());

    for window in stage_windows {
        let days = DayRange::from_days(window);
        let start0 = (days.start - 1) as usize;
        let end0 = days.end as usize;

        let trend = fit_exp_trend(window, &curr_i[start0..end0], days)?;
        let i_trend = trend.smoothed(window);

        recovered_trend.extend_from_slice(&i_trend);
        let r_trend = &recovered_trend[start0..end0];

        let sirs: Vec<SirState> = i_trend
            .iter()
            .zip(r_trend.iter())
            .map(|(&i, &r)| SirState::new(n - i - r, i, r))
            .collect();

        let coefficients = stage_coefficients(&sirs, n, days)?;
        stages.push(StageEstimate {
            days,
            trend,
            sir: sirs,
            coefficients,
        });
    }

    Ok(stages)
}

/// Regenerate the stage's smooth infected curve from its own coefficients.
///
/// Simulates forward from the stage's first reconstructed SIR state; used for
/// reporting/plotting and as a self-consistency check on the back-solve.
pub fn simulate_stage_infected(stage: &StageEstimate, n: f64) -> Vec<f64> {
    let days: Vec<u32> = (stage.days.start..=stage.days.end).collect();
    let first = stage.sir[0];
    trajectory(
        Compartment::Infected,
        &days,
        first.i,
        n,
        first,
        stage.coefficients,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RatioPolicy;
    use crate::fit::segments::{day_axis, windows};
    use chrono::NaiveDate;

    fn obs(new_cases: &[u64]) -> Vec<Observation> {
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let mut total = 0;
        new_cases
            .iter()
            .enumerate()
            .map(|(d, &nc)| {
                total += nc;
                Observation {
                    date: start + chrono::Duration::days(d as i64),
                    new_cases: nc,
                    total_cases: total,
                }
            })
            .collect()
    }

    fn config(population: u64, lag: usize, stage_bounds: Vec<usize>) -> EpiConfig {
        EpiConfig {
            population,
            recovery_lag: lag,
            stage_bounds,
            future_bounds: Vec::new(),
            ratio_policy: RatioPolicy::Fixed(1.0),
        }
    }

    #[test]
    fn cumulative_recovered_applies_the_lag() {
        assert_eq!(cumulative_recovered(&[1, 2, 3], 1), vec![0.0, 1.0, 3.0]);
        assert_eq!(cumulative_recovered(&[1, 2, 3], 0), vec![1.0, 3.0, 6.0]);
        assert_eq!(cumulative_recovered(&[1, 2, 3], 5), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn currently_infected_subtracts_lagged_recoveries() {
        let observations = obs(&[5, 5, 5, 5]);
        // totals = [5,10,15,20]; recovered(lag=2) = [0,0,5,10]
        let curr_i = currently_infected(&observations, 2);
        assert_eq!(curr_i, vec![5.0, 10.0, 10.0, 10.0]);
    }

    #[test]
    fn count_beta_recovers_true_rate_from_simulated_data() {
        let n = 100_000.0;
        let c = Coefficients { beta: 0.3, gamma: 0.1, r0: 3.0 };
        let mut state = SirState::new(n - 50.0, 50.0, 0.0);
        let mut sirs = vec![state];
        for _ in 0..20 {
            state = crate::models::step(n, state, c);
            sirs.push(state);
        }

        let days = DayRange::new(1, 21);
        let beta = count_beta(&sirs, n, days).unwrap();
        let gamma = count_gamma(&sirs, days).unwrap();
        assert!((beta - 0.3).abs() < 1e-9, "beta = {beta}");
        assert!((gamma - 0.1).abs() < 1e-9, "gamma = {gamma}");
    }

    #[test]
    fn count_beta_excludes_zero_si_pairs() {
        let n = 1000.0;
        // First pair has S = 0 and must not poison the average.
        let sirs = vec![
            SirState::new(0.0, 10.0, 0.0),
            SirState::new(900.0, 20.0, 80.0),
            SirState::new(891.0, 25.0, 84.0),
        ];
        let beta = count_beta(&sirs, n, DayRange::new(1, 3)).unwrap();
        let expected = n * (900.0 - 891.0) / (900.0 * 20.0);
        assert!((beta - expected).abs() < 1e-12);
        assert!(beta.is_finite());
    }

    #[test]
    fn count_beta_with_no_valid_pairs_is_insufficient_data() {
        let sirs = vec![
            SirState::new(0.0, 10.0, 0.0),
            SirState::new(0.0, 10.0, 0.0),
        ];
        let err = count_beta(&sirs, 1000.0, DayRange::new(4, 5)).unwrap_err();
        assert!(matches!(
            err,
            EstimateError::InsufficientData { quantity: Quantity::Beta, days }
                if days == DayRange::new(4, 5)
        ));
    }

    #[test]
    fn count_gamma_with_no_infected_is_insufficient_data() {
        let sirs = vec![
            SirState::new(1000.0, 0.0, 0.0),
            SirState::new(1000.0, 0.0, 0.0),
        ];
        let err = count_gamma(&sirs, DayRange::new(1, 2)).unwrap_err();
        assert!(matches!(
            err,
            EstimateError::InsufficientData { quantity: Quantity::Gamma, .. }
        ));
    }

    #[test]
    fn stage_coefficients_reject_zero_gamma() {
        // S + I constant across the pair means nothing flowed to R.
        let sirs = vec![
            SirState::new(900.0, 100.0, 0.0),
            SirState::new(890.0, 110.0, 0.0),
        ];
        let err = stage_coefficients(&sirs, 1000.0, DayRange::new(1, 2)).unwrap_err();
        assert!(matches!(err, EstimateError::UndefinedReproduction { .. }));
    }

    #[test]
    fn estimate_stages_lags_smoothed_recoveries() {
        // Clean exponential observations; lag 3 means recovered on day d is
        // the smoothed infected count from day d-3.
        let trend = crate::models::ExpTrend { a: 50.0, b: 0.1 };
        let n_days = 12u32;
        let curr_i: Vec<f64> = (1..=n_days).map(|d| trend.eval(f64::from(d))).collect();
        let cfg = config(1_000_000, 3, vec![0, n_days as usize]);

        let axis = day_axis(1, n_days);
        let parts = windows(&axis, &cfg.stage_bounds);
        let stages = estimate_stages(&cfg, &curr_i, &parts).unwrap();

        assert_eq!(stages.len(), 1);
        let stage = &stages[0];
        assert_eq!(stage.sir.len(), n_days as usize);
        // First 3 days recovered is 0, then the smoothed series lagged by 3.
        let smoothed = stage.trend.smoothed(&axis);
        for d in 0..3 {
            assert_eq!(stage.sir[d].r, 0.0);
        }
        for d in 3..n_days as usize {
            assert_eq!(stage.sir[d].r, smoothed[d - 3]);
        }
        // S closes the population identity per day.
        for st in &stage.sir {
            assert!((st.s + st.i + st.r - 1_000_000.0).abs() < 1e-6);
        }
    }

    #[test]
    fn back_solved_coefficients_reproduce_the_smoothed_trajectory() {
        // Self-consistency: simulating the stage forward from its first SIR
        // state with the averaged coefficients stays within 5% relative error
        // of the trend-smoothed trajectory.
        let trend = crate::models::ExpTrend { a: 200.0, b: 0.18 };
        let n_days = 10u32;
        let curr_i: Vec<f64> = (1..=n_days).map(|d| trend.eval(f64::from(d))).collect();
        let cfg = config(1_000_000, 0, vec![0, n_days as usize]);

        let axis = day_axis(1, n_days);
        let parts = windows(&axis, &cfg.stage_bounds);
        let stages = estimate_stages(&cfg, &curr_i, &parts).unwrap();
        let stage = &stages[0];

        let simulated = simulate_stage_infected(stage, cfg.population_f64());
        let smoothed = stage.trend.smoothed(&axis);
        assert_eq!(simulated.len(), smoothed.len());
        for (sim, smooth) in simulated.iter().zip(smoothed.iter()) {
            let rel = (sim - smooth).abs() / smooth.max(1.0);
            assert!(rel < 0.05, "sim={sim} smooth={smooth} rel={rel}");
        }
    }

    #[test]
    fn estimate_stages_runs_multiple_windows() {
        let trend = crate::models::ExpTrend { a: 30.0, b: 0.12 };
        let n_days = 20u32;
        let curr_i: Vec<f64> = (1..=n_days).map(|d| trend.eval(f64::from(d))).collect();
        let cfg = config(500_000, 2, vec![0, 10, 20]);

        let axis = day_axis(1, n_days);
        let parts = windows(&axis, &cfg.stage_bounds);
        let stages = estimate_stages(&cfg, &curr_i, &parts).unwrap();

        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].days, DayRange::new(1, 10));
        assert_eq!(stages[1].days, DayRange::new(11, 20));
        for stage in &stages {
            assert!(stage.coefficients.beta.is_finite());
            assert!(stage.coefficients.gamma.is_finite());
            assert!(stage.coefficients.r0.is_finite());
        }
    }

    #[test]
    fn all_zero_window_surfaces_insufficient_data() {
        let n_days = 8u32;
        let curr_i = vec![0.0; n_days as usize];
        let cfg = config(1000, 0, vec![0, n_days as usize]);

        let axis = day_axis(1, n_days);
        let parts = windows(&axis, &cfg.stage_bounds);
        let err = estimate_stages(&cfg, &curr_i, &parts).unwrap_err();
        assert!(matches!(err, EstimateError::InsufficientData { .. }));
    }
}
