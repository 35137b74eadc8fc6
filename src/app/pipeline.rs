//! Shared estimation pipeline used by the `fit` and `demo` front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! observations -> preprocessing -> per-stage estimation -> forecast
//!
//! The front-ends then focus on presentation (printing, plotting, exports).

use crate::domain::{EpiConfig, Forecast, Observation, RunSpec, StageEstimate};
use crate::error::AppError;
use crate::fit::{
    currently_infected, day_axis, estimate_stages, simulate_stage_infected, validate_bounds,
    windows,
};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub spec: RunSpec,
    /// Observed currently-infected counts, one per observed day.
    pub observed_infected: Vec<f64>,
    pub stages: Vec<StageEstimate>,
    /// Per-stage infected curves regenerated from the back-solved
    /// coefficients (for reporting/plotting).
    pub fitted: Vec<Vec<f64>>,
    pub forecast: Forecast,
}

/// Execute the full pipeline over an ordered observation series.
pub fn run(
    config: &EpiConfig,
    spec: RunSpec,
    observations: &[Observation],
) -> Result<RunOutput, AppError> {
    if observations.len() != spec.n_days {
        return Err(AppError::new(
            2,
            format!(
                "observation count {} does not match run spec ({} days)",
                observations.len(),
                spec.n_days
            ),
        ));
    }
    validate_bounds(&config.stage_bounds, 0, spec.n_days)?;
    let horizon = *config.future_bounds.last().unwrap_or(&spec.n_days);
    validate_bounds(&config.future_bounds, spec.n_days, horizon)?;

    let n = config.population_f64();

    // 1) Preprocess raw case counts into a currently-infected series.
    let observed_infected = currently_infected(observations, config.recovery_lag);

    // 2) Estimate each historical stage.
    let axis = day_axis(1, spec.n_days as u32);
    let stage_windows = windows(&axis, &config.stage_bounds);
    let stages = estimate_stages(config, &observed_infected, &stage_windows)?;

    // 3) Regenerate smooth per-stage curves from the estimates.
    let fitted = stages
        .iter()
        .map(|stage| simulate_stage_infected(stage, n))
        .collect();

    // 4) Forecast across the future stages.
    let future_axis = day_axis(spec.n_days as u32 + 1, horizon as u32);
    let future_windows = windows(&future_axis, &config.future_bounds);
    let forecast = crate::forecast::forecast(&stages, config.ratio_policy, &future_windows, n)?;

    Ok(RunOutput {
        spec,
        observed_infected,
        stages,
        fitted,
        forecast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Scenario, generate_observations};
    use crate::domain::RatioPolicy;

    fn demo_run() -> (EpiConfig, RunSpec, Vec<Observation>) {
        let scenario = Scenario {
            noise: 0.02,
            ..Scenario::default()
        };
        let observations = generate_observations(&scenario).unwrap();
        let n_days = observations.len();
        let config = EpiConfig {
            population: scenario.population,
            recovery_lag: 10,
            stage_bounds: scenario.stage_bounds(),
            future_bounds: vec![n_days, n_days + 30, n_days + 120],
            ratio_policy: RatioPolicy::FromHistory { event_index: 1 },
        };
        let spec = RunSpec {
            start_date: scenario.start_date,
            n_days,
        };
        (config, spec, observations)
    }

    #[test]
    fn pipeline_runs_end_to_end_on_demo_data() {
        let (config, spec, observations) = demo_run();
        let out = run(&config, spec, &observations).unwrap();

        assert_eq!(out.stages.len(), 3);
        assert_eq!(out.fitted.len(), 3);
        assert_eq!(out.observed_infected.len(), spec.n_days);
        assert_eq!(out.forecast.infected.len(), 120);
        assert_eq!(out.forecast.stages.len(), 2);

        // Growth stage should look faster than the post-intervention stage.
        let first = out.stages[0].coefficients.beta;
        let second = out.stages[1].coefficients.beta;
        assert!(first > second, "beta {first} should exceed {second}");
    }

    #[test]
    fn forecast_continues_from_final_historical_state() {
        let (config, spec, observations) = demo_run();
        let out = run(&config, spec, &observations).unwrap();

        let last_historical = out.stages.last().unwrap().sir.last().unwrap().i;
        assert_eq!(out.forecast.infected[0], last_historical);
    }

    #[test]
    fn mismatched_spec_is_rejected() {
        let (config, mut spec, observations) = demo_run();
        spec.n_days += 1;
        let err = run(&config, spec, &observations).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn bad_stage_bounds_are_rejected() {
        let (mut config, spec, observations) = demo_run();
        config.stage_bounds = vec![0, 10_000];
        let err = run(&config, spec, &observations).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
