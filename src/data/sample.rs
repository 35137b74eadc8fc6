//! Deterministic synthetic outbreak generation.
//!
//! Simulates a stage-wise SIR epidemic with known coefficients, then turns
//! the susceptible outflow into daily reported case counts with seeded
//! multiplicative noise. Useful for exercising the full estimation pipeline
//! without external data, and for end-to-end tests with a known ground truth.

use chrono::NaiveDate;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Coefficients, Observation, SirState};
use crate::error::AppError;
use crate::models::{infection_flow, step};

/// One true epidemic regime in the generated scenario.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioStage {
    /// Number of days this regime lasts.
    pub days: usize,
    /// True transmission rate during the regime.
    pub beta: f64,
}

/// Ground-truth scenario configuration.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub population: u64,
    /// Infected count on day 1.
    pub initial_infected: f64,
    /// True recovery rate, shared across stages.
    pub gamma: f64,
    pub stages: Vec<ScenarioStage>,
    /// Log-scale observation noise (0 disables noise).
    pub noise: f64,
    pub seed: u64,
    pub start_date: NaiveDate,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            population: 1_000_000,
            initial_infected: 5.0,
            gamma: 0.1,
            // Growth, intervention, partial reopening.
            stages: vec![
                ScenarioStage { days: 60, beta: 0.32 },
                ScenarioStage { days: 45, beta: 0.16 },
                ScenarioStage { days: 80, beta: 0.24 },
            ],
            noise: 0.05,
            seed: 42,
            start_date: NaiveDate::from_ymd_opt(2020, 3, 1).expect("valid date"),
        }
    }
}

impl Scenario {
    /// Total number of observed days the scenario produces.
    pub fn n_days(&self) -> usize {
        self.stages.iter().map(|s| s.days).sum()
    }

    /// Historical stage boundaries matching the true regimes.
    pub fn stage_bounds(&self) -> Vec<usize> {
        let mut bounds = vec![0];
        let mut acc = 0;
        for s in &self.stages {
            acc += s.days;
            bounds.push(acc);
        }
        bounds
    }
}

/// Generate the observation series for a scenario.
pub fn generate_observations(scenario: &Scenario) -> Result<Vec<Observation>, AppError> {
    if scenario.population == 0 {
        return Err(AppError::new(2, "Scenario population must be > 0."));
    }
    if scenario.stages.is_empty() {
        return Err(AppError::new(2, "Scenario needs at least one stage."));
    }
    if scenario.stages.iter().any(|s| s.days == 0) {
        return Err(AppError::new(2, "Scenario stages must last at least one day."));
    }
    if !(scenario.noise.is_finite() && scenario.noise >= 0.0) {
        return Err(AppError::new(2, "Scenario noise must be finite and >= 0."));
    }
    if !(scenario.gamma.is_finite() && scenario.gamma > 0.0) {
        return Err(AppError::new(2, "Scenario gamma must be finite and > 0."));
    }

    let n = scenario.population as f64;
    let mut rng = StdRng::seed_from_u64(scenario.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut state = SirState::new(n - scenario.initial_infected, scenario.initial_infected, 0.0);
    let mut observations = Vec::with_capacity(scenario.n_days());

    // Day 1 reports the seed infections.
    let mut total: u64 = scenario.initial_infected.round() as u64;
    observations.push(Observation {
        date: scenario.start_date,
        new_cases: total,
        total_cases: total,
    });

    // Per-day true beta, aligned with `stage_bounds`.
    let mut daily_beta = Vec::with_capacity(scenario.n_days());
    for regime in &scenario.stages {
        daily_beta.extend(std::iter::repeat(regime.beta).take(regime.days));
    }

    for (d, &beta) in daily_beta.iter().enumerate().skip(1) {
        let c = Coefficients {
            beta,
            gamma: scenario.gamma,
            r0: beta / scenario.gamma,
        };
        let flow = infection_flow(n, state, c);
        state = step(n, state, c);

        let noisy = if scenario.noise > 0.0 {
            let z: f64 = normal.sample(&mut rng);
            flow * (scenario.noise * z).exp()
        } else {
            flow
        };
        let new_cases = noisy.round().max(0.0) as u64;
        total += new_cases;

        observations.push(Observation {
            date: scenario.start_date + chrono::Duration::days(d as i64),
            new_cases,
            total_cases: total,
        });
    }

    Ok(observations)
}
