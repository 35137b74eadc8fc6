//! Discrete SIR difference equations.
//!
//! One step advances all three compartments by one day:
//!
//! - `S' = S − βSI/N`
//! - `I' = I + βSI/N − γI`
//! - `R' = R + γI`
//!
//! All three update rules read the *same* current snapshot; nothing is
//! computed from partially updated values. No bounds clamping: under
//! pathological coefficients the state may go negative or exceed `N`, and
//! callers own input sanity.

use crate::domain::{Coefficients, SirState};

/// Which compartment's update rule to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compartment {
    Susceptible,
    Infected,
    Recovered,
}

/// The S→I flow term `βSI/N` for one step.
pub fn infection_flow(n: f64, state: SirState, c: Coefficients) -> f64 {
    c.beta * state.s * state.i / n
}

/// Next-day susceptible count.
pub fn next_susceptible(n: f64, state: SirState, c: Coefficients) -> f64 {
    state.s - infection_flow(n, state, c)
}

/// Next-day infected count.
pub fn next_infected(n: f64, state: SirState, c: Coefficients) -> f64 {
    state.i + infection_flow(n, state, c) - c.gamma * state.i
}

/// Next-day recovered count.
pub fn next_recovered(_n: f64, state: SirState, c: Coefficients) -> f64 {
    state.r + c.gamma * state.i
}

impl Compartment {
    /// Evaluate this compartment's update rule against the current snapshot.
    pub fn next_value(self, n: f64, state: SirState, c: Coefficients) -> f64 {
        match self {
            Compartment::Susceptible => next_susceptible(n, state, c),
            Compartment::Infected => next_infected(n, state, c),
            Compartment::Recovered => next_recovered(n, state, c),
        }
    }
}

/// Advance the full SIR state one day.
pub fn step(n: f64, state: SirState, c: Coefficients) -> SirState {
    SirState {
        s: next_susceptible(n, state, c),
        i: next_infected(n, state, c),
        r: next_recovered(n, state, c),
    }
}

/// Generate one compartment's value sequence across a day window.
///
/// The first value is always `start`; each later value applies the chosen
/// update rule to the current state, after which the full state advances one
/// step with the same coefficients. Eager on purpose: downstream consumers
/// need random access and last-value extraction.
pub fn trajectory(
    compartment: Compartment,
    days: &[u32],
    start: f64,
    n: f64,
    state: SirState,
    c: Coefficients,
) -> Vec<f64> {
    if days.is_empty() {
        return Vec::new();
    }
    let mut values = Vec::with_capacity(days.len());
    values.push(start);
    let mut curr = state;
    for _ in 1..days.len() {
        values.push(compartment.next_value(n, curr, c));
        curr = step(n, curr, c);
    }
    values
}
