//! Nonlinear least-squares fit of `a·exp(b·x)` to a window of observed
//! infected counts.
//!
//! The model is linear in `a` for a fixed growth rate `b`, so we:
//!
//! - sweep a deterministic grid of `b` candidates (parallel), solving the
//!   closed-form best `a` and SSE for each
//! - pick the lowest-SSE candidate (ties broken by grid index)
//! - refine with damped Gauss–Newton, seeded from both the best candidate and
//!   the fixed initial guess `(a, b) = (4, 0.1)`
//!
//! Degenerate windows (fewer than two points, non-finite values) and grids
//! with no finite candidate surface as [`EstimateError::FitDidNotConverge`].

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::DayRange;
use crate::error::EstimateError;
use crate::models::ExpTrend;

/// Fixed initial guess used as a refinement seed.
const INITIAL_GUESS: ExpTrend = ExpTrend { a: 4.0, b: 0.1 };

/// Growth-rate grid bounds (per-day exponential rates beyond ±1 are far
/// outside plausible epidemic doubling times).
const B_MIN: f64 = -1.0;
const B_MAX: f64 = 1.0;
const B_STEPS: usize = 201;

const MAX_REFINE_ITERS: usize = 60;
const MAX_STEP_HALVINGS: usize = 8;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    idx: usize,
    trend: ExpTrend,
    sse: f64,
}

/// Fit the exponential trend over a stage window.
///
/// `days` are 1-based day indices; `observed` is the same-length slice of
/// reported infected counts. `days_range` identifies the stage in errors.
pub fn fit_exp_trend(
    days: &[u32],
    observed: &[f64],
    days_range: DayRange,
) -> Result<ExpTrend, EstimateError> {
    if days.len() < 2 {
        return Err(EstimateError::FitDidNotConverge {
            days: days_range,
            reason: format!("window has {} point(s), need at least 2", days.len()),
        });
    }
    if days.len() != observed.len() {
        return Err(EstimateError::FitDidNotConverge {
            days: days_range,
            reason: format!(
                "window has {} day(s) but {} observation(s)",
                days.len(),
                observed.len()
            ),
        });
    }
    if observed.iter().any(|v| !v.is_finite()) {
        return Err(EstimateError::FitDidNotConverge {
            days: days_range,
            reason: "non-finite observation in window".to_string(),
        });
    }

    let xs: Vec<f64> = days.iter().map(|&d| f64::from(d)).collect();

    // Grid sweep. Each candidate is independent; evaluate in parallel and
    // select deterministically (min SSE, ties by original grid index).
    let candidates: Vec<Candidate> = (0..B_STEPS)
        .into_par_iter()
        .filter_map(|idx| {
            let b = B_MIN + (B_MAX - B_MIN) * idx as f64 / (B_STEPS - 1) as f64;
            evaluate_candidate(&xs, observed, b).map(|(trend, sse)| Candidate { idx, trend, sse })
        })
        .collect();

    let Some(best) = candidates.iter().fold(None::<&Candidate>, |best, c| match best {
        None => Some(c),
        Some(b) if c.sse < b.sse || (c.sse == b.sse && c.idx < b.idx) => Some(c),
        Some(b) => Some(b),
    }) else {
        return Err(EstimateError::FitDidNotConverge {
            days: days_range,
            reason: "no finite fit candidate on the growth-rate grid".to_string(),
        });
    };

    // Gauss–Newton refinement from the grid winner and from the fixed initial
    // guess; keep whichever lands lower.
    let mut refined = *best;
    for seed in [best.trend, INITIAL_GUESS] {
        if let Some((trend, sse)) = refine(&xs, observed, seed) {
            if sse < refined.sse {
                refined = Candidate {
                    idx: refined.idx,
                    trend,
                    sse,
                };
            }
        }
    }

    Ok(refined.trend)
}

/// Closed-form best amplitude and SSE for a fixed growth rate.
fn evaluate_candidate(xs: &[f64], ys: &[f64], b: f64) -> Option<(ExpTrend, f64)> {
    let basis: Vec<f64> = xs.iter().map(|&x| (b * x).exp()).collect();
    if basis.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let denom: f64 = basis.iter().map(|e| e * e).sum();
    if !(denom.is_finite() && denom > 0.0) {
        return None;
    }
    let numer: f64 = basis.iter().zip(ys.iter()).map(|(e, y)| e * y).sum();
    let a = numer / denom;

    let sse = sse_for(xs, ys, ExpTrend { a, b });
    if sse.is_finite() {
        Some((ExpTrend { a, b }, sse))
    } else {
        None
    }
}

fn sse_for(xs: &[f64], ys: &[f64], trend: ExpTrend) -> f64 {
    xs.iter()
        .zip(ys.iter())
        .map(|(&x, &y)| {
            let r = y - trend.eval(x);
            r * r
        })
        .sum()
}

/// Damped Gauss–Newton refinement. Returns the best finite fit reached, or
/// `None` if no step ever improved on the seed.
fn refine(xs: &[f64], ys: &[f64], seed: ExpTrend) -> Option<(ExpTrend, f64)> {
    let n = xs.len();
    let mut curr = seed;
    let mut curr_sse = sse_for(xs, ys, curr);
    if !curr_sse.is_finite() {
        return None;
    }

    for _ in 0..MAX_REFINE_ITERS {
        // Residuals and Jacobian of r_i = y_i - a·exp(b·x_i):
        // ∂/∂a = exp(b·x), ∂/∂b = a·x·exp(b·x) (columns of J for the step
        // J Δ ≈ r).
        let mut jac = DMatrix::<f64>::zeros(n, 2);
        let mut res = DVector::<f64>::zeros(n);
        for i in 0..n {
            let e = (curr.b * xs[i]).exp();
            if !e.is_finite() {
                return Some((curr, curr_sse));
            }
            jac[(i, 0)] = e;
            jac[(i, 1)] = curr.a * xs[i] * e;
            res[i] = ys[i] - curr.a * e;
        }

        let Some(delta) = crate::math::solve_least_squares(&jac, &res) else {
            break;
        };

        // Step halving keeps the iteration from overshooting on stiff
        // exponentials.
        let mut scale = 1.0;
        let mut accepted = false;
        for _ in 0..=MAX_STEP_HALVINGS {
            let next = ExpTrend {
                a: curr.a + scale * delta[0],
                b: curr.b + scale * delta[1],
            };
            let next_sse = sse_for(xs, ys, next);
            if next_sse.is_finite() && next_sse < curr_sse {
                let improvement = curr_sse - next_sse;
                curr = next;
                curr_sse = next_sse;
                accepted = true;
                if improvement <= 1e-12 * curr_sse.max(1.0) {
                    return Some((curr, curr_sse));
                }
                break;
            }
            scale /= 2.0;
        }

        if !accepted {
            break;
        }
    }

    Some((curr, curr_sse))
}
