//! Exponential trend model `f(x) = a·exp(b·x)`.
//!
//! Used to denoise short windows of reported infected counts into a smooth
//! per-day estimate. Fitting lives in `crate::fit::trend_fit`; this module is
//! evaluation only.

use serde::{Deserialize, Serialize};

/// Fitted exponential trend parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpTrend {
    /// Amplitude.
    pub a: f64,
    /// Daily growth rate.
    pub b: f64,
}

impl ExpTrend {
    /// Evaluate the trend at a day index.
    pub fn eval(&self, x: f64) -> f64 {
        self.a * (self.b * x).exp()
    }

    /// Evaluate at each day index and truncate toward zero, yielding the
    /// smoothed whole-person infected estimate for a window.
    pub fn smoothed(&self, days: &[u32]) -> Vec<f64> {
        days.iter().map(|&d| self.eval(f64::from(d)).trunc()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_matches_closed_form() {
        let t = ExpTrend { a: 4.0, b: 0.1 };
        assert!((t.eval(0.0) - 4.0).abs() < 1e-12);
        assert!((t.eval(10.0) - 4.0 * 1.0f64.exp()).abs() < 1e-9);
    }

    #[test]
    fn smoothed_truncates_toward_zero() {
        let t = ExpTrend { a: 1.5, b: 0.0 };
        let y = t.smoothed(&[1, 2, 3]);
        assert_eq!(y, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn smoothed_len_matches_window() {
        let t = ExpTrend { a: 2.0, b: 0.2 };
        assert_eq!(t.smoothed(&(1..=14).collect::<Vec<_>>()).len(), 14);
    }
}
