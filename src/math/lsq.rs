//! Least squares solver.
//!
//! The exponential trend fit repeatedly solves small linear systems:
//!
//! - the closed-form amplitude for a candidate growth rate (1 column)
//! - the Gauss–Newton step `J Δ = r` during refinement (2 columns)
//!
//! Implementation choices:
//! - We use SVD so tall systems (many observed days, 1–2 parameters) solve
//!   robustly. (Nalgebra's `QR::solve` is intended for square systems and
//!   will panic for non-square matrices.)
//! - Near-flat windows can make the Jacobian columns nearly collinear, so we
//!   try progressively looser tolerances before giving up.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn least_squares_handles_tall_single_column() {
        // Best a for y = a·e with fixed basis column e.
        let e = [1.0, 2.0, 4.0, 8.0];
        let x = DMatrix::from_column_slice(4, 1, &e);
        let y = DVector::from_row_slice(&[3.0, 6.0, 12.0, 24.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 3.0).abs() < 1e-10);
    }
}
