//! Least squares solvers.
//!
//! Two regression problems recur in this crate:
//!
//! - the sigmoid calibration solves a tiny 2-column system for each
//!   candidate of the nonlinear grid search
//! - the Oikawa split search and the Casagrande tail window fit simple
//!   straight lines through a handful of points
//!
//! The multi-column case goes through SVD so tall design matrices are
//! handled robustly; the straight-line case uses the closed form.

use nalgebra::{DMatrix, DVector};

use crate::domain::LogLine;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances; near-degenerate sigmoid
    // candidates produce nearly collinear columns and are better skipped by
    // the caller than solved to garbage.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Closed-form least squares line through `(xs[i], ys[i])`.
///
/// Returns the fitted [`LogLine`] and the residual sum of squares, or
/// `None` when the x values carry (near) zero variance and the slope is
/// undefined.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<(LogLine, f64)> {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    if n < 2 {
        return None;
    }

    let n_f = n as f64;
    let x_bar = xs.iter().sum::<f64>() / n_f;
    let y_bar = ys.iter().sum::<f64>() / n_f;

    let mut cov = 0.0;
    let mut var = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - x_bar;
        cov += dx * (y - y_bar);
        var += dx * dx;
    }
    if var <= 1e-18 || !cov.is_finite() {
        return None;
    }

    let slope = cov / var;
    let intercept = y_bar - slope * x_bar;
    let line = LogLine { slope, intercept };

    let rss = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| {
            let r = y - line.eval(x);
            r * r
        })
        .sum();

    Some((line, rss))
}
