//! Natural cubic spline interpolation.
//!
//! The Casagrande construction needs a curve that passes through every
//! retained data point and is twice continuously differentiable, because
//! the pivot is located on the curvature of the interpolant. A natural
//! cubic spline (zero second derivative at both ends) satisfies both.
//!
//! The tridiagonal second-derivative system is assembled dense and solved
//! with nalgebra's LU; knot counts in oedometer tests are tiny, so the
//! dense solve costs nothing and avoids a hand-rolled elimination.

use nalgebra::{DMatrix, DVector};

/// Piecewise cubic `s_i(dx) = y_i + b_i dx + c_i dx^2 + d_i dx^3` with
/// `dx = x - x_i` on the interval `[x_i, x_{i+1}]`.
#[derive(Debug, Clone)]
pub struct NaturalSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl NaturalSpline {
    /// Fit the spline through `(x[i], y[i])`.
    ///
    /// Requires `x` strictly increasing with at least 3 knots (the caller
    /// validates both). Returns `None` if the coefficient system is
    /// singular, which cannot happen for strictly increasing knots but is
    /// surfaced rather than panicked on.
    pub fn fit(x: &[f64], y: &[f64]) -> Option<Self> {
        debug_assert_eq!(x.len(), y.len());
        debug_assert!(x.len() >= 3);
        debug_assert!(x.windows(2).all(|w| w[0] < w[1]));

        let n = x.len();
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

        // Natural boundary: c[0] = c[n-1] = 0, interior rows from the
        // second-derivative continuity conditions.
        let mut a = DMatrix::<f64>::zeros(n, n);
        let mut rhs = DVector::<f64>::zeros(n);
        a[(0, 0)] = 1.0;
        a[(n - 1, n - 1)] = 1.0;
        for i in 1..n - 1 {
            a[(i, i - 1)] = h[i - 1];
            a[(i, i)] = 2.0 * (h[i - 1] + h[i]);
            a[(i, i + 1)] = h[i];
            rhs[i] = 3.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
        }

        let c_full = a.lu().solve(&rhs)?;

        let mut b = vec![0.0; n - 1];
        let mut d = vec![0.0; n - 1];
        for i in 0..n - 1 {
            b[i] = (y[i + 1] - y[i]) / h[i] - h[i] * (2.0 * c_full[i] + c_full[i + 1]) / 3.0;
            d[i] = (c_full[i + 1] - c_full[i]) / (3.0 * h[i]);
        }

        Some(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            b,
            c: c_full.iter().copied().collect(),
            d,
        })
    }

    /// Index of the interval containing `xq`, clamped to the end intervals
    /// for out-of-range queries (end-polynomial extension).
    fn interval(&self, xq: f64) -> usize {
        let n = self.x.len();
        if xq <= self.x[0] {
            return 0;
        }
        if xq >= self.x[n - 1] {
            return n - 2;
        }
        // Binary search for the rightmost knot <= xq.
        let mut lo = 0;
        let mut hi = n - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.x[mid] <= xq {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }

    pub fn eval(&self, xq: f64) -> f64 {
        let i = self.interval(xq);
        let dx = xq - self.x[i];
        self.y[i] + self.b[i] * dx + self.c[i] * dx * dx + self.d[i] * dx * dx * dx
    }

    /// First derivative `dy/dx`.
    pub fn deriv(&self, xq: f64) -> f64 {
        let i = self.interval(xq);
        let dx = xq - self.x[i];
        self.b[i] + 2.0 * self.c[i] * dx + 3.0 * self.d[i] * dx * dx
    }

    /// Second derivative `d2y/dx2`.
    pub fn deriv2(&self, xq: f64) -> f64 {
        let i = self.interval(xq);
        let dx = xq - self.x[i];
        2.0 * self.c[i] + 6.0 * self.d[i] * dx
    }
}
