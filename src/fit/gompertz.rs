//! Gompertz sigmoid calibration.
//!
//! The maximum-curvature method works on a regression curve rather than an
//! interpolant, so isolated measurement noise cannot masquerade as a
//! curvature peak. The sigmoid is calibrated by a deterministic grid
//! search:
//!
//! - for each candidate `(b, m)` pair (steepness × locus) the model
//!   `y = a + c * g(x)` with `g(x) = exp(-exp(b * (x - m)))` is linear in
//!   `(a, c)` and solves as a two-column least squares problem
//! - the candidate with the lowest SSE wins; ties break by grid index
//!
//! Grid search avoids the local-minima and starting-point sensitivity of
//! nonlinear optimizers and keeps the whole fit reproducible.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::debug;

use crate::budget::Budget;
use crate::domain::{AnalysisConfig, SamplePoint};
use crate::error::AnalysisError;
use crate::fit::fitter::validate_points;
use crate::math::{lin_space, log_space, solve_least_squares};
use crate::models::{CurveModel, GompertzSigmoid, OrdinateScale};

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    sigmoid: GompertzSigmoid,
    sse: f64,
}

/// Calibrate a Gompertz sigmoid to the points in `(log10 p, y)` space.
pub fn sigmoid_model(
    points: &[SamplePoint],
    scale: OrdinateScale,
    config: &AnalysisConfig,
    budget: &Budget,
) -> Result<CurveModel, AnalysisError> {
    validate_points(points)?;
    budget.check("sigmoid calibration")?;

    let xs: Vec<f64> = points.iter().map(|p| p.pressure.log10()).collect();
    let ys: Vec<f64> = points.iter().map(|p| scale.apply(p.ordinate)).collect();

    let rates = log_space(config.rate_min, config.rate_max, config.rate_steps)?;
    let loci = lin_space(xs[0], xs[xs.len() - 1], config.locus_steps)?;

    let pairs: Vec<(usize, f64, f64)> = rates
        .iter()
        .flat_map(|&b| loci.iter().map(move |&m| (b, m)))
        .enumerate()
        .map(|(idx, (b, m))| (idx, b, m))
        .collect();

    let candidates: Vec<Candidate> = pairs
        .par_iter()
        .filter_map(|&(idx, b, m)| evaluate_candidate(idx, b, m, &xs, &ys))
        .collect();

    budget.check("sigmoid calibration")?;

    if candidates.is_empty() {
        return Err(AnalysisError::DegenerateSegment {
            reason: "no finite sigmoid calibration candidate".to_string(),
        });
    }

    // Deterministic selection: minimum SSE, ties by original grid index.
    let mut best = &candidates[0];
    for c in &candidates[1..] {
        if c.sse < best.sse || (c.sse == best.sse && c.idx < best.idx) {
            best = c;
        }
    }

    debug!(
        a = best.sigmoid.a,
        b = best.sigmoid.b,
        c = best.sigmoid.c,
        m = best.sigmoid.m,
        sse = best.sse,
        "sigmoid calibration chosen"
    );

    Ok(CurveModel::from_sigmoid(
        best.sigmoid,
        scale,
        points[0].pressure,
        points[points.len() - 1].pressure,
    ))
}

fn evaluate_candidate(idx: usize, b: f64, m: f64, xs: &[f64], ys: &[f64]) -> Option<Candidate> {
    let n = xs.len();

    let mut design = DMatrix::<f64>::zeros(n, 2);
    let mut obs = DVector::<f64>::zeros(n);
    for i in 0..n {
        let u = b * (xs[i] - m);
        design[(i, 0)] = 1.0;
        design[(i, 1)] = (-u.exp()).exp();
        obs[i] = ys[i];
    }

    let beta = solve_least_squares(&design, &obs)?;
    let sigmoid = GompertzSigmoid {
        a: beta[0],
        b,
        c: beta[1],
        m,
    };

    let mut sse = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let r = y - sigmoid.eval(x);
        sse += r * r;
    }

    if sse.is_finite() {
        Some(Candidate { idx, sigmoid, sse })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Grids that contain the synthetic truth exactly: rates 0.75..12 over
    /// 5 log steps hit 3.0, and a locus step of 0.2 hits 2.2.
    fn exact_grid_config() -> AnalysisConfig {
        AnalysisConfig {
            rate_min: 0.75,
            rate_max: 12.0,
            rate_steps: 5,
            locus_steps: 10,
            ..AnalysisConfig::default()
        }
    }

    fn synthetic_points(truth: &GompertzSigmoid, xs: &[f64]) -> Vec<SamplePoint> {
        xs.iter()
            .map(|&x| SamplePoint::new(10_f64.powf(x), truth.eval(x)))
            .collect()
    }

    #[test]
    fn calibration_recovers_on_grid_parameters() {
        let truth = GompertzSigmoid {
            a: 0.45,
            b: 3.0,
            c: 0.5,
            m: 2.2,
        };
        let xs: Vec<f64> = (0..10).map(|i| 1.2 + i as f64 * 0.2).collect();
        let points = synthetic_points(&truth, &xs);

        let model = sigmoid_model(
            &points,
            OrdinateScale::Linear,
            &exact_grid_config(),
            &Budget::unlimited(),
        )
        .unwrap();

        let [a, b, c, m] = model.sigmoid_params().unwrap();
        assert!((a - truth.a).abs() < 1e-6, "a={a}");
        assert!((b - truth.b).abs() < 1e-9, "b={b}");
        assert!((c - truth.c).abs() < 1e-6, "c={c}");
        assert!((m - truth.m).abs() < 1e-9, "m={m}");
    }

    #[test]
    fn calibration_is_deterministic() {
        let truth = GompertzSigmoid {
            a: 0.4,
            b: 2.0,
            c: 0.45,
            m: 2.0,
        };
        let xs: Vec<f64> = (0..8).map(|i| 1.3 + i as f64 * 0.22).collect();
        let points = synthetic_points(&truth, &xs);
        let config = AnalysisConfig::default();

        let first = sigmoid_model(
            &points,
            OrdinateScale::Linear,
            &config,
            &Budget::unlimited(),
        )
        .unwrap();
        let second = sigmoid_model(
            &points,
            OrdinateScale::Linear,
            &config,
            &Budget::unlimited(),
        )
        .unwrap();

        assert_eq!(first.sigmoid_params(), second.sigmoid_params());
    }

    #[test]
    fn exhausted_budget_times_out() {
        let points: Vec<SamplePoint> = (0..6)
            .map(|i| SamplePoint::new(10.0 * (i + 1) as f64, 0.9 - 0.05 * i as f64))
            .collect();
        let budget = Budget::with_limit(std::time::Duration::ZERO);
        assert!(matches!(
            sigmoid_model(
                &points,
                OrdinateScale::Linear,
                &AnalysisConfig::default(),
                &budget
            )
            .unwrap_err(),
            AnalysisError::TimedOut { .. }
        ));
    }
}
