//! Casagrande bisector-of-tangents construction.
//!
//! On the fitted `e – log10 p` curve:
//!
//! 1. the pivot is the point of maximum curvature (minimum radius)
//! 2. the tangent at the pivot and the horizontal through the pivot span an
//!    angle; the construction uses its bisector
//! 3. the virgin-compression line is either the steepest tangent of the
//!    fitted curve (the classical construction) or a regression line
//!    through the final points, per configuration
//! 4. the preconsolidation pressure sits at the bisector × virgin-line
//!    intersection
//!
//! When the input carried unload cycles, the curve beyond its first
//! inflexion past the first unload pressure is ignored for the pivot and
//! steepest-tangent searches; rebound artifacts in the interpolant would
//! otherwise masquerade as curvature extrema.

use tracing::debug;

use crate::budget::Budget;
use crate::domain::{
    AnalysisConfig, LogLine, MethodKind, MethodResult, SamplePoint, SupportingGeometry,
    VirginTangent,
};
use crate::error::AnalysisError;
use crate::math::{fit_line, log_space};
use crate::models::CurveModel;

pub fn estimate(
    model: &CurveModel,
    points: &[SamplePoint],
    first_unload_pressure: Option<f64>,
    config: &AnalysisConfig,
    budget: &Budget,
) -> Result<MethodResult, AnalysisError> {
    budget.check("Casagrande construction")?;

    let (p_min, p_max) = model.domain();
    let grid = log_space(p_min, p_max, config.grid_points)?;
    let xs: Vec<f64> = grid.iter().map(|p| p.log10()).collect();

    let slopes: Vec<f64> = xs.iter().map(|&x| model.slope_log(x)).collect();
    let concavity: Vec<f64> = xs.iter().map(|&x| model.concavity_log(x)).collect();
    let curvature: Vec<f64> = xs.iter().map(|&x| model.curvature_log(x)).collect();
    budget.check("Casagrande construction")?;

    let limit = if config.truncate_after_inflexion {
        inflexion_limit(&grid, &concavity, first_unload_pressure)
    } else {
        xs.len()
    };

    let pivot = select_pivot(&xs, &curvature[..limit], config.curvature_tie_tol);
    let x0 = xs[pivot];
    let y0 = model.eval_log(x0);
    let tangent_slope = slopes[pivot];

    let tangent = LogLine::through(x0, y0, tangent_slope);
    let horizontal = LogLine::through(x0, y0, 0.0);
    // Bisector of the angle between the tangent and the horizontal.
    let bisector = LogLine::through(x0, y0, (tangent_slope.atan() / 2.0).tan());

    let virgin = match config.virgin_tangent {
        VirginTangent::Steepest => {
            let mut steepest = 0;
            for i in 1..limit {
                if slopes[i] < slopes[steepest] {
                    steepest = i;
                }
            }
            LogLine::through(xs[steepest], model.eval_log(xs[steepest]), slopes[steepest])
        }
        VirginTangent::TailRegression { window } => {
            let take = window.min(points.len());
            if take < 2 {
                return Err(AnalysisError::InsufficientVirginSegment { got: take });
            }
            let tail = &points[points.len() - take..];
            let txs: Vec<f64> = tail.iter().map(|p| p.pressure.log10()).collect();
            let tys: Vec<f64> = tail
                .iter()
                .map(|p| model.ordinate_scale().apply(p.ordinate))
                .collect();
            fit_line(&txs, &tys)
                .ok_or_else(|| AnalysisError::DegenerateSegment {
                    reason: "zero pressure variance in the virgin-compression window"
                        .to_string(),
                })?
                .0
        }
    };

    let x_star = bisector
        .intersect_x(&virgin, 1e-12)
        .filter(|x| x.is_finite())
        .ok_or_else(|| AnalysisError::DegenerateSegment {
            reason: "bisector and virgin-compression line are parallel".to_string(),
        })?;

    let pressure = 10_f64.powf(x_star);
    let extrapolated = model.is_extrapolating(pressure);

    debug!(
        pivot_pressure = grid[pivot],
        pressure, extrapolated, "Casagrande intersection"
    );

    Ok(MethodResult {
        method: MethodKind::Casagrande,
        pressure,
        ordinate: virgin.eval(x_star),
        extrapolated,
        geometry: SupportingGeometry::Casagrande {
            pivot_pressure: grid[pivot],
            pivot_ordinate: y0,
            tangent,
            horizontal,
            bisector,
            virgin,
        },
    })
}

/// Index of the curvature maximum; candidates within the tie tolerance of
/// the maximum resolve to the one closest to the log-range midpoint, then
/// to the lower index.
fn select_pivot(xs: &[f64], curvature: &[f64], tie_tol: f64) -> usize {
    let mut k_max = f64::NEG_INFINITY;
    for &k in curvature {
        if k > k_max {
            k_max = k;
        }
    }

    let tol = tie_tol * k_max.abs().max(f64::MIN_POSITIVE);
    let x_mid = (xs[0] + xs[xs.len() - 1]) / 2.0;

    let mut pivot = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &k) in curvature.iter().enumerate() {
        if k_max - k <= tol {
            let dist = (xs[i] - x_mid).abs();
            if dist < best_dist {
                best_dist = dist;
                pivot = i;
            }
        }
    }
    pivot
}

/// Grid length to keep: everything up to the first concavity sign change at
/// a pressure beyond the first unload. Without unload information the whole
/// grid is kept.
fn inflexion_limit(
    grid: &[f64],
    concavity: &[f64],
    first_unload_pressure: Option<f64>,
) -> usize {
    let Some(p_unload) = first_unload_pressure else {
        return grid.len();
    };
    for i in 0..grid.len() - 1 {
        if concavity[i] * concavity[i + 1] < 0.0 && grid[i] > p_unload {
            return i + 1;
        }
    }
    grid.len()
}
