//! The curve fitter.
//!
//! Builds the smooth interpolating model the geometric constructions work
//! on. Fitting always operates on `log10(appliedPressure)`; consolidation
//! behavior is log-linear in the virgin compression range, so every
//! downstream construction is a straight-line construction in that
//! coordinate.

use crate::domain::SamplePoint;
use crate::error::AnalysisError;
use crate::math::NaturalSpline;
use crate::models::{CurveModel, OrdinateScale};

/// Minimum number of distinct points required to fit a curve.
pub const MIN_POINTS: usize = 4;

/// Validate a compression-curve point sequence for fitting.
///
/// The data layer already deduplicates and filters unload loops; this check
/// is the fitter's own contract so it holds for callers that skip the data
/// layer.
pub(crate) fn validate_points(points: &[SamplePoint]) -> Result<(), AnalysisError> {
    if points.len() < MIN_POINTS {
        return Err(AnalysisError::InsufficientData {
            got: points.len(),
            need: MIN_POINTS,
        });
    }
    for (index, point) in points.iter().enumerate() {
        if !(point.pressure.is_finite() && point.ordinate.is_finite()) {
            return Err(AnalysisError::NonFiniteSample { index });
        }
        if point.pressure <= 0.0 {
            return Err(AnalysisError::NonPositivePressure {
                pressure: point.pressure,
            });
        }
        if index > 0 && point.pressure <= points[index - 1].pressure {
            return Err(AnalysisError::NonMonotonicInput {
                index,
                pressure: point.pressure,
            });
        }
    }
    Ok(())
}

/// Fit a natural cubic spline through the points in `(log10 p, y)` space.
///
/// The result passes through every point and is twice continuously
/// differentiable, which the curvature-based constructions rely on.
pub fn spline_model(
    points: &[SamplePoint],
    scale: OrdinateScale,
) -> Result<CurveModel, AnalysisError> {
    validate_points(points)?;

    let xs: Vec<f64> = points.iter().map(|p| p.pressure.log10()).collect();
    let ys: Vec<f64> = points.iter().map(|p| scale.apply(p.ordinate)).collect();

    let spline =
        NaturalSpline::fit(&xs, &ys).ok_or_else(|| AnalysisError::DegenerateSegment {
            reason: "singular spline coefficient system".to_string(),
        })?;

    Ok(CurveModel::from_spline(
        spline,
        scale,
        points[0].pressure,
        points[points.len() - 1].pressure,
    ))
}
