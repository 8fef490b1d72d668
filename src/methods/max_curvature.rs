//! Maximum-curvature method (Gregory et al.).
//!
//! The preconsolidation pressure is read directly off the curvature of the
//! regression curve: κ(x) = |y''| / (1 + y'^2)^(3/2) over the observed
//! log-pressure range, with the global maximum as the estimate.
//!
//! A maximum on (or within a tolerance band of) either boundary is
//! rejected: it indicates an unterminated test, not a true inflexion of the
//! compressibility curve.

use tracing::debug;

use crate::budget::Budget;
use crate::domain::{AnalysisConfig, MethodKind, MethodResult, SupportingGeometry};
use crate::error::{AnalysisError, Boundary};
use crate::math::log_space;
use crate::models::CurveModel;

pub fn estimate(
    model: &CurveModel,
    config: &AnalysisConfig,
    budget: &Budget,
) -> Result<MethodResult, AnalysisError> {
    budget.check("curvature scan")?;

    let (p_min, p_max) = model.domain();
    let grid = log_space(p_min, p_max, config.grid_points)?;
    let xs: Vec<f64> = grid.iter().map(|p| p.log10()).collect();
    let curvature: Vec<f64> = xs.iter().map(|&x| model.curvature_log(x)).collect();
    budget.check("curvature scan")?;

    let mut peak = 0;
    for (i, &k) in curvature.iter().enumerate() {
        if k > curvature[peak] {
            peak = i;
        }
    }

    let (x_min, x_max) = model.log_domain();
    let band = config.boundary_band * (x_max - x_min);
    if xs[peak] <= x_min + band {
        return Err(AnalysisError::NoInteriorExtremum {
            pressure: grid[peak],
            side: Boundary::Lower,
        });
    }
    if xs[peak] >= x_max - band {
        return Err(AnalysisError::NoInteriorExtremum {
            pressure: grid[peak],
            side: Boundary::Upper,
        });
    }

    let pressure = grid[peak];
    debug!(pressure, curvature = curvature[peak], "curvature maximum");

    Ok(MethodResult {
        method: MethodKind::MaximumCurvature,
        pressure,
        ordinate: model.eval_log(xs[peak]),
        extrapolated: false,
        geometry: SupportingGeometry::MaximumCurvature {
            pressures: grid,
            curvature,
            sigmoid: model.sigmoid_params(),
        },
    })
}
