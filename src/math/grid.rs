//! Evaluation grid generation.
//!
//! Both the curvature scans and the sigmoid calibration use deterministic
//! grids: log-spaced in pressure (consolidation behavior is log-linear in
//! the virgin range) and linearly spaced in log-pressure for the locus
//! search. Grid search keeps the whole pipeline free of iteration-order and
//! starting-point nondeterminism.

use crate::error::AnalysisError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AnalysisError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > min) {
        return Err(AnalysisError::InvalidConfig {
            reason: format!("invalid log range: min={min}, max={max}"),
        });
    }
    if steps < 2 {
        return Err(AnalysisError::InvalidConfig {
            reason: "log_space needs at least 2 steps".to_string(),
        });
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

/// Generate `steps` linearly spaced points between `min` and `max`
/// (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AnalysisError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(AnalysisError::InvalidConfig {
            reason: format!("invalid linear range: min={min}, max={max}"),
        });
    }
    if steps < 2 {
        return Err(AnalysisError::InvalidConfig {
            reason: "lin_space needs at least 2 steps".to_string(),
        });
    }

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push(min + step * i as f64);
    }
    Ok(out)
}
