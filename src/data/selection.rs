//! Compression-curve point selection.
//!
//! An incremental-loading oedometer test may contain unload/reload cycles
//! and a final unload. Those points do not lie on the sigmoidal
//! compressibility curve and must be excluded before fitting:
//!
//! - an unload starts at a local pressure maximum
//! - the matching reload ends at the first later point whose pressure
//!   exceeds that maximum; everything strictly in between is dropped
//! - a final unload (no later point exceeds the maximum) is dropped to the
//!   end of the sequence
//!
//! After filtering, duplicate-pressure handling is explicit rather than
//! silent: an exactly repeated `(pressure, ordinate)` pair is collapsed to
//! one point; a repeated pressure with a different ordinate is
//! [`AnalysisError::NonMonotonicInput`].

use tracing::debug;

use crate::domain::SamplePoint;
use crate::error::AnalysisError;

/// Points retained for fitting, plus the pressure at which the first
/// unload began (used to gate inflexion truncation downstream).
#[derive(Debug, Clone)]
pub struct CompressionCurve {
    pub points: Vec<SamplePoint>,
    pub first_unload_pressure: Option<f64>,
}

/// Filter a raw load sequence down to the compressibility curve.
pub fn select_compression_points(
    raw: &[SamplePoint],
) -> Result<CompressionCurve, AnalysisError> {
    for (index, point) in raw.iter().enumerate() {
        if !(point.pressure.is_finite() && point.ordinate.is_finite()) {
            return Err(AnalysisError::NonFiniteSample { index });
        }
        if point.pressure <= 0.0 {
            return Err(AnalysisError::NonPositivePressure {
                pressure: point.pressure,
            });
        }
    }

    let n = raw.len();
    let mut keep = vec![true; n];
    let mut first_unload_pressure = None;

    for i in 0..n.saturating_sub(1) {
        if !keep[i] {
            continue;
        }
        let is_peak = raw[i].pressure > raw[i + 1].pressure
            && (i == 0 || raw[i].pressure > raw[i - 1].pressure);
        if !is_peak {
            continue;
        }
        if first_unload_pressure.is_none() {
            first_unload_pressure = Some(raw[i].pressure);
        }

        // Reload ends at the first pressure exceeding the peak; without one
        // the tail is a final unload and is dropped entirely.
        let reload_end = (i + 1..n).find(|&j| raw[j].pressure > raw[i].pressure);
        let end = reload_end.unwrap_or(n);
        for flag in keep.iter_mut().take(end).skip(i + 1) {
            *flag = false;
        }
    }

    let mut points: Vec<SamplePoint> = Vec::with_capacity(n);
    let mut indices: Vec<usize> = Vec::with_capacity(n);
    for (i, point) in raw.iter().enumerate() {
        if keep[i] {
            points.push(*point);
            indices.push(i);
        }
    }

    // Duplicate handling and strict monotonicity.
    let mut deduped: Vec<SamplePoint> = Vec::with_capacity(points.len());
    for (point, &index) in points.iter().zip(&indices) {
        match deduped.last() {
            Some(prev) if point.pressure == prev.pressure => {
                if point.ordinate == prev.ordinate {
                    continue;
                }
                return Err(AnalysisError::NonMonotonicInput {
                    index,
                    pressure: point.pressure,
                });
            }
            Some(prev) if point.pressure < prev.pressure => {
                return Err(AnalysisError::NonMonotonicInput {
                    index,
                    pressure: point.pressure,
                });
            }
            _ => deduped.push(*point),
        }
    }

    debug!(
        retained = deduped.len(),
        dropped = n - deduped.len(),
        first_unload_pressure,
        "compression-curve selection"
    );

    Ok(CompressionCurve {
        points: deduped,
        first_unload_pressure,
    })
}
