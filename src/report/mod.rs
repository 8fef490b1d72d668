//! Result aggregation.
//!
//! Runs the three methods against the same immutable models, collects
//! exactly one entry per method in declaration order, and classifies the
//! agreement with a recorded reference pressure.
//!
//! Failure policy (per method): a method error is recorded as that method's
//! failure marker and the remaining methods still complete. Curve-fitter
//! errors and budget exhaustion abort the whole aggregation; partial
//! results would be misleading without a model, and a deadline is a
//! deadline.

pub mod format;

pub use format::format_report;

use std::collections::BTreeMap;

use tracing::debug;

use crate::budget::Budget;
use crate::data::select_compression_points;
use crate::domain::{
    AgreementFlag, AnalysisConfig, ComparisonReport, MethodEntry, MethodKind,
    MethodOutcome, MethodResult, SamplePoint,
};
use crate::error::AnalysisError;
use crate::fit::{sigmoid_model, spline_model};
use crate::methods::{casagrande, max_curvature, oikawa};
use crate::models::{CurveModel, OrdinateScale};

/// Run the full analysis: selection, fitting, all three methods, and the
/// cross-check against `recorded_pressure`.
pub fn analyze(
    raw: &[SamplePoint],
    recorded_pressure: Option<f64>,
    config: &AnalysisConfig,
) -> Result<ComparisonReport, AnalysisError> {
    config.validate()?;
    if let Some(recorded) = recorded_pressure {
        if !(recorded.is_finite() && recorded > 0.0) {
            return Err(AnalysisError::NonPositivePressure { pressure: recorded });
        }
    }

    let budget = Budget::start(config.time_budget);
    budget.check("input validation")?;

    let selection = select_compression_points(raw)?;

    // Without a model no method can run, so fitter errors abort.
    let spline = spline_model(&selection.points, OrdinateScale::Linear)?;
    budget.check("curve fitting")?;

    // The sigmoid is the maximum-curvature method's own regression; a
    // calibration failure only fails that method.
    let sigmoid: Result<CurveModel, AnalysisError> =
        match sigmoid_model(&selection.points, OrdinateScale::Linear, config, &budget) {
            Err(e @ AnalysisError::TimedOut { .. }) => return Err(e),
            other => other,
        };

    // The methods are mutually independent given the shared immutable
    // models; run them in parallel. Output order is fixed by method
    // identity below, never by completion order.
    let (casa, (max_curv, oik)) = rayon::join(
        || {
            casagrande::estimate(
                &spline,
                &selection.points,
                selection.first_unload_pressure,
                config,
                &budget,
            )
        },
        || {
            rayon::join(
                || match &sigmoid {
                    Ok(model) => max_curvature::estimate(model, config, &budget),
                    Err(e) => Err(e.clone()),
                },
                || oikawa::estimate(&selection.points, config, &budget),
            )
        },
    );

    let mut entries = Vec::with_capacity(MethodKind::ALL.len());
    for (kind, outcome) in MethodKind::ALL.into_iter().zip([casa, max_curv, oik]) {
        entries.push(to_entry(kind, outcome)?);
    }

    let mut deviations = BTreeMap::new();
    if let Some(recorded) = recorded_pressure {
        for entry in &entries {
            if let Some(pressure) = entry.pressure() {
                let percent = (pressure - recorded) / recorded * 100.0;
                deviations.insert(entry.method, percent);
            }
        }
    }

    let agreement = classify_agreement(&deviations, config);

    Ok(ComparisonReport {
        recorded_pressure,
        entries,
        deviations,
        agreement,
    })
}

/// Fold a method outcome into a report entry; budget exhaustion inside a
/// method still aborts the whole run.
fn to_entry(
    kind: MethodKind,
    outcome: Result<MethodResult, AnalysisError>,
) -> Result<MethodEntry, AnalysisError> {
    let outcome = match outcome {
        Ok(result) => {
            debug!(method = kind.display_name(), pressure = result.pressure, "method estimate");
            MethodOutcome::Estimate(result)
        }
        Err(AnalysisError::TimedOut { stage }) => {
            return Err(AnalysisError::TimedOut { stage });
        }
        Err(e) => {
            debug!(method = kind.display_name(), error = %e, "method failed");
            MethodOutcome::Failed {
                reason: e.to_string(),
            }
        }
    };
    Ok(MethodEntry {
        method: kind,
        outcome,
    })
}

/// `Match` when every |deviation| is within the match threshold, `Minor`
/// within the minor threshold, `Major` otherwise. `None` without a recorded
/// pressure or without any successful method.
fn classify_agreement(
    deviations: &BTreeMap<MethodKind, f64>,
    config: &AnalysisConfig,
) -> Option<AgreementFlag> {
    if deviations.is_empty() {
        return None;
    }
    let worst = deviations
        .values()
        .map(|d| d.abs())
        .fold(0.0_f64, f64::max);

    Some(if worst <= config.match_threshold_pct {
        AgreementFlag::Match
    } else if worst <= config.minor_threshold_pct {
        AgreementFlag::Minor
    } else {
        AgreementFlag::Major
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    #[test]
    fn classify_agreement_thresholds() {
        let cfg = config();
        let mut devs = BTreeMap::new();
        assert_eq!(classify_agreement(&devs, &cfg), None);

        devs.insert(MethodKind::Casagrande, -4.0);
        devs.insert(MethodKind::Oikawa, 8.5);
        assert_eq!(classify_agreement(&devs, &cfg), Some(AgreementFlag::Match));

        devs.insert(MethodKind::MaximumCurvature, -18.0);
        assert_eq!(classify_agreement(&devs, &cfg), Some(AgreementFlag::Minor));

        devs.insert(MethodKind::Oikawa, 60.0);
        assert_eq!(classify_agreement(&devs, &cfg), Some(AgreementFlag::Major));
    }

    #[test]
    fn non_positive_recorded_pressure_is_rejected() {
        let points = vec![
            SamplePoint::new(25.0, 0.92),
            SamplePoint::new(50.0, 0.90),
            SamplePoint::new(100.0, 0.85),
            SamplePoint::new(200.0, 0.72),
        ];
        assert!(matches!(
            analyze(&points, Some(-10.0), &config()).unwrap_err(),
            AnalysisError::NonPositivePressure { .. }
        ));
    }

    #[test]
    fn fitter_failure_aborts_aggregation() {
        let points = vec![
            SamplePoint::new(25.0, 0.92),
            SamplePoint::new(50.0, 0.90),
            SamplePoint::new(100.0, 0.85),
        ];
        assert_eq!(
            analyze(&points, None, &config()).unwrap_err(),
            AnalysisError::InsufficientData { got: 3, need: 4 }
        );
    }
}
