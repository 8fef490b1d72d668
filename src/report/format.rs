//! Formatted terminal output for a comparison report.
//!
//! Formatting lives in one place so the numerical code stays clean and the
//! output is easy to snapshot. A failed method is always printed with its
//! reason; a report never shows a silently missing or zero pressure.

use crate::domain::{AgreementFlag, AnalysisConfig, ComparisonReport, MethodOutcome};

/// Render the full run summary.
pub fn format_report(report: &ComparisonReport, config: &AnalysisConfig) -> String {
    let mut out = String::new();

    out.push_str("=== oedo - Preconsolidation Pressure ===\n");
    out.push_str(&format!("Ordinate: {}\n", config.ordinate.display_name()));
    match report.recorded_pressure {
        Some(recorded) => out.push_str(&format!("Recorded pc: {recorded:.1}\n")),
        None => out.push_str("Recorded pc: (none)\n"),
    }

    out.push_str("\nMethod estimates:\n");
    for entry in &report.entries {
        match &entry.outcome {
            MethodOutcome::Estimate(result) => {
                let deviation = report
                    .deviations
                    .get(&entry.method)
                    .map(|d| format!("  dev={d:+.1}%"))
                    .unwrap_or_default();
                let extrapolated = if result.extrapolated {
                    " (extrapolated)"
                } else {
                    ""
                };
                out.push_str(&format!(
                    "* {:<18} pc={:>8.1}{deviation}{extrapolated}\n",
                    entry.method.display_name(),
                    result.pressure,
                ));
            }
            MethodOutcome::Failed { reason } => {
                out.push_str(&format!(
                    "  (failed {}) {reason}\n",
                    entry.method.display_name()
                ));
            }
        }
    }

    if let Some(agreement) = report.agreement {
        let label = match agreement {
            AgreementFlag::Match => "match",
            AgreementFlag::Minor => "minor",
            AgreementFlag::Major => "major",
        };
        out.push_str(&format!(
            "\nAgreement: {label} (match <= {:.0}%, minor <= {:.0}%)\n",
            config.match_threshold_pct, config.minor_threshold_pct
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        LogLine, MethodEntry, MethodKind, MethodResult, SupportingGeometry,
    };
    use std::collections::BTreeMap;

    fn sample_report() -> ComparisonReport {
        let line = LogLine {
            slope: -0.4,
            intercept: 1.6,
        };
        let result = MethodResult {
            method: MethodKind::Casagrande,
            pressure: 132.5,
            ordinate: 0.79,
            extrapolated: false,
            geometry: SupportingGeometry::Casagrande {
                pivot_pressure: 95.0,
                pivot_ordinate: 0.86,
                tangent: line,
                horizontal: LogLine {
                    slope: 0.0,
                    intercept: 0.86,
                },
                bisector: line,
                virgin: line,
            },
        };

        let mut deviations = BTreeMap::new();
        deviations.insert(MethodKind::Casagrande, -11.7);

        ComparisonReport {
            recorded_pressure: Some(150.0),
            entries: vec![
                MethodEntry {
                    method: MethodKind::Casagrande,
                    outcome: MethodOutcome::Estimate(result),
                },
                MethodEntry {
                    method: MethodKind::MaximumCurvature,
                    outcome: MethodOutcome::Failed {
                        reason: "curvature maximum at 800 sits on the upper boundary \
                                 of the observed pressure range"
                            .to_string(),
                    },
                },
            ],
            deviations,
            agreement: Some(crate::domain::AgreementFlag::Minor),
        }
    }

    #[test]
    fn summary_shows_estimates_and_failures() {
        let text = format_report(&sample_report(), &AnalysisConfig::default());
        assert!(text.contains("Casagrande"));
        assert!(text.contains("pc=   132.5"));
        assert!(text.contains("dev=-11.7%"));
        assert!(text.contains("(failed Maximum Curvature)"));
        assert!(text.contains("Agreement: minor"));
    }

    #[test]
    fn missing_recorded_pressure_is_explicit() {
        let mut report = sample_report();
        report.recorded_pressure = None;
        report.deviations.clear();
        report.agreement = None;
        let text = format_report(&report, &AnalysisConfig::default());
        assert!(text.contains("Recorded pc: (none)"));
        assert!(!text.contains("Agreement:"));
    }
}
