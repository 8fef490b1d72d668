//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they
//! can be:
//!
//! - used in-memory during the analysis
//! - handed to plotting/export collaborators without recomputation
//! - reloaded later for comparisons across test files

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// One oedometer load increment: applied pressure and the measured ordinate
/// (void ratio or axial strain, see [`OrdinateKind`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub pressure: f64,
    pub ordinate: f64,
}

impl SamplePoint {
    pub fn new(pressure: f64, ordinate: f64) -> Self {
        Self { pressure, ordinate }
    }
}

/// What the ordinate column of the test data means.
///
/// The constructions are identical for both; the kind is carried for
/// labeling and for collaborators that render axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrdinateKind {
    VoidRatio,
    Strain,
}

impl OrdinateKind {
    pub fn display_name(self) -> &'static str {
        match self {
            OrdinateKind::VoidRatio => "void ratio e",
            OrdinateKind::Strain => "axial strain",
        }
    }
}

/// The three curve constructions, in the fixed order they appear in every
/// [`ComparisonReport`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    Casagrande,
    MaximumCurvature,
    Oikawa,
}

impl MethodKind {
    pub const ALL: [MethodKind; 3] = [
        MethodKind::Casagrande,
        MethodKind::MaximumCurvature,
        MethodKind::Oikawa,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            MethodKind::Casagrande => "Casagrande",
            MethodKind::MaximumCurvature => "Maximum Curvature",
            MethodKind::Oikawa => "Oikawa",
        }
    }
}

/// A straight line in log-pressure coordinates: `y = slope * log10(p) + intercept`.
///
/// All construction lines (tangents, bisectors, regression segments) are
/// exchanged in this form so a plotting collaborator can draw them directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    pub slope: f64,
    pub intercept: f64,
}

impl LogLine {
    /// Line of a given slope through `(x, y)` with `x = log10(p)`.
    pub fn through(x: f64, y: f64, slope: f64) -> Self {
        Self {
            slope,
            intercept: y - slope * x,
        }
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// `x` coordinate where two lines cross, or `None` when the slopes
    /// differ by less than `eps` (no usable intersection).
    pub fn intersect_x(&self, other: &LogLine, eps: f64) -> Option<f64> {
        let denom = self.slope - other.slope;
        if denom.abs() < eps {
            return None;
        }
        Some((other.intercept - self.intercept) / denom)
    }
}

/// How the Casagrande virgin-compression tangent is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirginTangent {
    /// Tangent at the steepest (most negative slope) point of the fitted
    /// curve. This is the original construction.
    Steepest,
    /// Least-squares line through the final `window` data points.
    TailRegression { window: usize },
}

impl VirginTangent {
    /// Default window when tail regression is selected.
    pub const DEFAULT_WINDOW: usize = 4;
}

/// Method-specific auxiliary values kept for plotting and audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SupportingGeometry {
    Casagrande {
        /// Pivot (maximum-curvature point): pressure and fitted ordinate.
        pivot_pressure: f64,
        pivot_ordinate: f64,
        tangent: LogLine,
        horizontal: LogLine,
        bisector: LogLine,
        virgin: LogLine,
    },
    MaximumCurvature {
        /// Log-spaced pressures of the scan grid.
        pressures: Vec<f64>,
        /// Curvature at each grid pressure.
        curvature: Vec<f64>,
        /// Calibrated sigmoid `[a, b, c, m]` of
        /// `y = a + c * exp(-exp(b * (log10 p - m)))`, when the scan ran on
        /// a sigmoid model.
        sigmoid: Option<[f64; 4]>,
    },
    Oikawa {
        recompression: LogLine,
        virgin: LogLine,
        /// First data index of the virgin segment.
        split_index: usize,
        /// Combined residual sum of squares of the two segments.
        rss: f64,
    },
}

/// A single method's estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodResult {
    pub method: MethodKind,
    /// Estimated preconsolidation pressure.
    pub pressure: f64,
    /// Ordinate of the construction point (intersection or curvature peak).
    pub ordinate: f64,
    /// True when `pressure` falls outside the observed pressure range.
    pub extrapolated: bool,
    pub geometry: SupportingGeometry,
}

/// Estimate or explicit failure; a report never silently drops a method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MethodOutcome {
    Estimate(MethodResult),
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodEntry {
    pub method: MethodKind,
    pub outcome: MethodOutcome,
}

impl MethodEntry {
    pub fn pressure(&self) -> Option<f64> {
        match &self.outcome {
            MethodOutcome::Estimate(result) => Some(result.pressure),
            MethodOutcome::Failed { .. } => None,
        }
    }
}

/// How well the successful methods agree with the recorded pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementFlag {
    Match,
    Minor,
    Major,
}

/// Full output of one analysis run.
///
/// `entries` always holds exactly one entry per method, in the declaration
/// order of [`MethodKind::ALL`], regardless of which methods succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub recorded_pressure: Option<f64>,
    pub entries: Vec<MethodEntry>,
    /// Signed percent difference from the recorded pressure, per successful
    /// method. Empty when no recorded pressure was supplied.
    pub deviations: BTreeMap<MethodKind, f64>,
    /// `None` without a recorded pressure or without any successful method.
    pub agreement: Option<AgreementFlag>,
}

/// A full run's configuration.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub ordinate: OrdinateKind,

    /// Size of the log-spaced evaluation grid used by the pivot, tangent and
    /// curvature scans.
    pub grid_points: usize,

    /// Virgin-compression tangent construction for Casagrande.
    pub virgin_tangent: VirginTangent,

    /// Relative tolerance within which curvature maxima count as tied.
    pub curvature_tie_tol: f64,

    /// Fraction of the log-pressure range treated as "boundary" when the
    /// maximum-curvature method rejects edge extrema.
    pub boundary_band: f64,

    /// Minimum slope separation (log-log space) below which the two Oikawa
    /// segments count as parallel.
    pub min_slope_separation: f64,

    /// Ignore the fitted curve beyond its first inflexion past the first
    /// unload pressure when searching for the Casagrande pivot and the
    /// steepest tangent.
    pub truncate_after_inflexion: bool,

    /// Sigmoid calibration: log-spaced steepness grid.
    pub rate_min: f64,
    pub rate_max: f64,
    pub rate_steps: usize,
    /// Sigmoid calibration: linearly spaced locus grid over the observed
    /// log-pressure range.
    pub locus_steps: usize,

    /// All |deviations| at or below this percentage flag `Match`.
    pub match_threshold_pct: f64,
    /// All |deviations| at or below this percentage flag `Minor`.
    pub minor_threshold_pct: f64,

    /// Optional per-run deadline; `None` disables budget checks.
    pub time_budget: Option<Duration>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ordinate: OrdinateKind::VoidRatio,
            grid_points: 1000,
            virgin_tangent: VirginTangent::Steepest,
            curvature_tie_tol: 1e-9,
            boundary_band: 0.01,
            min_slope_separation: 1e-3,
            truncate_after_inflexion: true,
            rate_min: 0.25,
            rate_max: 25.0,
            rate_steps: 32,
            locus_steps: 33,
            match_threshold_pct: 10.0,
            minor_threshold_pct: 25.0,
            time_budget: None,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let fail = |reason: &str| {
            Err(AnalysisError::InvalidConfig {
                reason: reason.to_string(),
            })
        };

        if self.grid_points < 16 {
            return fail("grid_points must be at least 16");
        }
        if !(self.curvature_tie_tol.is_finite() && self.curvature_tie_tol >= 0.0) {
            return fail("curvature_tie_tol must be finite and non-negative");
        }
        if !(self.boundary_band > 0.0 && self.boundary_band < 0.5) {
            return fail("boundary_band must lie in (0, 0.5)");
        }
        if !(self.min_slope_separation.is_finite() && self.min_slope_separation > 0.0) {
            return fail("min_slope_separation must be finite and positive");
        }
        if !(self.rate_min.is_finite()
            && self.rate_max.is_finite()
            && self.rate_min > 0.0
            && self.rate_max > self.rate_min)
        {
            return fail("sigmoid rate range must be finite, positive and ordered");
        }
        if self.rate_steps < 2 || self.locus_steps < 2 {
            return fail("sigmoid grids need at least 2 steps each");
        }
        if !(self.match_threshold_pct > 0.0
            && self.minor_threshold_pct > self.match_threshold_pct)
        {
            return fail("agreement thresholds must satisfy 0 < match < minor");
        }
        Ok(())
    }
}
