//! Crate-wide error type.
//!
//! Every fallible operation in the core returns `AnalysisError`. The
//! aggregator decides which variants abort a whole run (input validation,
//! curve fitting, budget exhaustion) and which are recorded as a per-method
//! failure marker while the remaining methods continue.

use thiserror::Error;

/// Which end of the observed pressure range an extremum landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Lower,
    Upper,
}

impl std::fmt::Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Boundary::Lower => write!(f, "lower"),
            Boundary::Upper => write!(f, "upper"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("insufficient data: got {got} points, need at least {need}")]
    InsufficientData { got: usize, need: usize },

    #[error(
        "applied pressures must be strictly increasing after deduplication \
         (pressure {pressure} at index {index})"
    )]
    NonMonotonicInput { index: usize, pressure: f64 },

    #[error("non-finite sample value at index {index}")]
    NonFiniteSample { index: usize },

    #[error("applied pressure must be positive, got {pressure}")]
    NonPositivePressure { pressure: f64 },

    #[error("virgin-compression window holds {got} points, need at least 2")]
    InsufficientVirginSegment { got: usize },

    #[error(
        "curvature maximum at {pressure} sits on the {side} boundary of the \
         observed pressure range"
    )]
    NoInteriorExtremum { pressure: f64, side: Boundary },

    #[error("degenerate segment: {reason}")]
    DegenerateSegment { reason: String },

    #[error("analysis budget exhausted during {stage}")]
    TimedOut { stage: &'static str },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}
