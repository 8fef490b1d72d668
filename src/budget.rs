//! Per-run time budget.
//!
//! The core itself never blocks on external resources, but the caller may
//! impose a per-test-file deadline. Fitting and the method scans check the
//! budget at stage boundaries and inside their serial loops, and fail fast
//! with [`AnalysisError::TimedOut`] once it is exhausted.

use std::time::{Duration, Instant};

use crate::error::AnalysisError;

/// A deadline started when the aggregation begins.
///
/// `Budget::unlimited()` never expires, so the default configuration adds no
/// clock reads beyond a branch per check.
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    deadline: Option<Instant>,
}

impl Budget {
    pub fn unlimited() -> Self {
        Self { deadline: None }
    }

    pub fn with_limit(limit: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + limit),
        }
    }

    pub fn start(limit: Option<Duration>) -> Self {
        match limit {
            Some(limit) => Self::with_limit(limit),
            None => Self::unlimited(),
        }
    }

    pub fn expired(&self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// Return `TimedOut` naming the stage that ran over.
    pub fn check(&self, stage: &'static str) -> Result<(), AnalysisError> {
        if self.expired() {
            Err(AnalysisError::TimedOut { stage })
        } else {
            Ok(())
        }
    }
}
