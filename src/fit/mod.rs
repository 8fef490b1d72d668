//! Curve fitting: spline interpolation and sigmoid calibration.

pub mod fitter;
pub mod gompertz;

pub use fitter::{spline_model, MIN_POINTS};
pub use gompertz::sigmoid_model;
