//! Numeric primitives shared by the fitter and the methods.

pub mod grid;
pub mod ols;
pub mod spline;

pub use grid::{lin_space, log_space};
pub use ols::{fit_line, solve_least_squares};
pub use spline::NaturalSpline;
