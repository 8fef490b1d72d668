//! The three preconsolidation-pressure constructions.
//!
//! Each method consumes the shared immutable curve model and/or the raw
//! compression points and produces a [`crate::domain::MethodResult`] with
//! enough supporting geometry for a plotting collaborator to redraw the
//! construction. The methods are mutually independent; the aggregator may
//! run them in parallel without affecting any output.

pub mod casagrande;
pub mod max_curvature;
pub mod oikawa;
