//! Input preparation: compression-curve point selection and validation.

mod selection;

pub use selection::{select_compression_points, CompressionCurve};
