//! The immutable curve model consumed by the estimation methods.
//!
//! A [`CurveModel`] is a pure function of its input sample sequence plus
//! configuration; rebuilding always creates a new value. It owns one of two
//! representations:
//!
//! - a natural cubic spline interpolant (Casagrande's knot-passing curve)
//! - a calibrated Gompertz sigmoid (the regression curve of the
//!   maximum-curvature method, after Gregory et al.)
//!
//! Both are evaluated in `x = log10(pressure)` coordinates; the model also
//! records which ordinate transform its `y` values carry so downstream
//! constructions stay consistent.

use serde::{Deserialize, Serialize};

use crate::math::NaturalSpline;

/// Transform applied to the measured ordinate before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrdinateScale {
    /// Raw void ratio / strain (`e – log p` plots).
    Linear,
    /// `log10(1 + value)`, the specific-volume axis of the Oikawa plot.
    LogSpecificVolume,
}

impl OrdinateScale {
    pub fn apply(self, raw: f64) -> f64 {
        match self {
            OrdinateScale::Linear => raw,
            OrdinateScale::LogSpecificVolume => (1.0 + raw).log10(),
        }
    }
}

/// `y(x) = a + c * exp(-exp(b * (x - m)))` with `x = log10(pressure)`.
///
/// `a` is the high-pressure asymptote, `a + c` the low-pressure asymptote,
/// `b` the steepness and `m` the locus of the inflexion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GompertzSigmoid {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub m: f64,
}

impl GompertzSigmoid {
    pub fn eval(&self, x: f64) -> f64 {
        let u = self.b * (x - self.m);
        self.a + self.c * (-u.exp()).exp()
    }

    /// First derivative in `x`.
    ///
    /// Written as `-c·b·exp(u - e^u)` so the `e^u` overflow for large `u`
    /// collapses to 0 instead of producing `inf * 0`.
    pub fn deriv(&self, x: f64) -> f64 {
        let u = self.b * (x - self.m);
        -self.c * self.b * (u - u.exp()).exp()
    }

    /// Second derivative in `x`: `c·b²·(exp(2u - e^u) - exp(u - e^u))`.
    pub fn deriv2(&self, x: f64) -> f64 {
        let u = self.b * (x - self.m);
        let v = u.exp();
        self.c * self.b * self.b * ((2.0 * u - v).exp() - (u - v).exp())
    }

    pub fn params(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.m]
    }
}

#[derive(Debug, Clone)]
enum Representation {
    Spline(NaturalSpline),
    Sigmoid(GompertzSigmoid),
}

/// A fitted, immutable curve over the observed pressure range.
#[derive(Debug, Clone)]
pub struct CurveModel {
    repr: Representation,
    scale: OrdinateScale,
    p_min: f64,
    p_max: f64,
}

impl CurveModel {
    pub(crate) fn from_spline(
        spline: NaturalSpline,
        scale: OrdinateScale,
        p_min: f64,
        p_max: f64,
    ) -> Self {
        Self {
            repr: Representation::Spline(spline),
            scale,
            p_min,
            p_max,
        }
    }

    pub(crate) fn from_sigmoid(
        sigmoid: GompertzSigmoid,
        scale: OrdinateScale,
        p_min: f64,
        p_max: f64,
    ) -> Self {
        Self {
            repr: Representation::Sigmoid(sigmoid),
            scale,
            p_min,
            p_max,
        }
    }

    /// Observed pressure range the model was fitted on.
    pub fn domain(&self) -> (f64, f64) {
        (self.p_min, self.p_max)
    }

    /// Observed range in `log10(pressure)` coordinates.
    pub fn log_domain(&self) -> (f64, f64) {
        (self.p_min.log10(), self.p_max.log10())
    }

    /// True when `pressure` lies outside the observed range; evaluation is
    /// still defined there (end-polynomial / asymptote extension) but the
    /// caller must treat the value as an extrapolation.
    pub fn is_extrapolating(&self, pressure: f64) -> bool {
        pressure < self.p_min || pressure > self.p_max
    }

    pub fn ordinate_scale(&self) -> OrdinateScale {
        self.scale
    }

    /// Sigmoid parameters `[a, b, c, m]` when this model is a sigmoid.
    pub fn sigmoid_params(&self) -> Option<[f64; 4]> {
        match &self.repr {
            Representation::Sigmoid(s) => Some(s.params()),
            Representation::Spline(_) => None,
        }
    }

    /// Fitted ordinate at an applied pressure.
    pub fn evaluate(&self, pressure: f64) -> f64 {
        self.eval_log(pressure.log10())
    }

    /// Slope `dy/d log10(p)` at an applied pressure.
    pub fn derivative(&self, pressure: f64) -> f64 {
        self.slope_log(pressure.log10())
    }

    pub fn eval_log(&self, x: f64) -> f64 {
        match &self.repr {
            Representation::Spline(s) => s.eval(x),
            Representation::Sigmoid(s) => s.eval(x),
        }
    }

    pub fn slope_log(&self, x: f64) -> f64 {
        match &self.repr {
            Representation::Spline(s) => s.deriv(x),
            Representation::Sigmoid(s) => s.deriv(x),
        }
    }

    pub fn concavity_log(&self, x: f64) -> f64 {
        match &self.repr {
            Representation::Spline(s) => s.deriv2(x),
            Representation::Sigmoid(s) => s.deriv2(x),
        }
    }

    /// Curvature `|y''| / (1 + y'^2)^(3/2)` in log-pressure coordinates.
    pub fn curvature_log(&self, x: f64) -> f64 {
        let d1 = self.slope_log(x);
        let d2 = self.concavity_log(x);
        d2.abs() / (1.0 + d1 * d1).powf(1.5)
    }
}
