// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Cubic-bezier animation curves and the named presets built on top of
//! them.

/// A CSS-style cubic-bezier timing curve, defined by its two interior
/// control points — the endpoints are always `(0, 0)` and `(1, 1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Curve {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Curve {
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Curve {
        Curve { x1, y1, x2, y2 }
    }

    fn component(t: f64, p1: f64, p2: f64) -> f64 {
        let u = 1.0 - t;
        3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
    }

    fn derivative(t: f64, p1: f64, p2: f64) -> f64 {
        let u = 1.0 - t;
        3.0 * u * u * p1 + 6.0 * u * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
    }

    /// Evaluates the curve's y-value at progress `x` (0 to 1), solving for
    /// the curve's parametric `t` with a handful of Newton-Raphson
    /// iterations starting from `t = x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let mut t = x.clamp(0.0, 1.0);
        for _ in 0..8 {
            let error = Self::component(t, self.x1, self.x2) - x;
            let derivative = Self::derivative(t, self.x1, self.x2);
            if derivative.abs() < 1e-6 {
                break;
            }
            t = (t - error / derivative).clamp(0.0, 1.0);
        }
        Self::component(t, self.y1, self.y2)
    }
}

pub const DEFAULT_CURVE: Curve = Curve::new(0.25, 0.1, 0.25, 1.0);
pub const LINEAR_CURVE: Curve = Curve::new(0.0, 0.0, 1.0, 1.0);
pub const EASE_IN_CURVE: Curve = Curve::new(0.42, 0.0, 1.0, 1.0);
pub const EASE_OUT_CURVE: Curve = Curve::new(0.0, 0.0, 0.58, 1.0);
pub const EASE_IN_OUT_CURVE: Curve = Curve::new(0.42, 0.0, 0.58, 1.0);
