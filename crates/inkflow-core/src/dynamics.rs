//! Brush dynamics: pressure/velocity to width, opacity and flow.
//!
//! Everything here is a pure function of the sample and the brush. Two
//! response models exist: linear interpolation between 10% and 100% of the
//! base value, and bucketed response curves. A brush declares its model via
//! [`DynamicsModel`].

use crate::brush::BrushSettings;
use crate::point::{StrokePoint, clamp_unit};
use serde::{Deserialize, Serialize};

/// Number of buckets in a response curve.
pub const CURVE_BUCKETS: usize = 8;

/// Velocity (units/ms) at which the velocity curve reaches its last bucket.
pub const VELOCITY_SATURATION: f64 = 4.0;

/// Lower bound of every modulated value, as a fraction of its base.
pub const MIN_FRACTION: f64 = 0.1;

/// Discretized multiplier curve indexed by `floor(value * (N - 1))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseCurve([f64; CURVE_BUCKETS]);

impl ResponseCurve {
    pub fn new(multipliers: [f64; CURVE_BUCKETS]) -> Self {
        Self(multipliers)
    }

    /// A curve that never changes the value.
    pub fn flat() -> Self {
        Self([1.0; CURVE_BUCKETS])
    }

    pub fn multipliers(&self) -> &[f64] {
        &self.0
    }

    /// Multiplier for a normalized input in [0, 1] (clamped).
    pub fn sample(&self, value: f64) -> f64 {
        let index = (clamp_unit(value) * (CURVE_BUCKETS - 1) as f64).floor() as usize;
        self.0[index.min(CURVE_BUCKETS - 1)]
    }
}

impl Default for ResponseCurve {
    fn default() -> Self {
        Self::flat()
    }
}

/// Which response model a brush uses.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum DynamicsModel {
    #[default]
    Linear,
    Curves {
        pressure: ResponseCurve,
        velocity: ResponseCurve,
    },
}

/// Instantaneous output of the dynamics engine for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicsSample {
    pub width: f64,
    pub opacity: f64,
    pub flow: f64,
}

/// A response model.
pub trait Dynamics {
    /// Modulate `base` by the sample. `enabled` is the brush's toggle for
    /// the parameter; when off the base value is returned unchanged.
    fn modulate(&self, base: f64, enabled: bool, pressure: f64, velocity: Option<f64>) -> f64;

    fn sample(&self, brush: &BrushSettings, point: &StrokePoint) -> DynamicsSample {
        let pressure = point.clamped_pressure();
        let velocity = point.velocity;
        DynamicsSample {
            width: self.modulate(brush.size, brush.pressure_size, pressure, velocity),
            opacity: self.modulate(brush.opacity, brush.pressure_opacity, pressure, velocity),
            flow: self.modulate(brush.flow, brush.pressure_flow, pressure, velocity),
        }
    }
}

/// `min + (max - min) * pressure` with `min = base * 0.1`, `max = base`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearDynamics;

impl Dynamics for LinearDynamics {
    fn modulate(&self, base: f64, enabled: bool, pressure: f64, _velocity: Option<f64>) -> f64 {
        if !enabled {
            return base;
        }
        let min = base * MIN_FRACTION;
        min + (base - min) * clamp_unit(pressure)
    }
}

/// `base * pressure_curve(p) * velocity_curve(v)`, kept within
/// `[base * 0.1, base]`.
#[derive(Debug, Clone, Copy)]
pub struct CurveDynamics<'a> {
    pub pressure: &'a ResponseCurve,
    pub velocity: &'a ResponseCurve,
}

impl Dynamics for CurveDynamics<'_> {
    fn modulate(&self, base: f64, enabled: bool, pressure: f64, velocity: Option<f64>) -> f64 {
        if !enabled {
            return base;
        }
        let v = velocity.map_or(0.0, normalize_velocity);
        let value = base * self.pressure.sample(pressure) * self.velocity.sample(v);
        value.clamp(base * MIN_FRACTION, base)
    }
}

/// Map units/ms onto [0, 1].
pub fn normalize_velocity(velocity: f64) -> f64 {
    clamp_unit(velocity / VELOCITY_SATURATION)
}

impl DynamicsModel {
    pub fn sample(&self, brush: &BrushSettings, point: &StrokePoint) -> DynamicsSample {
        match self {
            DynamicsModel::Linear => LinearDynamics.sample(brush, point),
            DynamicsModel::Curves { pressure, velocity } => CurveDynamics { pressure, velocity }.sample(brush, point),
        }
    }
}

/// Dynamics for `point` under the model `brush` declares.
pub fn sample(brush: &BrushSettings, point: &StrokePoint) -> DynamicsSample {
    brush.dynamics.sample(brush, point)
}
