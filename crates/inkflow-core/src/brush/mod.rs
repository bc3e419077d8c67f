//! Brush settings and the built-in preset catalog.

mod catalog;

pub use catalog::BrushCatalog;

use crate::dynamics::DynamicsModel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Allowed brush size range for catalog validation.
pub const BRUSH_SIZE_RANGE: (f64, f64) = (1.0, 500.0);

/// Size range accepted by the live-editing size setter.
pub const LIVE_SIZE_RANGE: (f64, f64) = (1.0, 100.0);

/// Grouping used by brush pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrushCategory {
    Sketching,
    Inking,
    Painting,
    Marker,
    Effects,
}

impl BrushCategory {
    pub fn name(self) -> &'static str {
        match self {
            BrushCategory::Sketching => "Sketching",
            BrushCategory::Inking => "Inking",
            BrushCategory::Painting => "Painting",
            BrushCategory::Marker => "Marker",
            BrushCategory::Effects => "Effects",
        }
    }
}

/// A brush configuration.
///
/// Catalog entries are read-only; the engine keeps a working copy of the
/// selected one that live setters may tweak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    pub id: String,
    pub name: String,
    pub category: BrushCategory,
    /// Base diameter in canvas units.
    pub size: f64,
    pub opacity: f64,
    pub flow: f64,
    pub hardness: f64,
    /// Dab spacing as a fraction of size.
    pub spacing: f64,
    pub scattering: f64,
    /// Pressure modulates width.
    pub pressure_size: bool,
    /// Pressure modulates opacity.
    pub pressure_opacity: bool,
    /// Pressure modulates flow.
    pub pressure_flow: bool,
    /// Exponential filter weight, 0 = raw input, 1 = frozen.
    pub smoothing: f64,
    /// Random rotation per dab, degrees.
    pub angle_jitter: f64,
    pub taper: bool,
    #[serde(default)]
    pub dynamics: DynamicsModel,
}

/// One violated validation rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub field: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} is outside [{}, {}]",
            self.field, self.value, self.min, self.max
        )
    }
}

/// Result of [`BrushSettings::validate`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    fn check(&mut self, field: &'static str, value: f64, (min, max): (f64, f64)) {
        if !(min..=max).contains(&value) {
            self.violations.push(Violation {
                field,
                value,
                min,
                max,
            });
        }
    }
}

impl BrushSettings {
    /// Check every numeric parameter against its allowed range.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        report.check("size", self.size, BRUSH_SIZE_RANGE);
        report.check("opacity", self.opacity, (0.0, 1.0));
        report.check("flow", self.flow, (0.0, 1.0));
        report.check("hardness", self.hardness, (0.0, 1.0));
        report.check("spacing", self.spacing, (0.0, 1.0));
        report.check("smoothing", self.smoothing, (0.0, 1.0));
        if let DynamicsModel::Curves { pressure, velocity } = &self.dynamics {
            for &m in pressure.multipliers().iter().chain(velocity.multipliers()) {
                report.check("curve multiplier", m, (0.0, f64::MAX));
            }
        }
        report
    }

    /// Working copy with its size clamped to the live-editing range.
    pub fn with_size(&self, size: f64) -> Self {
        let size = if size.is_nan() { LIVE_SIZE_RANGE.0 } else { size };
        Self {
            size: size.clamp(LIVE_SIZE_RANGE.0, LIVE_SIZE_RANGE.1),
            ..self.clone()
        }
    }

    /// Working copy with its opacity clamped to [0, 1].
    pub fn with_opacity(&self, opacity: f64) -> Self {
        Self {
            opacity: crate::point::clamp_unit(opacity),
            ..self.clone()
        }
    }

    /// Smoothing factor clamped to [0, 1].
    pub fn smoothing_factor(&self) -> f64 {
        crate::point::clamp_unit(self.smoothing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pen() -> BrushSettings {
        BrushCatalog::builtin().get_by_id("pen").unwrap().clone()
    }

    #[test]
    fn test_valid_brush() {
        assert!(pen().validate().is_valid());
    }

    #[test]
    fn test_collects_every_violation() {
        let mut brush = pen();
        brush.size = 0.5;
        brush.opacity = 1.5;
        brush.spacing = -0.1;
        let report = brush.validate();
        assert!(!report.is_valid());
        let fields: Vec<_> = report.violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["size", "opacity", "spacing"]);
    }

    #[test]
    fn test_nan_is_a_violation() {
        let mut brush = pen();
        brush.hardness = f64::NAN;
        assert!(!brush.validate().is_valid());
    }

    #[test]
    fn test_size_upper_bound_is_inclusive() {
        let mut brush = pen();
        brush.size = 500.0;
        assert!(brush.validate().is_valid());
        brush.size = 500.1;
        assert!(!brush.validate().is_valid());
    }

    #[test]
    fn test_live_setters_clamp() {
        let brush = pen();
        assert_eq!(brush.with_size(250.0).size, 100.0);
        assert_eq!(brush.with_size(0.0).size, 1.0);
        assert_eq!(brush.with_opacity(-1.0).opacity, 0.0);
        assert_eq!(brush.with_opacity(0.4).opacity, 0.4);
    }

    #[test]
    fn test_violation_display() {
        let v = Violation {
            field: "flow",
            value: 2.0,
            min: 0.0,
            max: 1.0,
        };
        assert_eq!(v.to_string(), "flow = 2 is outside [0, 1]");
    }
}
