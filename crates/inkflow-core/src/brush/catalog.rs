//! Built-in brush presets.

use super::{BrushCategory, BrushSettings};
use crate::dynamics::{DynamicsModel, ResponseCurve};
use std::sync::LazyLock;

static BUILTIN: LazyLock<BrushCatalog> = LazyLock::new(|| BrushCatalog {
    presets: builtin_presets(),
});

/// Read-only registry of named brush presets.
#[derive(Debug, Clone)]
pub struct BrushCatalog {
    presets: Vec<BrushSettings>,
}

impl BrushCatalog {
    /// The process-wide built-in catalog.
    pub fn builtin() -> &'static BrushCatalog {
        &BUILTIN
    }

    /// Build a catalog from custom presets (previews, tests).
    pub fn from_presets(presets: Vec<BrushSettings>) -> Self {
        Self { presets }
    }

    pub fn get_by_id(&self, id: &str) -> Option<&BrushSettings> {
        self.presets.iter().find(|b| b.id == id)
    }

    /// Presets in `category`, in catalog order.
    pub fn list_by_category(&self, category: BrushCategory) -> Vec<&BrushSettings> {
        self.presets
            .iter()
            .filter(|b| b.category == category)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BrushSettings> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

fn preset(id: &str, name: &str, category: BrushCategory, size: f64) -> BrushSettings {
    BrushSettings {
        id: id.to_string(),
        name: name.to_string(),
        category,
        size,
        opacity: 1.0,
        flow: 1.0,
        hardness: 1.0,
        spacing: 0.1,
        scattering: 0.0,
        pressure_size: true,
        pressure_opacity: false,
        pressure_flow: false,
        smoothing: 0.5,
        angle_jitter: 0.0,
        taper: false,
        dynamics: DynamicsModel::Linear,
    }
}

fn builtin_presets() -> Vec<BrushSettings> {
    vec![
        BrushSettings {
            opacity: 0.8,
            hardness: 0.6,
            pressure_opacity: true,
            smoothing: 0.3,
            ..preset("pencil", "Pencil", BrushCategory::Sketching, 3.0)
        },
        BrushSettings {
            opacity: 0.7,
            hardness: 0.2,
            scattering: 0.3,
            pressure_opacity: true,
            pressure_flow: true,
            smoothing: 0.2,
            angle_jitter: 25.0,
            dynamics: DynamicsModel::Curves {
                pressure: ResponseCurve::new([0.35, 0.5, 0.62, 0.72, 0.8, 0.88, 0.95, 1.0]),
                velocity: ResponseCurve::new([1.0, 1.0, 0.95, 0.9, 0.85, 0.8, 0.75, 0.7]),
            },
            ..preset("charcoal", "Charcoal", BrushCategory::Sketching, 14.0)
        },
        BrushSettings {
            taper: true,
            ..preset("pen", "Pen", BrushCategory::Inking, 5.0)
        },
        BrushSettings {
            pressure_size: false,
            smoothing: 0.4,
            ..preset("fineliner", "Fineliner", BrushCategory::Inking, 2.0)
        },
        BrushSettings {
            hardness: 0.9,
            smoothing: 0.65,
            taper: true,
            dynamics: DynamicsModel::Curves {
                pressure: ResponseCurve::new([0.15, 0.3, 0.45, 0.6, 0.72, 0.84, 0.93, 1.0]),
                velocity: ResponseCurve::new([1.0, 0.92, 0.84, 0.76, 0.68, 0.6, 0.52, 0.45]),
            },
            ..preset("calligraphy", "Calligraphy", BrushCategory::Inking, 12.0)
        },
        BrushSettings {
            opacity: 0.9,
            hardness: 0.8,
            pressure_size: false,
            ..preset("marker", "Marker", BrushCategory::Marker, 18.0)
        },
        BrushSettings {
            opacity: 0.4,
            pressure_size: false,
            spacing: 0.05,
            ..preset("highlighter", "Highlighter", BrushCategory::Marker, 24.0)
        },
        BrushSettings {
            opacity: 0.5,
            flow: 0.3,
            hardness: 0.0,
            spacing: 0.05,
            pressure_size: false,
            pressure_opacity: true,
            pressure_flow: true,
            scattering: 0.1,
            ..preset("airbrush", "Airbrush", BrushCategory::Painting, 40.0)
        },
        BrushSettings {
            opacity: 0.6,
            flow: 0.5,
            hardness: 0.3,
            pressure_opacity: true,
            smoothing: 0.6,
            ..preset("watercolor", "Watercolor", BrushCategory::Painting, 30.0)
        },
        BrushSettings {
            opacity: 0.8,
            hardness: 0.5,
            scattering: 0.8,
            spacing: 0.4,
            angle_jitter: 180.0,
            smoothing: 0.0,
            ..preset("spray", "Spray", BrushCategory::Effects, 50.0)
        },
    ]
}
