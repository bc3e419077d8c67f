//! Layers: ordered, independently toggleable groups of strokes.

use crate::stroke::Stroke;
use peniko::{BlendMode, Mix};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique layer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub Uuid);

impl LayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a layer composites onto the layers below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LayerBlend {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
}

impl LayerBlend {
    pub fn to_blend_mode(self) -> BlendMode {
        let mix = match self {
            LayerBlend::Normal => Mix::Normal,
            LayerBlend::Multiply => Mix::Multiply,
            LayerBlend::Screen => Mix::Screen,
            LayerBlend::Overlay => Mix::Overlay,
            LayerBlend::Darken => Mix::Darken,
            LayerBlend::Lighten => Mix::Lighten,
        };
        BlendMode::from(mix)
    }
}

/// A layer of strokes. Insertion order is z-order within the layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    strokes: Vec<Stroke>,
    pub opacity: f64,
    pub blend: LayerBlend,
    pub visible: bool,
    pub locked: bool,
    /// Cross-layer z-order; unique within a canvas.
    pub order: i32,
}

impl Layer {
    pub fn new(name: impl Into<String>, order: i32) -> Self {
        Self {
            id: LayerId::new(),
            name: name.into(),
            strokes: Vec::new(),
            opacity: 1.0,
            blend: LayerBlend::Normal,
            visible: true,
            locked: false,
            order,
        }
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Append a stroke. Locked layers and empty strokes are refused and the
    /// stroke is handed back.
    pub fn add_stroke(&mut self, stroke: Stroke) -> Result<(), Stroke> {
        if self.locked || stroke.is_empty() {
            return Err(stroke);
        }
        self.strokes.push(stroke);
        Ok(())
    }

    /// Remove every stroke, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let n = self.strokes.len();
        self.strokes.clear();
        n
    }

    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }

    /// Copy without render caches.
    pub fn semantic_clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            strokes: self.strokes.iter().map(Stroke::semantic_clone).collect(),
            opacity: self.opacity,
            blend: self.blend,
            visible: self.visible,
            locked: self.locked,
            order: self.order,
        }
    }

    pub fn rebuild_render_cache(&mut self) {
        for stroke in &mut self.strokes {
            stroke.rebuild_render();
        }
    }
}
