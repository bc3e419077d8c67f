//! Canvas state: layers, active layer, size, background and view.

use crate::camera::Camera;
use crate::color::InkColor;
use crate::error::{EngineError, EngineResult};
use crate::layer::{Layer, LayerBlend, LayerId};
use crate::point::StrokePoint;
use crate::stroke::Stroke;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::mem::size_of;

/// Aggregate numbers about the committed content.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasStats {
    pub total_strokes: usize,
    pub total_points: usize,
    pub total_layers: usize,
    pub estimated_memory_bytes: usize,
    /// Mean points per stroke; 0 for an empty canvas.
    pub average_stroke_length: f64,
}

/// The full drawing: every layer plus canvas-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasState {
    layers: HashMap<LayerId, Layer>,
    active_layer_id: LayerId,
    pub width: f64,
    pub height: f64,
    pub background: InkColor,
    #[serde(default)]
    pub view: Camera,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new(1024.0, 768.0, InkColor::white())
    }
}

impl CanvasState {
    /// New canvas with a single empty layer, which is active.
    pub fn new(width: f64, height: f64, background: InkColor) -> Self {
        let layer = Layer::new("Layer 1", 0);
        let active_layer_id = layer.id;
        Self {
            layers: HashMap::from([(layer.id, layer)]),
            active_layer_id,
            width,
            height,
            background,
            view: Camera::default(),
        }
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(&id)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn active_layer_id(&self) -> LayerId {
        self.active_layer_id
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.layers.get(&self.active_layer_id)
    }

    pub fn active_layer_mut(&mut self) -> Option<&mut Layer> {
        self.layers.get_mut(&self.active_layer_id)
    }

    /// Whether a stroke may be started: the active layer exists and is unlocked.
    pub fn can_draw(&self) -> bool {
        self.active_layer().is_some_and(|l| !l.locked)
    }

    /// Add a layer on top of the stack and return its id.
    pub fn create_layer(&mut self, name: impl Into<String>) -> LayerId {
        let top = self.layers.values().map(|l| l.order).max();
        let order = match top.map(|o| o.checked_add(1)) {
            None => 0,
            Some(Some(order)) => order,
            // top of the stack sits at i32::MAX: compact the orders first
            Some(None) => {
                let ids: Vec<LayerId> = self.layers_ordered().iter().map(|l| l.id).collect();
                self.renumber(ids);
                self.layers.len() as i32
            }
        };
        let layer = Layer::new(name, order);
        let id = layer.id;
        self.layers.insert(id, layer);
        id
    }

    /// Returns false (and changes nothing) for an unknown id.
    pub fn set_active_layer(&mut self, id: LayerId) -> bool {
        if !self.layers.contains_key(&id) {
            return false;
        }
        self.active_layer_id = id;
        true
    }

    /// Move a layer to `new_index` in the bottom-to-top stack and renumber
    /// every layer's `order` to 0..n.
    pub fn reorder_layer(&mut self, id: LayerId, new_index: usize) -> bool {
        if !self.layers.contains_key(&id) {
            return false;
        }
        let mut ids: Vec<LayerId> = self.layers_ordered().iter().map(|l| l.id).collect();
        ids.retain(|&other| other != id);
        ids.insert(new_index.min(ids.len()), id);
        self.renumber(ids);
        true
    }

    /// Assign `order` 0..n following `ids`.
    fn renumber(&mut self, ids: Vec<LayerId>) {
        for (order, layer_id) in ids.into_iter().enumerate() {
            if let Some(layer) = self.layers.get_mut(&layer_id) {
                layer.order = order as i32;
            }
        }
    }

    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> bool {
        self.update_layer(id, |l| l.visible = visible)
    }

    pub fn set_layer_locked(&mut self, id: LayerId, locked: bool) -> bool {
        self.update_layer(id, |l| l.locked = locked)
    }

    pub fn set_layer_opacity(&mut self, id: LayerId, opacity: f64) -> bool {
        self.update_layer(id, |l| l.opacity = crate::point::clamp_unit(opacity))
    }

    pub fn set_layer_blend(&mut self, id: LayerId, blend: LayerBlend) -> bool {
        self.update_layer(id, |l| l.blend = blend)
    }

    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) -> bool {
        let name = name.into();
        self.update_layer(id, |l| l.name = name)
    }

    fn update_layer(&mut self, id: LayerId, f: impl FnOnce(&mut Layer)) -> bool {
        match self.layers.get_mut(&id) {
            Some(layer) => {
                f(layer);
                true
            }
            None => false,
        }
    }

    /// Remove a layer. The last remaining layer cannot be removed. If the
    /// active layer goes, the topmost remaining layer becomes active.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        if self.layers.len() <= 1 || self.layers.remove(&id).is_none() {
            return false;
        }
        if self.active_layer_id == id {
            if let Some(top) = self.layers.values().max_by_key(|l| l.order) {
                self.active_layer_id = top.id;
            }
        }
        true
    }

    /// Remove every stroke from one layer.
    pub fn clear_layer(&mut self, id: LayerId) -> bool {
        self.update_layer(id, |l| {
            l.clear();
        })
    }

    /// Remove every stroke from every layer. Returns the number removed.
    pub fn clear_all(&mut self) -> usize {
        self.layers.values_mut().map(Layer::clear).sum()
    }

    /// Layers from bottom to top.
    pub fn layers_ordered(&self) -> Vec<&Layer> {
        let mut layers: Vec<&Layer> = self.layers.values().collect();
        layers.sort_by_key(|l| l.order);
        layers
    }

    /// Strokes of visible layers in paint order.
    pub fn visible_strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.layers_ordered()
            .into_iter()
            .filter(|l| l.visible)
            .flat_map(|l| l.strokes().iter())
    }

    /// Append a finished stroke to the active layer.
    ///
    /// Hands the stroke back if the active layer is missing or locked.
    pub fn commit_stroke(&mut self, stroke: Stroke) -> Result<(), Stroke> {
        self.commit_stroke_to(self.active_layer_id, stroke)
    }

    /// Append a finished stroke to a specific layer.
    pub fn commit_stroke_to(&mut self, id: LayerId, stroke: Stroke) -> Result<(), Stroke> {
        match self.layers.get_mut(&id) {
            Some(layer) => layer.add_stroke(stroke),
            None => Err(stroke),
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn stats(&self) -> CanvasStats {
        let mut stats = CanvasStats {
            total_layers: self.layers.len(),
            ..CanvasStats::default()
        };
        let mut bytes = size_of::<Self>();
        for layer in self.layers.values() {
            bytes += size_of::<Layer>() + layer.name.len();
            for stroke in layer.strokes() {
                stats.total_strokes += 1;
                stats.total_points += stroke.len();
                bytes += size_of::<Stroke>()
                    + stroke.len() * size_of::<StrokePoint>()
                    + stroke.id.len()
                    + stroke.brush_id.len();
            }
        }
        stats.estimated_memory_bytes = bytes;
        if stats.total_strokes > 0 {
            stats.average_stroke_length = stats.total_points as f64 / stats.total_strokes as f64;
        }
        stats
    }

    /// Deep structural copy of the semantic data. Render caches are not
    /// copied, so nothing is shared with `self`.
    pub fn snapshot(&self) -> CanvasState {
        CanvasState {
            layers: self
                .layers
                .iter()
                .map(|(id, layer)| (*id, layer.semantic_clone()))
                .collect(),
            active_layer_id: self.active_layer_id,
            width: self.width,
            height: self.height,
            background: self.background,
            view: self.view,
        }
    }

    /// Replace the live state with `snapshot` and rebuild render caches.
    pub fn restore(&mut self, snapshot: CanvasState) {
        *self = snapshot;
        self.rebuild_render_cache();
    }

    /// Rebuild every stroke's curve and render objects from its points.
    pub fn rebuild_render_cache(&mut self) {
        for layer in self.layers.values_mut() {
            layer.rebuild_render_cache();
        }
    }

    /// Check the structural invariants of a loaded canvas.
    pub fn validate(&self) -> EngineResult<()> {
        if self.layers.is_empty() {
            return Err(EngineError::InvalidState("canvas has no layers".into()));
        }
        if !self.layers.contains_key(&self.active_layer_id) {
            return Err(EngineError::InvalidState(format!(
                "active layer {} does not exist",
                self.active_layer_id
            )));
        }
        let mut orders = HashSet::new();
        for (id, layer) in &self.layers {
            if *id != layer.id {
                return Err(EngineError::InvalidState(format!(
                    "layer {} stored under key {}",
                    layer.id, id
                )));
            }
            if !orders.insert(layer.order) {
                return Err(EngineError::InvalidState(format!(
                    "duplicate layer order {}",
                    layer.order
                )));
            }
            if let Some(stroke) = layer.strokes().iter().find(|s| s.is_empty()) {
                return Err(EngineError::InvalidState(format!(
                    "stroke {} has no points",
                    stroke.id
                )));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse, validate and rebuild render objects.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let mut state: CanvasState = serde_json::from_str(json)?;
        state.validate()?;
        state.rebuild_render_cache();
        Ok(state)
    }
}
