//! The drawing engine: the one object a host talks to.

use crate::brush::{BrushCatalog, BrushSettings};
use crate::camera::Camera;
use crate::canvas::{CanvasState, CanvasStats};
use crate::color::InkColor;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::events::{EngineEvent, EventKind, HandlerResult, Subscription};
use crate::history::HistoryManager;
use crate::layer::{Layer, LayerBlend, LayerId};
use crate::point::StrokePoint;
use crate::session::DrawingSession;
use crate::stroke::{Stroke, ToolKind};
use kurbo::Vec2;

/// A drawing engine instance.
///
/// Construct one per drawing surface. Input is ignored until
/// [`initialize`](Self::initialize) has been called.
#[derive(Debug)]
pub struct DrawingEngine {
    config: EngineConfig,
    session: DrawingSession,
    brush: BrushSettings,
    color: InkColor,
    tool: ToolKind,
    ready: bool,
}

impl DrawingEngine {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let brush = BrushCatalog::builtin()
            .get_by_id(&config.default_brush)
            .cloned()
            .ok_or_else(|| EngineError::Config(format!("unknown brush '{}'", config.default_brush)))?;
        let canvas = CanvasState::new(config.canvas_width, config.canvas_height, config.background);
        let session = DrawingSession::new(
            canvas,
            HistoryManager::new(config.max_history_size),
            config.min_point_distance,
        );
        Ok(Self {
            color: config.default_color,
            config,
            session,
            brush,
            tool: ToolKind::Brush,
            ready: false,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Mark the engine ready for input. Returns false if it already was.
    pub fn initialize(&mut self) -> bool {
        if self.ready {
            return false;
        }
        self.ready = true;
        log::info!(
            "Drawing engine ready ({}x{}, brush {})",
            self.config.canvas_width,
            self.config.canvas_height,
            self.brush.id
        );
        self.session.emit(EngineEvent::EngineInitialized);
        true
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    // --- Input ---

    pub fn start_stroke(&mut self, point: StrokePoint) -> bool {
        if !self.ready {
            log::warn!("Ignoring stroke start: engine not initialized");
            return false;
        }
        self.session.start_stroke(point, &self.brush, self.color, self.tool)
    }

    pub fn add_stroke_point(&mut self, point: StrokePoint) -> bool {
        self.session.add_point(point)
    }

    pub fn end_stroke(&mut self) -> Option<String> {
        self.session.end_stroke()
    }

    pub fn cancel_stroke(&mut self) -> bool {
        self.session.cancel_stroke()
    }

    // --- Canvas and layers ---

    /// Returns false for non-positive or non-finite sizes.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            log::warn!("Ignoring resize to {width}x{height}");
            return false;
        }
        self.session.canvas_mut().resize(width, height);
        self.session.emit(EngineEvent::CanvasResized { width, height });
        true
    }

    pub fn set_background(&mut self, color: InkColor) {
        self.session.canvas_mut().background = color;
        self.session.emit(EngineEvent::BackgroundChanged { color });
    }

    /// Set zoom and pan. Zoom is clamped to the camera's range.
    pub fn set_view(&mut self, zoom: f64, pan: Vec2) {
        self.session.canvas_mut().view = Camera::new(zoom, pan);
    }

    /// Add a layer on top. The active layer does not change.
    pub fn create_layer(&mut self, name: impl Into<String>) -> LayerId {
        let layer_id = self.session.canvas_mut().create_layer(name);
        self.session.emit(EngineEvent::LayerCreated { layer_id });
        layer_id
    }

    /// Remove a layer. The removal can be undone.
    pub fn remove_layer(&mut self, layer_id: LayerId) -> bool {
        let canvas = self.session.canvas();
        if canvas.layer(layer_id).is_none() || canvas.layer_count() <= 1 {
            log::warn!("Cannot remove layer {layer_id}");
            return false;
        }
        self.session.checkpoint();
        self.session.canvas_mut().remove_layer(layer_id);
        self.session.emit(EngineEvent::LayerRemoved { layer_id });
        true
    }

    pub fn set_active_layer(&mut self, layer_id: LayerId) -> bool {
        if !self.session.canvas_mut().set_active_layer(layer_id) {
            log::warn!("Cannot activate unknown layer {layer_id}");
            return false;
        }
        self.session.emit(EngineEvent::LayerActivated { layer_id });
        true
    }

    pub fn reorder_layer(&mut self, layer_id: LayerId, index: usize) -> bool {
        if !self.session.canvas_mut().reorder_layer(layer_id, index) {
            return false;
        }
        self.session.emit(EngineEvent::LayerReordered { layer_id, index });
        true
    }

    pub fn set_layer_visible(&mut self, layer_id: LayerId, visible: bool) -> bool {
        if !self.session.canvas_mut().set_layer_visible(layer_id, visible) {
            return false;
        }
        self.session.emit(EngineEvent::LayerVisibilityChanged { layer_id, visible });
        true
    }

    pub fn set_layer_locked(&mut self, layer_id: LayerId, locked: bool) -> bool {
        if !self.session.canvas_mut().set_layer_locked(layer_id, locked) {
            return false;
        }
        self.session.emit(EngineEvent::LayerLockChanged { layer_id, locked });
        true
    }

    /// Opacity is clamped to [0, 1]; the event carries the stored value.
    pub fn set_layer_opacity(&mut self, layer_id: LayerId, opacity: f64) -> bool {
        let canvas = self.session.canvas_mut();
        if !canvas.set_layer_opacity(layer_id, opacity) {
            return false;
        }
        let opacity = canvas.layer(layer_id).map_or(opacity, |l| l.opacity);
        self.session.emit(EngineEvent::LayerOpacityChanged { layer_id, opacity });
        true
    }

    pub fn set_layer_blend(&mut self, layer_id: LayerId, blend: LayerBlend) -> bool {
        if !self.session.canvas_mut().set_layer_blend(layer_id, blend) {
            return false;
        }
        self.session.emit(EngineEvent::LayerBlendChanged { layer_id, blend });
        true
    }

    pub fn rename_layer(&mut self, layer_id: LayerId, name: impl Into<String>) -> bool {
        let name = name.into();
        if !self.session.canvas_mut().rename_layer(layer_id, name.clone()) {
            return false;
        }
        log::debug!("Renamed layer {layer_id} to {name:?}");
        self.session.emit(EngineEvent::LayerRenamed { layer_id, name });
        true
    }

    pub fn clear_active_layer(&mut self) -> bool {
        self.session.clear_active_layer()
    }

    /// Returns the number of strokes removed.
    pub fn clear_canvas(&mut self) -> usize {
        self.session.clear_canvas()
    }

    // --- Brush ---

    /// Switch to a catalog brush. Unknown ids leave the brush unchanged.
    pub fn select_brush(&mut self, id: &str) -> bool {
        let Some(brush) = BrushCatalog::builtin().get_by_id(id) else {
            log::warn!("Unknown brush '{id}'");
            return false;
        };
        self.brush = brush.clone();
        self.emit_brush_changed();
        true
    }

    pub fn set_color(&mut self, color: InkColor) {
        self.color = color;
        self.session.emit(EngineEvent::ColorChanged { color });
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool = tool;
        self.session.emit(EngineEvent::ToolChanged { tool });
    }

    /// Clamped to [1, 100].
    pub fn set_brush_size(&mut self, size: f64) {
        self.brush = self.brush.with_size(size);
        self.emit_brush_changed();
    }

    /// Clamped to [0, 1].
    pub fn set_brush_opacity(&mut self, opacity: f64) {
        self.brush = self.brush.with_opacity(opacity);
        self.emit_brush_changed();
    }

    fn emit_brush_changed(&self) {
        self.session.emit(EngineEvent::BrushChanged {
            brush_id: self.brush.id.clone(),
        });
    }

    // --- Queries ---

    pub fn current_stroke(&self) -> Option<&Stroke> {
        self.session.current_stroke()
    }

    pub fn is_currently_drawing(&self) -> bool {
        self.session.is_drawing()
    }

    pub fn active_brush(&self) -> &BrushSettings {
        &self.brush
    }

    pub fn active_color(&self) -> InkColor {
        self.color
    }

    pub fn active_tool(&self) -> ToolKind {
        self.tool
    }

    pub fn canvas(&self) -> &CanvasState {
        self.session.canvas()
    }

    /// Layers from bottom to top.
    pub fn layers(&self) -> Vec<&Layer> {
        self.session.canvas().layers_ordered()
    }

    pub fn stats(&self) -> CanvasStats {
        self.session.canvas().stats()
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.session.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.session.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.history().can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.session.history().len()
    }

    // --- Subscriptions ---

    pub fn on<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&EngineEvent) -> HandlerResult + 'static,
    {
        self.session.events().on(kind, handler)
    }

    pub fn on_any<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&EngineEvent) -> HandlerResult + 'static,
    {
        self.session.events().on_any(handler)
    }

    // --- Persistence ---

    /// Serialize the committed canvas. A stroke in progress is not included.
    pub fn save_json(&self) -> EngineResult<String> {
        self.session.canvas().to_json()
    }

    /// Replace the canvas with a saved one. History is cleared.
    pub fn load_json(&mut self, json: &str) -> EngineResult<()> {
        let canvas = CanvasState::from_json(json)?;
        log::info!(
            "Loaded canvas with {} layers, {} strokes",
            canvas.layer_count(),
            canvas.stats().total_strokes
        );
        self.session.replace_canvas(canvas);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine() -> DrawingEngine {
        let mut engine = DrawingEngine::new(EngineConfig::default()).unwrap();
        engine.initialize();
        engine
    }

    fn p(x: f64, y: f64, t: u64) -> StrokePoint {
        StrokePoint::new(x, y, 0.5, t)
    }

    #[test]
    fn test_unknown_default_brush_is_config_error() {
        let config = EngineConfig {
            default_brush: "crayon".into(),
            ..EngineConfig::default()
        };
        assert!(matches!(DrawingEngine::new(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_input_ignored_before_initialize() {
        let mut engine = DrawingEngine::new(EngineConfig::default()).unwrap();
        assert!(!engine.is_ready());
        assert!(!engine.start_stroke(p(0.0, 0.0, 0)));
        assert!(engine.initialize());
        assert!(!engine.initialize());
        assert!(engine.start_stroke(p(0.0, 0.0, 0)));
    }

    #[test]
    fn test_brush_setters_clamp() {
        let mut engine = engine();
        engine.set_brush_size(500.0);
        assert_eq!(engine.active_brush().size, 100.0);
        engine.set_brush_size(0.0);
        assert_eq!(engine.active_brush().size, 1.0);
        engine.set_brush_opacity(2.0);
        assert_eq!(engine.active_brush().opacity, 1.0);
        assert!(!engine.select_brush("crayon"));
        assert!(engine.select_brush("marker"));
        assert_eq!(engine.active_brush().id, "marker");
    }

    #[test]
    fn test_stroke_uses_active_color_and_tool() {
        let mut engine = engine();
        let red = InkColor::new(255, 0, 0, 255);
        engine.set_color(red);
        engine.set_tool(ToolKind::Eraser);
        engine.start_stroke(p(0.0, 0.0, 0));
        let stroke = engine.current_stroke().unwrap();
        assert_eq!(stroke.color, red);
        assert_eq!(stroke.tool, ToolKind::Eraser);
        assert_eq!(stroke.brush_id, "pencil");
    }

    #[test]
    fn test_layer_events() {
        let mut engine = engine();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        engine.on_any(move |e| {
            sink.borrow_mut().push(e.kind());
            Ok(())
        });
        let b = engine.create_layer("B");
        engine.set_active_layer(b);
        engine.set_layer_visible(b, false);
        engine.set_layer_locked(b, true);
        assert!(!engine.set_active_layer(LayerId::new()));
        assert_eq!(
            *log.borrow(),
            vec![
                EventKind::LayerCreated,
                EventKind::LayerActivated,
                EventKind::LayerVisibilityChanged,
                EventKind::LayerLockChanged,
            ]
        );
    }

    #[test]
    fn test_layer_property_setters() {
        let mut engine = engine();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        engine.on_any(move |e| {
            sink.borrow_mut().push(e.clone());
            Ok(())
        });
        let id = engine.canvas().active_layer_id();
        assert!(engine.set_layer_opacity(id, -0.5));
        assert!(engine.set_layer_blend(id, LayerBlend::Screen));
        assert!(engine.rename_layer(id, "Inks"));

        let layer = engine.canvas().layer(id).unwrap();
        assert_eq!(layer.opacity, 0.0);
        assert_eq!(layer.blend, LayerBlend::Screen);
        assert_eq!(layer.name, "Inks");
        assert_eq!(
            *log.borrow(),
            vec![
                EngineEvent::LayerOpacityChanged { layer_id: id, opacity: 0.0 },
                EngineEvent::LayerBlendChanged { layer_id: id, blend: LayerBlend::Screen },
                EngineEvent::LayerRenamed { layer_id: id, name: "Inks".into() },
            ]
        );
    }

    #[test]
    fn test_layer_setters_ignore_unknown_layer() {
        let mut engine = engine();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        engine.on_any(move |_| {
            *sink.borrow_mut() += 1;
            Ok(())
        });
        let ghost = LayerId::new();
        assert!(!engine.set_layer_opacity(ghost, 0.5));
        assert!(!engine.set_layer_blend(ghost, LayerBlend::Darken));
        assert!(!engine.rename_layer(ghost, "ghost"));
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_remove_layer_is_undoable() {
        let mut engine = engine();
        let b = engine.create_layer("B");
        assert!(engine.remove_layer(b));
        assert_eq!(engine.layers().len(), 1);
        assert!(engine.undo());
        assert_eq!(engine.layers().len(), 2);
        let only = engine.canvas().active_layer_id();
        assert!(engine.remove_layer(b));
        assert!(!engine.remove_layer(only));
    }

    #[test]
    fn test_resize_and_view() {
        let mut engine = engine();
        assert!(!engine.resize(0.0, 10.0));
        assert!(engine.resize(800.0, 600.0));
        assert_eq!(engine.canvas().width, 800.0);
        engine.set_view(50.0, Vec2::new(3.0, 4.0));
        assert_eq!(engine.canvas().view.zoom, crate::camera::MAX_ZOOM);
    }

    #[test]
    fn test_load_clears_history() {
        let mut engine = engine();
        engine.start_stroke(p(0.0, 0.0, 0));
        engine.add_stroke_point(p(10.0, 10.0, 10));
        engine.end_stroke();
        let json = engine.save_json().unwrap();

        let mut other = self::engine();
        let restored = Rc::new(RefCell::new(0));
        let r = Rc::clone(&restored);
        other.on(EventKind::CanvasRestored, move |_| {
            *r.borrow_mut() += 1;
            Ok(())
        });
        other.start_stroke(p(0.0, 0.0, 0));
        other.load_json(&json).unwrap();
        assert!(!other.is_currently_drawing());
        assert!(!other.can_undo());
        assert_eq!(other.stats().total_strokes, 1);
        assert_eq!(*restored.borrow(), 1);
        assert_eq!(other.canvas(), engine.canvas());
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let mut engine = engine();
        assert!(engine.load_json("nope").is_err());
        assert_eq!(engine.layers().len(), 1);
    }
}
