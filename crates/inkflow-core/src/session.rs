//! Stroke lifecycle: `Idle` → `Drawing` → `Idle`.
//!
//! The session owns the canvas, its history and the event bus, and is the
//! only place strokes are started, extended and committed.

use crate::brush::BrushSettings;
use crate::canvas::CanvasState;
use crate::color::InkColor;
use crate::dynamics;
use crate::events::{EngineEvent, EventBus};
use crate::history::HistoryManager;
use crate::layer::LayerId;
use crate::path;
use crate::point::StrokePoint;
use crate::stroke::{Stroke, ToolKind};

/// Where the session is in the stroke lifecycle.
#[derive(Debug, Default)]
enum SessionState {
    #[default]
    Idle,
    Drawing {
        stroke: Stroke,
        /// Brush as it was when the stroke began.
        brush: BrushSettings,
        /// Layer the stroke will be committed to.
        layer_id: LayerId,
    },
}

/// The drawing state machine.
#[derive(Debug)]
pub struct DrawingSession {
    canvas: CanvasState,
    history: HistoryManager,
    events: EventBus,
    state: SessionState,
    min_point_distance: f64,
}

impl DrawingSession {
    pub fn new(canvas: CanvasState, history: HistoryManager, min_point_distance: f64) -> Self {
        Self {
            canvas,
            history,
            events: EventBus::new(),
            state: SessionState::Idle,
            min_point_distance,
        }
    }

    pub fn canvas(&self) -> &CanvasState {
        &self.canvas
    }

    /// Direct access for layer and canvas settings. Stroke content should go
    /// through the session methods.
    pub fn canvas_mut(&mut self) -> &mut CanvasState {
        &mut self.canvas
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn emit(&self, event: EngineEvent) {
        self.events.emit(&event);
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, SessionState::Drawing { .. })
    }

    /// The stroke being drawn, if any.
    pub fn current_stroke(&self) -> Option<&Stroke> {
        match &self.state {
            SessionState::Drawing { stroke, .. } => Some(stroke),
            SessionState::Idle => None,
        }
    }

    /// Begin a stroke on the active layer.
    ///
    /// Refused when the active layer is missing or locked. A stroke already
    /// in progress is ended first. The canvas is checkpointed before the new
    /// stroke begins.
    pub fn start_stroke(
        &mut self,
        point: StrokePoint,
        brush: &BrushSettings,
        color: InkColor,
        tool: ToolKind,
    ) -> bool {
        if !self.canvas.can_draw() {
            log::warn!(
                "Cannot start stroke: layer {} is missing or locked",
                self.canvas.active_layer_id()
            );
            return false;
        }
        if self.is_drawing() {
            log::debug!("Stroke started while drawing, ending the current one");
            self.end_stroke();
        }

        let point = StrokePoint { velocity: None, ..point };
        let stroke = Stroke::begin(point, brush, color, tool);
        let layer_id = self.canvas.active_layer_id();
        self.history.checkpoint(&self.canvas);

        let stroke_id = stroke.id.clone();
        log::debug!("Stroke {stroke_id} started on layer {layer_id} with brush {}", brush.id);
        self.state = SessionState::Drawing {
            stroke,
            brush: brush.clone(),
            layer_id,
        };
        self.emit(EngineEvent::StrokeStarted { stroke_id, layer_id });
        true
    }

    /// Append a raw sample to the current stroke.
    ///
    /// Returns false when idle or when the sample is too close to the last
    /// recorded point.
    pub fn add_point(&mut self, raw: StrokePoint) -> bool {
        let SessionState::Drawing { stroke, brush, .. } = &mut self.state else {
            return false;
        };
        let Some(last) = stroke.last_point().copied() else {
            return false;
        };
        if raw.distance_to(&last) < self.min_point_distance {
            return false;
        }

        let point = path::smooth(&last, &raw, brush.smoothing_factor()).with_velocity_from(&last);
        let sample = dynamics::sample(brush, &point);
        if !stroke.append(point, sample) {
            return false;
        }

        let event = EngineEvent::StrokeUpdated {
            stroke_id: stroke.id.clone(),
            point_count: stroke.len(),
        };
        self.emit(event);
        true
    }

    /// Complete the current stroke and commit it to its layer.
    ///
    /// Returns the id of the committed stroke. If the target layer was
    /// removed or locked while drawing, the stroke is dropped.
    pub fn end_stroke(&mut self) -> Option<String> {
        let SessionState::Drawing {
            mut stroke,
            layer_id,
            ..
        } = std::mem::take(&mut self.state)
        else {
            return None;
        };

        stroke.complete();
        let stroke_id = stroke.id.clone();
        let point_count = stroke.len();
        if let Err(dropped) = self.canvas.commit_stroke_to(layer_id, stroke) {
            log::warn!(
                "Dropping stroke {}: layer {layer_id} is missing or locked",
                dropped.id
            );
            return None;
        }

        let stats = self.canvas.stats();
        log::debug!(
            "Stroke {stroke_id} committed ({point_count} points, {} strokes total)",
            stats.total_strokes
        );
        self.emit(EngineEvent::StrokeCompleted {
            stroke_id: stroke_id.clone(),
            layer_id,
            point_count,
        });
        Some(stroke_id)
    }

    /// Discard the current stroke without committing it.
    pub fn cancel_stroke(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            SessionState::Drawing { stroke, .. } => {
                log::debug!("Stroke {} cancelled", stroke.id);
                true
            }
            SessionState::Idle => false,
        }
    }

    /// Checkpoint, then remove every stroke from every layer.
    pub fn clear_canvas(&mut self) -> usize {
        self.end_stroke();
        self.history.checkpoint(&self.canvas);
        let removed = self.canvas.clear_all();
        log::info!("Canvas cleared ({removed} strokes)");
        self.emit(EngineEvent::CanvasCleared { removed });
        removed
    }

    /// Checkpoint, then remove every stroke from the active layer.
    ///
    /// Refused for a locked layer.
    pub fn clear_active_layer(&mut self) -> bool {
        self.end_stroke();
        let layer_id = self.canvas.active_layer_id();
        if !self.canvas.can_draw() {
            log::warn!("Cannot clear layer {layer_id}: missing or locked");
            return false;
        }
        self.history.checkpoint(&self.canvas);
        let removed = self
            .canvas
            .active_layer_mut()
            .map_or(0, |layer| layer.clear());
        self.emit(EngineEvent::LayerCleared { layer_id, removed });
        true
    }

    /// Record the current canvas for undo. Used by destructive layer edits.
    pub fn checkpoint(&mut self) {
        self.history.checkpoint(&self.canvas);
    }

    /// Undo to the previous checkpoint. A stroke in progress is ended first.
    pub fn undo(&mut self) -> bool {
        self.end_stroke();
        if !self.history.undo(&mut self.canvas) {
            return false;
        }
        self.emit(EngineEvent::HistoryUndo);
        true
    }

    /// Redo the last undone step. A stroke in progress is ended first.
    pub fn redo(&mut self) -> bool {
        self.end_stroke();
        if !self.history.redo(&mut self.canvas) {
            return false;
        }
        self.emit(EngineEvent::HistoryRedo);
        true
    }

    /// Replace the whole canvas, dropping any stroke in progress and all
    /// history.
    pub fn replace_canvas(&mut self, mut canvas: CanvasState) {
        self.cancel_stroke();
        canvas.rebuild_render_cache();
        self.canvas = canvas;
        self.history.clear();
        self.emit(EngineEvent::CanvasRestored);
    }
}
