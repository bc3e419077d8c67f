//! Typed publish/subscribe bus for engine state transitions.
//!
//! Delivery is synchronous and in registration order. A handler that returns
//! an error or panics is logged and skipped; the remaining handlers and the
//! emitting operation are unaffected.

use crate::color::InkColor;
use crate::layer::{LayerBlend, LayerId};
use crate::stroke::ToolKind;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

/// Something the engine did.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    StrokeStarted { stroke_id: String, layer_id: LayerId },
    StrokeUpdated { stroke_id: String, point_count: usize },
    StrokeCompleted { stroke_id: String, layer_id: LayerId, point_count: usize },
    LayerCreated { layer_id: LayerId },
    LayerActivated { layer_id: LayerId },
    LayerCleared { layer_id: LayerId, removed: usize },
    LayerRemoved { layer_id: LayerId },
    LayerReordered { layer_id: LayerId, index: usize },
    LayerVisibilityChanged { layer_id: LayerId, visible: bool },
    LayerLockChanged { layer_id: LayerId, locked: bool },
    LayerOpacityChanged { layer_id: LayerId, opacity: f64 },
    LayerBlendChanged { layer_id: LayerId, blend: LayerBlend },
    LayerRenamed { layer_id: LayerId, name: String },
    CanvasResized { width: f64, height: f64 },
    BackgroundChanged { color: InkColor },
    CanvasCleared { removed: usize },
    CanvasRestored,
    HistoryUndo,
    HistoryRedo,
    BrushChanged { brush_id: String },
    ColorChanged { color: InkColor },
    ToolChanged { tool: ToolKind },
    EngineInitialized,
}

/// Discriminant of [`EngineEvent`], used to filter subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StrokeStarted,
    StrokeUpdated,
    StrokeCompleted,
    LayerCreated,
    LayerActivated,
    LayerCleared,
    LayerRemoved,
    LayerReordered,
    LayerVisibilityChanged,
    LayerLockChanged,
    LayerOpacityChanged,
    LayerBlendChanged,
    LayerRenamed,
    CanvasResized,
    BackgroundChanged,
    CanvasCleared,
    CanvasRestored,
    HistoryUndo,
    HistoryRedo,
    BrushChanged,
    ColorChanged,
    ToolChanged,
    EngineInitialized,
}

impl EventKind {
    /// Stable wire name, e.g. `"stroke:started"`.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::StrokeStarted => "stroke:started",
            EventKind::StrokeUpdated => "stroke:updated",
            EventKind::StrokeCompleted => "stroke:completed",
            EventKind::LayerCreated => "layer:created",
            EventKind::LayerActivated => "layer:activated",
            EventKind::LayerCleared => "layer:cleared",
            EventKind::LayerRemoved => "layer:removed",
            EventKind::LayerReordered => "layer:reordered",
            EventKind::LayerVisibilityChanged => "layer:visibility-changed",
            EventKind::LayerLockChanged => "layer:lock-changed",
            EventKind::LayerOpacityChanged => "layer:opacity-changed",
            EventKind::LayerBlendChanged => "layer:blend-changed",
            EventKind::LayerRenamed => "layer:renamed",
            EventKind::CanvasResized => "canvas:resized",
            EventKind::BackgroundChanged => "canvas:background-changed",
            EventKind::CanvasCleared => "canvas:cleared",
            EventKind::CanvasRestored => "canvas:restored",
            EventKind::HistoryUndo => "history:undo",
            EventKind::HistoryRedo => "history:redo",
            EventKind::BrushChanged => "brush:changed",
            EventKind::ColorChanged => "color:changed",
            EventKind::ToolChanged => "tool:changed",
            EventKind::EngineInitialized => "engine:initialized",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EngineEvent::StrokeStarted { .. } => EventKind::StrokeStarted,
            EngineEvent::StrokeUpdated { .. } => EventKind::StrokeUpdated,
            EngineEvent::StrokeCompleted { .. } => EventKind::StrokeCompleted,
            EngineEvent::LayerCreated { .. } => EventKind::LayerCreated,
            EngineEvent::LayerActivated { .. } => EventKind::LayerActivated,
            EngineEvent::LayerCleared { .. } => EventKind::LayerCleared,
            EngineEvent::LayerRemoved { .. } => EventKind::LayerRemoved,
            EngineEvent::LayerReordered { .. } => EventKind::LayerReordered,
            EngineEvent::LayerVisibilityChanged { .. } => EventKind::LayerVisibilityChanged,
            EngineEvent::LayerLockChanged { .. } => EventKind::LayerLockChanged,
            EngineEvent::LayerOpacityChanged { .. } => EventKind::LayerOpacityChanged,
            EngineEvent::LayerBlendChanged { .. } => EventKind::LayerBlendChanged,
            EngineEvent::LayerRenamed { .. } => EventKind::LayerRenamed,
            EngineEvent::CanvasResized { .. } => EventKind::CanvasResized,
            EngineEvent::BackgroundChanged { .. } => EventKind::BackgroundChanged,
            EngineEvent::CanvasCleared { .. } => EventKind::CanvasCleared,
            EngineEvent::CanvasRestored => EventKind::CanvasRestored,
            EngineEvent::HistoryUndo => EventKind::HistoryUndo,
            EngineEvent::HistoryRedo => EventKind::HistoryRedo,
            EngineEvent::BrushChanged { .. } => EventKind::BrushChanged,
            EngineEvent::ColorChanged { .. } => EventKind::ColorChanged,
            EngineEvent::ToolChanged { .. } => EventKind::ToolChanged,
            EngineEvent::EngineInitialized => EventKind::EngineInitialized,
        }
    }
}

/// What a handler returns. Errors are logged by the bus.
pub type HandlerResult = Result<(), Box<dyn std::error::Error>>;

type Handler = Rc<dyn Fn(&EngineEvent) -> HandlerResult>;

struct Entry {
    id: u64,
    filter: Option<EventKind>,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Entry>,
}

impl Registry {
    fn insert(&mut self, filter: Option<EventKind>, handler: Handler) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry { id, filter, handler });
        id
    }
}

/// Handle returned by [`EventBus::on`]. Dropping it keeps the handler
/// registered; call [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    /// Remove the handler. Returns false if it was already gone or the bus
    /// has been dropped.
    pub fn unsubscribe(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registry = registry.borrow_mut();
        let before = registry.entries.len();
        registry.entries.retain(|e| e.id != self.id);
        registry.entries.len() != before
    }
}

/// Single-threaded event bus.
#[derive(Default)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.handler_count()))
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one kind of event.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&EngineEvent) -> HandlerResult + 'static,
    {
        self.subscribe(Some(kind), Rc::new(handler))
    }

    /// Subscribe to every event.
    pub fn on_any<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&EngineEvent) -> HandlerResult + 'static,
    {
        self.subscribe(None, Rc::new(handler))
    }

    fn subscribe(&self, filter: Option<EventKind>, handler: Handler) -> Subscription {
        let id = self.registry.borrow_mut().insert(filter, handler);
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn handler_count(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    /// Deliver `event` to matching handlers and return how many ran
    /// successfully.
    ///
    /// Handlers are collected before delivery, so a handler may subscribe
    /// or unsubscribe without affecting the current emission.
    pub fn emit(&self, event: &EngineEvent) -> usize {
        let kind = event.kind();
        let handlers: Vec<Handler> = self
            .registry
            .borrow()
            .entries
            .iter()
            .filter(|e| e.filter.is_none_or(|k| k == kind))
            .map(|e| Rc::clone(&e.handler))
            .collect();

        let mut delivered = 0;
        for handler in handlers {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(err)) => log::error!("Handler for {kind} failed: {err}"),
                Err(payload) => {
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    log::error!("Handler for {kind} panicked: {message}");
                }
            }
        }
        delivered
    }
}
