//! InkFlow Core Library
//!
//! Freehand drawing engine: turns timestamped, pressure-tagged pointer samples
//! into smoothed vector strokes on layers, with brush dynamics, snapshot
//! undo/redo and a typed event bus. Rendering is left to the host, which
//! receives kurbo paths and peniko paint descriptors.

pub mod brush;
pub mod camera;
pub mod canvas;
pub mod color;
pub mod config;
pub mod dynamics;
pub mod engine;
pub mod error;
pub mod events;
pub mod history;
pub mod layer;
pub mod path;
pub mod point;
pub mod render;
pub mod session;
pub mod stroke;

pub use brush::{BrushCatalog, BrushCategory, BrushSettings, ValidationReport, Violation};
pub use camera::Camera;
pub use canvas::{CanvasState, CanvasStats};
pub use color::InkColor;
pub use config::EngineConfig;
pub use dynamics::{Dynamics, DynamicsModel, DynamicsSample, ResponseCurve};
pub use engine::DrawingEngine;
pub use error::{EngineError, EngineResult};
pub use events::{EngineEvent, EventBus, EventKind, HandlerResult, Subscription};
pub use history::{CanvasSnapshot, HistoryManager};
pub use layer::{Layer, LayerBlend, LayerId};
pub use path::{Curve, CurveSegment, PathBuilder};
pub use point::StrokePoint;
pub use render::{PaintMode, StrokePaint, StrokeRender};
pub use session::DrawingSession;
pub use stroke::{Stroke, ToolKind};
