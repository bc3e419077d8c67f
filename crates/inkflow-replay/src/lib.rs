//! Replays a recorded input script through a [`DrawingEngine`].
//!
//! A script is a JSON document with an optional engine config and a list of
//! operations, each tagged by `op`:
//!
//! ```json
//! { "ops": [
//!     { "op": "start", "x": 0, "y": 0, "pressure": 0.5, "t": 0 },
//!     { "op": "move", "x": 10, "y": 0, "pressure": 0.8, "t": 10 },
//!     { "op": "end" }
//! ] }
//! ```

use inkflow_core::{
    CanvasStats, DrawingEngine, EngineConfig, EngineError, InkColor, LayerId, StrokePoint, ToolKind,
};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::cell::Cell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Script error: {0}")]
    Script(#[from] serde_json::Error),
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("Invalid color '{0}'")]
    InvalidColor(String),
    #[error("No layer named '{0}'")]
    UnknownLayer(String),
}

pub type ReplayResult<T> = Result<T, ReplayError>;

fn default_pressure() -> f64 {
    0.5
}

/// One scripted input or command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptOp {
    Start {
        x: f64,
        y: f64,
        #[serde(default = "default_pressure")]
        pressure: f64,
        t: u64,
    },
    Move {
        x: f64,
        y: f64,
        #[serde(default = "default_pressure")]
        pressure: f64,
        t: u64,
    },
    End,
    Cancel,
    Undo,
    Redo,
    CreateLayer { name: String },
    SelectLayer { name: String },
    LockLayer { name: String, locked: bool },
    ShowLayer { name: String, visible: bool },
    RemoveLayer { name: String },
    ClearLayer,
    ClearCanvas,
    Brush { id: String },
    Size { size: f64 },
    Opacity { opacity: f64 },
    Color { hex: String },
    Tool { tool: ToolKind },
    Resize { width: f64, height: f64 },
    Background { hex: String },
}

/// A replay script.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default, deserialize_with = "config_object")]
    pub config: EngineConfig,
    pub ops: Vec<ScriptOp>,
}

fn config_object<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EngineConfig, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Err(D::Error::custom("config must be a JSON object"));
    }
    EngineConfig::deserialize(value).map_err(D::Error::custom)
}

impl Script {
    pub fn from_json(json: &str) -> ReplayResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> ReplayResult<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    /// Operations the engine accepted.
    pub applied: usize,
    /// Operations the engine refused (guards, duplicates, empty history).
    pub rejected: usize,
    /// Events delivered to the replay's listener.
    pub events: usize,
    pub stats: CanvasStats,
}

/// Run every operation of `script` against a fresh engine.
///
/// Refused operations are counted, not fatal. Malformed operands (bad
/// colors, unknown layer names) abort the replay.
pub fn replay(script: &Script) -> ReplayResult<(DrawingEngine, ReplayReport)> {
    let mut engine = DrawingEngine::new(script.config.clone())?;
    let events = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&events);
    engine.on_any(move |event| {
        log::debug!("{}", event.kind());
        counter.set(counter.get() + 1);
        Ok(())
    });
    engine.initialize();

    let mut applied = 0;
    let mut rejected = 0;
    for op in &script.ops {
        if apply(&mut engine, op)? {
            applied += 1;
        } else {
            log::info!("Rejected {op:?}");
            rejected += 1;
        }
    }
    if engine.end_stroke().is_some() {
        log::warn!("Script ended mid-stroke, stroke committed");
    }

    let report = ReplayReport {
        applied,
        rejected,
        events: events.get(),
        stats: engine.stats(),
    };
    Ok((engine, report))
}

fn apply(engine: &mut DrawingEngine, op: &ScriptOp) -> ReplayResult<bool> {
    let accepted = match op {
        ScriptOp::Start { x, y, pressure, t } => {
            engine.start_stroke(StrokePoint::new(*x, *y, *pressure, *t))
        }
        ScriptOp::Move { x, y, pressure, t } => {
            engine.add_stroke_point(StrokePoint::new(*x, *y, *pressure, *t))
        }
        ScriptOp::End => engine.end_stroke().is_some(),
        ScriptOp::Cancel => engine.cancel_stroke(),
        ScriptOp::Undo => engine.undo(),
        ScriptOp::Redo => engine.redo(),
        ScriptOp::CreateLayer { name } => {
            engine.create_layer(name.as_str());
            true
        }
        ScriptOp::SelectLayer { name } => {
            let id = layer_named(engine, name)?;
            engine.set_active_layer(id)
        }
        ScriptOp::LockLayer { name, locked } => {
            let id = layer_named(engine, name)?;
            engine.set_layer_locked(id, *locked)
        }
        ScriptOp::ShowLayer { name, visible } => {
            let id = layer_named(engine, name)?;
            engine.set_layer_visible(id, *visible)
        }
        ScriptOp::RemoveLayer { name } => {
            let id = layer_named(engine, name)?;
            engine.remove_layer(id)
        }
        ScriptOp::ClearLayer => engine.clear_active_layer(),
        ScriptOp::ClearCanvas => {
            engine.clear_canvas();
            true
        }
        ScriptOp::Brush { id } => engine.select_brush(id),
        ScriptOp::Size { size } => {
            engine.set_brush_size(*size);
            true
        }
        ScriptOp::Opacity { opacity } => {
            engine.set_brush_opacity(*opacity);
            true
        }
        ScriptOp::Color { hex } => {
            engine.set_color(parse_color(hex)?);
            true
        }
        ScriptOp::Tool { tool } => {
            engine.set_tool(*tool);
            true
        }
        ScriptOp::Resize { width, height } => engine.resize(*width, *height),
        ScriptOp::Background { hex } => {
            engine.set_background(parse_color(hex)?);
            true
        }
    };
    Ok(accepted)
}

fn layer_named(engine: &DrawingEngine, name: &str) -> ReplayResult<LayerId> {
    engine
        .layers()
        .iter()
        .find(|l| l.name == name)
        .map(|l| l.id)
        .ok_or_else(|| ReplayError::UnknownLayer(name.to_string()))
}

fn parse_color(hex: &str) -> ReplayResult<InkColor> {
    InkColor::from_hex(hex).ok_or_else(|| ReplayError::InvalidColor(hex.to_string()))
}

/// Write the engine's canvas as JSON.
pub fn write_canvas(engine: &DrawingEngine, path: &Path) -> ReplayResult<()> {
    fs::write(path, engine.save_json()?)?;
    log::info!("Wrote canvas to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkflow_core::CanvasState;
    use std::io::Write;

    const BASIC: &str = r##"{
        "ops": [
            { "op": "color", "hex": "#ff0000" },
            { "op": "start", "x": 0, "y": 0, "pressure": 0.5, "t": 0 },
            { "op": "move", "x": 10, "y": 0, "pressure": 0.8, "t": 10 },
            { "op": "move", "x": 6.5, "y": 0, "t": 12 },
            { "op": "end" },
            { "op": "create_layer", "name": "Top" },
            { "op": "select_layer", "name": "Top" },
            { "op": "start", "x": 5, "y": 5, "t": 100 },
            { "op": "move", "x": 25, "y": 5, "t": 110 },
            { "op": "end" },
            { "op": "undo" },
            { "op": "redo" },
            { "op": "redo" }
        ]
    }"##;

    #[test]
    fn test_replay_counts() {
        let script = Script::from_json(BASIC).unwrap();
        let (engine, report) = replay(&script).unwrap();
        assert_eq!(report.stats.total_strokes, 2);
        assert_eq!(report.stats.total_layers, 2);
        // the 6.5 move lands 0.5 from the smoothed point at 7.0 and the final
        // redo has nothing to redo
        assert_eq!(report.rejected, 2);
        assert_eq!(report.applied, script.ops.len() - 2);
        assert!(report.events > report.applied);
        assert_eq!(engine.active_color(), InkColor::new(255, 0, 0, 255));
    }

    #[test]
    fn test_locked_layer_script() {
        let script = Script::from_json(
            r#"{ "ops": [
                { "op": "lock_layer", "name": "Layer 1", "locked": true },
                { "op": "start", "x": 0, "y": 0, "t": 0 },
                { "op": "end" }
            ] }"#,
        )
        .unwrap();
        let (engine, report) = replay(&script).unwrap();
        assert_eq!(report.rejected, 2);
        assert_eq!(engine.stats().total_strokes, 0);
    }

    #[test]
    fn test_bad_operands_abort() {
        let script = Script::from_json(r#"{ "ops": [ { "op": "color", "hex": "red" } ] }"#).unwrap();
        assert!(matches!(replay(&script), Err(ReplayError::InvalidColor(_))));
        let script = Script::from_json(r#"{ "ops": [ { "op": "select_layer", "name": "x" } ] }"#).unwrap();
        assert!(matches!(replay(&script), Err(ReplayError::UnknownLayer(_))));
        assert!(matches!(Script::from_json(r#"{ "ops": [ { "op": "fly" } ] }"#), Err(ReplayError::Script(_))));
    }

    #[test]
    fn test_unterminated_stroke_is_committed() {
        let script = Script::from_json(
            r#"{ "ops": [ { "op": "start", "x": 0, "y": 0, "t": 0 } ] }"#,
        )
        .unwrap();
        let (engine, _) = replay(&script).unwrap();
        assert!(!engine.is_currently_drawing());
        assert_eq!(engine.stats().total_strokes, 1);
    }

    #[test]
    fn test_script_config_is_used() {
        let script = Script::from_json(
            r#"{ "config": { "default_brush": "pen", "canvas_width": 300 }, "ops": [] }"#,
        )
        .unwrap();
        let (engine, _) = replay(&script).unwrap();
        assert_eq!(engine.active_brush().id, "pen");
        assert_eq!(engine.canvas().width, 300.0);
    }

    #[test]
    fn test_load_and_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("script.json");
        let mut file = fs::File::create(&script_path).unwrap();
        file.write_all(BASIC.as_bytes()).unwrap();

        let script = Script::load(&script_path).unwrap();
        let (engine, _) = replay(&script).unwrap();
        let out = dir.path().join("canvas.json");
        write_canvas(&engine, &out).unwrap();

        let loaded = CanvasState::from_json(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(&loaded, engine.canvas());
    }

    #[test]
    fn test_config_must_be_object() {
        assert!(matches!(
            Script::from_json(r#"{ "config": [], "ops": [] }"#),
            Err(ReplayError::Script(_))
        ));
    }

    #[test]
    fn test_bundled_script() {
        let script = Script::from_json(include_str!("../scripts/two_layers.json")).unwrap();
        let (engine, report) = replay(&script).unwrap();
        assert_eq!(report.stats.total_layers, 2);
        assert_eq!(report.stats.total_strokes, 2);
        assert!(report.rejected >= 2);
        assert!(engine.can_redo());
    }

    #[test]
    fn test_missing_script_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Script::load(&dir.path().join("missing.json")),
            Err(ReplayError::Io(_))
        ));
    }
}
