//! Engine configuration.

use crate::color::InkColor;
use crate::error::{EngineError, EngineResult};
use crate::history::DEFAULT_MAX_HISTORY;
use crate::point::DEFAULT_MIN_POINT_DISTANCE;
use serde::{Deserialize, Serialize};

/// Settings read when an engine is constructed. Missing JSON fields take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_history_size: usize,
    /// Input samples closer than this to the previous one are dropped.
    pub min_point_distance: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub background: InkColor,
    pub default_brush: String,
    pub default_color: InkColor,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_history_size: DEFAULT_MAX_HISTORY,
            min_point_distance: DEFAULT_MIN_POINT_DISTANCE,
            canvas_width: 1024.0,
            canvas_height: 768.0,
            background: InkColor::white(),
            default_brush: "pencil".to_string(),
            default_color: InkColor::black(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON object. Anything other than an object is rejected even
    /// though every field has a default.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(EngineError::Config("config must be a JSON object".into()));
        }
        let config: EngineConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.max_history_size == 0 {
            return Err(EngineError::Config("max_history_size must be at least 1".into()));
        }
        if !self.min_point_distance.is_finite() || self.min_point_distance < 0.0 {
            return Err(EngineError::Config(format!(
                "min_point_distance must be a non-negative number, got {}",
                self.min_point_distance
            )));
        }
        for (field, value) in [("canvas_width", self.canvas_width), ("canvas_height", self.canvas_height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::Config(format!("{field} must be positive, got {value}")));
            }
        }
        Ok(())
    }
}
