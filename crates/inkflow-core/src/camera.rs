//! Zoom/pan view transform stored with the canvas.

use kurbo::Vec2;
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Maps canvas coordinates to screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Translation in screen units.
    pub offset: Vec2,
    /// 1.0 = 100%.
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn new(zoom: f64, offset: Vec2) -> Self {
        Self {
            offset,
            zoom: clamp_zoom(zoom),
        }
    }
}

fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() { zoom.clamp(MIN_ZOOM, MAX_ZOOM) } else { 1.0 }
}
