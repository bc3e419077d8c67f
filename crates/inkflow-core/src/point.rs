//! Timestamped, pressure-tagged input samples.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Consecutive samples closer than this are dropped before smoothing.
pub const DEFAULT_MIN_POINT_DISTANCE: f64 = 1.5;

/// One recorded pointer/stylus sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    /// Nominally in [0, 1]; clamped where it is consumed.
    pub pressure: f64,
    /// Milliseconds, host clock.
    pub timestamp: u64,
    /// Units per millisecond relative to the previous recorded sample.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
}

impl StrokePoint {
    pub fn new(x: f64, y: f64, pressure: f64, timestamp: u64) -> Self {
        Self {
            x,
            y,
            pressure,
            timestamp,
            velocity: None,
        }
    }

    /// Position as a kurbo point.
    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Pressure clamped to [0, 1]. NaN reads as zero.
    pub fn clamped_pressure(&self) -> f64 {
        clamp_unit(self.pressure)
    }

    pub fn distance_to(&self, other: &StrokePoint) -> f64 {
        self.pos().distance(other.pos())
    }

    /// Copy of `self` with its velocity derived from `previous`.
    ///
    /// Leaves velocity unset when time did not advance.
    pub fn with_velocity_from(mut self, previous: &StrokePoint) -> Self {
        let dt = self.timestamp.saturating_sub(previous.timestamp);
        self.velocity = if dt == 0 {
            None
        } else {
            Some(self.distance_to(previous) / dt as f64)
        };
        self
    }
}

/// Clamp to [0, 1], mapping NaN to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_from_previous() {
        let a = StrokePoint::new(0.0, 0.0, 0.5, 0);
        let b = StrokePoint::new(30.0, 40.0, 0.5, 10).with_velocity_from(&a);
        assert!((b.velocity.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_velocity_unset_without_time_delta() {
        let a = StrokePoint::new(0.0, 0.0, 0.5, 7);
        let b = StrokePoint::new(3.0, 4.0, 0.5, 7).with_velocity_from(&a);
        assert!(b.velocity.is_none());
    }

    #[test]
    fn test_clamped_pressure() {
        assert_eq!(StrokePoint::new(0.0, 0.0, 1.7, 0).clamped_pressure(), 1.0);
        assert_eq!(StrokePoint::new(0.0, 0.0, -0.2, 0).clamped_pressure(), 0.0);
        assert_eq!(StrokePoint::new(0.0, 0.0, f64::NAN, 0).clamped_pressure(), 0.0);
    }

    #[test]
    fn test_velocity_omitted_from_json_when_unset() {
        let json = serde_json::to_string(&StrokePoint::new(1.0, 2.0, 0.5, 3)).unwrap();
        assert!(!json.contains("velocity"));
        let back: StrokePoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back.velocity, None);
    }
}
