//! Input smoothing and incremental curve construction.
//!
//! Raw samples are run through an exponential filter, then chained into
//! quadratic segments whose endpoints are the midpoints between consecutive
//! samples. The sample itself becomes the control point, so the chain is
//! smooth at every join without any tangent estimation.

use crate::point::StrokePoint;
use kurbo::{BezPath, Circle, Point, Shape};
use serde::{Deserialize, Serialize};

/// Flattening tolerance used when a dot is turned into a path.
const DOT_TOLERANCE: f64 = 0.1;

/// Blend `raw` toward `previous` with the exponential filter
/// `previous + (raw - previous) * (1 - smoothing)`.
///
/// Only position is filtered; pressure and timestamp come from `raw`.
pub fn smooth(previous: &StrokePoint, raw: &StrokePoint, smoothing: f64) -> StrokePoint {
    let keep = 1.0 - crate::point::clamp_unit(smoothing);
    StrokePoint {
        x: previous.x + (raw.x - previous.x) * keep,
        y: previous.y + (raw.y - previous.y) * keep,
        ..*raw
    }
}

/// One segment of a stroke outline's center line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CurveSegment {
    Quad { ctrl: Point, end: Point },
    Line { end: Point },
}

/// Backend-neutral description of a stroke's center line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Curve {
    #[default]
    Empty,
    /// A tap: a filled circle.
    Dot { center: Point, radius: f64 },
    Path {
        start: Point,
        segments: Vec<CurveSegment>,
    },
}

impl Curve {
    pub fn is_empty(&self) -> bool {
        matches!(self, Curve::Empty)
    }

    /// Number of segments (a dot counts as none).
    pub fn segment_count(&self) -> usize {
        match self {
            Curve::Path { segments, .. } => segments.len(),
            _ => 0,
        }
    }

    /// Materialize as a kurbo path.
    pub fn to_bez_path(&self) -> BezPath {
        match self {
            Curve::Empty => BezPath::new(),
            Curve::Dot { center, radius } => Circle::new(*center, *radius).to_path(DOT_TOLERANCE),
            Curve::Path { start, segments } => {
                let mut path = BezPath::new();
                path.move_to(*start);
                for segment in segments {
                    match *segment {
                        CurveSegment::Quad { ctrl, end } => path.quad_to(ctrl, end),
                        CurveSegment::Line { end } => path.line_to(end),
                    }
                }
                path
            }
        }
    }
}

/// Builds a [`Curve`] one point at a time.
///
/// Each append touches only the tail of the segment list: the trailing line
/// becomes a quadratic anchored at the previous last point and a new
/// trailing line is added.
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    curve: Curve,
    last: Option<Point>,
    len: usize,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from an already-smoothed point list.
    pub fn from_points(points: &[StrokePoint], brush_size: f64) -> Self {
        let mut builder = Self::new();
        for point in points {
            builder.push(point, brush_size);
        }
        builder
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn into_curve(self) -> Curve {
        self.curve
    }

    /// Append a (smoothed) point.
    ///
    /// `brush_size` is only used for the single-point dot radius.
    pub fn push(&mut self, point: &StrokePoint, brush_size: f64) {
        let p = point.pos();
        self.len += 1;
        let replaced = match (&mut self.curve, self.last) {
            (Curve::Path { segments, .. }, Some(prev)) => {
                segments.pop();
                segments.push(CurveSegment::Quad {
                    ctrl: prev,
                    end: prev.midpoint(p),
                });
                segments.push(CurveSegment::Line { end: p });
                None
            }
            (Curve::Dot { center, .. }, Some(_)) => Some(Curve::Path {
                start: *center,
                segments: vec![CurveSegment::Line { end: p }],
            }),
            _ => Some(Curve::Dot {
                center: p,
                radius: brush_size * point.clamped_pressure() * 0.5,
            }),
        };
        if let Some(curve) = replaced {
            self.curve = curve;
        }
        self.last = Some(p);
    }
}

/// Full (non-incremental) construction, used to cross-check the builder.
pub fn build_curve(points: &[StrokePoint], brush_size: f64) -> Curve {
    match points {
        [] => Curve::Empty,
        [only] => Curve::Dot {
            center: only.pos(),
            radius: brush_size * only.clamped_pressure() * 0.5,
        },
        [first, .., last] => {
            let mut segments = Vec::with_capacity(points.len() - 1);
            for pair in points[1..].windows(2) {
                let ctrl = pair[0].pos();
                segments.push(CurveSegment::Quad {
                    ctrl,
                    end: ctrl.midpoint(pair[1].pos()),
                });
            }
            segments.push(CurveSegment::Line { end: last.pos() });
            Curve::Path {
                start: first.pos(),
                segments,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;

    fn pt(x: f64, y: f64) -> StrokePoint {
        StrokePoint::new(x, y, 0.5, 0)
    }

    #[test]
    fn test_smoothing_blends_toward_previous() {
        let s = smooth(&pt(0.0, 0.0), &pt(10.0, 20.0), 0.25);
        assert!((s.x - 7.5).abs() < 1e-9);
        assert!((s.y - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_smoothing_extremes() {
        let raw = StrokePoint::new(10.0, 10.0, 0.9, 42);
        let passthrough = smooth(&pt(0.0, 0.0), &raw, 0.0);
        assert_eq!(passthrough, raw);
        let frozen = smooth(&pt(0.0, 0.0), &raw, 1.0);
        assert_eq!((frozen.x, frozen.y), (0.0, 0.0));
        assert_eq!(frozen.pressure, 0.9);
        assert_eq!(frozen.timestamp, 42);
    }

    #[test]
    fn test_empty_curve() {
        assert!(build_curve(&[], 10.0).is_empty());
        assert!(PathBuilder::new().curve().is_empty());
        assert_eq!(Curve::Empty.to_bez_path().elements().len(), 0);
    }

    #[test]
    fn test_single_point_is_dot() {
        let curve = build_curve(&[pt(3.0, 4.0)], 10.0);
        assert_eq!(
            curve,
            Curve::Dot {
                center: Point::new(3.0, 4.0),
                radius: 2.5
            }
        );
        assert!(!curve.to_bez_path().elements().is_empty());
    }

    #[test]
    fn test_two_points_is_a_line() {
        let curve = build_curve(&[pt(0.0, 0.0), pt(10.0, 0.0)], 10.0);
        assert_eq!(
            curve,
            Curve::Path {
                start: Point::new(0.0, 0.0),
                segments: vec![CurveSegment::Line {
                    end: Point::new(10.0, 0.0)
                }],
            }
        );
    }

    #[test]
    fn test_midpoint_chain() {
        let points = [pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0)];
        let curve = build_curve(&points, 4.0);
        let Curve::Path { start, segments } = curve else {
            panic!("expected a path");
        };
        assert_eq!(start, Point::new(0.0, 0.0));
        assert_eq!(
            segments,
            vec![
                CurveSegment::Quad {
                    ctrl: Point::new(10.0, 0.0),
                    end: Point::new(10.0, 5.0)
                },
                CurveSegment::Quad {
                    ctrl: Point::new(10.0, 10.0),
                    end: Point::new(5.0, 10.0)
                },
                CurveSegment::Line {
                    end: Point::new(0.0, 10.0)
                },
            ]
        );
    }

    #[test]
    fn test_incremental_matches_full_build() {
        let points: Vec<_> = (0..40)
            .map(|i| {
                let t = f64::from(i) * 0.3;
                pt(t.cos() * 50.0 + t * 4.0, t.sin() * 30.0)
            })
            .collect();
        let mut builder = PathBuilder::new();
        for (i, p) in points.iter().enumerate() {
            builder.push(p, 8.0);
            assert_eq!(builder.curve(), &build_curve(&points[..=i], 8.0));
        }
        assert_eq!(builder.len(), 40);
        assert_eq!(PathBuilder::from_points(&points, 8.0).into_curve(), build_curve(&points, 8.0));
    }

    #[test]
    fn test_bez_path_shape() {
        let points = [pt(0.0, 0.0), pt(10.0, 0.0), pt(20.0, 5.0)];
        let path = build_curve(&points, 4.0).to_bez_path();
        let els = path.elements();
        assert_eq!(els.len(), 3);
        assert!(matches!(els[0], PathEl::MoveTo(_)));
        assert!(matches!(els[1], PathEl::QuadTo(..)));
        assert!(matches!(els[2], PathEl::LineTo(p) if p == Point::new(20.0, 5.0)));
    }
}
