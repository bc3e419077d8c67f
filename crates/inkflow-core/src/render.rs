//! Render descriptors derived from stroke data.
//!
//! The rasterizer is not part of the engine. It receives a [`StrokeRender`]:
//! a kurbo path plus a paint descriptor built on peniko types. Both are
//! caches rebuilt from the point list and never serialized.

use crate::color::InkColor;
use crate::path::Curve;
use crate::stroke::ToolKind;
use kurbo::{BezPath, Cap, Join};
use peniko::{BlendMode, Color, Compose, Mix};

/// How the path is painted.
#[derive(Debug, Clone)]
pub enum PaintMode {
    /// Stroke the center line.
    Stroke(kurbo::Stroke),
    /// Fill the outline (single-point taps).
    Fill,
}

/// Paint/style descriptor for one stroke.
#[derive(Debug, Clone)]
pub struct StrokePaint {
    pub color: Color,
    pub mode: PaintMode,
    pub blend: BlendMode,
}

impl StrokePaint {
    /// Build from stroke attributes. Erasers keep their coverage but
    /// composite as destination-out.
    pub fn new(color: InkColor, width: f64, opacity: f64, tool: ToolKind, curve: &Curve) -> Self {
        let mode = match curve {
            Curve::Dot { .. } => PaintMode::Fill,
            _ => PaintMode::Stroke(
                kurbo::Stroke::new(width)
                    .with_caps(Cap::Round)
                    .with_join(Join::Round),
            ),
        };
        let blend = match tool {
            ToolKind::Brush => BlendMode::from(Mix::Normal),
            ToolKind::Eraser => BlendMode::new(Mix::Normal, Compose::DestOut),
        };
        Self {
            color: color.with_opacity(opacity).into(),
            mode,
            blend,
        }
    }

    /// Stroke width, or `None` for filled taps.
    pub fn width(&self) -> Option<f64> {
        match &self.mode {
            PaintMode::Stroke(style) => Some(style.width),
            PaintMode::Fill => None,
        }
    }
}

/// Everything a rasterizer needs to draw one stroke.
#[derive(Debug, Clone)]
pub struct StrokeRender {
    pub path: BezPath,
    pub paint: StrokePaint,
}

impl StrokeRender {
    pub fn build(curve: &Curve, color: InkColor, width: f64, opacity: f64, tool: ToolKind) -> Self {
        Self {
            path: curve.to_bez_path(),
            paint: StrokePaint::new(color, width, opacity, tool, curve),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::build_curve;
    use crate::point::StrokePoint;

    fn line() -> Curve {
        build_curve(
            &[StrokePoint::new(0.0, 0.0, 1.0, 0), StrokePoint::new(5.0, 5.0, 1.0, 5)],
            4.0,
        )
    }

    #[test]
    fn test_paint_applies_opacity() {
        let paint = StrokePaint::new(InkColor::black(), 3.0, 0.5, ToolKind::Brush, &line());
        assert_eq!(InkColor::from(paint.color).a, 128);
        assert_eq!(paint.width(), Some(3.0));
    }

    #[test]
    fn test_dot_is_filled() {
        let dot = build_curve(&[StrokePoint::new(1.0, 1.0, 1.0, 0)], 4.0);
        let paint = StrokePaint::new(InkColor::black(), 3.0, 1.0, ToolKind::Brush, &dot);
        assert!(matches!(paint.mode, PaintMode::Fill));
        assert_eq!(paint.width(), None);
    }

    #[test]
    fn test_eraser_composes_destination_out() {
        let paint = StrokePaint::new(InkColor::black(), 3.0, 1.0, ToolKind::Eraser, &line());
        assert_eq!(paint.blend, BlendMode::new(Mix::Normal, Compose::DestOut));
    }

    #[test]
    fn test_render_path_follows_curve() {
        let render = StrokeRender::build(&line(), InkColor::black(), 2.0, 1.0, ToolKind::Brush);
        assert_eq!(render.path.elements().len(), 2);
    }
}
