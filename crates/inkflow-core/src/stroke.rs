//! A single continuous mark from pointer-down to pointer-up.

use crate::brush::BrushSettings;
use crate::color::InkColor;
use crate::dynamics::{self, DynamicsSample};
use crate::path::{Curve, PathBuilder};
use crate::point::StrokePoint;
use crate::render::StrokeRender;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a stroke does to the pixels under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolKind {
    #[default]
    Brush,
    Eraser,
}

/// A drawn stroke.
///
/// `points` is authoritative. `curve` and `render` are caches derived from
/// it and the style fields; they are skipped by serde and by equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stroke {
    pub id: String,
    points: Vec<StrokePoint>,
    pub color: InkColor,
    /// Brush size when the stroke began.
    pub base_width: f64,
    /// Brush opacity when the stroke began.
    pub base_opacity: f64,
    /// Width from the latest sample's dynamics.
    pub width: f64,
    /// Opacity from the latest sample's dynamics.
    pub opacity: f64,
    /// Flow from the latest sample's dynamics. Scales opacity when painted.
    #[serde(default = "full_flow")]
    pub flow: f64,
    pub tool: ToolKind,
    pub brush_id: String,
    completed: bool,
    #[serde(skip)]
    builder: PathBuilder,
    #[serde(skip)]
    render: Option<StrokeRender>,
}

fn full_flow() -> f64 {
    1.0
}

impl PartialEq for Stroke {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.points == other.points
            && self.color == other.color
            && self.base_width == other.base_width
            && self.base_opacity == other.base_opacity
            && self.width == other.width
            && self.opacity == other.opacity
            && self.flow == other.flow
            && self.tool == other.tool
            && self.brush_id == other.brush_id
            && self.completed == other.completed
    }
}

impl Stroke {
    /// Start a stroke at `point` with the given brush.
    pub fn begin(point: StrokePoint, brush: &BrushSettings, color: InkColor, tool: ToolKind) -> Self {
        let sample = dynamics::sample(brush, &point);
        let mut builder = PathBuilder::new();
        builder.push(&point, brush.size);
        Self {
            id: Uuid::new_v4().to_string(),
            points: vec![point],
            color,
            base_width: brush.size,
            base_opacity: brush.opacity,
            width: sample.width,
            opacity: sample.opacity,
            flow: sample.flow,
            tool,
            brush_id: brush.id.clone(),
            completed: false,
            builder,
            render: None,
        }
    }

    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    pub fn last_point(&self) -> Option<&StrokePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// The center-line description. Empty until built for a loaded stroke.
    pub fn curve(&self) -> &Curve {
        self.builder.curve()
    }

    /// Append an already-smoothed sample and its dynamics.
    ///
    /// Refused once the stroke is completed.
    pub fn append(&mut self, point: StrokePoint, sample: DynamicsSample) -> bool {
        if self.completed {
            return false;
        }
        self.builder.push(&point, self.base_width);
        self.points.push(point);
        self.width = sample.width;
        self.opacity = sample.opacity;
        self.flow = sample.flow;
        self.render = None;
        true
    }

    /// Freeze the point list and build the render objects.
    pub fn complete(&mut self) {
        self.completed = true;
        self.rebuild_render();
    }

    /// Cached render objects, if built.
    pub fn render_cached(&self) -> Option<&StrokeRender> {
        self.render.as_ref()
    }

    /// Alpha multiplier applied to the paint: opacity times flow.
    pub fn paint_opacity(&self) -> f64 {
        self.opacity * self.flow
    }

    /// Render objects, building them on first use after a mutation.
    pub fn render(&mut self) -> &StrokeRender {
        if self.builder.len() != self.points.len() {
            self.builder = PathBuilder::from_points(&self.points, self.base_width);
        }
        let (curve, color, width, opacity, tool) =
            (self.builder.curve(), self.color, self.width, self.paint_opacity(), self.tool);
        self.render
            .get_or_insert_with(|| StrokeRender::build(curve, color, width, opacity, tool))
    }

    /// Recompute curve and render objects from the raw point list.
    pub fn rebuild_render(&mut self) {
        self.builder = PathBuilder::from_points(&self.points, self.base_width);
        self.render = Some(StrokeRender::build(
            self.builder.curve(),
            self.color,
            self.width,
            self.paint_opacity(),
            self.tool,
        ));
    }

    /// Structural copy of the semantic data only. Caches are left empty.
    pub fn semantic_clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            points: self.points.clone(),
            color: self.color,
            base_width: self.base_width,
            base_opacity: self.base_opacity,
            width: self.width,
            opacity: self.opacity,
            flow: self.flow,
            tool: self.tool,
            brush_id: self.brush_id.clone(),
            completed: self.completed,
            builder: PathBuilder::new(),
            render: None,
        }
    }

    /// Bounding box of the samples, padded by half the base width.
    pub fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };
        let start = Rect::from_points(first.pos(), first.pos());
        let rect = self
            .points
            .iter()
            .fold(start, |r, p| r.union_pt(p.pos()));
        rect.inflate(self.base_width / 2.0, self.base_width / 2.0)
    }

    /// Center-line length through the raw samples.
    pub fn polyline_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }
}
