//! Drawable object descriptors.
//!
//! The scene itself is owned by the external renderer; these descriptors are
//! the closed set of drawable kinds the editor creates and mutates. Every
//! kind shares one transform/style payload and adds a kind-specific payload,
//! dispatched by exhaustive matching.

mod image;
mod shape;
mod stroke;
mod text;

pub use image::{ImageData, ImageFormat};
pub use shape::{CircleData, LineData, PathData, RectData, TriangleData};
pub use stroke::StrokeData;
pub use text::{CharSpan, CharStyle, TextboxData, DEFAULT_TEXT};

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::locks::LockSet;
use crate::style::{RgbColor, StyleState};

/// Unique identifier for drawable objects.
pub type ObjectId = Uuid;

/// Shared transform/style payload carried by every drawable kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectCommon {
    pub id: ObjectId,
    /// Top-left origin of the object.
    pub position: Point,
    /// Rotation in degrees.
    pub angle: f64,
    pub stroke: RgbColor,
    pub stroke_alpha: f64,
    pub stroke_width: f64,
    pub fill: RgbColor,
    pub fill_alpha: f64,
    /// Per-axis movement/scaling/rotation restrictions.
    #[serde(default)]
    pub locks: LockSet,
    /// Resize handles shown by the host renderer.
    #[serde(default)]
    pub has_controls: bool,
    /// Selection border shown by the host renderer.
    #[serde(default)]
    pub has_borders: bool,
    /// Whether the per-object remove affordance has been attached.
    #[serde(default)]
    pub removable: bool,
}

impl ObjectCommon {
    /// Build the common payload from the current control values.
    pub fn from_style(position: Point, style: &StyleState) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            angle: 0.0,
            stroke: style.stroke_color,
            // A zero-width stroke renders as fully transparent.
            stroke_alpha: if style.stroke_width == 0.0 {
                0.0
            } else {
                style.stroke_alpha
            },
            stroke_width: style.stroke_width,
            fill: style.fill_color,
            fill_alpha: style.fill_alpha,
            locks: LockSet::default(),
            has_controls: false,
            has_borders: false,
            removable: false,
        }
    }
}

/// Kind-specific payload for each drawable variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ObjectKind {
    /// A finished free-drawing or eraser stroke.
    Stroke(StrokeData),
    Rect(RectData),
    Circle(CircleData),
    Triangle(TriangleData),
    Line(LineData),
    Path(PathData),
    Image(ImageData),
    Textbox(TextboxData),
}

/// One drawable object: shared payload plus kind payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawableObject {
    pub common: ObjectCommon,
    pub kind: ObjectKind,
}

impl DrawableObject {
    pub fn new(common: ObjectCommon, kind: ObjectKind) -> Self {
        Self { common, kind }
    }

    pub fn id(&self) -> ObjectId {
        self.common.id
    }

    /// Stable kind name, used for object-list labels.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ObjectKind::Stroke(_) => "stroke",
            ObjectKind::Rect(_) => "rect",
            ObjectKind::Circle(_) => "circle",
            ObjectKind::Triangle(_) => "triangle",
            ObjectKind::Line(_) => "line",
            ObjectKind::Path(_) => "path",
            ObjectKind::Image(_) => "image",
            ObjectKind::Textbox(_) => "textbox",
        }
    }

    /// Free-drawing output is excluded from style back-propagation.
    pub fn is_free_drawing(&self) -> bool {
        matches!(self.kind, ObjectKind::Stroke(_))
    }

    /// Axis-aligned bounding box in scene coordinates.
    pub fn bounds(&self) -> Rect {
        let p = self.common.position;
        match &self.kind {
            ObjectKind::Stroke(s) => s.bounds().inflate(s.width / 2.0, s.width / 2.0),
            ObjectKind::Rect(r) => Rect::new(p.x, p.y, p.x + r.width, p.y + r.height),
            ObjectKind::Circle(c) => {
                let d = c.radius * 2.0;
                Rect::new(p.x, p.y, p.x + d, p.y + d)
            }
            ObjectKind::Triangle(t) => Rect::new(p.x, p.y, p.x + t.width, p.y + t.height),
            ObjectKind::Line(l) => Rect::new(
                p.x.min(l.end.x),
                p.y.min(l.end.y),
                p.x.max(l.end.x),
                p.y.max(l.end.y),
            ),
            ObjectKind::Path(d) => Rect::new(p.x, p.y, p.x + d.width, p.y + d.height),
            ObjectKind::Image(i) => {
                Rect::new(p.x, p.y, p.x + i.display_width(), p.y + i.display_height())
            }
            ObjectKind::Textbox(t) => {
                let (w, h) = t.approximate_size();
                Rect::new(p.x, p.y, p.x + w, p.y + h)
            }
        }
    }

    /// Move the object by `delta`, honoring its movement locks.
    ///
    /// A line's free endpoint travels with the origin so the segment keeps
    /// its shape.
    pub fn translate(&mut self, delta: Vec2) {
        let dx = if self.common.locks.move_x { 0.0 } else { delta.x };
        let dy = if self.common.locks.move_y { 0.0 } else { delta.y };
        self.common.position.x += dx;
        self.common.position.y += dy;
        if let ObjectKind::Line(l) = &mut self.kind {
            l.end.x += dx;
            l.end.y += dy;
        }
        if let ObjectKind::Stroke(s) = &mut self.kind {
            for point in &mut s.points {
                point.x += dx;
                point.y += dy;
            }
        }
    }
}
