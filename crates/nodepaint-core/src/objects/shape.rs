//! Primitive shape payloads.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle extent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RectData {
    pub width: f64,
    pub height: f64,
}

/// Circle payload. The common position is the top-left of the bounding
/// square, so the center sits at `position + (radius, radius)`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CircleData {
    pub radius: f64,
}

/// Isosceles triangle extent, apex at the top edge midpoint.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TriangleData {
    pub width: f64,
    pub height: f64,
}

/// Straight line segment. The common position is the fixed endpoint; `end`
/// is the free endpoint the drag gesture moves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LineData {
    pub end: Point,
}

/// Freeform path payload: renderer path data plus its cached extent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathData {
    /// SVG-style path commands, interpreted by the external renderer.
    pub data: String,
    pub width: f64,
    pub height: f64,
}
