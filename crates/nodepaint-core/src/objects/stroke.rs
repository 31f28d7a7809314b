//! Finished free-drawing stroke payload.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A stroke produced by the external free-drawing brush.
///
/// The brush algorithm (plain, symmetric or eraser) lives outside the core;
/// once a stroke ends the host inserts its polyline here so it can take part
/// in selection, history and serialization like any other object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrokeData {
    /// Sampled points in scene coordinates.
    pub points: Vec<Point>,
    /// Brush width the stroke was drawn with.
    pub width: f64,
    /// True for eraser strokes.
    pub erase: bool,
}

impl StrokeData {
    pub fn new(points: Vec<Point>, width: f64) -> Self {
        Self {
            points,
            width,
            erase: false,
        }
    }

    /// Bounding box of the sampled points (without stroke width).
    pub fn bounds(&self) -> Rect {
        let mut iter = self.points.iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        let mut rect = Rect::new(first.x, first.y, first.x, first.y);
        for p in iter {
            rect.x0 = rect.x0.min(p.x);
            rect.y0 = rect.y0.min(p.y);
            rect.x1 = rect.x1.max(p.x);
            rect.y1 = rect.y1.max(p.y);
        }
        rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let stroke = StrokeData::new(
            vec![
                Point::new(10.0, 20.0),
                Point::new(-5.0, 40.0),
                Point::new(30.0, 0.0),
            ],
            4.0,
        );
        let bounds = stroke.bounds();
        assert!((bounds.x0 + 5.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 0.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 30.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_stroke_bounds() {
        let stroke = StrokeData::default();
        assert_eq!(stroke.bounds(), Rect::ZERO);
    }
}
