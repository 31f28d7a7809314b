//! Tool selection and the draw/select interaction state machine.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::objects::{
    CircleData, DrawableObject, LineData, ObjectCommon, ObjectId, ObjectKind, PathData, RectData,
    TextboxData, TriangleData,
};
use crate::style::StyleState;

/// Available tools. `Select` is the "no tool" state used while browsing the
/// object list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Brush,
    SymmetryBrush,
    Erase,
    Rect,
    Circle,
    Triangle,
    Line,
    Image,
    Textbox,
    Select,
}

impl ToolKind {
    /// Continuous-stroke tools handled by the external brush.
    pub fn is_free_drawing(&self) -> bool {
        matches!(
            self,
            ToolKind::Brush | ToolKind::SymmetryBrush | ToolKind::Erase
        )
    }

    /// One-shot click-to-place, drag-to-size tools.
    pub fn is_shape(&self) -> bool {
        matches!(
            self,
            ToolKind::Rect | ToolKind::Circle | ToolKind::Triangle | ToolKind::Line
        )
    }

    /// Tools that insert an object immediately instead of arming a drag.
    pub fn is_insert(&self) -> bool {
        matches!(self, ToolKind::Image | ToolKind::Textbox)
    }

    /// Whether the canvas drawing flag stays engaged after pointer-up.
    pub fn keeps_continuous(&self) -> bool {
        self.is_free_drawing() || self.is_insert()
    }
}

/// Builds a fresh drawable descriptor for a one-shot placement gesture.
pub struct ShapeFactory;

impl ShapeFactory {
    /// Create the descriptor for `tool` at the pointer origin, styled from
    /// the current control values. Returns `None` for tools that do not
    /// place a shape this way.
    pub fn create(tool: ToolKind, origin: Point, style: &StyleState) -> Option<DrawableObject> {
        let kind = match tool {
            ToolKind::Rect => ObjectKind::Rect(RectData::default()),
            ToolKind::Circle => ObjectKind::Circle(CircleData { radius: 1.0 }),
            ToolKind::Triangle => ObjectKind::Triangle(TriangleData::default()),
            ToolKind::Line => ObjectKind::Line(LineData { end: origin }),
            _ => return None,
        };
        Some(DrawableObject::new(
            ObjectCommon::from_style(origin, style),
            kind,
        ))
    }

    /// Create a freeform path descriptor from renderer path data.
    pub fn create_path(
        origin: Point,
        data: String,
        width: f64,
        height: f64,
        style: &StyleState,
    ) -> DrawableObject {
        let mut common = ObjectCommon::from_style(origin, style);
        // Paths carry no fill, only their stroke.
        common.fill_alpha = 0.0;
        DrawableObject::new(
            common,
            ObjectKind::Path(PathData {
                data,
                width,
                height,
            }),
        )
    }

    /// Create a textbox at the pointer origin with placeholder content.
    ///
    /// Textboxes always start with a hairline stroke; the caller mirrors
    /// that width back into the controls.
    pub fn create_textbox(origin: Point, style: &StyleState) -> DrawableObject {
        let mut common = ObjectCommon::from_style(origin, style);
        common.stroke_width = 1.0;
        common.stroke_alpha = style.stroke_alpha;
        DrawableObject::new(
            common,
            ObjectKind::Textbox(TextboxData::new(crate::objects::DEFAULT_TEXT)),
        )
    }
}

/// An in-flight one-shot placement: the armed shape and the pointer origin
/// the drag-resize math is anchored to.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub origin: Point,
    pub id: ObjectId,
}

/// The interaction state machine.
///
/// Two top-level states, Draw and Select, with the active tool as substate.
/// `drawing` and `selecting` are never both true.
#[derive(Debug, Clone, Default)]
pub struct ToolModeController {
    active: ToolKind,
    drawing: bool,
    selecting: bool,
    /// Whether the external canvas is in continuous-stroke mode.
    continuous: bool,
    placement: Option<Placement>,
}

impl ToolModeController {
    pub fn new() -> Self {
        Self {
            active: ToolKind::Brush,
            drawing: true,
            selecting: false,
            continuous: true,
            placement: None,
        }
    }

    pub fn active(&self) -> ToolKind {
        self.active
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    /// Whether the external canvas currently runs the free-drawing brush.
    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    /// Change the active tool while staying in the current top-level state.
    pub fn set_active(&mut self, tool: ToolKind) {
        self.active = tool;
        match tool {
            t if t.is_free_drawing() => {
                self.continuous = true;
                self.drawing = true;
                self.selecting = false;
            }
            t if t.is_insert() => {
                self.continuous = false;
                self.drawing = false;
            }
            ToolKind::Select => {
                self.continuous = false;
                self.drawing = false;
            }
            // Shape tools arm a one-shot placement.
            _ => {
                self.continuous = false;
                self.drawing = true;
                self.selecting = false;
            }
        }
    }

    /// Enter Select mode: disengage drawing entirely.
    pub fn enter_select(&mut self) {
        self.selecting = true;
        self.drawing = false;
        self.continuous = false;
        self.placement = None;
    }

    /// Enter Draw mode, re-arming the active tool.
    pub fn enter_draw(&mut self) {
        self.selecting = false;
        self.drawing = true;
        self.continuous = self.active.keeps_continuous();
    }

    /// Pointer-down while drawing engages the canvas drawing flag.
    pub fn engage(&mut self) {
        self.continuous = self.drawing;
    }

    pub fn begin_placement(&mut self, origin: Point, id: ObjectId) {
        self.placement = Some(Placement { origin, id });
    }

    /// Finish the gesture. The canvas drawing flag stays on only for the
    /// continuous and insert tools.
    pub fn end_gesture(&mut self) {
        self.placement = None;
        if !self.active.keeps_continuous() {
            self.continuous = false;
        }
    }

    /// Suppress the drawing flag while an existing object is manipulated.
    pub fn suspend_continuous(&mut self) {
        self.continuous = false;
    }
}

/// Drag-resize math for an armed one-shot placement.
///
/// If the pointer crosses left of the recorded origin, the left edge tracks
/// the pointer; same for the top edge. A circle's radius is half the larger
/// pointer delta, reduced by half the stroke width once it exceeds the
/// stroke width so the stroke cannot dominate a tiny shape. A line updates
/// its free endpoint directly.
pub fn resize_placement(object: &mut DrawableObject, origin: Point, pointer: Point) {
    if origin.x > pointer.x {
        object.common.position.x = pointer.x;
    }
    if origin.y > pointer.y {
        object.common.position.y = pointer.y;
    }
    let stroke_width = object.common.stroke_width;
    match &mut object.kind {
        ObjectKind::Circle(circle) => {
            let mut radius = (origin.y - pointer.y)
                .abs()
                .max((origin.x - pointer.x).abs())
                / 2.0;
            if radius > stroke_width {
                radius -= stroke_width / 2.0;
            }
            circle.radius = radius;
        }
        ObjectKind::Line(line) => {
            line.end = pointer;
        }
        ObjectKind::Rect(rect) => {
            rect.width = (origin.x - pointer.x).abs();
            rect.height = (origin.y - pointer.y).abs();
        }
        ObjectKind::Triangle(triangle) => {
            triangle.width = (origin.x - pointer.x).abs();
            triangle.height = (origin.y - pointer.y).abs();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleState;

    #[test]
    fn test_default_state_is_brush_drawing() {
        let tools = ToolModeController::new();
        assert_eq!(tools.active(), ToolKind::Brush);
        assert!(tools.is_drawing());
        assert!(!tools.is_selecting());
        assert!(tools.is_continuous());
    }

    #[test]
    fn test_drawing_and_selecting_exclusive() {
        let mut tools = ToolModeController::new();
        tools.enter_select();
        assert!(tools.is_selecting() && !tools.is_drawing());
        tools.enter_draw();
        assert!(tools.is_drawing() && !tools.is_selecting());
    }

    #[test]
    fn test_shape_tool_arms_one_shot() {
        let mut tools = ToolModeController::new();
        tools.set_active(ToolKind::Rect);
        assert!(tools.is_drawing());
        assert!(!tools.is_continuous());
        tools.engage();
        assert!(tools.is_continuous());
        tools.end_gesture();
        assert!(!tools.is_continuous());
    }

    #[test]
    fn test_brush_survives_pointer_up() {
        let mut tools = ToolModeController::new();
        tools.set_active(ToolKind::Brush);
        tools.engage();
        tools.end_gesture();
        assert!(tools.is_continuous());
    }

    #[test]
    fn test_factory_creates_shapes() {
        let style = StyleState::default();
        let origin = Point::new(10.0, 20.0);
        for tool in [
            ToolKind::Rect,
            ToolKind::Circle,
            ToolKind::Triangle,
            ToolKind::Line,
        ] {
            let object = ShapeFactory::create(tool, origin, &style).unwrap();
            assert!((object.common.position.x - 10.0).abs() < f64::EPSILON);
            assert!((object.common.angle - 0.0).abs() < f64::EPSILON);
        }
        assert!(ShapeFactory::create(ToolKind::Brush, origin, &style).is_none());
        assert!(ShapeFactory::create(ToolKind::Select, origin, &style).is_none());
    }

    #[test]
    fn test_resize_tie_break_grows_left() {
        let style = StyleState::default();
        let origin = Point::new(100.0, 100.0);
        let mut object = ShapeFactory::create(ToolKind::Rect, origin, &style).unwrap();

        // Drag up-left of the origin: both edges track the pointer.
        resize_placement(&mut object, origin, Point::new(40.0, 70.0));
        assert!((object.common.position.x - 40.0).abs() < f64::EPSILON);
        assert!((object.common.position.y - 70.0).abs() < f64::EPSILON);
        if let ObjectKind::Rect(rect) = &object.kind {
            assert!((rect.width - 60.0).abs() < f64::EPSILON);
            assert!((rect.height - 30.0).abs() < f64::EPSILON);
        } else {
            panic!("expected rect");
        }
    }

    #[test]
    fn test_circle_radius_accounts_for_stroke() {
        let style = StyleState {
            stroke_width: 10.0,
            ..StyleState::default()
        };
        let origin = Point::new(0.0, 0.0);
        let mut object = ShapeFactory::create(ToolKind::Circle, origin, &style).unwrap();

        resize_placement(&mut object, origin, Point::new(100.0, 40.0));
        if let ObjectKind::Circle(circle) = &object.kind {
            // max(|dx|, |dy|) / 2 = 50, minus half the stroke width.
            assert!((circle.radius - 45.0).abs() < f64::EPSILON);
        } else {
            panic!("expected circle");
        }

        // A tiny drag stays below the stroke width and is not reduced.
        let mut small = ShapeFactory::create(ToolKind::Circle, origin, &style).unwrap();
        resize_placement(&mut small, origin, Point::new(8.0, 4.0));
        if let ObjectKind::Circle(circle) = &small.kind {
            assert!((circle.radius - 4.0).abs() < f64::EPSILON);
        } else {
            panic!("expected circle");
        }
    }

    #[test]
    fn test_line_tracks_free_endpoint() {
        let style = StyleState::default();
        let origin = Point::new(10.0, 10.0);
        let mut object = ShapeFactory::create(ToolKind::Line, origin, &style).unwrap();
        resize_placement(&mut object, origin, Point::new(90.0, 120.0));
        if let ObjectKind::Line(line) = &object.kind {
            assert!((line.end.x - 90.0).abs() < f64::EPSILON);
            assert!((line.end.y - 120.0).abs() < f64::EPSILON);
        } else {
            panic!("expected line");
        }
    }
}
