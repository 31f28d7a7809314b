//! Style binding between the controls, the active brush, and the selection.
//!
//! Reads and writes resolve against *what* is targeted: a textbox in live
//! text-edit receives rich-text range attributes, anything else receives
//! whole-object attributes.

use serde::{Deserialize, Serialize};

use crate::objects::{CharStyle, DrawableObject, ObjectKind};
use crate::style::{FontFamily, RgbColor, StyleState};
use crate::tools::ToolKind;

/// Mirror-axis toggles for the symmetry brush. The stroke algorithm itself
/// is external; the core only keeps the enabled flags alive across brush
/// rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymmetryOptions {
    pub axes: [bool; 6],
}

impl Default for SymmetryOptions {
    fn default() -> Self {
        // Vertical mirror enabled out of the box.
        Self {
            axes: [true, false, false, false, false, false],
        }
    }
}

impl SymmetryOptions {
    /// Flip one axis, returning its new state.
    pub fn toggle(&mut self, index: usize) -> bool {
        if let Some(axis) = self.axes.get_mut(index) {
            *axis = !*axis;
            *axis
        } else {
            false
        }
    }
}

/// Which free-drawing algorithm the host should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrushKind {
    Pencil,
    Symmetry,
    Eraser,
}

/// The active brush as pure data, consumed by the external canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushSpec {
    pub kind: BrushKind,
    pub color: RgbColor,
    pub alpha: f64,
    pub width: f64,
    pub symmetry: SymmetryOptions,
}

/// Readable style attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleAttr {
    StrokeColor,
    StrokeAlpha,
    FillColor,
    FillAlpha,
    StrokeWidth,
    FontFamily,
    FontWeight,
    FontStyle,
    Underline,
}

/// Value returned by a style read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleValue {
    Color(RgbColor),
    Scalar(f64),
    Font(FontFamily),
    Weight(crate::style::FontWeight),
    Style(crate::style::FontStyle),
    Flag(bool),
}

/// A single style-control change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleEdit {
    StrokeColor(RgbColor),
    StrokeAlpha(f64),
    FillColor(RgbColor),
    FillAlpha(f64),
    StrokeWidth(f64),
    EraseWidth(f64),
}

/// Active/inactive states for the textbox toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextIndicators {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// Couples [`StyleState`] to the active brush and the selected objects.
#[derive(Debug, Clone)]
pub struct StyleBinder {
    state: StyleState,
    brush: BrushSpec,
    symmetry: SymmetryOptions,
}

impl Default for StyleBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleBinder {
    pub fn new() -> Self {
        let state = StyleState::default();
        let symmetry = SymmetryOptions::default();
        let brush = BrushSpec {
            kind: BrushKind::Pencil,
            color: state.stroke_color,
            alpha: state.stroke_alpha,
            width: state.stroke_width,
            symmetry,
        };
        Self {
            state,
            brush,
            symmetry,
        }
    }

    pub fn state(&self) -> &StyleState {
        &self.state
    }

    pub fn brush(&self) -> &BrushSpec {
        &self.brush
    }

    /// Record a control change into the style state.
    pub fn apply_edit(&mut self, edit: StyleEdit) {
        match edit {
            StyleEdit::StrokeColor(color) => self.state.stroke_color = color,
            StyleEdit::StrokeAlpha(alpha) => self.state.stroke_alpha = alpha.clamp(0.0, 1.0),
            StyleEdit::FillColor(color) => self.state.fill_color = color,
            StyleEdit::FillAlpha(alpha) => self.state.fill_alpha = alpha.clamp(0.0, 1.0),
            StyleEdit::StrokeWidth(width) => self.state.stroke_width = width.max(0.0),
            StyleEdit::EraseWidth(width) => self.state.erase_width = width.max(0.0),
        }
    }

    /// Rebuild the brush instance for the given tool and re-apply the
    /// current stroke settings. The eraser is sized by the erase width.
    pub fn rebuild_brush(&mut self, tool: ToolKind) {
        self.brush = match tool {
            ToolKind::Erase => BrushSpec {
                kind: BrushKind::Eraser,
                color: self.state.stroke_color,
                alpha: self.state.stroke_alpha,
                width: self.state.erase_width,
                symmetry: self.symmetry,
            },
            ToolKind::SymmetryBrush => BrushSpec {
                kind: BrushKind::Symmetry,
                color: self.state.stroke_color,
                alpha: self.state.stroke_alpha,
                width: self.state.stroke_width,
                symmetry: self.symmetry,
            },
            _ => BrushSpec {
                kind: BrushKind::Pencil,
                color: self.state.stroke_color,
                alpha: self.state.stroke_alpha,
                width: self.state.stroke_width,
                symmetry: self.symmetry,
            },
        };
    }

    /// Flip one symmetry mirror axis, keeping the setting across rebuilds.
    pub fn toggle_symmetry_axis(&mut self, index: usize) -> bool {
        let enabled = self.symmetry.toggle(index);
        self.brush.symmetry = self.symmetry;
        enabled
    }

    /// Write the current stroke/fill settings onto an object.
    ///
    /// A textbox in live edit receives them as rich-text attributes on the
    /// selected range; everything else gets whole-object attributes.
    pub fn apply_state_to_object(&self, object: &mut DrawableObject) {
        if let ObjectKind::Textbox(text) = &mut object.kind {
            if let Some(span) = text.edit_span() {
                let patch = CharStyle {
                    stroke: Some(self.state.stroke_color),
                    stroke_alpha: Some(self.state.stroke_alpha),
                    stroke_width: Some(self.state.stroke_width),
                    fill: Some(self.state.fill_color),
                    fill_alpha: Some(self.state.fill_alpha),
                    ..CharStyle::default()
                };
                text.apply_range_style(span, &patch);
                return;
            }
        }
        object.common.stroke = self.state.stroke_color;
        object.common.stroke_alpha = self.state.stroke_alpha;
        object.common.stroke_width = self.state.stroke_width;
        object.common.fill = self.state.fill_color;
        object.common.fill_alpha = self.state.fill_alpha;
    }

    /// Populate the controls from a freshly selected object.
    ///
    /// Free-drawing strokes are excluded from back-propagation. Returns
    /// whether the state changed.
    pub fn populate_from_object(&mut self, object: &DrawableObject) -> bool {
        if object.is_free_drawing() {
            return false;
        }
        self.state.stroke_width = object.common.stroke_width;
        self.state.stroke_color = object.common.stroke;
        self.state.stroke_alpha = object.common.stroke_alpha;
        self.state.fill_color = object.common.fill;
        self.state.fill_alpha = object.common.fill_alpha;
        true
    }

    /// Set the font family on a textbox (range or whole object).
    pub fn set_font_family(&self, object: &mut DrawableObject, family: FontFamily) {
        let ObjectKind::Textbox(text) = &mut object.kind else {
            return;
        };
        text.font_family = family;
    }

    /// Toggle bold, returning the new indicator state. No-op for anything
    /// but a textbox.
    pub fn toggle_bold(&self, object: &mut DrawableObject) -> Option<bool> {
        let ObjectKind::Textbox(text) = &mut object.kind else {
            return None;
        };
        if let Some(span) = text.edit_span() {
            let next = text.effective_weight(Some(span)).toggled();
            text.apply_range_style(
                span,
                &CharStyle {
                    font_weight: Some(next),
                    ..CharStyle::default()
                },
            );
            Some(next.is_active())
        } else {
            text.font_weight = text.font_weight.toggled();
            Some(text.font_weight.is_active())
        }
    }

    /// Toggle italic, returning the new indicator state.
    pub fn toggle_italic(&self, object: &mut DrawableObject) -> Option<bool> {
        let ObjectKind::Textbox(text) = &mut object.kind else {
            return None;
        };
        if let Some(span) = text.edit_span() {
            let next = text.effective_style(Some(span)).toggled();
            text.apply_range_style(
                span,
                &CharStyle {
                    font_style: Some(next),
                    ..CharStyle::default()
                },
            );
            Some(next.is_active())
        } else {
            text.font_style = text.font_style.toggled();
            Some(text.font_style.is_active())
        }
    }

    /// Toggle underline, returning the new indicator state.
    ///
    /// Underline rendering requires a solid fill, so the fill alpha is
    /// forced fully opaque and the fill re-applied.
    pub fn toggle_underline(&mut self, object: &mut DrawableObject) -> Option<bool> {
        let ObjectKind::Textbox(text) = &mut object.kind else {
            return None;
        };
        self.state.fill_alpha = 1.0;
        let enabled = if let Some(span) = text.edit_span() {
            let next = !text.effective_underline(Some(span));
            text.apply_range_style(
                span,
                &CharStyle {
                    underline: Some(next),
                    fill: Some(self.state.fill_color),
                    fill_alpha: Some(1.0),
                    ..CharStyle::default()
                },
            );
            next
        } else {
            text.underline = !text.underline;
            text.underline
        };
        object.common.fill = self.state.fill_color;
        object.common.fill_alpha = 1.0;
        Some(enabled)
    }

    /// Read a style attribute from an object.
    ///
    /// A textbox in live text-edit answers from the selected range's
    /// overrides, falling back to the whole-object attribute; font
    /// attributes on non-text objects read as `None`.
    pub fn get_style(&self, object: &DrawableObject, attr: StyleAttr) -> Option<StyleValue> {
        if let ObjectKind::Textbox(text) = &object.kind {
            let span = text.edit_span();
            if let Some(span) = span {
                let overrides = text.range_style(span);
                match attr {
                    StyleAttr::StrokeColor if overrides.stroke.is_some() => {
                        return overrides.stroke.map(StyleValue::Color);
                    }
                    StyleAttr::StrokeAlpha if overrides.stroke_alpha.is_some() => {
                        return overrides.stroke_alpha.map(StyleValue::Scalar);
                    }
                    StyleAttr::FillColor if overrides.fill.is_some() => {
                        return overrides.fill.map(StyleValue::Color);
                    }
                    StyleAttr::FillAlpha if overrides.fill_alpha.is_some() => {
                        return overrides.fill_alpha.map(StyleValue::Scalar);
                    }
                    StyleAttr::StrokeWidth if overrides.stroke_width.is_some() => {
                        return overrides.stroke_width.map(StyleValue::Scalar);
                    }
                    _ => {}
                }
            }
            match attr {
                StyleAttr::FontFamily => return Some(StyleValue::Font(text.font_family)),
                StyleAttr::FontWeight => {
                    return Some(StyleValue::Weight(text.effective_weight(span)));
                }
                StyleAttr::FontStyle => {
                    return Some(StyleValue::Style(text.effective_style(span)));
                }
                StyleAttr::Underline => {
                    return Some(StyleValue::Flag(text.effective_underline(span)));
                }
                _ => {}
            }
        }
        match attr {
            StyleAttr::StrokeColor => Some(StyleValue::Color(object.common.stroke)),
            StyleAttr::StrokeAlpha => Some(StyleValue::Scalar(object.common.stroke_alpha)),
            StyleAttr::FillColor => Some(StyleValue::Color(object.common.fill)),
            StyleAttr::FillAlpha => Some(StyleValue::Scalar(object.common.fill_alpha)),
            StyleAttr::StrokeWidth => Some(StyleValue::Scalar(object.common.stroke_width)),
            StyleAttr::FontFamily | StyleAttr::FontWeight | StyleAttr::FontStyle
            | StyleAttr::Underline => None,
        }
    }

    /// Tri-state indicator reads for the textbox toggles.
    pub fn text_indicators(&self, object: &DrawableObject) -> Option<TextIndicators> {
        let ObjectKind::Textbox(text) = &object.kind else {
            return None;
        };
        let span = text.edit_span();
        Some(TextIndicators {
            bold: text.effective_weight(span).is_active(),
            italic: text.effective_style(span).is_active(),
            underline: text.effective_underline(span),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{CharSpan, ObjectCommon, RectData, TextboxData};
    use crate::style::{FontWeight, StyleState};
    use kurbo::Point;

    fn textbox() -> DrawableObject {
        DrawableObject::new(
            ObjectCommon::from_style(Point::ZERO, &StyleState::default()),
            ObjectKind::Textbox(TextboxData::new("Hello world")),
        )
    }

    fn rect() -> DrawableObject {
        DrawableObject::new(
            ObjectCommon::from_style(Point::ZERO, &StyleState::default()),
            ObjectKind::Rect(RectData {
                width: 10.0,
                height: 10.0,
            }),
        )
    }

    #[test]
    fn test_brush_rebuild_for_eraser_uses_erase_width() {
        let mut binder = StyleBinder::new();
        binder.apply_edit(StyleEdit::EraseWidth(32.0));
        binder.rebuild_brush(ToolKind::Erase);
        assert_eq!(binder.brush().kind, BrushKind::Eraser);
        assert!((binder.brush().width - 32.0).abs() < f64::EPSILON);

        binder.rebuild_brush(ToolKind::Brush);
        assert_eq!(binder.brush().kind, BrushKind::Pencil);
        assert!((binder.brush().width - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_symmetry_axes_survive_rebuild() {
        let mut binder = StyleBinder::new();
        binder.toggle_symmetry_axis(3);
        binder.rebuild_brush(ToolKind::Brush);
        binder.rebuild_brush(ToolKind::SymmetryBrush);
        assert_eq!(binder.brush().kind, BrushKind::Symmetry);
        assert!(binder.brush().symmetry.axes[3]);
    }

    #[test]
    fn test_whole_object_style_write() {
        let mut binder = StyleBinder::new();
        binder.apply_edit(StyleEdit::StrokeWidth(9.0));
        binder.apply_edit(StyleEdit::FillAlpha(0.4));
        let mut object = rect();
        binder.apply_state_to_object(&mut object);
        assert!((object.common.stroke_width - 9.0).abs() < f64::EPSILON);
        assert!((object.common.fill_alpha - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_editing_textbox_targets_range() {
        let binder = StyleBinder::new();
        let mut object = textbox();
        if let ObjectKind::Textbox(text) = &mut object.kind {
            text.editing = true;
            text.selection = Some(CharSpan::new(0, 5));
        }
        let before_width = object.common.stroke_width;
        binder.apply_state_to_object(&mut object);
        // Whole-object attributes untouched; range overrides written.
        assert!((object.common.stroke_width - before_width).abs() < f64::EPSILON);
        if let ObjectKind::Textbox(text) = &object.kind {
            assert!(text.char_styles[0].is_some());
            assert!(text.char_styles[5].is_none());
        }
    }

    #[test]
    fn test_bold_toggle_whole_object() {
        let binder = StyleBinder::new();
        let mut object = textbox();
        assert_eq!(binder.toggle_bold(&mut object), Some(true));
        assert_eq!(binder.toggle_bold(&mut object), Some(false));
        assert_eq!(binder.toggle_bold(&mut rect()), None);
    }

    #[test]
    fn test_bold_toggle_on_selection_range() {
        let binder = StyleBinder::new();
        let mut object = textbox();
        if let ObjectKind::Textbox(text) = &mut object.kind {
            text.editing = true;
            text.selection = Some(CharSpan::new(2, 4));
        }
        assert_eq!(binder.toggle_bold(&mut object), Some(true));
        if let ObjectKind::Textbox(text) = &object.kind {
            assert_eq!(text.char_styles[2].unwrap().font_weight, Some(FontWeight::Bold));
            // Object-level weight untouched.
            assert_eq!(text.font_weight, FontWeight::Normal);
        }
    }

    #[test]
    fn test_underline_forces_opaque_fill() {
        let mut binder = StyleBinder::new();
        let mut object = textbox();
        assert!((binder.state().fill_alpha - 0.0).abs() < f64::EPSILON);
        assert_eq!(binder.toggle_underline(&mut object), Some(true));
        assert!((binder.state().fill_alpha - 1.0).abs() < f64::EPSILON);
        assert!((object.common.fill_alpha - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_get_style_resolves_edit_range() {
        let binder = StyleBinder::new();
        let mut object = textbox();

        // Whole-object read while not editing.
        assert_eq!(
            binder.get_style(&object, StyleAttr::StrokeWidth),
            Some(StyleValue::Scalar(5.0))
        );
        assert_eq!(
            binder.get_style(&object, StyleAttr::FontWeight),
            Some(StyleValue::Weight(FontWeight::Normal))
        );

        // Range override wins during live edit.
        if let ObjectKind::Textbox(text) = &mut object.kind {
            text.editing = true;
            text.selection = Some(CharSpan::new(0, 3));
            text.apply_range_style(
                CharSpan::new(0, 3),
                &CharStyle {
                    stroke_width: Some(2.0),
                    ..CharStyle::default()
                },
            );
        }
        assert_eq!(
            binder.get_style(&object, StyleAttr::StrokeWidth),
            Some(StyleValue::Scalar(2.0))
        );

        // Font attributes are absent on non-text objects.
        assert_eq!(binder.get_style(&rect(), StyleAttr::Underline), None);
    }

    #[test]
    fn test_populate_skips_free_drawing() {
        use crate::objects::StrokeData;
        let mut binder = StyleBinder::new();
        let mut stroke_object = DrawableObject::new(
            ObjectCommon::from_style(Point::ZERO, &StyleState::default()),
            ObjectKind::Stroke(StrokeData::new(vec![], 3.0)),
        );
        stroke_object.common.stroke_width = 99.0;
        assert!(!binder.populate_from_object(&stroke_object));
        assert!((binder.state().stroke_width - 5.0).abs() < f64::EPSILON);

        let mut shape = rect();
        shape.common.stroke_width = 7.0;
        assert!(binder.populate_from_object(&shape));
        assert!((binder.state().stroke_width - 7.0).abs() < f64::EPSILON);
    }
}
