//! Textbox payload with per-range rich-text overrides.

use serde::{Deserialize, Serialize};

use crate::style::{FontFamily, FontStyle, FontWeight, RgbColor};

/// Placeholder content for freshly placed textboxes.
pub const DEFAULT_TEXT: &str = "Text here";

/// Character range of an active in-place text selection (half-open, in
/// chars).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharSpan {
    pub start: usize,
    pub end: usize,
}

impl CharSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Rich-text attribute overrides for a character. `None` fields fall back to
/// the whole-object attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CharStyle {
    pub fill: Option<RgbColor>,
    pub fill_alpha: Option<f64>,
    pub stroke: Option<RgbColor>,
    pub stroke_alpha: Option<f64>,
    pub stroke_width: Option<f64>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub underline: Option<bool>,
}

impl CharStyle {
    /// Merge `patch` over `self`: set fields of the patch win.
    fn merged(mut self, patch: &CharStyle) -> Self {
        if patch.fill.is_some() {
            self.fill = patch.fill;
        }
        if patch.fill_alpha.is_some() {
            self.fill_alpha = patch.fill_alpha;
        }
        if patch.stroke.is_some() {
            self.stroke = patch.stroke;
        }
        if patch.stroke_alpha.is_some() {
            self.stroke_alpha = patch.stroke_alpha;
        }
        if patch.stroke_width.is_some() {
            self.stroke_width = patch.stroke_width;
        }
        if patch.font_weight.is_some() {
            self.font_weight = patch.font_weight;
        }
        if patch.font_style.is_some() {
            self.font_style = patch.font_style;
        }
        if patch.underline.is_some() {
            self.underline = patch.underline;
        }
        self
    }
}

/// A textbox on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextboxData {
    pub content: String,
    pub font_family: FontFamily,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub underline: bool,
    /// Wrap width of the box.
    pub width: f64,
    /// Font size in pixels.
    pub font_size: f64,
    /// True while the host has the textbox in live text-edit.
    #[serde(default)]
    pub editing: bool,
    /// Selected char range during live edit.
    #[serde(default)]
    pub selection: Option<CharSpan>,
    /// Per-char overrides, one entry per char; `None` = object default.
    #[serde(default)]
    pub char_styles: Vec<Option<CharStyle>>,
}

impl TextboxData {
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let chars = content.chars().count();
        Self {
            content,
            font_family: FontFamily::default(),
            font_weight: FontWeight::default(),
            font_style: FontStyle::default(),
            underline: false,
            width: 120.0,
            font_size: Self::DEFAULT_FONT_SIZE,
            editing: false,
            selection: None,
            char_styles: vec![None; chars],
        }
    }

    /// Replace the content, resizing the per-char overrides to match.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        let chars = self.content.chars().count();
        self.char_styles.resize(chars, None);
    }

    /// The active selection, when the box is in live edit with a non-empty
    /// range. This is the target for in-place style edits.
    pub fn edit_span(&self) -> Option<CharSpan> {
        if !self.editing {
            return None;
        }
        self.selection.filter(|span| !span.is_empty())
    }

    /// Apply a rich-text patch to a char range, merging over existing
    /// overrides.
    pub fn apply_range_style(&mut self, span: CharSpan, patch: &CharStyle) {
        let chars = self.content.chars().count();
        self.char_styles.resize(chars, None);
        for slot in self
            .char_styles
            .iter_mut()
            .take(span.end.min(chars))
            .skip(span.start)
        {
            let base = slot.unwrap_or_default();
            *slot = Some(base.merged(patch));
        }
    }

    /// Effective overrides at the start of a range, the way the controls
    /// read back the selection's current attributes.
    pub fn range_style(&self, span: CharSpan) -> CharStyle {
        self.char_styles
            .get(span.start)
            .copied()
            .flatten()
            .unwrap_or_default()
    }

    /// Effective weight at the selection start, falling back to the object
    /// attribute.
    pub fn effective_weight(&self, span: Option<CharSpan>) -> FontWeight {
        span.and_then(|s| self.char_styles.get(s.start).copied().flatten())
            .and_then(|cs| cs.font_weight)
            .unwrap_or(self.font_weight)
    }

    pub fn effective_style(&self, span: Option<CharSpan>) -> FontStyle {
        span.and_then(|s| self.char_styles.get(s.start).copied().flatten())
            .and_then(|cs| cs.font_style)
            .unwrap_or(self.font_style)
    }

    pub fn effective_underline(&self, span: Option<CharSpan>) -> bool {
        span.and_then(|s| self.char_styles.get(s.start).copied().flatten())
            .and_then(|cs| cs.underline)
            .unwrap_or(self.underline)
    }

    /// Rough layout extent used for bounds until the renderer reports real
    /// metrics.
    pub fn approximate_size(&self) -> (f64, f64) {
        let max_line = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let lines = self.content.lines().count().max(1);
        let width = (max_line as f64 * self.font_size * 0.55).max(self.width);
        let height = lines as f64 * self.font_size * 1.2;
        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_style_merge() {
        let mut text = TextboxData::new("Hello");
        text.apply_range_style(
            CharSpan::new(1, 3),
            &CharStyle {
                font_weight: Some(FontWeight::Bold),
                ..CharStyle::default()
            },
        );
        text.apply_range_style(
            CharSpan::new(2, 4),
            &CharStyle {
                underline: Some(true),
                ..CharStyle::default()
            },
        );

        // Char 2 keeps the bold from the first patch and gains underline.
        let at2 = text.char_styles[2].unwrap();
        assert_eq!(at2.font_weight, Some(FontWeight::Bold));
        assert_eq!(at2.underline, Some(true));
        // Char 0 untouched.
        assert!(text.char_styles[0].is_none());
    }

    #[test]
    fn test_edit_span_requires_editing() {
        let mut text = TextboxData::new("Hello");
        text.selection = Some(CharSpan::new(0, 3));
        assert!(text.edit_span().is_none());
        text.editing = true;
        assert_eq!(text.edit_span(), Some(CharSpan::new(0, 3)));
        text.selection = Some(CharSpan::new(2, 2));
        assert!(text.edit_span().is_none());
    }

    #[test]
    fn test_effective_attrs_fall_back_to_object() {
        let mut text = TextboxData::new("Hi");
        text.font_weight = FontWeight::Bold;
        assert_eq!(text.effective_weight(None), FontWeight::Bold);
        assert_eq!(
            text.effective_weight(Some(CharSpan::new(0, 1))),
            FontWeight::Bold
        );
    }

    #[test]
    fn test_set_content_resizes_overrides() {
        let mut text = TextboxData::new("Hello");
        text.apply_range_style(
            CharSpan::new(0, 5),
            &CharStyle {
                underline: Some(true),
                ..CharStyle::default()
            },
        );
        text.set_content("Hi");
        assert_eq!(text.char_styles.len(), 2);
    }
}
