//! Style state shared between the free-drawing brush, the style controls,
//! and the selected objects.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable 24-bit RGB color.
///
/// Alpha travels separately as an `f64` in `[0, 1]` so the host controls can
/// edit color and opacity independently; the packed RGBA form only exists at
/// the renderer boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Combine with an alpha into the renderer's packed color.
    pub fn packed(self, alpha: f64) -> Color {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color::from_rgba8(self.r, self.g, self.b, a)
    }

    /// Decompose a packed color back into RGB + separate alpha.
    pub fn unpack(color: Color) -> (Self, f64) {
        let rgba = color.to_rgba8();
        (Self::new(rgba.r, rgba.g, rgba.b), rgba.a as f64 / 255.0)
    }
}

/// Font family options for textboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Arial,
    TimesNewRoman,
    Verdana,
    Georgia,
    Courier,
    ComicSans,
    Impact,
}

impl FontFamily {
    /// Get the font family name as used by the renderer.
    pub fn name(&self) -> &'static str {
        match self {
            FontFamily::Arial => "arial",
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::Verdana => "verdana",
            FontFamily::Georgia => "georgia",
            FontFamily::Courier => "courier",
            FontFamily::ComicSans => "comic sans ms",
            FontFamily::Impact => "impact",
        }
    }

    /// Get display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            FontFamily::Arial => "Arial",
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::Verdana => "Verdana",
            FontFamily::Georgia => "Georgia",
            FontFamily::Courier => "Courier",
            FontFamily::ComicSans => "Comic Sans MS",
            FontFamily::Impact => "Impact",
        }
    }

    /// Get all available font families.
    pub fn all() -> &'static [FontFamily] {
        &[
            FontFamily::Arial,
            FontFamily::TimesNewRoman,
            FontFamily::Verdana,
            FontFamily::Georgia,
            FontFamily::Courier,
            FontFamily::ComicSans,
            FontFamily::Impact,
        ]
    }
}

/// Font weight. The bold toggle flips between the two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    /// Whether the host's bold indicator should show as active.
    pub fn is_active(&self) -> bool {
        matches!(self, FontWeight::Bold)
    }

    pub fn toggled(self) -> Self {
        match self {
            FontWeight::Normal => FontWeight::Bold,
            FontWeight::Bold => FontWeight::Normal,
        }
    }
}

/// Font style. The italic toggle flips between the two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    /// Whether the host's italic indicator should show as active.
    pub fn is_active(&self) -> bool {
        matches!(self, FontStyle::Italic)
    }

    pub fn toggled(self) -> Self {
        match self {
            FontStyle::Normal => FontStyle::Italic,
            FontStyle::Italic => FontStyle::Normal,
        }
    }
}

/// Current stroke/fill colors, alphas and widths, as shown by the controls.
///
/// Pure data: the binder is the only component that mutates it, everything
/// else reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleState {
    pub stroke_color: RgbColor,
    pub stroke_alpha: f64,
    pub fill_color: RgbColor,
    pub fill_alpha: f64,
    pub stroke_width: f64,
    pub erase_width: f64,
}

impl Default for StyleState {
    fn default() -> Self {
        Self {
            stroke_color: RgbColor::white(),
            stroke_alpha: 1.0,
            fill_color: RgbColor::new(0xFF, 0x00, 0xFF),
            fill_alpha: 0.0,
            stroke_width: 5.0,
            erase_width: 20.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_roundtrip() {
        let color = RgbColor::new(0x12, 0x34, 0x56);
        let (back, alpha) = RgbColor::unpack(color.packed(0.5));
        assert_eq!(back, color);
        assert!((alpha - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_packed_clamps_alpha() {
        let packed = RgbColor::white().packed(2.0);
        assert_eq!(packed.to_rgba8().a, 255);
    }

    #[test]
    fn test_default_state_matches_controls() {
        let state = StyleState::default();
        assert_eq!(state.stroke_color, RgbColor::white());
        assert!((state.fill_alpha - 0.0).abs() < f64::EPSILON);
        assert!((state.stroke_width - 5.0).abs() < f64::EPSILON);
        assert!((state.erase_width - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weight_toggle() {
        assert_eq!(FontWeight::Normal.toggled(), FontWeight::Bold);
        assert!(FontWeight::Bold.is_active());
        assert!(!FontStyle::Normal.is_active());
    }
}
