//! Editable text payload.

use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Default font stack for new text.
pub const DEFAULT_FONT_FAMILY: &str = "Inter, system-ui, sans-serif";

/// Average glyph advance as a fraction of the font size, used for layout estimates.
const GLYPH_ADVANCE: f64 = 0.6;

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Light,
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontWeight::Light => "light",
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }

    /// Parse a CSS-ish weight name or number.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" | "300" => Some(FontWeight::Light),
            "normal" | "400" => Some(FontWeight::Normal),
            "bold" | "700" => Some(FontWeight::Bold),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "normal" => Some(FontStyle::Normal),
            "italic" => Some(FontStyle::Italic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "left" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" => Some(TextAlign::Right),
            _ => None,
        }
    }
}

/// Inline-editable text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub content: String,
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f64,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    /// Extra spacing between characters, in thousandths of an em.
    #[serde(default)]
    pub char_spacing: f64,
    #[serde(default)]
    pub padding: f64,
}

fn default_line_height() -> f64 {
    1.16
}

impl Text {
    pub fn new(content: impl Into<String>, font_size: f64) -> Self {
        Self {
            content: content.into(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size,
            font_weight: FontWeight::default(),
            font_style: FontStyle::default(),
            text_align: TextAlign::default(),
            line_height: default_line_height(),
            char_spacing: 0.0,
            padding: 0.0,
        }
    }

    pub fn line_count(&self) -> usize {
        self.content.split('\n').count().max(1)
    }

    /// Approximate layout box for the content.
    ///
    /// Glyph metrics are not available in the core, so width is estimated
    /// from the longest line with a fixed average advance.
    pub fn measure(&self) -> Size {
        let longest = self
            .content
            .split('\n')
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0) as f64;
        let advance = self.font_size * (GLYPH_ADVANCE + self.char_spacing / 1000.0);
        let width = (longest * advance).max(self.font_size * GLYPH_ADVANCE);
        let height = self.line_count() as f64 * self.font_size * self.line_height;
        Size::new(width, height)
    }
}
