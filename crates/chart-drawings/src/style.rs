// File: crates/chart-drawings/src/style.rs
// Summary: Colours and per-primitive style options (line options, position band style).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 8-bit RGBA colour. Serialised as `#RRGGBB` or `#RRGGBBAA`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self { Self { r, g, b, a: 255 } }
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self { Self { r, g, b, a } }

    pub fn with_alpha(self, a: u8) -> Self { Self { a, ..self } }

    fn named(name: &str) -> Option<Self> {
        let c = match name.to_ascii_lowercase().as_str() {
            "white" => Self::WHITE,
            "black" => Self::BLACK,
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "orange" => Self::rgb(255, 165, 0),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "transparent" => Self::rgba(0, 0, 0, 0),
            _ => return None,
        };
        Some(c)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Rgba {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(hex) = s.strip_prefix('#') else {
            return Self::named(s).ok_or_else(|| format!("unknown colour '{s}'"));
        };
        if !hex.is_ascii() {
            return Err(format!("bad colour '{s}'"));
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("bad colour '{s}': {e}"));
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17).map_err(|e| format!("bad colour '{s}': {e}"));
        match hex.len() {
            3 => Ok(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(format!("bad colour '{s}'")),
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl From<Rgba> for String {
    fn from(c: Rgba) -> Self { c.to_string() }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

impl LineStyle {
    /// Dash pattern in device pixels (on, off), or `None` for solid strokes.
    pub fn dash(&self) -> Option<[f32; 2]> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some([10.0, 3.0]),
        }
    }
}

/// Options carried by every line-like primitive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LineOptions {
    pub color: Rgba,
    pub width: f32,
    pub style: LineStyle,
    pub show_label: bool,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self { color: Rgba::WHITE, width: 3.0, style: LineStyle::Solid, show_label: false }
    }
}

/// Partial update for [`LineOptions`]; `None` fields are left as they are.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineOptionsPatch {
    pub color: Option<Rgba>,
    pub width: Option<f32>,
    pub style: Option<LineStyle>,
    pub show_label: Option<bool>,
}

impl LineOptions {
    pub fn apply(&mut self, patch: &LineOptionsPatch) {
        if let Some(c) = patch.color { self.color = c; }
        if let Some(w) = patch.width { self.width = w.max(0.5); }
        if let Some(s) = patch.style { self.style = s; }
        if let Some(l) = patch.show_label { self.show_label = l; }
    }
}

/// Colours and stroke width of a position band.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PositionStyle {
    pub entry_color: Rgba,
    pub tp_color: Rgba,
    pub sl_color: Rgba,
    pub line_color: Rgba,
    pub width: f32,
}

impl Default for PositionStyle {
    fn default() -> Self {
        Self {
            entry_color: Rgba::rgba(0x88, 0x88, 0xff, 0x55),
            tp_color: Rgba::rgba(0x2e, 0xcc, 0x70, 0x55),
            sl_color: Rgba::rgba(0xe7, 0x4c, 0x3c, 0x55),
            line_color: Rgba::WHITE,
            width: 2.0,
        }
    }
}
