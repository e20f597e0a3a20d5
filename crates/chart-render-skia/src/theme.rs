// File: crates/chart-render-skia/src/theme.rs
// Summary: Pane palettes (background, grid, candles, status line) drawn behind the annotations.

use chart_drawings::Rgba;
use skia_safe as skia;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub background: Rgba,
    pub grid: Rgba,
    pub candle_up: Rgba,
    pub candle_down: Rgba,
    pub status_text: Rgba,
}

const PRESETS: [Theme; 3] = [
    Theme {
        name: "dark",
        background: Rgba::rgb(18, 18, 20),
        grid: Rgba::rgb(40, 40, 45),
        candle_up: Rgba::rgb(38, 166, 154),
        candle_down: Rgba::rgb(239, 83, 80),
        status_text: Rgba::rgb(150, 150, 160),
    },
    Theme {
        name: "light",
        background: Rgba::rgb(250, 250, 252),
        grid: Rgba::rgb(230, 230, 235),
        candle_up: Rgba::rgb(8, 153, 129),
        candle_down: Rgba::rgb(242, 54, 69),
        status_text: Rgba::rgb(100, 100, 110),
    },
    Theme {
        name: "solarized-dark",
        background: Rgba::rgb(0x00, 0x2b, 0x36),
        grid: Rgba::rgb(0x07, 0x36, 0x42),
        candle_up: Rgba::rgb(0x2a, 0xa1, 0x98),
        candle_down: Rgba::rgb(0xdc, 0x32, 0x2f),
        status_text: Rgba::rgb(0x83, 0x94, 0x96),
    },
];

impl Theme {
    pub fn dark() -> Self { PRESETS[0] }

    pub fn light() -> Self { PRESETS[1] }

    pub fn solarized_dark() -> Self { PRESETS[2] }

    /// Candle colour for a bar that closed at or above its open, or below it.
    pub fn candle(&self, rising: bool) -> Rgba {
        if rising { self.candle_up } else { self.candle_down }
    }
}

pub fn presets() -> &'static [Theme] { &PRESETS }

/// Preset by name (case-insensitive); unknown names get the dark palette.
pub fn find(name: &str) -> Theme {
    PRESETS
        .iter()
        .copied()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .unwrap_or_else(Theme::dark)
}

pub(crate) fn to_skia(c: Rgba) -> skia::Color {
    skia::Color::from_argb(c.a, c.r, c.g, c.b)
}
