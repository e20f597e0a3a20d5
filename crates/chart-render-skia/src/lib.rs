// File: crates/chart-render-skia/src/lib.rs
// Summary: Skia renderer for chart-drawings: canvas-backed Surface, candle pane and PNG export.

pub mod scene;
pub mod surface;
pub mod text;
pub mod theme;

pub use scene::{render_png, render_to_png, RenderOptions};
pub use surface::SkiaSurface;
pub use text::TextShaper;
pub use theme::Theme;
