// File: crates/chart-drawings/src/render.rs
// Summary: Renderer-agnostic drawing surface (device pixels) plus a recording implementation for tests.

use crate::geometry::{Pt, RectF};
use crate::style::Rgba;

/// Stroke parameters for lines and arcs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f32,
    pub dash: Option<[f32; 2]>,
}

impl Stroke {
    pub fn solid(color: Rgba, width: f32) -> Self { Self { color, width, dash: None } }
    pub fn dashed(color: Rgba, width: f32, dash: [f32; 2]) -> Self { Self { color, width, dash: Some(dash) } }
}

/// Minimal painter API the primitives draw through. Coordinates are device pixels.
pub trait Surface {
    /// Bitmap size in device pixels (width, height).
    fn size(&self) -> (f64, f64);
    fn stroke_line(&mut self, from: Pt, to: Pt, stroke: &Stroke);
    fn fill_rect(&mut self, rect: RectF, color: Rgba);
    fn fill_polygon(&mut self, points: &[Pt], color: Rgba);
    /// Arc around `center`; angles in degrees, 0 = +x, positive = counter-clockwise on screen.
    fn stroke_arc(&mut self, center: Pt, radius: f64, start_deg: f64, sweep_deg: f64, stroke: &Stroke);
    /// Text with its baseline-left corner at `at`.
    fn fill_text(&mut self, text: &str, at: Pt, size: f32, color: Rgba);
    fn measure_text(&self, text: &str, size: f32) -> f64 {
        text.chars().count() as f64 * size as f64 * 0.6
    }
}

/// One recorded paint call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Line { from: Pt, to: Pt, stroke: Stroke },
    Rect { rect: RectF, color: Rgba },
    Polygon { points: Vec<Pt>, color: Rgba },
    Arc { center: Pt, radius: f64, start_deg: f64, sweep_deg: f64, stroke: Stroke },
    Text { text: String, at: Pt, size: f32, color: Rgba },
}

/// Surface that stores every call; used by tests and for headless inspection.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, commands: Vec::new() }
    }

    pub fn lines(&self) -> impl Iterator<Item = (Pt, Pt, &Stroke)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line { from, to, stroke } => Some((*from, *to, stroke)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn clear(&mut self) { self.commands.clear(); }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f64, f64) { (self.width, self.height) }

    fn stroke_line(&mut self, from: Pt, to: Pt, stroke: &Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke: *stroke });
    }

    fn fill_rect(&mut self, rect: RectF, color: Rgba) {
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    fn fill_polygon(&mut self, points: &[Pt], color: Rgba) {
        self.commands.push(DrawCommand::Polygon { points: points.to_vec(), color });
    }

    fn stroke_arc(&mut self, center: Pt, radius: f64, start_deg: f64, sweep_deg: f64, stroke: &Stroke) {
        self.commands.push(DrawCommand::Arc { center, radius, start_deg, sweep_deg, stroke: *stroke });
    }

    fn fill_text(&mut self, text: &str, at: Pt, size: f32, color: Rgba) {
        self.commands.push(DrawCommand::Text { text: text.to_string(), at, size, color });
    }
}
