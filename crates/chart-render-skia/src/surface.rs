// File: crates/chart-render-skia/src/surface.rs
// Summary: `Surface` implementation over a Skia canvas.

use chart_drawings::geometry::{Pt, RectF};
use chart_drawings::{Rgba, Stroke, Surface};
use skia_safe as skia;

use crate::text::TextShaper;
use crate::theme::to_skia;

/// Paints drawing primitives onto a borrowed canvas. Coordinates arrive in device pixels.
pub struct SkiaSurface<'a> {
    canvas: &'a skia::Canvas,
    shaper: &'a TextShaper,
    size: (f64, f64),
    draw_labels: bool,
}

impl<'a> SkiaSurface<'a> {
    pub fn new(canvas: &'a skia::Canvas, shaper: &'a TextShaper, size: (f64, f64)) -> Self {
        Self { canvas, shaper, size, draw_labels: true }
    }

    /// Skip text entirely; useful for pixel comparisons across platforms.
    pub fn without_labels(mut self) -> Self {
        self.draw_labels = false;
        self
    }

    pub fn canvas(&self) -> &skia::Canvas { self.canvas }
}

fn stroke_paint(stroke: &Stroke) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Stroke);
    paint.set_stroke_width(stroke.width.max(0.5));
    paint.set_color(to_skia(stroke.color));
    if let Some(intervals) = stroke.dash {
        paint.set_path_effect(skia::PathEffect::dash(&intervals, 0.0));
    }
    paint
}

fn fill_paint(color: Rgba) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Fill);
    paint.set_color(to_skia(color));
    paint
}

fn pt(p: Pt) -> skia::Point {
    skia::Point::new(p.x as f32, p.y as f32)
}

impl Surface for SkiaSurface<'_> {
    fn size(&self) -> (f64, f64) { self.size }

    fn stroke_line(&mut self, from: Pt, to: Pt, stroke: &Stroke) {
        self.canvas.draw_line(pt(from), pt(to), &stroke_paint(stroke));
    }

    fn fill_rect(&mut self, rect: RectF, color: Rgba) {
        let r = skia::Rect::from_ltrb(rect.left as f32, rect.top as f32, rect.right as f32, rect.bottom as f32);
        self.canvas.draw_rect(r, &fill_paint(color));
    }

    fn fill_polygon(&mut self, points: &[Pt], color: Rgba) {
        let Some((first, rest)) = points.split_first() else { return };
        let mut path = skia::Path::new();
        path.move_to(pt(*first));
        for p in rest {
            path.line_to(pt(*p));
        }
        path.close();
        self.canvas.draw_path(&path, &fill_paint(color));
    }

    fn stroke_arc(&mut self, center: Pt, radius: f64, start_deg: f64, sweep_deg: f64, stroke: &Stroke) {
        let (cx, cy, r) = (center.x as f32, center.y as f32, radius as f32);
        let oval = skia::Rect::from_ltrb(cx - r, cy - r, cx + r, cy + r);
        // Skia sweeps clockwise in a y-down space; our angles grow counter-clockwise on screen.
        self.canvas.draw_arc(oval, -start_deg as f32, -sweep_deg as f32, false, &stroke_paint(stroke));
    }

    fn fill_text(&mut self, text: &str, at: Pt, size: f32, color: Rgba) {
        if !self.draw_labels {
            return;
        }
        self.shaper.draw_left(self.canvas, text, at.x as f32, at.y as f32, size, to_skia(color));
    }

    fn measure_text(&self, text: &str, size: f32) -> f64 {
        self.shaper.measure_width(text, size) as f64
    }
}
