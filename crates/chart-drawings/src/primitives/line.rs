// File: crates/chart-drawings/src/primitives/line.rs
// Summary: Two-point line family: trend segment, ray, info line and extended line.

use chrono::Duration;

use super::{DragDelta, DrawingKind, HitKind, Primitive};
use crate::codec::{DrawingRecord, LineRecord};
use crate::config::EngineConfig;
use crate::geometry::{distance_to_segment, Pt, RectF};
use crate::mapper::CoordinateMapper;
use crate::render::{Stroke, Surface};
use crate::style::{LineOptions, Rgba};
use crate::types::{DrawingId, Point};

const LABEL_FONT: f32 = 13.0;
const LABEL_BG: Rgba = Rgba::rgb(0x40, 0x40, 0x40);

/// How the drawn segment is derived from the two defining points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// Literal endpoints.
    Trend,
    /// From p1 through p2 to the visible edge.
    Ray,
    /// Literal endpoints with a measurement label.
    Info,
    /// Through both points to both visible edges.
    Extended,
}

impl LineKind {
    pub fn drawing_kind(&self) -> DrawingKind {
        match self {
            LineKind::Trend => DrawingKind::Trend,
            LineKind::Ray => DrawingKind::Ray,
            LineKind::Info => DrawingKind::Info,
            LineKind::Extended => DrawingKind::Extended,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct LineGeometry {
    a: Pt,
    b: Pt,
    from: Pt,
    to: Pt,
}

#[derive(Clone, Debug)]
pub struct TrendSegment {
    id: DrawingId,
    kind: LineKind,
    pub p1: Point,
    pub p2: Point,
    pub options: LineOptions,
    geometry: Option<LineGeometry>,
}

impl TrendSegment {
    pub fn new(kind: LineKind, p1: Point, p2: Point, options: LineOptions) -> Self {
        Self { id: DrawingId::new(), kind, p1, p2, options, geometry: None }
    }

    pub fn line_kind(&self) -> LineKind { self.kind }

    /// The segment actually drawn, in pane px, as of the last geometry update.
    pub fn drawn_segment(&self) -> Option<(Pt, Pt)> {
        self.geometry.map(|g| (g.from, g.to))
    }

    /// Measurement text shown on info lines.
    pub fn info_label(&self) -> String {
        let change = self.p2.price - self.p1.price;
        let pct = if self.p1.price != 0.0 { change / self.p1.price * 100.0 } else { 0.0 };
        let mut text = format!("{change:+.2} ({pct:+.2}%)");
        if let (Some(l1), Some(l2)) = (self.p1.logical, self.p2.logical) {
            text.push_str(&format!("  {} bars", (l2 - l1).round() as i64));
        }
        if let (Some(t1), Some(t2)) = (self.p1.time, self.p2.time) {
            text.push_str(&format!("  {}", format_span(Duration::seconds(t2 - t1))));
        }
        text
    }

    fn derive_segment(&self, a: Pt, b: Pt, mapper: &CoordinateMapper<'_>) -> (Pt, Pt) {
        if matches!(self.kind, LineKind::Trend | LineKind::Info) {
            return (a, b);
        }
        let (left, right) = mapper.visible_x_edges();
        let (_, height) = mapper.pane_size();
        let dx = b.x - a.x;

        if dx.abs() < 1e-9 {
            // Vertical: no slope to extrapolate with.
            return match self.kind {
                LineKind::Ray => (a, Pt::new(a.x, if b.y >= a.y { height } else { 0.0 })),
                _ => (Pt::new(a.x, 0.0), Pt::new(a.x, height)),
            };
        }

        let slope = (b.y - a.y) / dx;
        let at = |x: f64| Pt::new(x, a.y + slope * (x - a.x));
        match self.kind {
            LineKind::Ray => {
                let edge = if dx > 0.0 { right.max(b.x) } else { left.min(b.x) };
                (a, at(edge))
            }
            _ => (at(left.min(a.x.min(b.x))), at(right.max(a.x.max(b.x)))),
        }
    }

    fn draw_label(&self, surface: &mut dyn Surface, g: &LineGeometry, ratio: f64) {
        let text = match self.kind {
            LineKind::Info => self.info_label(),
            _ => format!("{:.2}", self.p2.price),
        };
        let size = LABEL_FONT * ratio as f32;
        let pad = 5.0 * ratio;
        let mid = g.a.midpoint(g.b).scaled(ratio);
        let w = surface.measure_text(&text, size);
        let h = size as f64 + pad;
        let top = mid.y - 20.0 * ratio - h;
        surface.fill_rect(RectF::from_ltwh(mid.x - w / 2.0 - pad, top, w + pad * 2.0, h), LABEL_BG);
        surface.fill_text(&text, Pt::new(mid.x - w / 2.0, top + h - pad), size, self.options.color);
    }
}

impl Primitive for TrendSegment {
    fn id(&self) -> DrawingId { self.id }

    fn kind(&self) -> DrawingKind { self.kind.drawing_kind() }

    fn update_geometry(&mut self, mapper: &CoordinateMapper<'_>, _config: &EngineConfig) {
        let resolve = |p: &Point| Some(Pt::new(mapper.to_x(p)?, mapper.to_y(p.price)?));
        self.geometry = match (resolve(&self.p1), resolve(&self.p2)) {
            (Some(a), Some(b)) => {
                let (from, to) = self.derive_segment(a, b, mapper);
                Some(LineGeometry { a, b, from, to })
            }
            _ => None,
        };
    }

    fn hit_test(&self, px: f64, py: f64, config: &EngineConfig) -> Option<HitKind> {
        let g = self.geometry?;
        let p = Pt::new(px, py);
        let tol = config.line_hit_tolerance;
        if p.distance_to(g.a) <= tol {
            return Some(HitKind::P1);
        }
        if p.distance_to(g.b) <= tol {
            return Some(HitKind::P2);
        }
        (distance_to_segment(p, g.from, g.to) <= tol).then_some(HitKind::Body)
    }

    fn apply_delta(&mut self, mapper: &CoordinateMapper<'_>, kind: HitKind, delta: &DragDelta) {
        let (dl, dp) = (delta.delta_logical, delta.delta_price);
        match kind {
            HitKind::P1 => self.p1 = mapper.shift(&self.p1, dl, dp),
            HitKind::P2 => self.p2 = mapper.shift(&self.p2, dl, dp),
            HitKind::Body => {
                self.p1 = mapper.shift(&self.p1, dl, dp);
                self.p2 = mapper.shift(&self.p2, dl, dp);
            }
            _ => {}
        }
    }

    fn render(&self, surface: &mut dyn Surface, ratio: f64, _config: &EngineConfig) {
        let Some(g) = self.geometry else { return };
        let stroke = Stroke { color: self.options.color, width: self.options.width, dash: self.options.style.dash() };
        let round = |p: Pt| Pt::new((p.x * ratio).round(), (p.y * ratio).round());
        surface.stroke_line(round(g.from), round(g.to), &stroke);
        if self.options.show_label {
            self.draw_label(surface, &g, ratio);
        }
    }

    fn to_record(&self) -> DrawingRecord {
        let record = LineRecord::new(&self.p1, &self.p2, self.options);
        match self.kind {
            LineKind::Trend => DrawingRecord::Trend(record),
            LineKind::Ray => DrawingRecord::Ray(record),
            LineKind::Info => DrawingRecord::Info(record),
            LineKind::Extended => DrawingRecord::Extended(record),
        }
    }
}

/// Compact span such as `2d 4h`, `3h 15m` or `45m`.
fn format_span(span: Duration) -> String {
    let sign = if span < Duration::zero() { "-" } else { "" };
    let span = span.abs();
    let days = span.num_days();
    let hours = span.num_hours() % 24;
    let minutes = span.num_minutes() % 60;
    if days > 0 {
        format!("{sign}{days}d {hours}h")
    } else if hours > 0 {
        format!("{sign}{hours}h {minutes}m")
    } else {
        format!("{sign}{minutes}m")
    }
}
