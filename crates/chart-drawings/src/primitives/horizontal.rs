// File: crates/chart-drawings/src/primitives/horizontal.rs
// Summary: Horizontal price level spanning the visible time range.

use super::{DragDelta, DrawingKind, HitKind, Primitive};
use crate::codec::{DrawingRecord, HorizontalRecord};
use crate::config::EngineConfig;
use crate::geometry::Pt;
use crate::mapper::CoordinateMapper;
use crate::render::{Stroke, Surface};
use crate::style::LineOptions;
use crate::types::{DrawingId, Point, SubscriptionId};

#[derive(Clone, Debug)]
pub struct HorizontalLine {
    id: DrawingId,
    pub price: f64,
    pub options: LineOptions,
    span: Option<(Point, Point)>,
    subscription: Option<SubscriptionId>,
    geometry: Option<(Pt, Pt)>,
}

impl HorizontalLine {
    pub fn new(price: f64, options: LineOptions) -> Self {
        Self { id: DrawingId::new(), price, options, span: None, subscription: None, geometry: None }
    }

    /// Model endpoints at the left and right edges of the visible range, as of the last range notification.
    pub fn span(&self) -> Option<(Point, Point)> {
        self.span.map(|(a, b)| (Point { price: self.price, ..a }, Point { price: self.price, ..b }))
    }

    pub fn drawn_segment(&self) -> Option<(Pt, Pt)> { self.geometry }

    fn refresh_span(&mut self, mapper: &CoordinateMapper<'_>) {
        let host = mapper.host();
        let logical = host.visible_logical_range();
        let time = host.visible_time_range();
        if logical.is_none() && time.is_none() {
            return;
        }
        let edge = |l: Option<f64>, t: Option<i64>| Point { time: t, logical: l, price: self.price };
        self.span = Some((
            edge(logical.map(|r| r.from), time.map(|r| r.from)),
            edge(logical.map(|r| r.to), time.map(|r| r.to)),
        ));
    }
}

impl Primitive for HorizontalLine {
    fn id(&self) -> DrawingId { self.id }

    fn kind(&self) -> DrawingKind { DrawingKind::Horizontal }

    fn update_geometry(&mut self, mapper: &CoordinateMapper<'_>, _config: &EngineConfig) {
        if self.span.is_none() {
            self.refresh_span(mapper);
        }
        let Some(y) = mapper.to_y(self.price) else {
            self.geometry = None;
            return;
        };
        let (left, right) = match self.span {
            Some((a, b)) => (mapper.to_x(&a), mapper.to_x(&b)),
            None => (None, None),
        };
        let (w, _) = mapper.pane_size();
        self.geometry = Some((Pt::new(left.unwrap_or(0.0), y), Pt::new(right.unwrap_or(w), y)));
    }

    fn hit_test(&self, px: f64, py: f64, config: &EngineConfig) -> Option<HitKind> {
        let (a, b) = self.geometry?;
        let tol = config.line_hit_tolerance;
        let within_x = px >= a.x.min(b.x) - tol && px <= a.x.max(b.x) + tol;
        (within_x && (py - a.y).abs() <= tol).then_some(HitKind::Body)
    }

    fn apply_delta(&mut self, _mapper: &CoordinateMapper<'_>, kind: HitKind, delta: &DragDelta) {
        if kind == HitKind::Body {
            self.price += delta.delta_price;
        }
    }

    fn render(&self, surface: &mut dyn Surface, ratio: f64, _config: &EngineConfig) {
        let Some((a, b)) = self.geometry else { return };
        let stroke = Stroke { color: self.options.color, width: self.options.width, dash: self.options.style.dash() };
        let y = (a.y * ratio).round();
        surface.stroke_line(Pt::new((a.x * ratio).round(), y), Pt::new((b.x * ratio).round(), y), &stroke);
        if self.options.show_label {
            let size = 12.0 * ratio as f32;
            let text = format!("{:.2}", self.price);
            let tw = surface.measure_text(&text, size);
            surface.fill_text(&text, Pt::new(b.x * ratio - tw - 6.0 * ratio, y - 4.0 * ratio), size, self.options.color);
        }
    }

    fn to_record(&self) -> DrawingRecord {
        DrawingRecord::Horizontal(HorizontalRecord { price: Some(self.price), options: self.options })
    }

    fn wants_range_updates(&self) -> bool { true }

    fn subscription(&self) -> Option<SubscriptionId> { self.subscription }

    fn set_subscription(&mut self, subscription: Option<SubscriptionId>) { self.subscription = subscription; }

    fn on_visible_range_change(&mut self, mapper: &CoordinateMapper<'_>) { self.refresh_span(mapper); }
}
