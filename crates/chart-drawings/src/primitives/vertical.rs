// File: crates/chart-drawings/src/primitives/vertical.rs
// Summary: Vertical time marker, optionally limited to a price window around an anchor price.

use super::{DragDelta, DrawingKind, HitKind, Primitive};
use crate::codec::{DrawingRecord, VerticalRecord};
use crate::config::EngineConfig;
use crate::geometry::Pt;
use crate::mapper::CoordinateMapper;
use crate::render::{Stroke, Surface};
use crate::style::LineOptions;
use crate::types::{normalize_timestamp, DrawingId, SubscriptionId, Timestamp};

#[derive(Clone, Debug)]
pub struct VerticalLine {
    id: DrawingId,
    pub time: Timestamp,
    pub anchor_price: Option<f64>,
    pub options: LineOptions,
    /// Sub-second remainder of drag motion not yet applied to `time`.
    drag_carry: f64,
    in_view: bool,
    subscription: Option<SubscriptionId>,
    geometry: Option<(Pt, Pt)>,
}

impl VerticalLine {
    pub fn new(time: Timestamp, anchor_price: Option<f64>, options: LineOptions) -> Self {
        Self {
            id: DrawingId::new(),
            time: normalize_timestamp(time),
            anchor_price: anchor_price.filter(|p| p.is_finite()),
            options,
            drag_carry: 0.0,
            in_view: true,
            subscription: None,
            geometry: None,
        }
    }

    pub fn drawn_segment(&self) -> Option<(Pt, Pt)> { self.geometry }

    /// Whether `time` fell inside the visible range at the last geometry pass or range notification.
    pub fn in_view(&self) -> bool { self.in_view }

    fn refresh_in_view(&mut self, mapper: &CoordinateMapper<'_>) {
        if let (Some(range), Some(logical)) = (mapper.visible_logical_range(), mapper.time_to_logical(self.time)) {
            self.in_view = range.contains(logical);
        }
    }
}

impl Primitive for VerticalLine {
    fn id(&self) -> DrawingId { self.id }

    fn kind(&self) -> DrawingKind { DrawingKind::Vertical }

    fn update_geometry(&mut self, mapper: &CoordinateMapper<'_>, config: &EngineConfig) {
        self.refresh_in_view(mapper);
        let Some(x) = mapper.time_to_x(self.time) else {
            self.geometry = None;
            return;
        };
        let (_, height) = mapper.pane_size();
        let ys = match self.anchor_price {
            Some(p) => {
                let half = config.vertical_price_window / 2.0;
                mapper.to_y(p + half).zip(mapper.to_y(p - half))
            }
            None => Some((0.0, height)),
        };
        self.geometry = ys.map(|(top, bottom)| (Pt::new(x, top.min(bottom)), Pt::new(x, top.max(bottom))));
    }

    fn hit_test(&self, px: f64, py: f64, config: &EngineConfig) -> Option<HitKind> {
        if !self.in_view {
            return None;
        }
        let (top, bottom) = self.geometry?;
        let tol = config.line_hit_tolerance;
        ((px - top.x).abs() <= tol && py >= top.y - tol && py <= bottom.y + tol).then_some(HitKind::Body)
    }

    fn apply_delta(&mut self, mapper: &CoordinateMapper<'_>, kind: HitKind, delta: &DragDelta) {
        if kind != HitKind::Body {
            return;
        }
        let Some(spb) = mapper.seconds_per_bar() else { return };
        let total = self.drag_carry + delta.delta_logical * spb as f64;
        let whole = total.round();
        self.time += whole as i64;
        self.drag_carry = total - whole;
    }

    fn render(&self, surface: &mut dyn Surface, ratio: f64, _config: &EngineConfig) {
        let Some((top, bottom)) = self.geometry.filter(|_| self.in_view) else { return };
        let stroke = Stroke { color: self.options.color, width: self.options.width, dash: self.options.style.dash() };
        let x = (top.x * ratio).round();
        surface.stroke_line(Pt::new(x, (top.y * ratio).round()), Pt::new(x, (bottom.y * ratio).round()), &stroke);
    }

    fn to_record(&self) -> DrawingRecord {
        DrawingRecord::Vertical(VerticalRecord { time: Some(self.time), price: self.anchor_price, options: self.options })
    }

    fn wants_range_updates(&self) -> bool { true }

    fn subscription(&self) -> Option<SubscriptionId> { self.subscription }

    fn set_subscription(&mut self, subscription: Option<SubscriptionId>) { self.subscription = subscription; }

    fn on_visible_range_change(&mut self, mapper: &CoordinateMapper<'_>) {
        self.refresh_in_view(mapper);
    }
}
