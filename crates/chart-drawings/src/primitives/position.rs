// File: crates/chart-drawings/src/primitives/position.rs
// Summary: Long/short position band with TP/SL zones, hit tracking, bar-count width and resize handle.

use super::evaluator::{HitType, PositionEvaluator, PositionHit, PositionLevels};
use super::{DragDelta, DrawingKind, HitKind, Primitive};
use crate::codec::{DrawingRecord, PointRecord, PositionRecord};
use crate::config::EngineConfig;
use crate::geometry::{clamp, Pt, RectF};
use crate::mapper::CoordinateMapper;
use crate::render::{Stroke, Surface};
use crate::style::{PositionStyle, Rgba};
use crate::types::{Bar, DrawingId, Point, Side};

const ARROW_DASH: [f32; 2] = [8.0, 6.0];
const LABEL_BOX: Rgba = Rgba::rgba(0, 0, 0, 153);

/// Pane-space geometry cached by `update_geometry`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct BandGeometry {
    entry_x: f64,
    entry_y: f64,
    tp_y: f64,
    sl_y: f64,
    width: f64,
    hit_x: Option<f64>,
}

impl BandGeometry {
    fn right(&self) -> f64 { self.entry_x + self.width }
}

#[derive(Clone, Debug)]
pub struct PositionBand {
    id: DrawingId,
    pub entry: Point,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub side: Side,
    band_bars: Option<u32>,
    /// Pixel width from older records; converted to `band_bars` once the scale is known.
    legacy_width_px: Option<f64>,
    pub style: PositionStyle,
    evaluator: PositionEvaluator,
    pending_init: bool,
    geometry: Option<BandGeometry>,
}

impl PositionBand {
    pub fn new(side: Side, entry: Point, take_profit: f64, stop_loss: f64, style: PositionStyle) -> Self {
        Self {
            id: DrawingId::new(),
            entry,
            take_profit,
            stop_loss,
            side,
            band_bars: None,
            legacy_width_px: None,
            style,
            evaluator: PositionEvaluator::new(),
            pending_init: false,
            geometry: None,
        }
    }

    pub fn with_band_bars(mut self, bars: Option<u32>) -> Self {
        self.band_bars = bars.map(|b| b.max(1));
        self
    }

    pub fn with_legacy_width(mut self, px: Option<f64>) -> Self {
        self.legacy_width_px = px.filter(|w| w.is_finite() && *w > 0.0);
        self
    }

    pub fn band_bars(&self) -> Option<u32> { self.band_bars }

    pub fn legacy_width(&self) -> Option<f64> { self.legacy_width_px }

    pub fn levels(&self) -> PositionLevels {
        PositionLevels { side: self.side, entry: self.entry, take_profit: self.take_profit, stop_loss: self.stop_loss }
    }

    pub fn hit(&self) -> Option<&PositionHit> { self.evaluator.hit() }

    pub fn last_close(&self) -> Option<f64> { self.evaluator.last_close() }

    /// True while the entry still needs enrichment and the historical replay hasn't run.
    pub fn is_pending(&self) -> bool { self.pending_init }

    pub(crate) fn mark_pending(&mut self) { self.pending_init = true; }

    /// Fill in the entry's missing time/logical and replay loaded bars. Runs once.
    pub fn finish_init(&mut self, mapper: &CoordinateMapper<'_>) {
        self.entry = mapper.enrich(&self.entry);
        self.pending_init = false;
        self.replay(mapper);
    }

    pub fn check_bar(&mut self, bar: &Bar, bar_logical: Option<f64>) -> Option<PositionHit> {
        let levels = self.levels();
        self.evaluator.check_bar(&levels, bar, bar_logical)
    }

    /// Evaluate every bar the host currently holds.
    pub fn replay(&mut self, mapper: &CoordinateMapper<'_>) -> Option<PositionHit> {
        let levels = self.levels();
        self.evaluator.replay(&levels, mapper.host().bars())
    }

    pub fn set_entry(&mut self, mapper: &CoordinateMapper<'_>, entry: Point) {
        self.entry = mapper.enrich(&entry);
        self.evaluator.reset();
    }

    pub fn set_take_profit(&mut self, price: f64) {
        self.take_profit = price;
        self.evaluator.reset();
    }

    pub fn set_stop_loss(&mut self, price: f64) {
        self.stop_loss = price;
        self.evaluator.reset();
    }

    pub fn move_by(&mut self, mapper: &CoordinateMapper<'_>, delta_logical: f64, delta_price: f64) {
        self.entry = mapper.shift(&self.entry, delta_logical, delta_price);
        self.take_profit += delta_price;
        self.stop_loss += delta_price;
        self.evaluator.reset();
    }

    /// Set the band's right edge to `logical`. Keeps the recorded hit.
    pub fn resize_to_logical(&mut self, logical: f64) {
        let Some(entry) = self.entry.logical else { return };
        self.band_bars = Some((logical - entry).round().max(1.0) as u32);
        self.legacy_width_px = None;
    }

    /// Set the band width from a pane-pixel width. Keeps the recorded hit.
    pub fn set_band_width_px(&mut self, mapper: &CoordinateMapper<'_>, width: f64) {
        let Some(entry_x) = self.entry.logical.and_then(|l| mapper.logical_to_x(l)) else { return };
        if let Some(target) = mapper.to_logical(entry_x + width) {
            self.resize_to_logical(target);
        }
    }

    /// TP distance as a percentage of the entry price.
    pub fn pl_percent(&self) -> f64 {
        let diff = match self.side {
            Side::Long => self.take_profit - self.entry.price,
            Side::Short => self.entry.price - self.take_profit,
        };
        if self.entry.price == 0.0 { 0.0 } else { diff / self.entry.price * 100.0 }
    }

    /// Reward over risk, or `None` when the stop sits on the entry.
    pub fn risk_reward(&self) -> Option<f64> {
        let risk = (self.entry.price - self.stop_loss).abs();
        let reward = (self.take_profit - self.entry.price).abs();
        (risk > 0.0).then(|| reward / risk)
    }

    /// Until the scale is known the pixel width is kept as is and drawn directly.
    fn convert_legacy_width(&mut self, mapper: &CoordinateMapper<'_>) {
        let (Some(px), Some(entry)) = (self.legacy_width_px, self.entry.logical) else { return };
        let per_bar = match (mapper.logical_to_x(entry), mapper.logical_to_x(entry + 1.0)) {
            (Some(a), Some(b)) if (b - a).abs() > 0.0 => (b - a).abs(),
            (Some(_), Some(_)) => 10.0,
            _ => return,
        };
        self.band_bars = Some((px / per_bar).round().max(1.0) as u32);
        self.legacy_width_px = None;
    }

    fn width_px(&self, mapper: &CoordinateMapper<'_>, entry_x: f64, config: &EngineConfig) -> f64 {
        let bars = self.band_bars.unwrap_or(config.default_band_bars) as f64;
        match self.entry.logical.and_then(|l| mapper.logical_to_x(l + bars)) {
            Some(edge) => (edge - entry_x).max(0.0),
            None => self.legacy_width_px.unwrap_or(config.fallback_band_width_px),
        }
    }

    fn hit_x(&self, mapper: &CoordinateMapper<'_>) -> Option<f64> {
        let hit = self.evaluator.hit()?;
        hit.logical
            .and_then(|l| mapper.logical_to_x(l))
            .or_else(|| hit.time.and_then(|t| mapper.time_to_x(t)))
    }

    fn arrow_target(&self, g: &BandGeometry) -> (f64, HitType) {
        let kind = match self.evaluator.hit() {
            Some(hit) => hit.kind,
            None if self.evaluator.moving_toward_tp(&self.levels()) => HitType::Tp,
            None => HitType::Sl,
        };
        let y = match kind {
            HitType::Tp => g.tp_y,
            HitType::Sl => g.sl_y,
        };
        (y, kind)
    }

    fn draw_arrow(&self, surface: &mut dyn Surface, g: &BandGeometry, ratio: f64, x: f64, y_entry: f64, band: f64) {
        let (w, h) = surface.size();
        let (target_y, kind) = self.arrow_target(g);
        let target_y = (target_y * ratio).round();
        let max_x = w - (12.0 * ratio).round();

        let (end_x, off_screen) = match (self.evaluator.hit(), g.hit_x) {
            (Some(_), Some(hx)) if (0.0..=w).contains(&(hx * ratio)) => {
                let min_x = x + (8.0 * ratio).round();
                (clamp((hx * ratio).round(), min_x, max_x.max(min_x)), false)
            }
            (Some(_), _) => ((x + band).min(w - (24.0 * ratio).round()), true),
            (None, _) => {
                let end = (x + (24.0 * ratio).round()).max(x + band).min(max_x);
                (end, !(0.0..=h).contains(&target_y))
            }
        };

        let color = self.style.line_color;
        let from = Pt::new(x, y_entry);
        let to = Pt::new(end_x, target_y);
        surface.stroke_line(from, to, &Stroke::dashed(color, 2.0, ARROW_DASH));

        let head = 6.0 * ratio;
        let angle = (to.y - from.y).atan2(to.x - from.x);
        let wing = |a: f64| Pt::new(to.x - head * a.cos(), to.y - head * a.sin());
        let spread = std::f64::consts::FRAC_PI_6;
        surface.fill_polygon(&[to, wing(angle - spread), wing(angle + spread)], color);

        if off_screen {
            let size = 8.0 * ratio;
            let tip = Pt::new(end_x, clamp(target_y, 0.0, h));
            surface.fill_polygon(
                &[tip, Pt::new(tip.x - size, tip.y - size / 2.0), Pt::new(tip.x - size, tip.y + size / 2.0)],
                color,
            );
            let text = format!("{} (off-screen)", kind.label());
            let font = 10.0 * ratio as f32;
            let tw = surface.measure_text(&text, font);
            let at = Pt::new(tip.x - size - tw - (6.0 * ratio).round(), tip.y - (10.0 * ratio).round());
            surface.fill_text(&text, at, font, Rgba::WHITE);
        }
    }

    fn draw_labels(&self, surface: &mut dyn Surface, ratio: f64, x: f64, y_entry: f64, band: f64) {
        let font = 12.0 * ratio as f32;
        let gap = (8.0 * ratio).round();
        surface.fill_text(&format!("{:.2}%", self.pl_percent()), Pt::new(x + gap, y_entry - gap), font, Rgba::WHITE);

        let rr = self.risk_reward().map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string());
        let label = format!("R:R {rr}");
        let pad = 6.0 * ratio;
        let box_w = surface.measure_text(&label, font) + pad * 2.0;
        let box_h = 18.0 * ratio;
        let left = x + band - box_w - gap;
        surface.fill_rect(RectF::from_ltwh(left, y_entry - box_h - gap, box_w, box_h), LABEL_BOX);
        surface.fill_text(&label, Pt::new(left + pad, y_entry - gap - box_h / 2.0 + 4.0 * ratio), font, Rgba::WHITE);
    }
}

impl Primitive for PositionBand {
    fn id(&self) -> DrawingId { self.id }

    fn kind(&self) -> DrawingKind { DrawingKind::Position }

    fn update_geometry(&mut self, mapper: &CoordinateMapper<'_>, config: &EngineConfig) {
        if self.entry.logical.is_none() {
            self.entry = mapper.enrich(&self.entry);
        }
        if self.band_bars.is_none() && self.legacy_width_px.is_some() {
            self.convert_legacy_width(mapper);
        }
        let resolved = (|| {
            Some((mapper.to_x(&self.entry)?, mapper.to_y(self.entry.price)?, mapper.to_y(self.take_profit)?, mapper.to_y(self.stop_loss)?))
        })();
        self.geometry = resolved.map(|(entry_x, entry_y, tp_y, sl_y)| BandGeometry {
            entry_x,
            entry_y,
            tp_y,
            sl_y,
            width: self.width_px(mapper, entry_x, config),
            hit_x: self.hit_x(mapper),
        });
    }

    fn hit_test(&self, px: f64, py: f64, config: &EngineConfig) -> Option<HitKind> {
        let g = self.geometry?;
        let tol = config.band_hit_tolerance;
        let right = g.right();
        if px < g.entry_x - tol || px > right + tol {
            return None;
        }
        if (px - right).abs() <= tol {
            return Some(HitKind::Resize);
        }
        if (py - g.tp_y).abs() <= tol {
            return Some(HitKind::Tp);
        }
        if (py - g.sl_y).abs() <= tol {
            return Some(HitKind::Sl);
        }
        if (py - g.entry_y).abs() <= tol {
            return Some(HitKind::Entry);
        }
        let top = g.entry_y.min(g.tp_y).min(g.sl_y);
        let bottom = g.entry_y.max(g.tp_y).max(g.sl_y);
        let body = RectF { left: g.entry_x - tol, top, right: right + tol, bottom };
        body.contains(Pt::new(px, py)).then_some(HitKind::Body)
    }

    fn apply_delta(&mut self, mapper: &CoordinateMapper<'_>, kind: HitKind, delta: &DragDelta) {
        match kind {
            HitKind::Body => self.move_by(mapper, delta.delta_logical, delta.delta_price),
            HitKind::Tp => self.set_take_profit(self.take_profit + delta.delta_price),
            HitKind::Sl => self.set_stop_loss(self.stop_loss + delta.delta_price),
            HitKind::Entry => {
                let moved = mapper.shift(&self.entry, delta.delta_logical, delta.delta_price);
                self.set_entry(mapper, moved);
            }
            HitKind::Resize => self.resize_to_logical(delta.logical),
            HitKind::P1 | HitKind::P2 => {}
        }
    }

    fn render(&self, surface: &mut dyn Surface, ratio: f64, config: &EngineConfig) {
        let Some(g) = self.geometry else { return };
        let (w, _) = surface.size();
        let x = (g.entry_x * ratio).round();
        let y_entry = (g.entry_y * ratio).round();
        let y_tp = (g.tp_y * ratio).round();
        let y_sl = (g.sl_y * ratio).round();

        let desired = (g.width * ratio).round().max(config.min_band_width_px);
        let available = (w - x).max(0.0);
        let band = desired.min(available).max(config.min_band_width_px);

        surface.fill_rect(RectF::between_ys(x, x + band, y_entry, y_tp), self.style.tp_color);
        surface.fill_rect(RectF::between_ys(x, x + band, y_entry, y_sl), self.style.sl_color);

        self.draw_arrow(surface, &g, ratio, x, y_entry, band);

        let border = Stroke::solid(self.style.line_color, self.style.width);
        for y in [y_entry, y_tp, y_sl] {
            surface.stroke_line(Pt::new(x, y), Pt::new(x + band, y), &border);
        }

        self.draw_labels(surface, ratio, x, y_entry, band);
    }

    fn to_record(&self) -> DrawingRecord {
        DrawingRecord::Position(PositionRecord {
            entry: Some(PointRecord::from(&self.entry)),
            take_profit: Some(self.take_profit),
            stop_loss: Some(self.stop_loss),
            side: self.side,
            band_bars: self.band_bars,
            band_width: self.legacy_width_px,
            options: self.style,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long(entry: f64, tp: f64, sl: f64) -> PositionBand {
        PositionBand::new(Side::Long, Point::at_logical(50.0, entry), tp, sl, PositionStyle::default())
    }

    #[test]
    fn pl_percent_follows_side() {
        assert!((long(100.0, 110.0, 95.0).pl_percent() - 10.0).abs() < 1e-9);
        let short = PositionBand::new(Side::Short, Point::at_logical(0.0, 100.0), 90.0, 105.0, PositionStyle::default());
        assert!((short.pl_percent() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn risk_reward_is_none_without_risk() {
        assert_eq!(long(100.0, 110.0, 100.0).risk_reward(), None);
        assert!((long(100.0, 110.0, 95.0).risk_reward().unwrap_or_default() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn resize_counts_bars_from_entry() {
        let mut band = long(100.0, 110.0, 95.0).with_legacy_width(Some(120.0));
        band.resize_to_logical(80.2);
        assert_eq!(band.band_bars(), Some(30));
        assert_eq!(band.legacy_width(), None);
        band.resize_to_logical(10.0);
        assert_eq!(band.band_bars(), Some(1));
    }
}
