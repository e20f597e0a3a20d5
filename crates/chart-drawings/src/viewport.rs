// File: crates/chart-drawings/src/viewport.rs
// Summary: Reference `ChartHost` over bar-index and price axes; pan/zoom state, bars, subscriptions.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::host::ChartHost;
use crate::scale::{BarScale, PriceScale};
use crate::types::{Bar, DrawingId, LogicalRange, SubscriptionId, TimeRange, Timestamp};

/// A pannable/zoomable chart pane holding one bar series.
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
    pub bar_scale: BarScale,
    pub price_scale: PriceScale,
    seconds_per_bar: i64,
    bars: Vec<Bar>,
    laid_out: bool,
    interaction_enabled: bool,
    attached: BTreeSet<DrawingId>,
    subscriptions: HashMap<SubscriptionId, DrawingId>,
    next_subscription: u64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, seconds_per_bar: i64) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
            bar_scale: BarScale::new(0.0, 8.0),
            price_scale: PriceScale::linear(height, 0.0, 100.0),
            seconds_per_bar: seconds_per_bar.max(1),
            bars: Vec::new(),
            laid_out: false,
            interaction_enabled: true,
            attached: BTreeSet::new(),
            subscriptions: HashMap::new(),
            next_subscription: 1,
        }
    }

    pub fn with_pixel_ratio(mut self, ratio: f64) -> Self {
        self.pixel_ratio = ratio.max(0.1);
        self
    }

    /// Replace the series. Bars are sorted ascending and de-duplicated by time.
    pub fn set_bars(&mut self, mut bars: Vec<Bar>) {
        bars.sort_by_key(|b| b.time);
        bars.dedup_by_key(|b| b.time);
        self.bars = bars;
    }

    /// Apply a live bar: update in place when it matches the last bar's time, append when newer.
    /// Returns the logical index the bar landed on, or `None` for stale bars.
    pub fn append_bar(&mut self, bar: Bar) -> Option<usize> {
        match self.bars.last() {
            Some(last) if last.time == bar.time => {
                let i = self.bars.len() - 1;
                self.bars[i] = bar;
                Some(i)
            }
            Some(last) if last.time > bar.time => None,
            _ => {
                self.bars.push(bar);
                Some(self.bars.len() - 1)
            }
        }
    }

    /// Show every bar and autoscale prices; completes the first layout.
    pub fn fit_content(&mut self) {
        let n = self.bars.len().max(1) as f64;
        let spacing = (self.width / (n + 2.0)).clamp(0.5, 200.0);
        self.bar_scale = BarScale::new(-1.0, spacing);
        if let Some((lo, hi)) = self.price_extent() {
            let m = (hi - lo).max(1e-9) * 0.1;
            self.price_scale = PriceScale::linear(self.height, lo - m, hi + m);
        }
        self.laid_out = true;
    }

    /// Mark the pane as laid out without touching the scales.
    pub fn mark_laid_out(&mut self) { self.laid_out = true; }

    pub fn set_price_range(&mut self, vmin: f64, vmax: f64) {
        self.price_scale = PriceScale::linear(self.height, vmin, vmax);
    }

    pub fn set_log_price_range(&mut self, vmin: f64, vmax: f64) {
        self.price_scale = PriceScale::log10(self.height, vmin, vmax);
    }

    /// Pan horizontally by `dx_px`. Ignored while interaction is suspended. Returns true when the range moved.
    pub fn pan_px(&mut self, dx_px: f64) -> bool {
        if !self.interaction_enabled { return false; }
        self.bar_scale.scroll(dx_px);
        true
    }

    pub fn zoom_at(&mut self, cursor_px: f64, factor: f64) -> bool {
        if !self.interaction_enabled { return false; }
        self.bar_scale.zoom(cursor_px, factor);
        true
    }

    pub fn scroll_price_px(&mut self, dy_px: f64) -> bool {
        if !self.interaction_enabled { return false; }
        self.price_scale.scroll(dy_px);
        true
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.price_scale.height = height;
    }

    pub fn interaction_enabled(&self) -> bool { self.interaction_enabled }
    pub fn attached_count(&self) -> usize { self.attached.len() }
    pub fn is_attached(&self, id: DrawingId) -> bool { self.attached.contains(&id) }
    pub fn subscription_count(&self) -> usize { self.subscriptions.len() }

    fn price_extent(&self) -> Option<(f64, f64)> {
        let lo = self.bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let hi = self.bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        (lo.is_finite() && hi.is_finite()).then_some((lo, hi))
    }

    /// Fractional logical index of `time`: exact, interpolated between bars, or extrapolated past either end.
    pub fn logical_for_time(&self, time: Timestamp) -> Option<f64> {
        let first = self.bars.first()?;
        let last = self.bars.last()?;
        let spb = self.seconds_per_bar as f64;
        match self.bars.binary_search_by_key(&time, |b| b.time) {
            Ok(i) => Some(i as f64),
            Err(0) => Some((time - first.time) as f64 / spb),
            Err(i) if i == self.bars.len() => Some((self.bars.len() - 1) as f64 + (time - last.time) as f64 / spb),
            Err(i) => {
                let (a, b) = (&self.bars[i - 1], &self.bars[i]);
                let frac = (time - a.time) as f64 / ((b.time - a.time) as f64).max(1.0);
                Some((i - 1) as f64 + frac)
            }
        }
    }

    /// Timestamp at `logical`: nearest bar inside the series, extrapolated outside it.
    pub fn time_for_logical(&self, logical: f64) -> Option<Timestamp> {
        let first = self.bars.first()?;
        let last = self.bars.last()?;
        let last_idx = (self.bars.len() - 1) as f64;
        if logical < 0.0 {
            Some(first.time + (logical * self.seconds_per_bar as f64).round() as i64)
        } else if logical > last_idx {
            Some(last.time + ((logical - last_idx) * self.seconds_per_bar as f64).round() as i64)
        } else {
            Some(self.bars[logical.round() as usize].time)
        }
    }

    fn ready(&self) -> bool { self.laid_out && !self.bars.is_empty() }
}

impl ChartHost for Viewport {
    fn time_to_coordinate(&self, time: Timestamp) -> Option<f64> {
        if !self.ready() { return None; }
        self.logical_for_time(time).map(|l| self.bar_scale.x_of(l))
    }

    fn coordinate_to_time(&self, x: f64) -> Option<Timestamp> {
        if !self.ready() { return None; }
        self.time_for_logical(self.bar_scale.logical_at(x))
    }

    fn logical_to_coordinate(&self, logical: f64) -> Option<f64> {
        if !self.ready() || !logical.is_finite() { return None; }
        Some(self.bar_scale.x_of(logical))
    }

    fn coordinate_to_logical(&self, x: f64) -> Option<f64> {
        if !self.ready() || !x.is_finite() { return None; }
        Some(self.bar_scale.logical_at(x))
    }

    fn price_to_coordinate(&self, price: f64) -> Option<f64> {
        if !self.laid_out || !price.is_finite() { return None; }
        Some(self.price_scale.y_of(price))
    }

    fn coordinate_to_price(&self, y: f64) -> Option<f64> {
        if !self.laid_out || !y.is_finite() { return None; }
        Some(self.price_scale.price_at(y))
    }

    fn visible_logical_range(&self) -> Option<LogicalRange> {
        if !self.ready() { return None; }
        Some(LogicalRange { from: self.bar_scale.logical_at(0.0), to: self.bar_scale.logical_at(self.width) })
    }

    fn visible_time_range(&self) -> Option<TimeRange> {
        let r = self.visible_logical_range()?;
        Some(TimeRange { from: self.time_for_logical(r.from)?, to: self.time_for_logical(r.to)? })
    }

    fn pane_size(&self) -> (f64, f64) { (self.width, self.height) }

    fn pixel_ratio(&self) -> f64 { self.pixel_ratio }

    fn seconds_per_bar(&self) -> Option<i64> { Some(self.seconds_per_bar) }

    fn bars(&self) -> &[Bar] { &self.bars }

    fn is_laid_out(&self) -> bool { self.laid_out }

    fn attach_primitive(&mut self, id: DrawingId) {
        self.attached.insert(id);
    }

    fn detach_primitive(&mut self, id: DrawingId) {
        self.attached.remove(&id);
    }

    fn subscribe_visible_range_change(&mut self, owner: DrawingId) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.insert(id, owner);
        debug!(subscription = id.0, owner = owner.raw(), "visible range listener added");
        id
    }

    fn unsubscribe_visible_range_change(&mut self, subscription: SubscriptionId) {
        if self.subscriptions.remove(&subscription).is_some() {
            debug!(subscription = subscription.0, "visible range listener removed");
        }
    }

    fn set_interaction_enabled(&mut self, enabled: bool) {
        self.interaction_enabled = enabled;
    }
}
