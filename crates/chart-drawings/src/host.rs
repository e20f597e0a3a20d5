// File: crates/chart-drawings/src/host.rs
// Summary: Capability interface the annotation core consumes from the host chart.

use crate::types::{Bar, DrawingId, LogicalRange, SubscriptionId, TimeRange, Timestamp};

/// What the core needs from the chart it decorates.
///
/// All coordinates are pane CSS pixels. Conversions return `None` whenever the
/// axis cannot currently resolve the value (no data, not laid out yet); callers
/// must skip the frame rather than treat that as zero.
pub trait ChartHost {
    fn time_to_coordinate(&self, time: Timestamp) -> Option<f64>;
    fn coordinate_to_time(&self, x: f64) -> Option<Timestamp>;
    fn logical_to_coordinate(&self, logical: f64) -> Option<f64>;
    fn coordinate_to_logical(&self, x: f64) -> Option<f64>;
    fn price_to_coordinate(&self, price: f64) -> Option<f64>;
    fn coordinate_to_price(&self, y: f64) -> Option<f64>;

    fn visible_logical_range(&self) -> Option<LogicalRange>;
    fn visible_time_range(&self) -> Option<TimeRange>;

    /// Pane size in CSS pixels (width, height).
    fn pane_size(&self) -> (f64, f64);
    /// Device pixels per CSS pixel.
    fn pixel_ratio(&self) -> f64 { 1.0 }
    /// Bar duration of the active timeframe, if known.
    fn seconds_per_bar(&self) -> Option<i64>;
    /// Bars currently loaded in the series, ascending by time. Bar `i` sits at logical index `i`.
    fn bars(&self) -> &[Bar];
    /// False until the host has completed its first layout pass.
    fn is_laid_out(&self) -> bool;

    fn attach_primitive(&mut self, id: DrawingId);
    fn detach_primitive(&mut self, id: DrawingId);

    fn subscribe_visible_range_change(&mut self, owner: DrawingId) -> SubscriptionId;
    fn unsubscribe_visible_range_change(&mut self, subscription: SubscriptionId);

    /// Enable or suspend the host's native pan/zoom/scroll handling.
    fn set_interaction_enabled(&mut self, enabled: bool);
}
