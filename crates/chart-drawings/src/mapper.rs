// File: crates/chart-drawings/src/mapper.rs
// Summary: CoordinateMapper: model (time/logical, price) <-> pane pixel conversions over a ChartHost.

use crate::host::ChartHost;
use crate::types::{LogicalRange, Point, Timestamp};

/// Thin adapter over the host's axis APIs.
///
/// Logical indices are preferred for horizontal placement because they stay
/// stable when bars are prepended or appended; time is the fallback.
#[derive(Clone, Copy)]
pub struct CoordinateMapper<'a> {
    host: &'a dyn ChartHost,
}

impl<'a> CoordinateMapper<'a> {
    pub fn new(host: &'a dyn ChartHost) -> Self { Self { host } }

    pub fn host(&self) -> &'a dyn ChartHost { self.host }

    /// Horizontal pane coordinate of `point`.
    pub fn to_x(&self, point: &Point) -> Option<f64> {
        if let Some(x) = point.logical.and_then(|l| self.host.logical_to_coordinate(l)) {
            return Some(x);
        }
        point.time.and_then(|t| self.host.time_to_coordinate(t))
    }

    pub fn to_y(&self, price: f64) -> Option<f64> { self.host.price_to_coordinate(price) }

    pub fn logical_to_x(&self, logical: f64) -> Option<f64> { self.host.logical_to_coordinate(logical) }

    pub fn time_to_x(&self, time: Timestamp) -> Option<f64> { self.host.time_to_coordinate(time) }

    pub fn to_logical(&self, x: f64) -> Option<f64> { self.host.coordinate_to_logical(x) }

    pub fn to_time(&self, x: f64) -> Option<Timestamp> { self.host.coordinate_to_time(x) }

    pub fn to_price(&self, y: f64) -> Option<f64> { self.host.coordinate_to_price(y) }

    /// Logical index for a timestamp, via its pane coordinate.
    pub fn time_to_logical(&self, time: Timestamp) -> Option<f64> {
        self.host.time_to_coordinate(time).and_then(|x| self.host.coordinate_to_logical(x))
    }

    pub fn logical_to_time(&self, logical: f64) -> Option<Timestamp> {
        self.host.logical_to_coordinate(logical).and_then(|x| self.host.coordinate_to_time(x))
    }

    /// Model point under a pane position; logical index is authoritative, time derived.
    pub fn point_at(&self, x: f64, y: f64) -> Option<Point> {
        let logical = self.to_logical(x)?;
        let price = self.to_price(y)?;
        Some(Point { time: self.to_time(x), logical: Some(logical), price })
    }

    /// Fill in whichever of time/logical is missing. Unresolvable fields stay `None`.
    pub fn enrich(&self, point: &Point) -> Point {
        let mut out = *point;
        if out.logical.is_none() {
            out.logical = out.time.and_then(|t| self.time_to_logical(t));
        }
        if out.time.is_none() {
            out.time = out.logical.and_then(|l| self.logical_to_time(l));
        }
        out
    }

    /// Shift a point by whole-shape drag deltas, keeping both horizontal fields in sync.
    pub fn shift(&self, point: &Point, delta_logical: f64, delta_price: f64) -> Point {
        let enriched = self.enrich(point);
        let mut out = Point { price: enriched.price + delta_price, ..enriched };
        if let Some(l) = enriched.logical {
            let moved = l + delta_logical;
            out.logical = Some(moved);
            out.time = self.logical_to_time(moved).or(enriched.time);
        } else if let (Some(t), Some(spb)) = (enriched.time, self.host.seconds_per_bar()) {
            out.time = Some(t + (delta_logical * spb as f64).round() as i64);
        }
        out
    }

    pub fn visible_logical_range(&self) -> Option<LogicalRange> { self.host.visible_logical_range() }

    /// Left and right pane x of the visible time range, falling back to the pane edges.
    pub fn visible_x_edges(&self) -> (f64, f64) {
        let (w, _) = self.host.pane_size();
        match self.visible_logical_range() {
            Some(r) => (
                self.logical_to_x(r.from).unwrap_or(0.0),
                self.logical_to_x(r.to).unwrap_or(w),
            ),
            None => (0.0, w),
        }
    }

    pub fn pane_size(&self) -> (f64, f64) { self.host.pane_size() }

    pub fn pixel_ratio(&self) -> f64 { self.host.pixel_ratio() }

    pub fn seconds_per_bar(&self) -> Option<i64> { self.host.seconds_per_bar() }
}
