// File: crates/chart-drawings/src/primitives/evaluator.rs
// Summary: Decides whether and where a simulated position reaches its take-profit or stop-loss.

use tracing::info;

use crate::types::{Bar, Point, Side, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitType {
    Tp,
    Sl,
}

impl HitType {
    pub fn label(&self) -> &'static str {
        match self {
            HitType::Tp => "TP",
            HitType::Sl => "SL",
        }
    }
}

/// The first bar that touched a level. Written once per evaluation epoch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionHit {
    pub kind: HitType,
    pub time: Option<Timestamp>,
    pub logical: Option<f64>,
    pub price: f64,
}

/// The levels a bar is checked against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionLevels {
    pub side: Side,
    pub entry: Point,
    pub take_profit: f64,
    pub stop_loss: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PositionEvaluator {
    hit: Option<PositionHit>,
    last_close: Option<f64>,
}

impl PositionEvaluator {
    pub fn new() -> Self { Self::default() }

    pub fn hit(&self) -> Option<&PositionHit> { self.hit.as_ref() }

    pub fn last_close(&self) -> Option<f64> { self.last_close }

    /// Forget the recorded hit so the next bars are evaluated again.
    pub fn reset(&mut self) { self.hit = None; }

    /// Check one bar. Returns the hit when this bar is the one that produced it.
    ///
    /// `bar_logical` is the bar's logical index when known; it takes precedence
    /// over time when deciding whether the bar is after the entry.
    pub fn check_bar(&mut self, levels: &PositionLevels, bar: &Bar, bar_logical: Option<f64>) -> Option<PositionHit> {
        self.last_close = Some(bar.close);
        if self.hit.is_some() || !is_after_entry(&levels.entry, bar.time, bar_logical) {
            return None;
        }

        let touched = match levels.side {
            Side::Long if bar.high >= levels.take_profit => Some((HitType::Tp, bar.high)),
            Side::Long if bar.low <= levels.stop_loss => Some((HitType::Sl, bar.low)),
            Side::Short if bar.low <= levels.take_profit => Some((HitType::Tp, bar.low)),
            Side::Short if bar.high >= levels.stop_loss => Some((HitType::Sl, bar.high)),
            _ => None,
        };

        let (kind, price) = touched?;
        let hit = PositionHit { kind, time: Some(bar.time), logical: bar_logical, price };
        info!(kind = kind.label(), time = bar.time, price, "position level reached");
        self.hit = Some(hit);
        Some(hit)
    }

    /// Evaluate every loaded bar in ascending time order; bar `i` has logical index `i`.
    pub fn replay(&mut self, levels: &PositionLevels, bars: &[Bar]) -> Option<PositionHit> {
        let mut order: Vec<usize> = (0..bars.len()).collect();
        order.sort_by_key(|&i| bars[i].time);
        for i in order {
            self.check_bar(levels, &bars[i], Some(i as f64));
        }
        self.hit
    }

    /// True when the price is currently moving toward take-profit, judged from the
    /// last close seen (or the entry itself before any bar arrived).
    pub fn moving_toward_tp(&self, levels: &PositionLevels) -> bool {
        let reference = self.last_close.unwrap_or(levels.entry.price);
        match levels.side {
            Side::Long => reference >= levels.entry.price,
            Side::Short => reference <= levels.entry.price,
        }
    }
}

/// Only bars strictly after the entry count. Logical index wins over time;
/// with neither known the bar is evaluated anyway.
fn is_after_entry(entry: &Point, bar_time: Timestamp, bar_logical: Option<f64>) -> bool {
    if let (Some(e), Some(b)) = (entry.logical, bar_logical) {
        return b > e;
    }
    match entry.time {
        Some(t) => bar_time > t,
        None => true,
    }
}
