// File: crates/chart-drawings/src/types.rs
// Summary: Shared model types: timestamps, chart points, bars, feed status, ids and ranges.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// UTC timestamp in whole seconds.
pub type Timestamp = i64;

/// Values above this are treated as epoch milliseconds.
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Normalise a raw epoch value to seconds (millisecond inputs are divided down).
pub fn normalize_timestamp(raw: i64) -> Timestamp {
    if raw > MILLIS_THRESHOLD { raw / 1000 } else { raw }
}

static NEXT_DRAWING_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an attached drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawingId(u64);

impl DrawingId {
    pub fn new() -> Self {
        Self(NEXT_DRAWING_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 { self.0 }
}

impl Default for DrawingId {
    fn default() -> Self { Self::new() }
}

/// Handle returned by a host when a visible-range listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// A position on the chart in model space.
///
/// Exactly one of `time`/`logical` is authoritative when the point is created;
/// the other is derived through the coordinate mapper when needed.
/// Contract: `price` is finite.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub time: Option<Timestamp>,
    pub logical: Option<f64>,
    pub price: f64,
}

impl Point {
    pub fn at_time(time: Timestamp, price: f64) -> Self {
        Self { time: Some(normalize_timestamp(time)), logical: None, price }
    }

    pub fn at_logical(logical: f64, price: f64) -> Self {
        Self { time: None, logical: Some(logical), price }
    }

    pub fn with_time(mut self, time: Timestamp) -> Self {
        self.time = Some(normalize_timestamp(time));
        self
    }

    /// True when at least one horizontal coordinate is known and the price is usable.
    pub fn is_placeable(&self) -> bool {
        self.price.is_finite() && (self.time.is_some() || self.logical.is_some())
    }
}

/// One OHLC bar as delivered by the market-data feed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: Timestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(time: Timestamp, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self { time: normalize_timestamp(time), open, high, low, close }
    }
}

/// Connection state reported by the market-data feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Open,
    Closed,
    Reconnecting,
    Error,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Open => "live",
            ConnectionStatus::Closed => "closed",
            ConnectionStatus::Reconnecting => "reconnecting",
            ConnectionStatus::Error => "error",
        }
    }
}

/// Push-driven events from the market-data collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FeedEvent {
    Bar(Bar),
    Status(ConnectionStatus),
}

/// Visible range on the time axis in logical (bar index) units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogicalRange {
    pub from: f64,
    pub to: f64,
}

impl LogicalRange {
    pub fn contains(&self, logical: f64) -> bool {
        logical >= self.from && logical <= self.to
    }
}

/// Visible range on the time axis in wall-clock units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeRange {
    pub from: Timestamp,
    pub to: Timestamp,
}

/// Direction of a simulated position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Long,
    Short,
}
