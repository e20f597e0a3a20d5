// File: crates/chart-drawings/src/primitives/mod.rs
// Summary: Drawable primitives: shared capability trait, hit kinds, and the closed `Drawing` union.

mod angle;
mod evaluator;
mod horizontal;
mod line;
mod position;
mod vertical;

pub use angle::AngleMarker;
pub use evaluator::{HitType, PositionEvaluator, PositionHit, PositionLevels};
pub use horizontal::HorizontalLine;
pub use line::{LineKind, TrendSegment};
pub use position::PositionBand;
pub use vertical::VerticalLine;

use crate::codec::DrawingRecord;
use crate::config::EngineConfig;
use crate::mapper::CoordinateMapper;
use crate::render::Surface;
use crate::types::{DrawingId, SubscriptionId};

/// Canonical persisted kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawingKind {
    Trend,
    Ray,
    Info,
    Extended,
    Horizontal,
    Vertical,
    Position,
}

impl DrawingKind {
    pub const ALL: [DrawingKind; 7] = [
        DrawingKind::Trend,
        DrawingKind::Ray,
        DrawingKind::Info,
        DrawingKind::Extended,
        DrawingKind::Horizontal,
        DrawingKind::Vertical,
        DrawingKind::Position,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DrawingKind::Trend => "trend",
            DrawingKind::Ray => "ray",
            DrawingKind::Info => "info",
            DrawingKind::Extended => "extended",
            DrawingKind::Horizontal => "horizontal",
            DrawingKind::Vertical => "vertical",
            DrawingKind::Position => "position",
        }
    }
}

/// Which part of a primitive the pointer is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitKind {
    Body,
    P1,
    P2,
    Tp,
    Sl,
    Entry,
    Resize,
}

/// Pointer motion since the previous move event, plus where the pointer is now.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragDelta {
    pub delta_logical: f64,
    pub delta_price: f64,
    pub logical: f64,
    pub price: f64,
}

/// Capability set every attached primitive provides.
pub trait Primitive {
    fn id(&self) -> DrawingId;
    fn kind(&self) -> DrawingKind;
    /// Recompute cached pane coordinates from the model. Must run before render or hit-test.
    fn update_geometry(&mut self, mapper: &CoordinateMapper<'_>, config: &EngineConfig);
    /// Hit-test against the cached geometry (pane px).
    fn hit_test(&self, px: f64, py: f64, config: &EngineConfig) -> Option<HitKind>;
    fn apply_delta(&mut self, mapper: &CoordinateMapper<'_>, kind: HitKind, delta: &DragDelta);
    /// Paint using the cached geometry; `ratio` converts pane px to device px.
    fn render(&self, surface: &mut dyn Surface, ratio: f64, config: &EngineConfig);
    fn to_record(&self) -> DrawingRecord;

    /// Whether the primitive must follow visible-range changes.
    fn wants_range_updates(&self) -> bool { false }
    fn subscription(&self) -> Option<SubscriptionId> { None }
    fn set_subscription(&mut self, _subscription: Option<SubscriptionId>) {}
    fn on_visible_range_change(&mut self, _mapper: &CoordinateMapper<'_>) {}
}

/// Every primitive the registry can own.
#[derive(Clone, Debug)]
pub enum Drawing {
    Line(TrendSegment),
    Horizontal(HorizontalLine),
    Vertical(VerticalLine),
    Position(PositionBand),
}

macro_rules! dispatch {
    ($self:expr, $d:ident => $body:expr) => {
        match $self {
            Drawing::Line($d) => $body,
            Drawing::Horizontal($d) => $body,
            Drawing::Vertical($d) => $body,
            Drawing::Position($d) => $body,
        }
    };
}

impl Drawing {
    pub fn as_position(&self) -> Option<&PositionBand> {
        match self { Drawing::Position(p) => Some(p), _ => None }
    }

    pub fn as_position_mut(&mut self) -> Option<&mut PositionBand> {
        match self { Drawing::Position(p) => Some(p), _ => None }
    }

    pub fn as_line(&self) -> Option<&TrendSegment> {
        match self { Drawing::Line(l) => Some(l), _ => None }
    }

    pub fn as_line_mut(&mut self) -> Option<&mut TrendSegment> {
        match self { Drawing::Line(l) => Some(l), _ => None }
    }

    pub fn as_horizontal(&self) -> Option<&HorizontalLine> {
        match self { Drawing::Horizontal(h) => Some(h), _ => None }
    }

    pub fn as_vertical(&self) -> Option<&VerticalLine> {
        match self { Drawing::Vertical(v) => Some(v), _ => None }
    }
}

impl Primitive for Drawing {
    fn id(&self) -> DrawingId { dispatch!(self, d => d.id()) }
    fn kind(&self) -> DrawingKind { dispatch!(self, d => d.kind()) }
    fn update_geometry(&mut self, mapper: &CoordinateMapper<'_>, config: &EngineConfig) {
        dispatch!(self, d => d.update_geometry(mapper, config))
    }
    fn hit_test(&self, px: f64, py: f64, config: &EngineConfig) -> Option<HitKind> {
        dispatch!(self, d => d.hit_test(px, py, config))
    }
    fn apply_delta(&mut self, mapper: &CoordinateMapper<'_>, kind: HitKind, delta: &DragDelta) {
        dispatch!(self, d => d.apply_delta(mapper, kind, delta))
    }
    fn render(&self, surface: &mut dyn Surface, ratio: f64, config: &EngineConfig) {
        dispatch!(self, d => d.render(surface, ratio, config))
    }
    fn to_record(&self) -> DrawingRecord { dispatch!(self, d => d.to_record()) }
    fn wants_range_updates(&self) -> bool { dispatch!(self, d => d.wants_range_updates()) }
    fn subscription(&self) -> Option<SubscriptionId> { dispatch!(self, d => d.subscription()) }
    fn set_subscription(&mut self, subscription: Option<SubscriptionId>) {
        dispatch!(self, d => d.set_subscription(subscription))
    }
    fn on_visible_range_change(&mut self, mapper: &CoordinateMapper<'_>) {
        dispatch!(self, d => d.on_visible_range_change(mapper))
    }
}

impl From<TrendSegment> for Drawing {
    fn from(v: TrendSegment) -> Self { Drawing::Line(v) }
}
impl From<HorizontalLine> for Drawing {
    fn from(v: HorizontalLine) -> Self { Drawing::Horizontal(v) }
}
impl From<VerticalLine> for Drawing {
    fn from(v: VerticalLine) -> Self { Drawing::Vertical(v) }
}
impl From<PositionBand> for Drawing {
    fn from(v: PositionBand) -> Self { Drawing::Position(v) }
}
