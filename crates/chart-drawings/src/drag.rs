// File: crates/chart-drawings/src/drag.rs
// Summary: Drag state machine turning pointer moves into incremental model-space deltas.

use tracing::debug;

use crate::primitives::{DragDelta, HitKind};
use crate::types::DrawingId;

#[derive(Clone, Copy, Debug, PartialEq)]
struct ActiveDrag {
    target: DrawingId,
    kind: HitKind,
    last_logical: f64,
    last_price: f64,
}

/// Idle until `begin`; each `update` reports motion since the previous update.
#[derive(Clone, Debug, Default)]
pub struct DragController {
    active: Option<ActiveDrag>,
}

impl DragController {
    pub fn new() -> Self { Self::default() }

    pub fn is_active(&self) -> bool { self.active.is_some() }

    pub fn target(&self) -> Option<DrawingId> { self.active.map(|a| a.target) }

    pub fn kind(&self) -> Option<HitKind> { self.active.map(|a| a.kind) }

    pub fn begin(&mut self, target: DrawingId, kind: HitKind, logical: f64, price: f64) {
        debug!(id = target.raw(), ?kind, "drag started");
        self.active = Some(ActiveDrag { target, kind, last_logical: logical, last_price: price });
    }

    /// Delta from the previous pointer position; `None` when no drag is running.
    pub fn update(&mut self, logical: f64, price: f64) -> Option<(DrawingId, HitKind, DragDelta)> {
        let drag = self.active.as_mut()?;
        let delta = DragDelta {
            delta_logical: logical - drag.last_logical,
            delta_price: price - drag.last_price,
            logical,
            price,
        };
        drag.last_logical = logical;
        drag.last_price = price;
        Some((drag.target, drag.kind, delta))
    }

    /// Stop dragging; returns what was being dragged.
    pub fn end(&mut self) -> Option<(DrawingId, HitKind)> {
        let drag = self.active.take()?;
        debug!(id = drag.target.raw(), "drag finished");
        Some((drag.target, drag.kind))
    }

    /// Abandon the drag if it targets `id`.
    pub fn cancel_for(&mut self, id: DrawingId) {
        if self.target() == Some(id) {
            self.active = None;
        }
    }

    pub fn cancel(&mut self) { self.active = None; }
}
