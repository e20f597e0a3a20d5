// File: crates/chart-drawings/src/registry.rs
// Summary: Ordered collection of attached drawings; attach/detach bookkeeping and topmost hit lookup.

use tracing::debug;

use crate::config::EngineConfig;
use crate::host::ChartHost;
use crate::mapper::CoordinateMapper;
use crate::primitives::{Drawing, HitKind, Primitive};
use crate::render::Surface;
use crate::types::DrawingId;

/// Drawings in insertion order; later entries paint on top and win hit ties.
#[derive(Default)]
pub struct DrawingRegistry {
    drawings: Vec<Drawing>,
}

impl DrawingRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.drawings.len() }

    pub fn is_empty(&self) -> bool { self.drawings.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Drawing> { self.drawings.iter() }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Drawing> { self.drawings.iter_mut() }

    pub fn get(&self, id: DrawingId) -> Option<&Drawing> {
        self.drawings.iter().find(|d| d.id() == id)
    }

    pub fn get_mut(&mut self, id: DrawingId) -> Option<&mut Drawing> {
        self.drawings.iter_mut().find(|d| d.id() == id)
    }

    pub fn contains(&self, id: DrawingId) -> bool { self.get(id).is_some() }

    /// Attach to the host, subscribe range-following kinds, and append.
    pub fn add(&mut self, host: &mut dyn ChartHost, mut drawing: Drawing) -> DrawingId {
        let id = drawing.id();
        host.attach_primitive(id);
        if drawing.wants_range_updates() {
            let sub = host.subscribe_visible_range_change(id);
            drawing.set_subscription(Some(sub));
            drawing.on_visible_range_change(&CoordinateMapper::new(&*host));
        }
        debug!(id = id.raw(), kind = drawing.kind().as_str(), "drawing attached");
        self.drawings.push(drawing);
        id
    }

    /// Detach and drop `id`. Returns the removed drawing.
    pub fn remove(&mut self, host: &mut dyn ChartHost, id: DrawingId) -> Option<Drawing> {
        let index = self.drawings.iter().position(|d| d.id() == id)?;
        let mut drawing = self.drawings.remove(index);
        release(host, &mut drawing);
        Some(drawing)
    }

    /// Detach everything.
    pub fn clear(&mut self, host: &mut dyn ChartHost) {
        for mut drawing in self.drawings.drain(..) {
            release(host, &mut drawing);
        }
    }

    /// Topmost drawing under the pointer. Geometry is refreshed first since the
    /// view may have moved since the last paint.
    pub fn find_topmost_hit(
        &mut self,
        host: &dyn ChartHost,
        config: &EngineConfig,
        px: f64,
        py: f64,
    ) -> Option<(DrawingId, HitKind)> {
        let mapper = CoordinateMapper::new(host);
        self.drawings.iter_mut().rev().find_map(|d| {
            d.update_geometry(&mapper, config);
            d.hit_test(px, py, config).map(|kind| (d.id(), kind))
        })
    }

    /// Forward a visible-range change to every subscribed drawing.
    pub fn notify_visible_range(&mut self, host: &dyn ChartHost) {
        let mapper = CoordinateMapper::new(host);
        for d in self.drawings.iter_mut().filter(|d| d.subscription().is_some()) {
            d.on_visible_range_change(&mapper);
        }
    }

    pub fn render(&mut self, host: &dyn ChartHost, config: &EngineConfig, surface: &mut dyn Surface) {
        let mapper = CoordinateMapper::new(host);
        let ratio = host.pixel_ratio();
        for d in self.drawings.iter_mut() {
            d.update_geometry(&mapper, config);
            d.render(surface, ratio, config);
        }
    }
}

fn release(host: &mut dyn ChartHost, drawing: &mut Drawing) {
    if let Some(sub) = drawing.subscription() {
        host.unsubscribe_visible_range_change(sub);
        drawing.set_subscription(None);
    }
    host.detach_primitive(drawing.id());
    debug!(id = drawing.id().raw(), "drawing detached");
}
