// File: crates/chart-drawings/src/engine.rs
// Summary: DrawingEngine facade: placement, selection/drag input, feed events, persistence and render.

use tracing::{debug, info, warn};

use crate::codec::{DrawingStore, PersistenceCodec};
use crate::config::EngineConfig;
use crate::context::{DrawingTool, SymbolContext, ToolState};
use crate::error::Result;
use crate::factory::DrawingFactory;
use crate::geometry::Pt;
use crate::host::ChartHost;
use crate::mapper::CoordinateMapper;
use crate::primitives::{
    AngleMarker, Drawing, HitKind, HorizontalLine, LineKind, PositionBand, Primitive, TrendSegment, VerticalLine,
};
use crate::registry::DrawingRegistry;
use crate::render::{Stroke, Surface};
use crate::selection::SelectionController;
use crate::drag::DragController;
use crate::style::{LineOptionsPatch, PositionStyle};
use crate::types::{Bar, ConnectionStatus, DrawingId, Point, Side};

/// Owns every drawing for the active symbol and routes host events to them.
///
/// The host is passed into each call rather than stored, so the shell keeps
/// ownership of its chart and the engine never outlives a borrow.
pub struct DrawingEngine {
    config: EngineConfig,
    registry: DrawingRegistry,
    selection: SelectionController,
    drag: DragController,
    codec: PersistenceCodec,
    symbol: SymbolContext,
    annotations: Vec<AngleMarker>,
    placement: Vec<Point>,
    preview: Option<Point>,
    feed_status: ConnectionStatus,
}

impl DrawingEngine {
    pub fn new(config: EngineConfig, store: impl DrawingStore + 'static) -> Self {
        Self {
            config,
            registry: DrawingRegistry::new(),
            selection: SelectionController::new(),
            drag: DragController::new(),
            codec: PersistenceCodec::new(store),
            symbol: SymbolContext::default(),
            annotations: Vec::new(),
            placement: Vec::new(),
            preview: None,
            feed_status: ConnectionStatus::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig { &self.config }
    pub fn registry(&self) -> &DrawingRegistry { &self.registry }
    pub fn selection(&self) -> &SelectionController { &self.selection }
    pub fn selection_mut(&mut self) -> &mut SelectionController { &mut self.selection }
    pub fn drag(&self) -> &DragController { &self.drag }
    pub fn codec(&self) -> &PersistenceCodec { &self.codec }
    pub fn symbol(&self) -> &SymbolContext { &self.symbol }
    pub fn annotations(&self) -> &[AngleMarker] { &self.annotations }
    pub fn pending_points(&self) -> &[Point] { &self.placement }
    pub fn feed_status(&self) -> ConnectionStatus { self.feed_status }

    pub fn drawing(&self, id: DrawingId) -> Option<&Drawing> { self.registry.get(id) }

    /// Switch symbols: drop everything tied to the previous one and load the new set.
    pub fn load_symbol(&mut self, host: &mut dyn ChartHost, symbol: SymbolContext) -> usize {
        if self.drag.is_active() {
            self.drag.cancel();
            host.set_interaction_enabled(true);
        }
        self.selection.clear();
        self.registry.clear(host);
        self.annotations.clear();
        self.placement.clear();
        self.preview = None;
        self.symbol = symbol;

        let key = self.symbol.storage_key();
        let records = self.codec.load(&key);
        let mut loaded = 0;
        for record in &records {
            let Some(drawing) = DrawingFactory::create(&CoordinateMapper::new(&*host), record) else { continue };
            self.add_drawing(host, drawing);
            loaded += 1;
        }
        info!(key = %key, loaded, skipped = records.len() - loaded, "drawings loaded");
        loaded
    }

    /// Attach a drawing; positions evaluate the loaded history unless still waiting for layout.
    pub fn add_drawing(&mut self, host: &mut dyn ChartHost, drawing: Drawing) -> DrawingId {
        let id = self.registry.add(host, drawing);
        let mapper = CoordinateMapper::new(&*host);
        if let Some(band) = self.registry.get_mut(id).and_then(Drawing::as_position_mut) {
            if !band.is_pending() {
                band.replay(&mapper);
            }
        }
        id
    }

    /// Place the active tool's shape. Returns the new drawing's id once the shape is complete.
    pub fn handle_click(&mut self, host: &mut dyn ChartHost, tools: &mut ToolState, x: f64, y: f64) -> Option<DrawingId> {
        let tool = tools.active_tool()?;
        let mapper = CoordinateMapper::new(&*host);
        let point = snapped_point(&mapper, x, y)?;

        if tool.clicks_required() == 2 && self.placement.is_empty() {
            self.placement.push(point);
            self.preview = Some(point);
            return None;
        }
        let first = self.placement.last().copied().unwrap_or(point);

        // Tool and placement state survive until the shape is actually built.
        let drawing: Drawing = match tool {
            DrawingTool::TrendLine => TrendSegment::new(LineKind::Trend, first, point, self.config.line_options).into(),
            DrawingTool::Ray => TrendSegment::new(LineKind::Ray, first, point, self.config.line_options).into(),
            DrawingTool::InfoLine => TrendSegment::new(LineKind::Info, first, point, self.config.info_line_options).into(),
            DrawingTool::ExtendedLine => {
                TrendSegment::new(LineKind::Extended, first, point, self.config.line_options).into()
            }
            DrawingTool::HorizontalLine => HorizontalLine::new(point.price, self.config.line_options).into(),
            DrawingTool::VerticalLine => {
                let time = point.time?;
                VerticalLine::new(time, Some(point.price), self.config.line_options).into()
            }
            DrawingTool::LongPosition | DrawingTool::ShortPosition => {
                let side = tool.position_side().unwrap_or_default();
                self.new_position(side, point).into()
            }
            DrawingTool::TrendAngle => {
                self.finish_placement(tools);
                if let Some(marker) = AngleMarker::new(&mapper, first, point, self.config.angle_arc_radius) {
                    debug!(degree = marker.degree, "angle marker placed");
                    self.annotations.push(marker);
                }
                return None;
            }
        };
        self.finish_placement(tools);

        let id = self.add_drawing(host, drawing);
        info!(tool = tool.title(), id = id.raw(), "drawing placed");
        self.persist();
        Some(id)
    }

    fn finish_placement(&mut self, tools: &mut ToolState) {
        self.placement.clear();
        self.preview = None;
        tools.clear();
    }

    fn new_position(&self, side: Side, entry: Point) -> PositionBand {
        let e = entry.price;
        let (tp, sl) = match side {
            Side::Long => (e * (1.0 + self.config.position_tp_fraction), e * (1.0 - self.config.position_sl_fraction)),
            Side::Short => (e * (1.0 - self.config.position_tp_fraction), e * (1.0 + self.config.position_sl_fraction)),
        };
        PositionBand::new(side, entry, tp, sl, self.config.position_style)
            .with_band_bars(Some(self.config.default_band_bars))
    }

    /// Track the pointer while a two-click shape is half placed.
    pub fn handle_hover(&mut self, host: &dyn ChartHost, x: f64, y: f64) {
        if self.placement.is_empty() {
            return;
        }
        if let Some(p) = CoordinateMapper::new(host).point_at(x, y) {
            self.preview = Some(p);
        }
    }

    /// Segment from the first placed point to the pointer, if a shape is half placed.
    pub fn preview_segment(&self) -> Option<(Point, Point)> {
        Some((*self.placement.first()?, self.preview?))
    }

    /// First press on a shape selects it; a press on the selected shape starts a drag.
    /// Returns true when the press landed on a drawing.
    pub fn pointer_down(&mut self, host: &mut dyn ChartHost, x: f64, y: f64) -> bool {
        let Some((id, kind)) = self.registry.find_topmost_hit(&*host, &self.config, x, y) else {
            self.selection.clear();
            return false;
        };
        if !self.selection.is_selected(id) {
            self.selection.select(id);
            return true;
        }
        let mapper = CoordinateMapper::new(&*host);
        let (Some(logical), Some(price)) = (mapper.to_logical(x), mapper.to_price(y)) else { return true };
        self.drag.begin(id, kind, logical, price);
        host.set_interaction_enabled(false);
        true
    }

    pub fn pointer_move(&mut self, host: &mut dyn ChartHost, x: f64, y: f64) -> bool {
        if !self.drag.is_active() {
            self.handle_hover(&*host, x, y);
            return false;
        }
        let mapper = CoordinateMapper::new(&*host);
        let (Some(logical), Some(price)) = (mapper.to_logical(x), mapper.to_price(y)) else { return false };
        let Some((id, kind, delta)) = self.drag.update(logical, price) else { return false };
        match self.registry.get_mut(id) {
            Some(drawing) => {
                drawing.apply_delta(&mapper, kind, &delta);
                true
            }
            None => {
                self.drag.cancel();
                false
            }
        }
    }

    /// Finish a drag: restore chart interaction, re-evaluate edited positions, persist.
    pub fn pointer_up(&mut self, host: &mut dyn ChartHost) -> bool {
        let Some((id, kind)) = self.drag.end() else { return false };
        host.set_interaction_enabled(true);
        if kind != HitKind::Resize {
            let mapper = CoordinateMapper::new(&*host);
            if let Some(band) = self.registry.get_mut(id).and_then(Drawing::as_position_mut) {
                if band.hit().is_none() {
                    band.replay(&mapper);
                }
            }
        }
        self.persist();
        true
    }

    /// Feed a bar the host has already applied to its series.
    pub fn on_bar(&mut self, host: &dyn ChartHost, bar: &Bar) {
        let logical = host.bars().binary_search_by_key(&bar.time, |b| b.time).ok().map(|i| i as f64);
        for band in self.registry.iter_mut().filter_map(Drawing::as_position_mut) {
            if !band.is_pending() {
                band.check_bar(bar, logical);
            }
        }
    }

    pub fn on_connection_status(&mut self, status: ConnectionStatus) {
        if status != self.feed_status {
            info!(from = ?self.feed_status, to = ?status, "feed status changed");
            self.feed_status = status;
        }
    }

    pub fn on_visible_range_changed(&mut self, host: &dyn ChartHost) {
        self.registry.notify_visible_range(host);
    }

    /// Host finished its first layout: complete deferred position initialisation.
    pub fn on_layout_ready(&mut self, host: &dyn ChartHost) {
        let mapper = CoordinateMapper::new(host);
        let mut finished = 0;
        for band in self.registry.iter_mut().filter_map(Drawing::as_position_mut) {
            if band.is_pending() {
                band.finish_init(&mapper);
                finished += 1;
            }
        }
        if finished > 0 {
            debug!(finished, "deferred positions initialised");
        }
        self.registry.notify_visible_range(host);
    }

    pub fn delete_selected(&mut self, host: &mut dyn ChartHost) -> bool {
        let Some(id) = self.selection.current() else { return false };
        self.drag.cancel_for(id);
        self.selection.forget(id);
        if self.registry.remove(host, id).is_none() {
            return false;
        }
        info!(id = id.raw(), "drawing deleted");
        self.persist();
        true
    }

    pub fn update_selected_line_options(&mut self, patch: &LineOptionsPatch) -> bool {
        let Some(drawing) = self.selection.current().and_then(|id| self.registry.get_mut(id)) else { return false };
        let options = match drawing {
            Drawing::Line(l) => &mut l.options,
            Drawing::Horizontal(h) => &mut h.options,
            Drawing::Vertical(v) => &mut v.options,
            Drawing::Position(_) => return false,
        };
        options.apply(patch);
        self.persist();
        true
    }

    pub fn update_selected_position_style(&mut self, style: PositionStyle) -> bool {
        let Some(band) = self.selection.current().and_then(|id| self.registry.get_mut(id)).and_then(Drawing::as_position_mut)
        else {
            return false;
        };
        band.style = style;
        self.persist();
        true
    }

    /// Paint drawings, then ephemeral markers, then the placement preview.
    pub fn render(&mut self, host: &dyn ChartHost, surface: &mut dyn Surface) {
        self.registry.render(host, &self.config, surface);

        let mapper = CoordinateMapper::new(host);
        let ratio = host.pixel_ratio();
        for marker in self.annotations.iter_mut() {
            marker.update_geometry(&mapper);
            marker.render(surface, ratio);
        }

        if let Some((a, b)) = self.preview_segment() {
            let px = |p: &Point| Some(Pt::new(mapper.to_x(p)? * ratio, mapper.to_y(p.price)? * ratio));
            if let (Some(from), Some(to)) = (px(&a), px(&b)) {
                let opts = self.config.line_options;
                surface.stroke_line(from, to, &Stroke::dashed(opts.color, opts.width, [10.0, 3.0]));
            }
        }
    }

    /// Write every drawing to the active symbol's key.
    pub fn save(&mut self) -> Result<()> {
        let records: Vec<_> = self.registry.iter().map(|d| d.to_record()).collect();
        self.codec.save(&self.symbol.storage_key(), &records)
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            warn!(error = %e, "failed to persist drawings");
        }
    }
}

/// Pointer position as a model point snapped to the nearest bar.
fn snapped_point(mapper: &CoordinateMapper<'_>, x: f64, y: f64) -> Option<Point> {
    let raw = mapper.point_at(x, y)?;
    let logical = raw.logical?.round();
    Some(Point { time: mapper.logical_to_time(logical).or(raw.time), logical: Some(logical), price: raw.price })
}
