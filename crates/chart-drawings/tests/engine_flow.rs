// File: crates/chart-drawings/tests/engine_flow.rs
// Purpose: End-to-end engine behaviour: placement, select-then-drag, resize, symbol switching, deferred init.

use std::cell::RefCell;
use std::rc::Rc;

use chart_drawings::codec::encode;
use chart_drawings::{
    Bar, ChartHost, ConnectionStatus, Drawing, DrawingEngine, DrawingId, DrawingKind, DrawingStore, DrawingTool,
    EngineConfig, HitType, HorizontalLine, LineKind, LineOptions, LineOptionsPatch, LineStyle, LogicalRange,
    MemoryStore, Point, PositionBand, PositionStyle, Primitive, RecordingSurface, Side, SubscriptionId,
    SymbolContext, TimeRange, Timestamp, ToolState, TrendSegment, Viewport,
};

const T0: i64 = 1_700_000_000;

/// x = (logical + 1) * 10, y(100) = 240, 20 px per price unit.
fn viewport_with(high: f64, low: f64, laid_out: bool) -> Viewport {
    let bars = (0..98).map(|i| Bar::new(T0 + i * 60, 100.0, high, low, 100.0)).collect();
    let mut vp = Viewport::new(1000.0, 480.0, 60);
    vp.set_bars(bars);
    if laid_out {
        vp.fit_content();
    }
    vp
}

fn viewport() -> Viewport {
    viewport_with(110.0, 90.0, true)
}

fn engine(store: MemoryStore) -> DrawingEngine {
    DrawingEngine::new(EngineConfig { default_band_bars: 10, ..EngineConfig::default() }, store)
}

fn saved(engine: &DrawingEngine, key: &str) -> Vec<serde_json::Value> {
    let text = engine.codec().store().read(key).expect("read").unwrap_or_else(|| "[]".into());
    serde_json::from_str(&text).expect("json")
}

#[test]
fn two_click_tools_wait_for_second_point() {
    let mut vp = viewport();
    let mut eng = engine(MemoryStore::new());
    eng.load_symbol(&mut vp, SymbolContext::new("BTCUSDT"));

    let mut tools = ToolState::select(DrawingTool::TrendLine);
    assert_eq!(eng.handle_click(&mut vp, &mut tools, 104.0, 240.0), None);
    assert_eq!(eng.pending_points().len(), 1);
    assert!(tools.active);

    eng.handle_hover(&vp, 250.0, 200.0);
    let (a, b) = eng.preview_segment().expect("preview");
    assert_eq!(a.logical, Some(9.0), "placement snaps to the nearest bar");
    assert!((b.price - 102.0).abs() < 1e-9);

    let id = eng.handle_click(&mut vp, &mut tools, 310.0, 140.0).expect("trend placed");
    assert!(eng.pending_points().is_empty());
    assert_eq!(tools, ToolState::default());

    let line = eng.drawing(id).and_then(Drawing::as_line).expect("line");
    assert_eq!(line.line_kind(), LineKind::Trend);
    assert_eq!(line.p1.logical, Some(9.0));
    assert_eq!(line.p1.time, Some(T0 + 9 * 60));
    assert!((line.p2.price - 105.0).abs() < 1e-9);

    let records = saved(&eng, "drawings:BTCUSDT");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["kind"], "trend");
}

#[test]
fn single_click_tools_and_positions() {
    let mut vp = viewport();
    let mut eng = engine(MemoryStore::new());

    let mut tools = ToolState::select(DrawingTool::LongPosition);
    let id = eng.handle_click(&mut vp, &mut tools, 510.0, 240.0).expect("position");
    let band = eng.drawing(id).and_then(Drawing::as_position).expect("band");
    assert_eq!(band.side, Side::Long);
    assert!((band.take_profit - 102.0).abs() < 1e-9);
    assert!((band.stop_loss - 99.0).abs() < 1e-9);
    assert_eq!(band.band_bars(), Some(10));
    // Loaded bars reach 110 right after entry.
    assert_eq!(band.hit().map(|h| h.kind), Some(HitType::Tp));
    assert_eq!(band.hit().and_then(|h| h.logical), Some(51.0));

    let mut tools = ToolState::select(DrawingTool::ShortPosition);
    let id = eng.handle_click(&mut vp, &mut tools, 510.0, 240.0).expect("short");
    let band = eng.drawing(id).and_then(Drawing::as_position).expect("band");
    assert!((band.take_profit - 98.0).abs() < 1e-9);
    assert!((band.stop_loss - 101.0).abs() < 1e-9);

    let mut tools = ToolState::select(DrawingTool::VerticalLine);
    let id = eng.handle_click(&mut vp, &mut tools, 210.0, 240.0).expect("vertical");
    assert_eq!(eng.drawing(id).and_then(Drawing::as_vertical).map(|v| v.time), Some(T0 + 20 * 60));

    assert_eq!(eng.registry().len(), 3);
    assert_eq!(vp.attached_count(), 3);
    assert_eq!(vp.subscription_count(), 1);
    assert_eq!(saved(&eng, "drawings:__global__").len(), 3);
}

/// Host whose time axis never resolves: logical and price still work.
struct NoClock(Viewport);

impl ChartHost for NoClock {
    fn time_to_coordinate(&self, _time: Timestamp) -> Option<f64> { None }
    fn coordinate_to_time(&self, _x: f64) -> Option<Timestamp> { None }
    fn logical_to_coordinate(&self, logical: f64) -> Option<f64> { self.0.logical_to_coordinate(logical) }
    fn coordinate_to_logical(&self, x: f64) -> Option<f64> { self.0.coordinate_to_logical(x) }
    fn price_to_coordinate(&self, price: f64) -> Option<f64> { self.0.price_to_coordinate(price) }
    fn coordinate_to_price(&self, y: f64) -> Option<f64> { self.0.coordinate_to_price(y) }
    fn visible_logical_range(&self) -> Option<LogicalRange> { self.0.visible_logical_range() }
    fn visible_time_range(&self) -> Option<TimeRange> { None }
    fn pane_size(&self) -> (f64, f64) { self.0.pane_size() }
    fn seconds_per_bar(&self) -> Option<i64> { None }
    fn bars(&self) -> &[Bar] { self.0.bars() }
    fn is_laid_out(&self) -> bool { self.0.is_laid_out() }
    fn attach_primitive(&mut self, id: DrawingId) { self.0.attach_primitive(id) }
    fn detach_primitive(&mut self, id: DrawingId) { self.0.detach_primitive(id) }
    fn subscribe_visible_range_change(&mut self, owner: DrawingId) -> SubscriptionId {
        self.0.subscribe_visible_range_change(owner)
    }
    fn unsubscribe_visible_range_change(&mut self, subscription: SubscriptionId) {
        self.0.unsubscribe_visible_range_change(subscription)
    }
    fn set_interaction_enabled(&mut self, enabled: bool) { self.0.set_interaction_enabled(enabled) }
}

#[test]
fn unresolved_vertical_click_keeps_the_tool() {
    let mut host = NoClock(viewport());
    let mut eng = engine(MemoryStore::new());
    let mut tools = ToolState::select(DrawingTool::VerticalLine);

    assert_eq!(eng.handle_click(&mut host, &mut tools, 210.0, 240.0), None);
    assert_eq!(tools.active_tool(), Some(DrawingTool::VerticalLine));
    assert!(eng.registry().is_empty());
    assert_eq!(host.0.attached_count(), 0);

    // Same tool state places the line once time resolves.
    let mut vp = host.0;
    let id = eng.handle_click(&mut vp, &mut tools, 210.0, 240.0).expect("vertical");
    assert_eq!(eng.drawing(id).and_then(Drawing::as_vertical).map(|v| v.time), Some(T0 + 20 * 60));
    assert_eq!(tools, ToolState::default());
}

#[test]
fn first_press_selects_second_press_drags() {
    let mut vp = viewport();
    let mut eng = engine(MemoryStore::new());
    eng.load_symbol(&mut vp, SymbolContext::new("ETHUSDT"));

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    eng.selection_mut().subscribe(move |id| sink.borrow_mut().push(id));

    let mut tools = ToolState::select(DrawingTool::HorizontalLine);
    let id = eng.handle_click(&mut vp, &mut tools, 500.0, 240.0).expect("line");

    assert!(eng.pointer_down(&mut vp, 500.0, 241.0));
    assert_eq!(eng.selection().current(), Some(id));
    assert!(!eng.drag().is_active(), "selection alone never drags");
    assert!(vp.interaction_enabled());

    assert!(eng.pointer_down(&mut vp, 500.0, 241.0));
    assert!(eng.drag().is_active());
    assert!(!vp.interaction_enabled());
    assert!(!vp.pan_px(50.0), "chart pan suspended while dragging");

    assert!(eng.pointer_move(&mut vp, 520.0, 221.0));
    assert!(eng.pointer_move(&mut vp, 530.0, 201.0));
    let line = eng.drawing(id).and_then(Drawing::as_horizontal).expect("horizontal");
    assert!((line.price - 102.0).abs() < 1e-9);

    assert!(eng.pointer_up(&mut vp));
    assert!(!eng.drag().is_active());
    assert!(vp.interaction_enabled());
    let records = saved(&eng, "drawings:ETHUSDT");
    assert!((records[0]["price"].as_f64().unwrap_or_default() - 102.0).abs() < 1e-9);

    // Empty space clears the selection.
    assert!(!eng.pointer_down(&mut vp, 500.0, 400.0));
    assert_eq!(eng.selection().current(), None);
    assert_eq!(*seen.borrow(), vec![Some(id), None]);
}

#[test]
fn dragging_the_resize_handle_sets_bar_count() {
    let mut vp = viewport();
    let mut eng = engine(MemoryStore::new());
    let mut tools = ToolState::select(DrawingTool::LongPosition);
    let id = eng.handle_click(&mut vp, &mut tools, 510.0, 240.0).expect("position");
    let hit_before = eng.drawing(id).and_then(Drawing::as_position).and_then(|b| b.hit().copied());

    // Entry at logical 50, band edge at logical 60 (x = 610).
    eng.pointer_down(&mut vp, 610.0, 230.0);
    eng.pointer_down(&mut vp, 610.0, 230.0);
    assert_eq!(eng.drag().kind(), Some(chart_drawings::HitKind::Resize));
    eng.pointer_move(&mut vp, 700.0, 230.0);
    eng.pointer_move(&mut vp, 810.0, 230.0);
    eng.pointer_up(&mut vp);

    let band = eng.drawing(id).and_then(Drawing::as_position).expect("band");
    assert_eq!(band.band_bars(), Some(30));
    assert_eq!(band.hit().copied(), hit_before, "resize keeps the recorded hit");
}

#[test]
fn moving_a_position_resets_and_replays_its_hit() {
    let mut vp = viewport();
    let mut eng = engine(MemoryStore::new());
    let band = PositionBand::new(Side::Long, Point::at_logical(50.0, 100.0), 111.0, 89.0, PositionStyle::default())
        .with_band_bars(Some(10));
    let id = eng.add_drawing(&mut vp, band.into());
    assert!(eng.drawing(id).and_then(Drawing::as_position).and_then(|b| b.hit()).is_none());

    // SL line sits at y = 460; drag it up to 95 (y = 340), inside the bars' range.
    eng.pointer_down(&mut vp, 550.0, 460.0);
    eng.pointer_down(&mut vp, 550.0, 460.0);
    assert_eq!(eng.drag().kind(), Some(chart_drawings::HitKind::Sl));
    eng.pointer_move(&mut vp, 550.0, 340.0);
    eng.pointer_up(&mut vp);

    let band = eng.drawing(id).and_then(Drawing::as_position).expect("band");
    assert!((band.stop_loss - 95.0).abs() < 1e-6);
    let hit = band.hit().expect("replayed after edit");
    assert_eq!(hit.kind, HitType::Sl);
    assert_eq!(hit.logical, Some(51.0));
    assert_eq!(hit.price, 90.0);
}

#[test]
fn live_bars_feed_positions() {
    let mut vp = viewport_with(100.5, 99.5, true);
    let mut eng = engine(MemoryStore::new());
    let band = PositionBand::new(Side::Long, Point::at_logical(90.0, 100.0), 102.0, 99.0, PositionStyle::default());
    let id = eng.add_drawing(&mut vp, band.into());

    let bar = Bar::new(T0 + 98 * 60, 100.0, 102.5, 99.8, 102.0);
    assert_eq!(vp.append_bar(bar), Some(98));
    eng.on_bar(&vp, &bar);
    eng.on_connection_status(ConnectionStatus::Open);

    let band = eng.drawing(id).and_then(Drawing::as_position).expect("band");
    let hit = band.hit().expect("tp");
    assert_eq!((hit.kind, hit.logical, hit.price), (HitType::Tp, Some(98.0), 102.5));
    assert_eq!(band.last_close(), Some(102.0));
    assert_eq!(eng.feed_status(), ConnectionStatus::Open);
}

#[test]
fn switching_symbols_releases_everything() {
    let records = encode(&[
        TrendSegment::new(LineKind::Ray, Point::at_logical(1.0, 100.0), Point::at_logical(5.0, 101.0), LineOptions::default())
            .to_record(),
        HorizontalLine::new(100.0, LineOptions::default()).to_record(),
        PositionBand::new(Side::Long, Point::at_time(T0 + 600, 100.0), 105.0, 95.0, PositionStyle::default())
            .to_record(),
    ])
    .expect("encode");
    let mut store = MemoryStore::new();
    store.write("drawings:AAA", &records).expect("seed");

    let mut vp = viewport();
    let mut eng = engine(store);
    assert_eq!(eng.load_symbol(&mut vp, SymbolContext::new("AAA")), 3);
    assert_eq!(vp.attached_count(), 3);
    assert_eq!(vp.subscription_count(), 1);

    // Half-placed shape, an angle marker, a selection and a live drag all belong to AAA.
    let mut tools = ToolState::select(DrawingTool::TrendAngle);
    eng.handle_click(&mut vp, &mut tools, 300.0, 240.0);
    eng.handle_click(&mut vp, &mut tools, 400.0, 140.0);
    assert_eq!(eng.annotations().len(), 1);
    eng.pointer_down(&mut vp, 500.0, 240.0);
    eng.pointer_down(&mut vp, 500.0, 240.0);
    assert!(eng.drag().is_active());

    assert_eq!(eng.load_symbol(&mut vp, SymbolContext::new("BBB")), 0);
    assert_eq!(eng.registry().len(), 0);
    assert_eq!(vp.attached_count(), 0);
    assert_eq!(vp.subscription_count(), 0);
    assert!(eng.annotations().is_empty());
    assert_eq!(eng.selection().current(), None);
    assert!(!eng.drag().is_active());
    assert!(vp.interaction_enabled());

    assert_eq!(eng.load_symbol(&mut vp, SymbolContext::new("AAA")), 3);
    let kinds: Vec<_> = eng.registry().iter().map(|d| d.kind()).collect();
    assert_eq!(kinds, vec![DrawingKind::Ray, DrawingKind::Horizontal, DrawingKind::Position]);
}

#[test]
fn deferred_initialisation_runs_once_after_layout() {
    let record = encode(&[PositionBand::new(
        Side::Long,
        Point::at_time(T0 + 600, 100.0),
        105.0,
        95.0,
        PositionStyle::default(),
    )
    .to_record()])
    .expect("encode");
    let mut store = MemoryStore::new();
    store.write("drawings:SOL", &record).expect("seed");

    let mut vp = viewport_with(106.0, 99.0, false);
    let mut eng = engine(store);
    eng.load_symbol(&mut vp, SymbolContext::new("SOL"));
    let band = eng.registry().iter().find_map(Drawing::as_position).expect("band");
    assert!(band.is_pending());
    assert!(band.hit().is_none());

    vp.fit_content();
    eng.on_layout_ready(&vp);
    let band = eng.registry().iter().find_map(Drawing::as_position).expect("band");
    assert!(!band.is_pending());
    assert_eq!(band.entry.logical, Some(10.0));
    let hit = band.hit().copied().expect("replayed");
    assert_eq!((hit.kind, hit.logical), (HitType::Tp, Some(11.0)));

    eng.on_layout_ready(&vp);
    let band = eng.registry().iter().find_map(Drawing::as_position).expect("band");
    assert_eq!(band.hit().copied(), Some(hit));
}

#[test]
fn delete_and_restyle_selected() {
    let mut vp = viewport();
    let mut eng = engine(MemoryStore::new());
    let mut tools = ToolState::select(DrawingTool::HorizontalLine);
    let id = eng.handle_click(&mut vp, &mut tools, 500.0, 240.0).expect("line");

    assert!(!eng.update_selected_line_options(&LineOptionsPatch::default()), "nothing selected");
    eng.pointer_down(&mut vp, 500.0, 240.0);
    let patch = LineOptionsPatch { style: Some(LineStyle::Dashed), width: Some(1.0), ..LineOptionsPatch::default() };
    assert!(eng.update_selected_line_options(&patch));
    let opts = eng.drawing(id).and_then(Drawing::as_horizontal).map(|h| h.options).expect("options");
    assert_eq!((opts.style, opts.width), (LineStyle::Dashed, 1.0));
    assert!(!eng.update_selected_position_style(PositionStyle::default()));

    assert!(eng.delete_selected(&mut vp));
    assert!(eng.registry().is_empty());
    assert_eq!(vp.attached_count(), 0);
    assert_eq!(vp.subscription_count(), 0);
    assert_eq!(eng.selection().current(), None);
    assert!(saved(&eng, "drawings:__global__").is_empty());
}

#[test]
fn render_paints_drawings_markers_and_preview() {
    let mut vp = viewport();
    let mut eng = engine(MemoryStore::new());
    let mut tools = ToolState::select(DrawingTool::InfoLine);
    eng.handle_click(&mut vp, &mut tools, 110.0, 240.0);
    eng.handle_click(&mut vp, &mut tools, 310.0, 140.0);

    let mut tools = ToolState::select(DrawingTool::TrendAngle);
    eng.handle_click(&mut vp, &mut tools, 110.0, 240.0);
    eng.handle_click(&mut vp, &mut tools, 210.0, 140.0);

    let mut tools = ToolState::select(DrawingTool::Ray);
    eng.handle_click(&mut vp, &mut tools, 510.0, 240.0);
    eng.handle_hover(&vp, 600.0, 200.0);

    let mut surface = RecordingSurface::new(1000.0, 480.0);
    eng.render(&vp, &mut surface);
    let texts: Vec<&str> = surface.texts().collect();
    assert!(texts.iter().any(|t| t.starts_with("+5.00 (+5.00%)  20 bars  20m")), "{texts:?}");
    assert!(texts.contains(&"45"), "{texts:?}");
    assert_eq!(eng.annotations()[0].label(), "45");
    // Info line, angle reference + segment, preview.
    assert_eq!(surface.lines().count(), 4);
}
