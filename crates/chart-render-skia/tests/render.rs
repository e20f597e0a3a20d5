// File: crates/chart-render-skia/tests/render.rs
// Purpose: Pixel checks on the PNG pipeline: background, drawings at pane coordinates, device pixel ratio.

use chart_drawings::{
    Bar, DrawingEngine, EngineConfig, HorizontalLine, LineOptions, LineStyle, MemoryStore, Rgba, Viewport,
};
use chart_render_skia::{render_png, RenderOptions, Theme};

const T0: i64 = 1_700_000_000;

/// Same pane as the core tests: price 101 sits at y = 220.
fn viewport(ratio: f64) -> Viewport {
    let bars = (0..98).map(|i| Bar::new(T0 + i * 60, 100.0, 110.0, 90.0, 100.0)).collect();
    let mut vp = Viewport::new(1000.0, 480.0, 60).with_pixel_ratio(ratio);
    vp.set_bars(bars);
    vp.fit_content();
    vp
}

fn plain() -> RenderOptions {
    RenderOptions { theme: Theme::dark(), draw_grid: false, draw_bars: false, draw_labels: false, draw_status: false }
}

fn engine_with_line(vp: &mut Viewport) -> DrawingEngine {
    let mut engine = DrawingEngine::new(EngineConfig::default(), MemoryStore::new());
    let opts = LineOptions { color: Rgba::rgb(0, 200, 255), width: 4.0, style: LineStyle::Solid, show_label: false };
    engine.add_drawing(vp, HorizontalLine::new(101.0, opts).into());
    engine
}

#[test]
fn horizontal_line_lands_on_its_price() {
    let mut vp = viewport(1.0);
    let mut engine = engine_with_line(&mut vp);
    let bytes = render_png(&vp, &mut engine, &plain()).expect("render");
    let img = image::load_from_memory(&bytes).expect("decode").to_rgba8();
    assert_eq!((img.width(), img.height()), (1000, 480));

    assert_eq!(img.get_pixel(500, 220).0, [0, 200, 255, 255]);
    assert_eq!(img.get_pixel(5, 220).0, [0, 200, 255, 255], "full pane span");
    assert_eq!(img.get_pixel(500, 100).0, [18, 18, 20, 255]);
}

#[test]
fn pixel_ratio_scales_the_bitmap() {
    let mut vp = viewport(2.0);
    let mut engine = engine_with_line(&mut vp);
    let bytes = render_png(&vp, &mut engine, &plain()).expect("render");
    let img = image::load_from_memory(&bytes).expect("decode").to_rgba8();
    assert_eq!((img.width(), img.height()), (2000, 960));
    assert_eq!(img.get_pixel(1000, 440).0, [0, 200, 255, 255]);
    assert_eq!(img.get_pixel(1000, 220).0, [18, 18, 20, 255]);
}

#[test]
fn candles_paint_under_drawings() {
    let mut vp = viewport(1.0);
    let mut engine = engine_with_line(&mut vp);
    let opts = RenderOptions { draw_bars: true, ..plain() };
    let bytes = render_png(&vp, &mut engine, &opts).expect("render");
    let img = image::load_from_memory(&bytes).expect("decode").to_rgba8();

    // Bar 49 sits at x = 500; its flat body is one pixel tall at y = 240. The drawing stays on top of its wick.
    let up = Theme::dark().candle_up;
    assert_eq!(img.get_pixel(500, 240).0, [up.r, up.g, up.b, 255]);
    assert_eq!(img.get_pixel(500, 220).0, [0, 200, 255, 255]);
}

#[test]
fn empty_pane_is_an_error() {
    let vp = Viewport::new(0.0, 0.0, 60);
    let mut engine = DrawingEngine::new(EngineConfig::default(), MemoryStore::new());
    assert!(render_png(&vp, &mut engine, &plain()).is_err());
}
