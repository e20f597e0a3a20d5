// File: crates/chart-render-skia/tests/snapshot.rs
// Purpose: Golden snapshot harness with bless flow.
// Behavior:
// - Renders a deterministic pane with one of each drawing kind to PNG bytes.
// - If env UPDATE_SNAPSHOTS=1, (re)writes the snapshot file.
// - Else, if snapshot exists, compares decoded pixels for exact match.
// - Else, logs a note and returns (skips) without failing to ease first run.

use chart_drawings::{
    Bar, DrawingEngine, EngineConfig, HorizontalLine, LineKind, LineOptions, MemoryStore, Point, PositionBand,
    PositionStyle, Side, TrendSegment, VerticalLine, Viewport,
};
use chart_render_skia::{render_png, RenderOptions};

const T0: i64 = 1_700_000_000;

fn render_bytes() -> Vec<u8> {
    let bars = (0..98)
        .map(|i| {
            let o = 100.0 + (i as f64 * 0.2).sin() * 5.0;
            let c = 100.0 + ((i + 1) as f64 * 0.2).sin() * 5.0;
            Bar::new(T0 + i * 60, o, o.max(c) + 1.0, o.min(c) - 1.0, c)
        })
        .collect();
    let mut vp = Viewport::new(800.0, 400.0, 60);
    vp.set_bars(bars);
    vp.fit_content();

    let mut engine = DrawingEngine::new(EngineConfig::default(), MemoryStore::new());
    let opts = LineOptions::default();
    engine.add_drawing(&mut vp, TrendSegment::new(LineKind::Ray, Point::at_logical(10.0, 97.0), Point::at_logical(30.0, 100.0), opts).into());
    engine.add_drawing(&mut vp, HorizontalLine::new(103.0, opts).into());
    engine.add_drawing(&mut vp, VerticalLine::new(T0 + 60 * 60, None, opts).into());
    engine.add_drawing(
        &mut vp,
        PositionBand::new(Side::Long, Point::at_logical(50.0, 100.0), 104.0, 98.0, PositionStyle::default())
            .with_band_bars(Some(20))
            .into(),
    );

    // Labels depend on installed fonts.
    let opts = RenderOptions { draw_labels: false, ..RenderOptions::default() };
    render_png(&vp, &mut engine, &opts).expect("render")
}

#[test]
fn golden_drawings_pane() {
    let bytes = render_bytes();
    let snap_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/__snapshots__");
    let snap_path = snap_dir.join("drawings_pane.png");

    let update = std::env::var("UPDATE_SNAPSHOTS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if update {
        std::fs::create_dir_all(&snap_dir).expect("create snapshots dir");
        std::fs::write(&snap_path, &bytes).expect("write snapshot");
        eprintln!("[snapshot] Updated {} ({} bytes)", snap_path.display(), bytes.len());
        return;
    }

    if snap_path.exists() {
        let want = std::fs::read(&snap_path).expect("read snapshot");
        let got_img = image::load_from_memory(&bytes).expect("decode got").to_rgba8();
        let want_img = image::load_from_memory(&want).expect("decode want").to_rgba8();
        assert_eq!(got_img.as_raw(), want_img.as_raw(), "rendered pixels differ from golden snapshot: {}", snap_path.display());
    } else {
        eprintln!("[snapshot] Missing snapshot {}; set UPDATE_SNAPSHOTS=1 to bless.", snap_path.display());
    }
}
