// File: crates/demo/src/main.rs
// Summary: Demo loads OHLC CSV (or synthesises bars), places one of each drawing through the
//          click API, streams the tail as live bars, persists per symbol and renders a PNG.

use anyhow::{Context, Result};
use chart_drawings::types::normalize_timestamp;
use chart_drawings::{
    Bar, ChartHost, ConnectionStatus, Drawing, DrawingEngine, DrawingTool, EngineConfig, FeedEvent, FileStore,
    SymbolContext, ToolState, Viewport,
};
use chart_render_skia::{render_to_png, theme, RenderOptions};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const LIVE_BARS: usize = 20;

struct Args {
    input: Option<PathBuf>,
    symbol: Option<String>,
    config: Option<PathBuf>,
    theme: String,
}

fn parse_args() -> Result<Args> {
    let mut args = Args { input: None, symbol: None, config: None, theme: "dark".into() };
    let mut it = std::env::args().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--symbol" => args.symbol = Some(it.next().context("--symbol needs a value")?),
            "--config" => args.config = Some(it.next().context("--config needs a path")?.into()),
            "--theme" => args.theme = it.next().context("--theme needs a name")?,
            _ => args.input = Some(PathBuf::from(a)),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(p) => EngineConfig::load(p).with_context(|| format!("loading config '{}'", p.display()))?,
        None => EngineConfig::default(),
    };

    let bars = match &args.input {
        Some(raw) => {
            let (path, used_alt) = resolve_path(raw)?;
            info!(path = %path.display(), swapped_extension = used_alt, "using input file");
            load_ohlc_csv(&path).with_context(|| format!("failed to load CSV '{}'", path.display()))?
        }
        None => synth_bars(300),
    };
    if bars.len() <= LIVE_BARS {
        anyhow::bail!("need more than {LIVE_BARS} bars, got {} (check headers/delimiter)", bars.len());
    }
    let symbol = args
        .symbol
        .clone()
        .or_else(|| args.input.as_deref().and_then(symbol_from_path))
        .unwrap_or_else(|| "DEMO".to_string());
    info!(bars = bars.len(), %symbol, "loaded bars");

    let (history, live) = bars.split_at(bars.len() - LIVE_BARS);
    let mut vp = Viewport::new(1200.0, 600.0, seconds_per_bar(&bars));
    vp.set_bars(history.to_vec());

    let out_dir = PathBuf::from("target/out");
    let mut engine = DrawingEngine::new(config, FileStore::new(out_dir.join("drawings")));
    let restored = engine.load_symbol(&mut vp, SymbolContext::new(symbol.clone()));
    // Stored positions wait for the first layout pass.
    vp.fit_content();
    engine.on_layout_ready(&vp);
    info!(restored, "drawings restored");

    if restored == 0 {
        place_defaults(&mut engine, &mut vp);
    }

    // Replay the tail as the feed would deliver it.
    let events = std::iter::once(FeedEvent::Status(ConnectionStatus::Open))
        .chain(live.iter().copied().map(FeedEvent::Bar))
        .chain(std::iter::once(FeedEvent::Status(ConnectionStatus::Closed)));
    for event in events {
        match event {
            FeedEvent::Bar(bar) => {
                if vp.append_bar(bar).is_some() {
                    engine.on_bar(&vp, &bar);
                }
            }
            FeedEvent::Status(status) => engine.on_connection_status(status),
        }
    }
    vp.fit_content();
    engine.on_visible_range_changed(&vp);

    report_positions(&engine);
    engine.save().context("saving drawings")?;

    let opts = RenderOptions { theme: theme::find(&args.theme), ..RenderOptions::default() };
    let out = out_dir.join(format!("drawings_{}.png", symbol));
    render_to_png(&vp, &mut engine, &opts, &out)?;
    info!(path = %out.display(), "wrote");

    if drag_first_take_profit(&mut engine, &mut vp, -40.0) {
        let out = out_dir.join(format!("drawings_{}_dragged.png", symbol));
        render_to_png(&vp, &mut engine, &opts, &out)?;
        info!(path = %out.display(), "wrote");
    }

    // Round-trip through another symbol; markers are ephemeral and do not come back.
    let other = engine.load_symbol(&mut vp, SymbolContext::new(format!("{symbol}ALT")));
    let back = engine.load_symbol(&mut vp, SymbolContext::new(symbol.clone()));
    info!(other, back, attached = vp.attached_count(), subscriptions = vp.subscription_count(), "symbol switch");
    let out = out_dir.join(format!("drawings_{}_reloaded.png", symbol));
    render_to_png(&vp, &mut engine, &opts, &out)?;
    info!(path = %out.display(), "wrote");
    Ok(())
}

/// Select the first position band, then drag its take-profit line by `dy` pixels.
fn drag_first_take_profit(engine: &mut DrawingEngine, vp: &mut Viewport, dy: f64) -> bool {
    let Some(band) = engine.registry().iter().find_map(Drawing::as_position) else { return false };
    let grip = band
        .entry
        .logical
        .and_then(|l| vp.logical_to_coordinate(l + 1.0))
        .zip(vp.price_to_coordinate(band.take_profit));
    let Some((x, y)) = grip else {
        warn!("position not on screen; skipping drag");
        return false;
    };
    let before = band.take_profit;

    // First press selects, second press grabs.
    engine.pointer_down(vp, x, y);
    if !engine.pointer_down(vp, x, y) || !engine.drag().is_active() {
        warn!("take-profit grip missed");
        return false;
    }
    engine.pointer_move(vp, x, y + dy / 2.0);
    engine.pointer_move(vp, x, y + dy);
    engine.pointer_up(vp);

    let after = engine.registry().iter().find_map(Drawing::as_position).map(|b| b.take_profit);
    info!(before, ?after, "take-profit dragged");
    true
}

/// Place one of each drawing the way a user would: pick a tool, click the pane.
fn place_defaults(engine: &mut DrawingEngine, vp: &mut Viewport) {
    let n = vp.bars().len();
    let at = |vp: &Viewport, i: usize, price: f64| -> Option<(f64, f64)> {
        Some((vp.logical_to_coordinate(i as f64)?, vp.price_to_coordinate(price)?))
    };
    let bar = |i: usize| vp.bars()[i.min(n - 1)];
    let (a, b, c) = (n / 5, n / 2, n * 3 / 4);

    let plans: Vec<(DrawingTool, Vec<Option<(f64, f64)>>)> = vec![
        (DrawingTool::TrendLine, vec![at(vp, a, bar(a).low), at(vp, b, bar(b).high)]),
        (DrawingTool::InfoLine, vec![at(vp, b, bar(b).close), at(vp, c, bar(c).close)]),
        (DrawingTool::Ray, vec![at(vp, a, bar(a).high), at(vp, a + 10, bar(a + 10).high)]),
        (DrawingTool::TrendAngle, vec![at(vp, c, bar(c).low), at(vp, c + 8, bar(c + 8).high)]),
        (DrawingTool::HorizontalLine, vec![at(vp, n - 1, bar(n - 1).close)]),
        (DrawingTool::VerticalLine, vec![at(vp, b, bar(b).close)]),
        (DrawingTool::LongPosition, vec![at(vp, n - 5, bar(n - 5).close)]),
    ];

    for (tool, clicks) in plans {
        let mut tools = ToolState::select(tool);
        for (x, y) in clicks.into_iter().flatten() {
            engine.handle_hover(&*vp, x, y);
            engine.handle_click(vp, &mut tools, x, y);
        }
        if tools.active_tool().is_some() {
            warn!(tool = tool.title(), "placement did not complete");
        }
    }
    info!(drawings = engine.registry().len(), markers = engine.annotations().len(), "default drawings placed");
}

fn report_positions(engine: &DrawingEngine) {
    for band in engine.registry().iter().filter_map(Drawing::as_position) {
        match band.hit() {
            Some(hit) => info!(
                side = ?band.side,
                outcome = hit.kind.label(),
                price = hit.price,
                time = ?hit.time,
                "position closed"
            ),
            None => info!(side = ?band.side, pl_pct = band.pl_percent(), "position open"),
        }
    }
}

/// Resolve path, trying .csv/.cvs swap if needed.
/// Returns (actual_path, used_alt)
fn resolve_path(p: &Path) -> Result<(PathBuf, bool)> {
    if p.exists() {
        return Ok((p.to_path_buf(), false));
    }
    if let Some(alt) = swap_ext(p) {
        if alt.exists() {
            return Ok((alt, true));
        }
    }
    anyhow::bail!("file not found: {}", p.display());
}

fn swap_ext(p: &Path) -> Option<PathBuf> {
    let mut alt = p.to_path_buf();
    let ext = p.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "cvs" => alt.set_extension("csv"),
        "csv" => alt.set_extension("cvs"),
        _ => return None,
    };
    Some(alt)
}

/// `binanceus_CRVUSDT_6h_...csv` -> `CRVUSDT`; otherwise the first stem token.
fn symbol_from_path(p: &Path) -> Option<String> {
    let stem = p.file_stem()?.to_str()?;
    let mut parts = stem.split('_');
    let first = parts.next()?;
    let pick = parts.next().filter(|_| first.chars().all(|c| c.is_ascii_lowercase())).unwrap_or(first);
    (!pick.is_empty()).then(|| pick.to_ascii_uppercase())
}

/// Load Binance-like OHLC CSV into bars. Rows without a parseable time are skipped.
fn load_ohlc_csv(path: &Path) -> Result<Vec<Bar>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr.headers()?.iter().map(|h| h.trim().to_lowercase()).collect::<Vec<_>>();
    info!(?headers, "csv headers");

    let idx = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));
    let i_time = idx(&["time", "timestamp", "open_time", "date", "datetime"]);
    let i_open = idx(&["open", "o"]);
    let i_high = idx(&["high", "h"]);
    let i_low = idx(&["low", "l"]);
    let i_close = idx(&["close", "c", "adj_close", "close_price"]);
    let (Some(i_time), Some(i_open), Some(i_high), Some(i_low), Some(i_close)) = (i_time, i_open, i_high, i_low, i_close)
    else {
        anyhow::bail!("missing one of time/open/high/low/close columns");
    };

    let mut out = Vec::new();
    let mut skipped = 0usize;
    for rec in rdr.records() {
        let rec = rec?;
        let num = |i: usize| rec.get(i).and_then(|s| s.trim().parse::<f64>().ok());
        let time = rec.get(i_time).and_then(|s| s.trim().parse::<i64>().ok());
        match (time, num(i_open), num(i_high), num(i_low), num(i_close)) {
            (Some(t), Some(o), Some(h), Some(l), Some(c)) => out.push(Bar::new(normalize_timestamp(t), o, h, l, c)),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(skipped, "rows without numeric time/OHLC were skipped");
    }
    Ok(out)
}

/// Median spacing between consecutive bars, in seconds.
fn seconds_per_bar(bars: &[Bar]) -> i64 {
    let mut gaps: Vec<i64> = bars.windows(2).map(|w| w[1].time - w[0].time).filter(|g| *g > 0).collect();
    gaps.sort_unstable();
    gaps.get(gaps.len() / 2).copied().unwrap_or(60)
}

fn synth_bars(n: usize) -> Vec<Bar> {
    let start = 1_700_000_000i64;
    let mut price = 100.0f64;
    (0..n)
        .map(|i| {
            let o = price;
            let c = o + (i as f64 * 0.15).sin() * 0.8 + 0.05;
            price = c;
            Bar::new(start + i as i64 * 3600, o, o.max(c) + 0.6, o.min(c) - 0.6, c)
        })
        .collect()
}
