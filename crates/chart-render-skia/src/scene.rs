// File: crates/chart-render-skia/src/scene.rs
// Summary: Headless PNG pipeline: background, grid, candles, then the engine's drawings on top.

use std::path::Path;

use anyhow::{anyhow, Result};
use chart_drawings::{ChartHost, DrawingEngine};
use skia_safe as skia;
use tracing::debug;

use crate::surface::SkiaSurface;
use crate::text::TextShaper;
use crate::theme::{to_skia, Theme};

pub struct RenderOptions {
    pub theme: Theme,
    pub draw_grid: bool,
    pub draw_bars: bool,
    /// Text is font-dependent; turn off for byte-stable output.
    pub draw_labels: bool,
    /// Feed connection state in the top-left corner.
    pub draw_status: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { theme: Theme::dark(), draw_grid: true, draw_bars: true, draw_labels: true, draw_status: true }
    }
}

/// Render the host pane plus all drawings and return encoded PNG bytes.
/// Bitmap size is the pane size times the host's pixel ratio.
pub fn render_png(host: &dyn ChartHost, engine: &mut DrawingEngine, opts: &RenderOptions) -> Result<Vec<u8>> {
    let ratio = host.pixel_ratio();
    let (w, h) = host.pane_size();
    let (dw, dh) = ((w * ratio).round() as i32, (h * ratio).round() as i32);
    if dw <= 0 || dh <= 0 {
        return Err(anyhow!("pane has no area ({w}x{h})"));
    }

    let mut surface = skia::surfaces::raster_n32_premul((dw, dh))
        .ok_or_else(|| anyhow!("failed to create raster surface"))?;
    let shaper = TextShaper::new();
    {
        let canvas = surface.canvas();
        canvas.clear(to_skia(opts.theme.background));
        if opts.draw_grid {
            draw_grid(canvas, dw as f32, dh as f32, to_skia(opts.theme.grid));
        }
        if opts.draw_bars {
            draw_candles(canvas, host, ratio as f32, &opts.theme);
        }

        let mut target = SkiaSurface::new(canvas, &shaper, (dw as f64, dh as f64));
        if !opts.draw_labels {
            target = target.without_labels();
        }
        engine.render(host, &mut target);

        if opts.draw_status && opts.draw_labels {
            let status = format!("{} | {}", engine.symbol().storage_key(), engine.feed_status().label());
            let size = 12.0 * ratio as f32;
            shaper.draw_left(canvas, &status, 8.0 * ratio as f32, 18.0 * ratio as f32, size, to_skia(opts.theme.status_text));
        }
    }
    debug!(width = dw, height = dh, drawings = engine.registry().len(), "rendered frame");

    let image = surface.image_snapshot();
    #[allow(deprecated)]
    let data = image
        .encode_to_data(skia::EncodedImageFormat::PNG)
        .ok_or_else(|| anyhow!("encode PNG failed"))?;
    Ok(data.as_bytes().to_vec())
}

/// Render and write a PNG at `output_png_path`, creating parent directories.
pub fn render_to_png(
    host: &dyn ChartHost,
    engine: &mut DrawingEngine,
    opts: &RenderOptions,
    output_png_path: impl AsRef<Path>,
) -> Result<()> {
    let bytes = render_png(host, engine, opts)?;
    if let Some(parent) = output_png_path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output_png_path, bytes)?;
    Ok(())
}

// ---- helpers ----------------------------------------------------------------

fn draw_grid(canvas: &skia::Canvas, w: f32, h: f32, color: skia::Color) {
    let mut paint = skia::Paint::default();
    paint.set_color(color);
    paint.set_anti_alias(true);
    paint.set_stroke_width(1.0);

    for i in 1..10 {
        let x = w * i as f32 / 10.0;
        canvas.draw_line((x, 0.0), (x, h), &paint);
    }
    for i in 1..6 {
        let y = h * i as f32 / 6.0;
        canvas.draw_line((0.0, y), (w, y), &paint);
    }
}

fn draw_candles(canvas: &skia::Canvas, host: &dyn ChartHost, ratio: f32, theme: &Theme) {
    let bars = host.bars();
    if bars.is_empty() {
        return;
    }
    let spacing = match (host.logical_to_coordinate(0.0), host.logical_to_coordinate(1.0)) {
        (Some(a), Some(b)) => (b - a).abs() as f32,
        _ => return,
    };
    let half = (spacing * 0.35).max(1.0) * ratio;
    let (w, _) = host.pane_size();

    let mut wick = skia::Paint::default();
    wick.set_anti_alias(true);
    wick.set_style(skia::paint::Style::Stroke);
    wick.set_stroke_width(ratio);

    let mut body = skia::Paint::default();
    body.set_anti_alias(true);
    body.set_style(skia::paint::Style::Fill);

    for (i, bar) in bars.iter().enumerate() {
        let Some(x) = host.logical_to_coordinate(i as f64) else { continue };
        if x < -(spacing as f64) || x > w + spacing as f64 {
            continue;
        }
        let ys = [bar.open, bar.high, bar.low, bar.close].map(|p| host.price_to_coordinate(p));
        let [Some(y_o), Some(y_h), Some(y_l), Some(y_c)] = ys else { continue };
        let x = x as f32 * ratio;
        let [y_o, y_h, y_l, y_c] = [y_o, y_h, y_l, y_c].map(|y| y as f32 * ratio);

        let color = to_skia(theme.candle(bar.close >= bar.open));
        wick.set_color(color);
        body.set_color(color);

        canvas.draw_line((x, y_h), (x, y_l), &wick);
        let top = y_o.min(y_c);
        let bot = y_o.max(y_c);
        let rect = skia::Rect::from_ltrb(x - half, top, x + half, bot.max(top + 1.0));
        canvas.draw_rect(rect, &body);
    }
}
