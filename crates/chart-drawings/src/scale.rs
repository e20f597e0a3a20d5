// File: crates/chart-drawings/src/scale.rs
// Summary: Bar-index and price axes for the reference viewport: pixel conversions plus scroll/zoom.

const MIN_SPACING: f64 = 0.5;
const MAX_SPACING: f64 = 200.0;
const TINY: f64 = 1e-12;

/// Horizontal axis. Pane x = (logical - first_logical) * spacing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarScale {
    pub first_logical: f64,
    /// Pixels per bar.
    pub spacing: f64,
}

impl BarScale {
    pub fn new(first_logical: f64, spacing: f64) -> Self {
        Self { first_logical, spacing: spacing.max(0.01) }
    }

    #[inline]
    pub fn x_of(&self, logical: f64) -> f64 {
        (logical - self.first_logical) * self.spacing
    }

    #[inline]
    pub fn logical_at(&self, x: f64) -> f64 {
        self.first_logical + x / self.spacing
    }

    /// Change spacing by `factor`; the bar under `anchor_x` stays put.
    pub fn zoom(&mut self, anchor_x: f64, factor: f64) {
        let anchored = self.logical_at(anchor_x);
        self.spacing = (self.spacing * factor).clamp(MIN_SPACING, MAX_SPACING);
        self.first_logical = anchored - anchor_x / self.spacing;
    }

    /// Drag content right by `dx` pixels.
    pub fn scroll(&mut self, dx: f64) {
        self.first_logical -= dx / self.spacing;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PriceMode {
    #[default]
    Linear,
    Log10,
}

/// Vertical axis over `[0, height]`, top = highest price.
/// `lo`/`hi` live in axis space (raw prices, or their log10).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceScale {
    pub height: f64,
    mode: PriceMode,
    lo: f64,
    hi: f64,
}

impl PriceScale {
    pub fn linear(height: f64, min: f64, max: f64) -> Self {
        let max = if (max - min).abs() < TINY { min + 1.0 } else { max };
        Self { height, mode: PriceMode::Linear, lo: min, hi: max }
    }

    /// Log axis; non-positive bounds are pushed into the positive range.
    pub fn log10(height: f64, min: f64, max: f64) -> Self {
        let min = min.max(TINY);
        let max = if max <= min { min * 10.0 } else { max };
        Self { height, mode: PriceMode::Log10, lo: min.log10(), hi: max.log10() }
    }

    pub fn mode(&self) -> PriceMode { self.mode }

    /// Visible (min, max) in price units.
    pub fn range(&self) -> (f64, f64) {
        (self.from_axis(self.lo), self.from_axis(self.hi))
    }

    #[inline]
    pub fn y_of(&self, price: f64) -> f64 {
        self.height - (self.to_axis(price) - self.lo) / self.span() * self.rows()
    }

    #[inline]
    pub fn price_at(&self, y: f64) -> f64 {
        self.from_axis(self.lo + (self.height - y) / self.rows() * self.span())
    }

    /// Shift the visible range by `dy` pixels; positive moves prices up.
    pub fn scroll(&mut self, dy: f64) {
        let shift = dy / self.rows() * self.span();
        self.lo += shift;
        self.hi += shift;
    }

    fn to_axis(&self, price: f64) -> f64 {
        match self.mode {
            PriceMode::Linear => price,
            PriceMode::Log10 => price.max(TINY).log10(),
        }
    }

    fn from_axis(&self, v: f64) -> f64 {
        match self.mode {
            PriceMode::Linear => v,
            PriceMode::Log10 => 10f64.powf(v),
        }
    }

    fn span(&self) -> f64 { (self.hi - self.lo).max(TINY) }

    fn rows(&self) -> f64 { self.height.max(1.0) }
}
