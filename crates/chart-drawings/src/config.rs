// File: crates/chart-drawings/src/config.rs
// Summary: Engine configuration with defaults; partial JSON overrides via serde.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::style::{LineOptions, PositionStyle};

/// Tunables for hit-testing, placement defaults and band rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Endpoint/body tolerance for line-like primitives (pane px).
    pub line_hit_tolerance: f64,
    /// Edge/level tolerance for position bands (pane px).
    pub band_hit_tolerance: f64,
    /// Horizontal extent of a new position band, in bars.
    pub default_band_bars: u32,
    /// Narrowest band drawn, in device px.
    pub min_band_width_px: f64,
    /// Band width used when the bar-count width can't be resolved, in pane px.
    pub fallback_band_width_px: f64,
    /// Price span of a vertical line centred on its anchor price.
    pub vertical_price_window: f64,
    /// Distance from entry to take-profit for a new position, as a fraction of entry.
    pub position_tp_fraction: f64,
    /// Distance from entry to stop-loss for a new position, as a fraction of entry.
    pub position_sl_fraction: f64,
    /// Radius of the angle marker arc (pane px).
    pub angle_arc_radius: f64,
    pub line_options: LineOptions,
    pub info_line_options: LineOptions,
    pub position_style: PositionStyle,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            line_hit_tolerance: 8.0,
            band_hit_tolerance: 6.0,
            default_band_bars: 30,
            min_band_width_px: 8.0,
            fallback_band_width_px: 24.0,
            vertical_price_window: 2000.0,
            position_tp_fraction: 0.02,
            position_sl_fraction: 0.01,
            angle_arc_radius: 30.0,
            line_options: LineOptions::default(),
            info_line_options: LineOptions { show_label: true, ..LineOptions::default() },
            position_style: PositionStyle::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
