// File: crates/chart-drawings/src/context.rs
// Summary: Toolbar tool selection and active-symbol context read by the engine.

use crate::codec::storage_key;
use crate::types::Side;

/// Drawing tools offered by the toolbar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawingTool {
    TrendLine,
    Ray,
    InfoLine,
    ExtendedLine,
    TrendAngle,
    HorizontalLine,
    VerticalLine,
    LongPosition,
    ShortPosition,
}

impl DrawingTool {
    /// Map a toolbar title ("Trend Line", "Long Position", ...) to a tool.
    pub fn from_title(title: &str) -> Option<Self> {
        let tool = match title.trim() {
            "Trend Line" => Self::TrendLine,
            "Ray" => Self::Ray,
            "Info Line" => Self::InfoLine,
            "Extended Line" => Self::ExtendedLine,
            "Trend Angle" => Self::TrendAngle,
            "Horizontal Line" => Self::HorizontalLine,
            "Vertical Line" => Self::VerticalLine,
            "Long Position" => Self::LongPosition,
            "Short Position" => Self::ShortPosition,
            _ => return None,
        };
        Some(tool)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::TrendLine => "Trend Line",
            Self::Ray => "Ray",
            Self::InfoLine => "Info Line",
            Self::ExtendedLine => "Extended Line",
            Self::TrendAngle => "Trend Angle",
            Self::HorizontalLine => "Horizontal Line",
            Self::VerticalLine => "Vertical Line",
            Self::LongPosition => "Long Position",
            Self::ShortPosition => "Short Position",
        }
    }

    /// Pointer clicks needed to place the shape.
    pub fn clicks_required(&self) -> usize {
        match self {
            Self::HorizontalLine | Self::VerticalLine | Self::LongPosition | Self::ShortPosition => 1,
            _ => 2,
        }
    }

    pub fn position_side(&self) -> Option<Side> {
        match self {
            Self::LongPosition => Some(Side::Long),
            Self::ShortPosition => Some(Side::Short),
            _ => None,
        }
    }
}

/// Current toolbar selection. The engine clears it once a shape is placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ToolState {
    pub tool: Option<DrawingTool>,
    pub active: bool,
}

impl ToolState {
    pub fn select(tool: DrawingTool) -> Self { Self { tool: Some(tool), active: true } }

    pub fn active_tool(&self) -> Option<DrawingTool> { self.tool.filter(|_| self.active) }

    pub fn clear(&mut self) { *self = Self::default(); }
}

/// The symbol whose drawings are loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolContext {
    pub symbol: Option<String>,
}

impl SymbolContext {
    pub fn new(symbol: impl Into<String>) -> Self { Self { symbol: Some(symbol.into()) } }

    pub fn storage_key(&self) -> String { storage_key(self.symbol.as_deref()) }
}
