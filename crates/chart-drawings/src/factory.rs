// File: crates/chart-drawings/src/factory.rs
// Summary: Rebuild drawings from persisted records, re-deriving coordinate fields where possible.

use tracing::warn;

use crate::codec::{DrawingRecord, LineRecord, PositionRecord};
use crate::error::{DrawingError, Result};
use crate::mapper::CoordinateMapper;
use crate::primitives::{Drawing, HorizontalLine, LineKind, PositionBand, TrendSegment, VerticalLine};

/// Turns records into drawings. Records missing required fields yield `None`.
pub struct DrawingFactory;

impl DrawingFactory {
    pub fn create(mapper: &CoordinateMapper<'_>, record: &DrawingRecord) -> Option<Drawing> {
        Self::build(mapper, record)
            .map_err(|e| warn!(kind = record.kind().as_str(), error = %e, "drawing record rejected"))
            .ok()
    }

    pub fn build(mapper: &CoordinateMapper<'_>, record: &DrawingRecord) -> Result<Drawing> {
        let drawing = match record {
            DrawingRecord::Trend(r) => line(LineKind::Trend, "trend", r)?,
            DrawingRecord::Ray(r) => line(LineKind::Ray, "ray", r)?,
            DrawingRecord::Info(r) => line(LineKind::Info, "info", r)?,
            DrawingRecord::Extended(r) => line(LineKind::Extended, "extended", r)?,
            DrawingRecord::Horizontal(r) => {
                let price = r.price.filter(|p| p.is_finite()).ok_or(missing("horizontal", "price"))?;
                HorizontalLine::new(price, r.options).into()
            }
            DrawingRecord::Vertical(r) => {
                let time = r.time.ok_or(missing("vertical", "time"))?;
                VerticalLine::new(time, r.price, r.options).into()
            }
            DrawingRecord::Position(r) => position(mapper, r)?.into(),
        };
        Ok(drawing)
    }
}

fn missing(kind: &'static str, field: &'static str) -> DrawingError {
    DrawingError::MissingField { kind, field }
}

fn line(kind: LineKind, name: &'static str, r: &LineRecord) -> Result<Drawing> {
    let p1 = r.p1.as_ref().and_then(|p| p.to_point()).ok_or(missing(name, "p1"))?;
    let p2 = r.p2.as_ref().and_then(|p| p.to_point()).ok_or(missing(name, "p2"))?;
    Ok(TrendSegment::new(kind, p1, p2, r.options).into())
}

fn position(mapper: &CoordinateMapper<'_>, r: &PositionRecord) -> Result<PositionBand> {
    let entry = r.entry.as_ref().and_then(|p| p.to_point()).ok_or(missing("position", "entry"))?;
    let tp = r.take_profit.filter(|p| p.is_finite()).ok_or(missing("position", "tp"))?;
    let sl = r.stop_loss.filter(|p| p.is_finite()).ok_or(missing("position", "sl"))?;

    let mut band = PositionBand::new(r.side, entry, tp, sl, r.options)
        .with_band_bars(r.band_bars)
        .with_legacy_width(r.band_width);
    if mapper.host().is_laid_out() {
        band.entry = mapper.enrich(&band.entry);
    } else {
        band.mark_pending();
    }
    Ok(band)
}
