// File: crates/chart-drawings/src/codec.rs
// Summary: Persisted drawing records, kind normalisation, and key/value stores for per-symbol storage.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{DrawingError, Result};
use crate::primitives::DrawingKind;
use crate::style::{LineOptions, PositionStyle};
use crate::types::{normalize_timestamp, Point, Side, Timestamp};

pub const STORAGE_PREFIX: &str = "drawings:";
pub const GLOBAL_SYMBOL: &str = "__global__";

/// Storage key for a symbol's drawings; blank or missing symbols share the global key.
pub fn storage_key(symbol: Option<&str>) -> String {
    match symbol.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => format!("{STORAGE_PREFIX}{s}"),
        None => format!("{STORAGE_PREFIX}{GLOBAL_SYMBOL}"),
    }
}

/// Substring -> canonical kind, checked in order; first match wins.
const KIND_TABLE: &[(&str, DrawingKind)] = &[
    ("position", DrawingKind::Position),
    ("long", DrawingKind::Position),
    ("short", DrawingKind::Position),
    ("horizontal", DrawingKind::Horizontal),
    ("hline", DrawingKind::Horizontal),
    ("vertical", DrawingKind::Vertical),
    ("vline", DrawingKind::Vertical),
    ("extended", DrawingKind::Extended),
    ("info", DrawingKind::Info),
    ("ray", DrawingKind::Ray),
    ("trend", DrawingKind::Trend),
    ("line", DrawingKind::Trend),
];

/// Case-insensitive substring match of an arbitrary kind label onto the canonical set.
pub fn normalize_kind(raw: &str) -> Option<DrawingKind> {
    let lower = raw.to_ascii_lowercase();
    KIND_TABLE.iter().find(|(needle, _)| lower.contains(needle)).map(|(_, kind)| *kind)
}

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PointRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl From<&Point> for PointRecord {
    fn from(p: &Point) -> Self {
        Self { time: p.time, logical: p.logical, price: Some(p.price) }
    }
}

impl PointRecord {
    /// A usable point, or `None` when the price or both horizontal fields are missing.
    pub fn to_point(&self) -> Option<Point> {
        let point = Point { time: self.time.map(normalize_timestamp), logical: self.logical, price: self.price? };
        point.is_placeable().then_some(point)
    }
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct LineRecord {
    #[serde(default)]
    pub p1: Option<PointRecord>,
    #[serde(default)]
    pub p2: Option<PointRecord>,
    #[serde(default)]
    pub options: LineOptions,
}

impl LineRecord {
    pub fn new(p1: &Point, p2: &Point, options: LineOptions) -> Self {
        Self { p1: Some(p1.into()), p2: Some(p2.into()), options }
    }
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct HorizontalRecord {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub options: LineOptions,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct VerticalRecord {
    #[serde(default)]
    pub time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default)]
    pub options: LineOptions,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    #[serde(default)]
    pub entry: Option<PointRecord>,
    #[serde(default, rename = "tp", alias = "takeProfit")]
    pub take_profit: Option<f64>,
    #[serde(default, rename = "sl", alias = "stopLoss")]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub side: Side,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band_bars: Option<u32>,
    /// Older records stored the band as a pixel width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band_width: Option<f64>,
    #[serde(default)]
    pub options: PositionStyle,
}

/// One persisted drawing, tagged by its canonical kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DrawingRecord {
    Trend(LineRecord),
    Ray(LineRecord),
    Info(LineRecord),
    Extended(LineRecord),
    Horizontal(HorizontalRecord),
    Vertical(VerticalRecord),
    Position(PositionRecord),
}

impl DrawingRecord {
    pub fn kind(&self) -> DrawingKind {
        match self {
            DrawingRecord::Trend(_) => DrawingKind::Trend,
            DrawingRecord::Ray(_) => DrawingKind::Ray,
            DrawingRecord::Info(_) => DrawingKind::Info,
            DrawingRecord::Extended(_) => DrawingKind::Extended,
            DrawingRecord::Horizontal(_) => DrawingKind::Horizontal,
            DrawingRecord::Vertical(_) => DrawingKind::Vertical,
            DrawingRecord::Position(_) => DrawingKind::Position,
        }
    }
}

/// Serialise records as a JSON array.
pub fn encode(records: &[DrawingRecord]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

/// Parse a stored JSON array. Malformed input yields an empty list; individual
/// bad or unknown records are skipped with a warning.
pub fn decode(text: &str) -> Vec<DrawingRecord> {
    let values = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(values)) => values,
        Ok(_) => {
            warn!("stored drawings are not a JSON array; ignoring");
            return Vec::new();
        }
        Err(e) => {
            warn!(error = %e, "stored drawings are malformed; ignoring");
            return Vec::new();
        }
    };
    values.into_iter().filter_map(|v| decode_record(v).map_err(|e| warn!(error = %e, "skipping drawing record")).ok()).collect()
}

fn decode_record(mut value: Value) -> Result<DrawingRecord> {
    let obj = value.as_object_mut().ok_or_else(|| DrawingError::UnknownKind("<not an object>".into()))?;
    let raw = obj
        .get("kind")
        .or_else(|| obj.get("type"))
        .and_then(Value::as_str)
        .ok_or(DrawingError::MissingField { kind: "drawing", field: "kind" })?
        .to_string();
    let kind = normalize_kind(&raw).ok_or_else(|| DrawingError::UnknownKind(raw.clone()))?;
    if kind == DrawingKind::Position && !obj.contains_key("side") && raw.to_ascii_lowercase().contains("short") {
        obj.insert("side".into(), Value::from("short"));
    }
    obj.remove("type");
    obj.insert("kind".into(), Value::from(kind.as_str()));
    Ok(serde_json::from_value(value)?)
}

/// Key/value persistence backend.
pub trait DrawingStore {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-process store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl DrawingStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(DrawingError::Storage("empty storage key".into()));
        }
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        Ok(self.dir.join(format!("{name}.json")))
    }
}

impl DrawingStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, value)?;
        debug!(path = %path.display(), "drawings written");
        Ok(())
    }
}

/// Reads and writes a symbol's record list through a store.
pub struct PersistenceCodec {
    store: Box<dyn DrawingStore>,
}

impl PersistenceCodec {
    pub fn new(store: impl DrawingStore + 'static) -> Self {
        Self { store: Box::new(store) }
    }

    pub fn store(&self) -> &dyn DrawingStore { self.store.as_ref() }

    pub fn store_mut(&mut self) -> &mut dyn DrawingStore { self.store.as_mut() }

    pub fn save(&mut self, key: &str, records: &[DrawingRecord]) -> Result<()> {
        let text = encode(records)?;
        self.store.write(key, &text)
    }

    /// Never fails: read errors and malformed data produce an empty list.
    pub fn load(&self, key: &str) -> Vec<DrawingRecord> {
        match self.store.read(key) {
            Ok(Some(text)) => decode(&text),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "failed to read drawings");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_table_order() {
        assert_eq!(normalize_kind("LongPosition"), Some(DrawingKind::Position));
        assert_eq!(normalize_kind("HorizontalLine"), Some(DrawingKind::Horizontal));
        assert_eq!(normalize_kind("InfoLine"), Some(DrawingKind::Info));
        assert_eq!(normalize_kind("RayLine"), Some(DrawingKind::Ray));
        assert_eq!(normalize_kind("line"), Some(DrawingKind::Trend));
        assert_eq!(normalize_kind("circle"), None);
    }

    #[test]
    fn storage_keys() {
        assert_eq!(storage_key(Some("BTCUSDT")), "drawings:BTCUSDT");
        assert_eq!(storage_key(Some("  ")), "drawings:__global__");
        assert_eq!(storage_key(None), "drawings:__global__");
    }
}
