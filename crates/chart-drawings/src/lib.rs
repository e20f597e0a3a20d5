// File: crates/chart-drawings/src/lib.rs
// Summary: Chart annotation core; exports drawing primitives, engine, host contract and persistence.

pub mod types;
pub mod error;
pub mod geometry;
pub mod style;
pub mod config;
pub mod scale;
pub mod host;
pub mod viewport;
pub mod mapper;
pub mod render;
pub mod primitives;
pub mod registry;
pub mod selection;
pub mod drag;
pub mod codec;
pub mod factory;
pub mod context;
pub mod engine;

pub use types::{Bar, ConnectionStatus, DrawingId, FeedEvent, LogicalRange, Point, Side, SubscriptionId, TimeRange, Timestamp};
pub use error::{DrawingError, Result};
pub use style::{LineOptions, LineOptionsPatch, LineStyle, PositionStyle, Rgba};
pub use config::EngineConfig;
pub use host::ChartHost;
pub use viewport::Viewport;
pub use mapper::CoordinateMapper;
pub use render::{DrawCommand, RecordingSurface, Stroke, Surface};
pub use primitives::{
    AngleMarker, DragDelta, Drawing, DrawingKind, HitKind, HitType, HorizontalLine, LineKind, PositionBand,
    PositionEvaluator, PositionHit, PositionLevels, Primitive, TrendSegment, VerticalLine,
};
pub use registry::DrawingRegistry;
pub use selection::{ObserverId, SelectionController};
pub use drag::DragController;
pub use codec::{storage_key, DrawingRecord, DrawingStore, FileStore, MemoryStore, PersistenceCodec};
pub use factory::DrawingFactory;
pub use context::{DrawingTool, SymbolContext, ToolState};
pub use engine::DrawingEngine;
