//! # igr-rs — Intermediate Graph Representation builder
//!
//! Turns a geometric detector description (sensors + declared features) into
//! an Intermediate Graph Representation (IGR): an undirected sensor graph whose
//! vertex and edge features are normalized and quantized into fixed-width
//! two's-complement bit strings, ready for a hardware-description generator.
//!
//! ## Pipeline
//!
//! ```text
//! DetectorDescription ─ set_detector ─▶ vertices + SensorMap
//!                     ─ train(predicate) ─▶ edges (raw + dense ids)
//!                     ─ add_edge_feature(def, metric) ─▶ edge columns
//!                     ─ serialize_igr_database ─▶ normalize → quantize → JSON
//!
//! raw edges ─ fit(events) ─▶ fixed-width per-event edge arrays
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use igr_rs::{IgrBuilder, FeatureDefinition, FeatureKind};
//! use igr_rs::graph::EpsilonNeighborhood;
//! use igr_rs::features::EuclideanDistance;
//!
//! # fn example(detector: serde_json::Value) -> igr_rs::Result<()> {
//! let mut igr = IgrBuilder::new();
//! igr.set_detector(&detector)?;
//! igr.train(&EpsilonNeighborhood::planar("x", "y", 14.0))?;
//! igr.add_edge_feature(
//!     FeatureDefinition::new("distance", FeatureKind::Static, 8, false, (0.0, 100.0)),
//!     &EuclideanDistance::planar("x", "y"),
//! )?;
//! igr.write_igr_file("igr.json")?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod schema;
pub mod graph;
pub mod features;
pub mod quant;
pub mod event;
pub mod export;
pub mod builder;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Code, DetectorDescription, Edge, EdgeId, FeatureColumns, FeatureDefinition,
    FeatureKind, FeatureValue, IgrDatabase, RawEdge, SensorId, SensorMap,
    SensorRecord, Vertex, VertexId,
};

// ============================================================================
// Re-exports: Pipeline
// ============================================================================

pub use builder::{BuildStage, BuilderConfig, IgrBuilder};
pub use event::{EventBatch, EventEdges, EventFilter};
pub use export::IgrArtifact;
pub use features::EdgeMetric;
pub use graph::AdjacencyPredicate;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("State error: cannot {operation} in stage {stage:?}")]
    StateError { operation: &'static str, stage: BuildStage },

    #[error("Range error: {value} does not fit a {resolution}-bit code (signed {sign})")]
    RangeError { value: f64, resolution: u32, sign: bool },

    #[error("Shape error: {0}")]
    ShapeError(String),

    #[error("NumPy array error: {0}")]
    Npy(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
