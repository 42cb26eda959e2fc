//! # Graph Representation Model
//!
//! Typed DTOs for the detector description and the IGR database.
//! These types cross every boundary: schema ↔ graph ↔ features ↔ quant ↔ export.
//!
//! Design rule: column order is carried by the `FeatureDefinition` lists, never
//! by ad-hoc positional conventions. This module is pure data — no I/O.

pub mod feature;
pub mod detector;
pub mod sensor_map;
pub mod vertex;
pub mod edge;
pub mod value;
pub mod code;
pub mod database;

pub use feature::{FeatureDefinition, FeatureKind};
pub use detector::{DetectorDescription, SensorId, SensorRecord};
pub use sensor_map::SensorMap;
pub use vertex::{Vertex, VertexId};
pub use edge::{Edge, EdgeId, RawEdge};
pub use value::{FeatureColumns, FeatureValue};
pub use code::Code;
pub use database::IgrDatabase;
