//! Vertex of the IGR graph.

use serde::{Deserialize, Serialize};
use super::FeatureColumns;

/// Dense vertex identifier (`0..N`), distinct from the raw sensor id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub usize);

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A vertex with one value per static vertex feature, in definition order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vertex {
    pub id: VertexId,
    pub static_features: FeatureColumns,
}

impl Vertex {
    pub fn new(id: VertexId, static_features: FeatureColumns) -> Self {
        Self { id, static_features }
    }
}
