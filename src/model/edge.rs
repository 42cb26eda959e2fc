//! Undirected edge of the IGR graph.

use serde::{Deserialize, Serialize};
use super::{FeatureColumns, SensorId, VertexId};

/// Edge as produced by adjacency construction, in raw sensor-id space.
pub type RawEdge = (SensorId, SensorId);

/// Opaque edge identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub usize);

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An undirected edge between two dense vertex ids.
///
/// `features` holds one value per edge feature definition (static and
/// computed alike), aligned with `IgrDatabase::edge_features`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub vertex_a: VertexId,
    pub vertex_b: VertexId,
    pub features: FeatureColumns,
}

impl Edge {
    pub fn new(id: EdgeId, vertex_a: VertexId, vertex_b: VertexId) -> Self {
        Self {
            id,
            vertex_a,
            vertex_b,
            features: FeatureColumns::new(),
        }
    }

    /// The "other" end of the edge from the given vertex.
    pub fn other_vertex(&self, from: VertexId) -> Option<VertexId> {
        if from == self.vertex_a { Some(self.vertex_b) }
        else if from == self.vertex_b { Some(self.vertex_a) }
        else { None }
    }
}
