//! IgrDatabase — the single mutable graph owned by one builder run.

use serde::Serialize;

use super::{Edge, FeatureDefinition, Vertex};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IgrDatabase {
    pub vertex_features: Vec<FeatureDefinition>,
    pub edge_features: Vec<FeatureDefinition>,
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
}

impl IgrDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
