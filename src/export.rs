//! IGR export — the artifact document and the raw edge / event arrays.
//!
//! ```text
//! IgrDatabase (quantized) → IgrArtifact → pretty JSON
//!   → consumed by the hardware-description generator
//!
//! raw edges  → N × 2 int64 .npy
//! EventBatch → events × width × 2 int64 .npy
//! ```

use std::io::{Read, Write};

use ndarray::{Array2, Array3};
use ndarray_npy::{ReadNpyExt, WriteNpyExt};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::event::EventBatch;
use crate::model::*;
use crate::{Error, Result};

// ============================================================================
// Artifact document
// ============================================================================

/// The serialized IGR, one-to-one with the document the generator reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IgrArtifact {
    pub vertex_features: Vec<FeatureDefinition>,
    pub edge_features: Vec<FeatureDefinition>,
    pub vertices: Vec<ArtifactVertex>,
    pub edges: Vec<ArtifactEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactVertex {
    pub id: VertexId,
    pub static_features: Vec<Code>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactEdge {
    pub id: EdgeId,
    pub vertex_a: VertexId,
    pub vertex_b: VertexId,
    pub static_features: Vec<Code>,
    /// Only written when the graph declares computed edge features.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub computed_features: Vec<Code>,
}

impl IgrArtifact {
    /// Build the document from a fully quantized database.
    ///
    /// Edge columns are split by kind: static codes go to `staticFeatures`,
    /// computed ones to `computedFeatures`, each in definition order.
    pub fn from_database(database: &IgrDatabase) -> Result<Self> {
        let vertices = database
            .vertices
            .iter()
            .map(|v| {
                Ok(ArtifactVertex {
                    id: v.id,
                    static_features: codes("vertex", v.id.0, v.static_features.iter())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let kinds: Vec<FeatureKind> = database.edge_features.iter().map(|d| d.kind).collect();
        let edges = database
            .edges
            .iter()
            .map(|e| {
                if e.features.len() != kinds.len() {
                    return Err(Error::ShapeError(format!(
                        "edge {} has {} feature columns, expected {}",
                        e.id,
                        e.features.len(),
                        kinds.len()
                    )));
                }
                let of_kind = |kind: FeatureKind| {
                    e.features
                        .iter()
                        .zip(&kinds)
                        .filter(move |(_, k)| **k == kind)
                        .map(|(value, _)| value)
                };
                Ok(ArtifactEdge {
                    id: e.id,
                    vertex_a: e.vertex_a,
                    vertex_b: e.vertex_b,
                    static_features: codes("edge", e.id.0, of_kind(FeatureKind::Static))?,
                    computed_features: codes("edge", e.id.0, of_kind(FeatureKind::Computed))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            vertex_features: database.vertex_features.clone(),
            edge_features: database.edge_features.clone(),
            vertices,
            edges,
        })
    }
}

fn codes<'v>(
    what: &str,
    id: usize,
    values: impl Iterator<Item = &'v FeatureValue>,
) -> Result<Vec<Code>> {
    values
        .map(|value| {
            value.as_code().copied().ok_or_else(|| {
                Error::ShapeError(format!(
                    "{what} {id} holds a {} value, expected QUANTIZED",
                    value.stage_name()
                ))
            })
        })
        .collect()
}

/// Write the artifact as pretty JSON indented by `indent` spaces.
pub fn write_artifact(artifact: &IgrArtifact, writer: &mut dyn Write, indent: usize) -> Result<()> {
    let indent = vec![b' '; indent];
    let mut ser = serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(&indent));
    artifact.serialize(&mut ser)?;
    Ok(())
}

pub fn read_artifact(reader: impl Read) -> Result<IgrArtifact> {
    Ok(serde_json::from_reader(reader)?)
}

// ============================================================================
// NumPy arrays
// ============================================================================

/// Store a raw edge list as an `N × 2` int64 array.
pub fn write_raw_edges_npy(edges: &[RawEdge], writer: impl Write) -> Result<()> {
    let flat: Vec<i64> = edges.iter().flat_map(|&(a, b)| [a, b]).collect();
    let array = Array2::from_shape_vec((edges.len(), 2), flat)
        .map_err(|e| Error::ShapeError(format!("raw edge array: {e}")))?;
    array
        .write_npy(writer)
        .map_err(|e| Error::Npy(format!("failed to write raw edges: {e}")))
}

/// Load a raw edge list written by [`write_raw_edges_npy`].
pub fn read_raw_edges_npy(reader: impl Read) -> Result<Vec<RawEdge>> {
    let array = Array2::<i64>::read_npy(reader)
        .map_err(|e| Error::Npy(format!("failed to read raw edges: {e}")))?;
    if array.ncols() != 2 {
        return Err(Error::ShapeError(format!(
            "raw edge array has shape {:?}, expected [N, 2]",
            array.shape()
        )));
    }
    Ok(array.rows().into_iter().map(|row| (row[0], row[1])).collect())
}

/// Store fitted events as an `events × width × 2` int64 array, padding included.
pub fn write_events_npy(batch: &EventBatch, writer: impl Write) -> Result<()> {
    let flat: Vec<i64> = batch
        .events
        .iter()
        .flat_map(|event| event.pairs.iter().flat_map(|&(a, b)| [a, b]))
        .collect();
    let array = Array3::from_shape_vec((batch.events.len(), batch.width, 2), flat)
        .map_err(|e| Error::ShapeError(format!("event array: {e}")))?;
    array
        .write_npy(writer)
        .map_err(|e| Error::Npy(format!("failed to write events: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventFilter;
    use smallvec::smallvec;

    fn quantized_database() -> IgrDatabase {
        let mut edge = Edge::new(EdgeId(0), VertexId(0), VertexId(1));
        edge.features = smallvec![
            FeatureValue::Quantized(Code::encode(-1, 4).unwrap()),
            FeatureValue::Quantized(Code::encode(127, 8).unwrap()),
        ];
        IgrDatabase {
            vertex_features: vec![FeatureDefinition::new("r", FeatureKind::Static, 3, false, (0.0, 1.0))],
            edge_features: vec![
                FeatureDefinition::new("c", FeatureKind::Computed, 4, true, (-1.0, 1.0)),
                FeatureDefinition::new("d", FeatureKind::Static, 8, false, (0.0, 100.0)),
            ],
            vertices: vec![
                Vertex::new(VertexId(0), smallvec![FeatureValue::Quantized(Code::encode(3, 3).unwrap())]),
                Vertex::new(VertexId(1), smallvec![FeatureValue::Quantized(Code::encode(5, 3).unwrap())]),
            ],
            edges: vec![edge],
        }
    }

    #[test]
    fn test_artifact_splits_edge_columns_by_kind() {
        let artifact = IgrArtifact::from_database(&quantized_database()).unwrap();
        let edge = &artifact.edges[0];
        assert_eq!(edge.static_features, vec![Code::encode(127, 8).unwrap()]);
        assert_eq!(edge.computed_features, vec![Code::encode(-1, 4).unwrap()]);
    }

    #[test]
    fn test_artifact_json_shape() {
        let artifact = IgrArtifact::from_database(&quantized_database()).unwrap();
        let mut buf = Vec::new();
        write_artifact(&artifact, &mut buf, 4).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"vertexFeatures\""));
        assert!(text.contains("\"vertexA\": 0"));
        assert!(text.contains("\"b01111111\""));
        assert!(text.contains("\n    \"edges\""));
        assert_eq!(read_artifact(text.as_bytes()).unwrap(), artifact);
    }

    #[test]
    fn test_unquantized_database_rejected() {
        let mut db = quantized_database();
        db.vertices[1].static_features[0] = FeatureValue::Normalized(0.5);
        assert!(matches!(IgrArtifact::from_database(&db), Err(Error::ShapeError(_))));
    }

    #[test]
    fn test_raw_edges_npy_roundtrip() {
        let edges = vec![(7, 3), (9, 0)];
        let mut buf = Vec::new();
        write_raw_edges_npy(&edges, &mut buf).unwrap();
        assert_eq!(read_raw_edges_npy(buf.as_slice()).unwrap(), edges);
    }

    #[test]
    fn test_events_npy_shape() {
        let edges = [(2, 1), (3, 2)];
        let batch = EventFilter::new(&edges).fit(vec![vec![1, 2, 3], vec![]]);
        let mut buf = Vec::new();
        write_events_npy(&batch, &mut buf).unwrap();
        let array = Array3::<i64>::read_npy(buf.as_slice()).unwrap();
        assert_eq!(array.shape(), &[2, 2, 2]);
        assert_eq!(array[[0, 1, 0]], 3);
        assert_eq!(array[[1, 0, 0]], 0);
    }
}
