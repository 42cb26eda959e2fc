//! `IgrBuilder` — one pipeline run, gated by an explicit stage machine.
//!
//! ```text
//! Unbuilt ─set_detector─▶ DetectorSet ─train─▶ Trained ─add_edge_feature─▶ FeaturesAttached
//!                                                 │                            │
//!                                                 └──────── normalize ◀────────┘
//!                                                              │
//!                                                 Normalized ─quantize─▶ Quantized ─serialize─▶ Serialized
//! ```
//!
//! Normalization and quantization are destructive; every operation checks
//! its source stage and fails with `StateError` instead of re-applying them.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::event::{EventBatch, EventFilter};
use crate::export::{self, IgrArtifact};
use crate::features::{self, EdgeMetric};
use crate::graph::{self, AdjacencyPredicate};
use crate::model::*;
use crate::{quant, schema, Error, Result};

// ============================================================================
// Configuration
// ============================================================================

/// Builder configuration.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// JSON Schema detector descriptions are validated against.
    pub detector_schema: Value,
    /// Indentation of the pretty-printed artifact.
    pub indent: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            detector_schema: schema::detector_schema(),
            indent: 4,
        }
    }
}

// ============================================================================
// Stages
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildStage {
    Unbuilt,
    DetectorSet,
    Trained,
    FeaturesAttached,
    Normalized,
    Quantized,
    Serialized,
}

// ============================================================================
// IgrBuilder
// ============================================================================

/// Owns the IGR database for the duration of one run.
pub struct IgrBuilder {
    config: BuilderConfig,
    stage: BuildStage,
    detector: Option<DetectorDescription>,
    sensor_map: SensorMap,
    database: IgrDatabase,
    /// Adjacency in raw sensor-id space; what `fit` filters.
    raw_edges: Option<Vec<RawEdge>>,
    events: Option<EventBatch>,
}

impl Default for IgrBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IgrBuilder {
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            config,
            stage: BuildStage::Unbuilt,
            detector: None,
            sensor_map: SensorMap::default(),
            database: IgrDatabase::new(),
            raw_edges: None,
            events: None,
        }
    }

    fn require(&self, operation: &'static str, allowed: &[BuildStage]) -> Result<()> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(Error::StateError { operation, stage: self.stage })
        }
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    /// Validate the detector description, then derive vertex features,
    /// vertices and the sensor map from it.
    pub fn set_detector(&mut self, description: &Value) -> Result<()> {
        self.require("set detector", &[BuildStage::Unbuilt])?;

        let detector = schema::validate_detector(&self.config.detector_schema, description)?;
        let vertices = features::extract_vertices(&detector.sensors, &detector.features)?;
        let sensor_map = SensorMap::from_sensors(&detector.sensors)?;

        info!(
            sensors = detector.sensors.len(),
            features = detector.features.len(),
            "Detector set"
        );
        self.database.vertex_features = detector.features.clone();
        self.database.vertices = vertices;
        self.sensor_map = sensor_map;
        self.detector = Some(detector);
        self.stage = BuildStage::DetectorSet;
        Ok(())
    }

    /// Build the edge set from every sensor pair the predicate accepts.
    ///
    /// Returns the edges in raw sensor-id space; the database receives the
    /// same edges remapped to dense vertex ids, with edge id = list position.
    pub fn train<P>(&mut self, predicate: &P) -> Result<Vec<RawEdge>>
    where
        P: AdjacencyPredicate + ?Sized,
    {
        self.require("train", &[BuildStage::DetectorSet])?;
        let sensors = self.sensors()?;

        let adjacency = graph::build_adjacency(sensors, predicate);
        let edges = adjacency
            .edges
            .iter()
            .enumerate()
            .map(|(index, &(a, b))| {
                let dense = |raw: SensorId| {
                    self.sensor_map.dense(raw).ok_or_else(|| {
                        Error::ShapeError(format!("edge references unknown sensor {raw}"))
                    })
                };
                Ok(Edge::new(EdgeId(index), dense(a)?, dense(b)?))
            })
            .collect::<Result<Vec<_>>>()?;

        self.database.edges = edges;
        self.raw_edges = Some(adjacency.edges.clone());
        self.stage = BuildStage::Trained;
        Ok(adjacency.edges)
    }

    /// Add one edge feature column computed by `metric` for every edge.
    /// Call once per feature; call order is column order.
    pub fn add_edge_feature<M>(&mut self, definition: FeatureDefinition, metric: &M) -> Result<()>
    where
        M: EdgeMetric + ?Sized,
    {
        self.require(
            "add edge feature",
            &[BuildStage::Trained, BuildStage::FeaturesAttached],
        )?;
        schema::validate_definition(&definition)?;
        if self.database.edge_features.iter().any(|f| f.name == definition.name) {
            return Err(Error::SchemaError(format!(
                "duplicate edge feature name {:?}",
                definition.name
            )));
        }

        let sensors = match &self.detector {
            Some(detector) => &detector.sensors,
            None => return Err(Error::StateError { operation: "add edge feature", stage: self.stage }),
        };
        features::attach_edge_feature(&mut self.database, sensors, definition, metric)?;
        self.stage = BuildStage::FeaturesAttached;
        Ok(())
    }

    pub fn normalize(&mut self) -> Result<()> {
        self.require("normalize", &[BuildStage::Trained, BuildStage::FeaturesAttached])?;
        quant::normalize_database(&mut self.database)?;
        self.stage = BuildStage::Normalized;
        Ok(())
    }

    pub fn quantize(&mut self) -> Result<()> {
        self.require("quantize", &[BuildStage::Normalized])?;
        quant::quantize_database(&mut self.database)?;
        self.stage = BuildStage::Quantized;
        Ok(())
    }

    /// Normalize, quantize and write the artifact. Terminal: the builder
    /// accepts no further pipeline operations afterwards.
    pub fn serialize_igr_database(&mut self, writer: &mut dyn Write) -> Result<IgrArtifact> {
        self.require(
            "serialize",
            &[BuildStage::Trained, BuildStage::FeaturesAttached, BuildStage::Quantized],
        )?;
        if self.stage != BuildStage::Quantized {
            self.normalize()?;
            self.quantize()?;
        }

        let artifact = IgrArtifact::from_database(&self.database)?;
        export::write_artifact(&artifact, writer, self.config.indent)?;
        writer.flush()?;

        info!(
            vertices = self.vertices_num(),
            edges = self.edges_num(),
            "IGR database serialized"
        );
        self.stage = BuildStage::Serialized;
        Ok(artifact)
    }

    pub fn write_igr_file(&mut self, path: impl AsRef<Path>) -> Result<IgrArtifact> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.serialize_igr_database(&mut writer)
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Filter the raw edges against each event's active sensor ids.
    /// Ids are raw sensor ids, the same space `train` returns.
    pub fn fit<I, E>(&mut self, events: I) -> Result<&EventBatch>
    where
        I: IntoIterator<Item = E>,
        E: IntoIterator<Item = SensorId>,
    {
        let edges = self
            .raw_edges
            .as_deref()
            .ok_or(Error::StateError { operation: "fit", stage: self.stage })?;
        let batch = EventFilter::new(edges).fit(events);
        info!(events = batch.len(), width = batch.width, "Events evaluated");
        Ok(self.events.insert(batch))
    }

    pub fn events(&self) -> Option<&EventBatch> {
        self.events.as_ref()
    }

    /// Install a previously saved raw edge list so `fit` can run without
    /// training. Only valid before `train`, so database and raw edges never
    /// disagree.
    pub fn load_raw_edges(&mut self, edges: Vec<RawEdge>) -> Result<()> {
        self.require("load raw edges", &[BuildStage::Unbuilt, BuildStage::DetectorSet])?;
        self.raw_edges = Some(edges);
        Ok(())
    }

    pub fn save_raw_edges(&self, path: impl AsRef<Path>) -> Result<()> {
        let edges = self
            .raw_edges
            .as_deref()
            .ok_or(Error::StateError { operation: "save raw edges", stage: self.stage })?;
        let mut writer = BufWriter::new(File::create(path)?);
        export::write_raw_edges_npy(edges, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load_raw_edges_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let edges = export::read_raw_edges_npy(BufReader::new(File::open(path)?))?;
        self.load_raw_edges(edges)
    }

    pub fn save_events(&self, path: impl AsRef<Path>) -> Result<()> {
        let batch = self
            .events
            .as_ref()
            .ok_or(Error::StateError { operation: "save events", stage: self.stage })?;
        let mut writer = BufWriter::new(File::create(path)?);
        export::write_events_npy(batch, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    pub fn vertices_num(&self) -> usize {
        self.database.vertex_count()
    }

    pub fn edges_num(&self) -> usize {
        self.database.edge_count()
    }

    pub fn database(&self) -> &IgrDatabase {
        &self.database
    }

    pub fn sensor_map(&self) -> &SensorMap {
        &self.sensor_map
    }

    pub fn raw_edges(&self) -> Option<&[RawEdge]> {
        self.raw_edges.as_deref()
    }

    fn sensors(&self) -> Result<&[SensorRecord]> {
        self.detector
            .as_ref()
            .map(|d| d.sensors.as_slice())
            .ok_or(Error::StateError { operation: "read sensors", stage: self.stage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detector() -> Value {
        json!({
            "sensors": [
                { "id": 100, "features": { "x": 0.0, "y": 0.0 } },
                { "id": 200, "features": { "x": 1.0, "y": 0.0 } },
                { "id": 300, "features": { "x": 5.0, "y": 0.0 } }
            ],
            "features": [
                { "name": "x", "kind": "static", "resolution": 8, "sign": 0, "range": [0, 10] }
            ]
        })
    }

    #[test]
    fn test_stage_progression() {
        let mut igr = IgrBuilder::new();
        assert_eq!(igr.stage(), BuildStage::Unbuilt);
        igr.set_detector(&detector()).unwrap();
        assert_eq!(igr.stage(), BuildStage::DetectorSet);
        let raw = igr.train(&graph::EpsilonNeighborhood::planar("x", "y", 2.0)).unwrap();
        assert_eq!(raw, vec![(200, 100)]);
        assert_eq!(igr.database().edges[0].vertex_a, VertexId(1));
        assert_eq!(igr.stage(), BuildStage::Trained);
        igr.normalize().unwrap();
        igr.quantize().unwrap();
        assert_eq!(igr.stage(), BuildStage::Quantized);
        let mut buf = Vec::new();
        igr.serialize_igr_database(&mut buf).unwrap();
        assert_eq!(igr.stage(), BuildStage::Serialized);
    }

    #[test]
    fn test_train_before_detector() {
        let mut igr = IgrBuilder::new();
        let err = igr.train(&|_: &SensorRecord, _: &SensorRecord| true).unwrap_err();
        assert!(matches!(err, Error::StateError { operation: "train", stage: BuildStage::Unbuilt }));
    }

    #[test]
    fn test_quantize_requires_normalize() {
        let mut igr = IgrBuilder::new();
        igr.set_detector(&detector()).unwrap();
        igr.train(&|_: &SensorRecord, _: &SensorRecord| false).unwrap();
        assert!(matches!(igr.quantize(), Err(Error::StateError { .. })));
        igr.normalize().unwrap();
        assert!(matches!(igr.normalize(), Err(Error::StateError { .. })));
    }

    #[test]
    fn test_load_raw_edges_after_train_rejected() {
        let mut igr = IgrBuilder::new();
        igr.set_detector(&detector()).unwrap();
        igr.train(&|_: &SensorRecord, _: &SensorRecord| true).unwrap();
        assert!(matches!(igr.load_raw_edges(vec![(1, 2)]), Err(Error::StateError { .. })));
    }

    #[test]
    fn test_custom_indent() {
        let mut igr = IgrBuilder::with_config(BuilderConfig { indent: 2, ..Default::default() });
        igr.set_detector(&detector()).unwrap();
        igr.train(&|_: &SensorRecord, _: &SensorRecord| false).unwrap();
        let mut buf = Vec::new();
        igr.serialize_igr_database(&mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().starts_with("{\n  \"vertexFeatures\""));
    }
}
