//! Detector description — the sensor records the graph is built from.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::FeatureDefinition;

/// Raw sensor identifier as written in the detector description.
pub type SensorId = i64;

/// One sensor of the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    pub id: SensorId,
    pub features: Map<String, Value>,
}

impl SensorRecord {
    pub fn new(id: SensorId) -> Self {
        Self {
            id,
            features: Map::new(),
        }
    }

    pub fn with_feature(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.features.insert(name.into(), value.into());
        self
    }

    /// Numeric value of a feature, if present and numeric.
    pub fn feature(&self, name: &str) -> Option<f64> {
        self.features.get(name).and_then(Value::as_f64)
    }
}

/// The full description handed to `set_detector`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorDescription {
    pub sensors: Vec<SensorRecord>,
    pub features: Vec<FeatureDefinition>,
}
