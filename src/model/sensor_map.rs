//! SensorMap — bijection between raw sensor ids and dense vertex ids.

use hashbrown::HashMap;

use super::{SensorId, SensorRecord, VertexId};
use crate::{Error, Result};

/// Raw sensor id ↔ dense vertex id. Built once, read-only afterwards.
///
/// Dense ids follow the order of the sensors in the detector description,
/// so `VertexId(i)` is always the `i`-th sensor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorMap {
    to_dense: HashMap<SensorId, VertexId>,
    to_raw: Vec<SensorId>,
}

impl SensorMap {
    pub fn from_sensors(sensors: &[SensorRecord]) -> Result<Self> {
        let mut to_dense = HashMap::with_capacity(sensors.len());
        let mut to_raw = Vec::with_capacity(sensors.len());
        for (index, sensor) in sensors.iter().enumerate() {
            if to_dense.insert(sensor.id, VertexId(index)).is_some() {
                return Err(Error::SchemaError(format!(
                    "duplicate sensor id {}",
                    sensor.id
                )));
            }
            to_raw.push(sensor.id);
        }
        Ok(Self { to_dense, to_raw })
    }

    pub fn dense(&self, raw: SensorId) -> Option<VertexId> {
        self.to_dense.get(&raw).copied()
    }

    pub fn raw(&self, dense: VertexId) -> Option<SensorId> {
        self.to_raw.get(dense.0).copied()
    }

    pub fn len(&self) -> usize {
        self.to_raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_raw.is_empty()
    }
}
