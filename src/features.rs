//! Feature attachment — static vertex columns and metric-derived edge columns.

use tracing::{debug, info};

use crate::model::{
    Edge, FeatureColumns, FeatureDefinition, FeatureValue, IgrDatabase, SensorRecord, Vertex,
    VertexId,
};
use crate::{Error, Result};

// ============================================================================
// Metric strategy
// ============================================================================

/// Computes one edge feature value from the two endpoint sensors.
///
/// Metrics see the raw sensor records, not the dense vertices, so any
/// feature of the detector description is available to them.
pub trait EdgeMetric {
    fn measure(&self, a: &SensorRecord, b: &SensorRecord) -> f64;
}

impl<F> EdgeMetric for F
where
    F: Fn(&SensorRecord, &SensorRecord) -> f64,
{
    fn measure(&self, a: &SensorRecord, b: &SensorRecord) -> f64 {
        self(a, b)
    }
}

/// Planar Euclidean distance between two coordinate features.
/// Missing coordinates yield `NaN`, which the quantizer rejects.
#[derive(Debug, Clone, PartialEq)]
pub struct EuclideanDistance {
    pub x: String,
    pub y: String,
}

impl EuclideanDistance {
    pub fn planar(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self { x: x.into(), y: y.into() }
    }
}

impl EdgeMetric for EuclideanDistance {
    fn measure(&self, a: &SensorRecord, b: &SensorRecord) -> f64 {
        match (a.feature(&self.x), a.feature(&self.y), b.feature(&self.x), b.feature(&self.y)) {
            (Some(ax), Some(ay), Some(bx), Some(by)) => (ax - bx).hypot(ay - by),
            _ => f64::NAN,
        }
    }
}

// ============================================================================
// Vertex columns
// ============================================================================

/// One vertex per sensor, carrying the value of every `static` definition
/// in definition order. Dense id `i` is the `i`-th sensor.
pub fn extract_vertices(
    sensors: &[SensorRecord],
    definitions: &[FeatureDefinition],
) -> Result<Vec<Vertex>> {
    let names: Vec<&str> = definitions
        .iter()
        .filter(|d| d.is_static())
        .map(|d| d.name.as_str())
        .collect();

    sensors
        .iter()
        .enumerate()
        .map(|(index, sensor)| {
            let columns = names
                .iter()
                .map(|name| {
                    sensor.feature(name).map(FeatureValue::Raw).ok_or_else(|| {
                        Error::ShapeError(format!(
                            "sensor {} has no numeric value for static feature {name:?}",
                            sensor.id
                        ))
                    })
                })
                .collect::<Result<FeatureColumns>>()?;
            Ok(Vertex::new(VertexId(index), columns))
        })
        .collect()
}

// ============================================================================
// Edge columns
// ============================================================================

/// Append `definition` to the edge feature list and one metric value to
/// every edge, in edge-id order.
pub fn attach_edge_feature<M>(
    database: &mut IgrDatabase,
    sensors: &[SensorRecord],
    definition: FeatureDefinition,
    metric: &M,
) -> Result<()>
where
    M: EdgeMetric + ?Sized,
{
    let column = database.edge_features.len();
    for edge in &database.edges {
        if edge.features.len() != column {
            return Err(Error::ShapeError(format!(
                "edge {} has {} feature columns, expected {column}",
                edge.id,
                edge.features.len()
            )));
        }
    }

    let values = database
        .edges
        .iter()
        .map(|edge| {
            let (a, b) = endpoints(sensors, edge)?;
            Ok(metric.measure(a, b))
        })
        .collect::<Result<Vec<f64>>>()?;

    for (edge, value) in database.edges.iter_mut().zip(values) {
        edge.features.push(FeatureValue::Raw(value));
    }
    debug!(feature = %definition.name, column, "Edge feature column attached");
    info!(
        feature = %definition.name,
        kind = ?definition.kind,
        edges = database.edges.len(),
        "Edge feature added"
    );
    database.edge_features.push(definition);
    Ok(())
}

fn endpoints<'s>(sensors: &'s [SensorRecord], edge: &Edge) -> Result<(&'s SensorRecord, &'s SensorRecord)> {
    let lookup = |id: VertexId| {
        sensors.get(id.0).ok_or_else(|| {
            Error::ShapeError(format!("edge {} references unknown vertex {id}", edge.id))
        })
    };
    Ok((lookup(edge.vertex_a)?, lookup(edge.vertex_b)?))
}
