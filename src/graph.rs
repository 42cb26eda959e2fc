//! Adjacency construction — which sensor pairs become edges.
//!
//! Every unordered pair of sensors is tested exactly once: the last sensor is
//! popped off the working list and tested against everything still in it,
//! until the list is empty. That is `n(n-1)/2` predicate calls, quadratic on
//! purpose; detector sensor counts are small enough for it.

use hashbrown::HashSet;
use tracing::{debug, info};

use crate::model::{RawEdge, SensorRecord};

// ============================================================================
// Predicate strategy
// ============================================================================

/// Decides whether two sensors are adjacent.
///
/// # Contract
///
/// Implementations must be symmetric (`adjacent(a, b) == adjacent(b, a)`) and
/// should be irreflexive. The builder does not verify this: with an
/// asymmetric predicate, edge presence depends on sensor order, since each
/// pair is only ever tested as `(later sensor, earlier sensor)`.
pub trait AdjacencyPredicate {
    fn adjacent(&self, a: &SensorRecord, b: &SensorRecord) -> bool;
}

impl<F> AdjacencyPredicate for F
where
    F: Fn(&SensorRecord, &SensorRecord) -> bool,
{
    fn adjacent(&self, a: &SensorRecord, b: &SensorRecord) -> bool {
        self(a, b)
    }
}

/// Epsilon-neighbor predicate on two coordinate features.
///
/// Adjacent iff `0 < dx² + dy² < epsilon²`; coincident sensors are never
/// adjacent. Sensors missing either coordinate are never adjacent.
#[derive(Debug, Clone, PartialEq)]
pub struct EpsilonNeighborhood {
    pub x: String,
    pub y: String,
    pub epsilon: f64,
}

impl EpsilonNeighborhood {
    pub fn planar(x: impl Into<String>, y: impl Into<String>, epsilon: f64) -> Self {
        Self { x: x.into(), y: y.into(), epsilon }
    }
}

impl AdjacencyPredicate for EpsilonNeighborhood {
    fn adjacent(&self, a: &SensorRecord, b: &SensorRecord) -> bool {
        let (Some(ax), Some(ay), Some(bx), Some(by)) = (
            a.feature(&self.x),
            a.feature(&self.y),
            b.feature(&self.x),
            b.feature(&self.y),
        ) else {
            return false;
        };
        let d2 = (ax - bx).powi(2) + (ay - by).powi(2);
        d2 < self.epsilon * self.epsilon && d2 > 0.0
    }
}

// ============================================================================
// Construction
// ============================================================================

/// Result of one adjacency pass, in raw sensor-id space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Adjacency {
    /// Unique undirected pairs, in discovery order.
    pub edges: Vec<RawEdge>,
    pub pairs_evaluated: usize,
}

/// Test every unordered sensor pair once and collect the adjacent ones.
///
/// Pairs are stored as `(popped sensor id, remaining sensor id)`. No self
/// pairs are ever tested; a pair already present in either orientation is
/// not added again.
pub fn build_adjacency<P>(sensors: &[SensorRecord], predicate: &P) -> Adjacency
where
    P: AdjacencyPredicate + ?Sized,
{
    let mut remaining: Vec<&SensorRecord> = sensors.iter().collect();
    let mut seen: HashSet<RawEdge> = HashSet::new();
    let mut adjacency = Adjacency::default();

    while let Some(current) = remaining.pop() {
        for other in &remaining {
            adjacency.pairs_evaluated += 1;
            if current.id == other.id || !predicate.adjacent(current, other) {
                continue;
            }
            let key = if current.id <= other.id {
                (current.id, other.id)
            } else {
                (other.id, current.id)
            };
            if seen.insert(key) {
                adjacency.edges.push((current.id, other.id));
            } else {
                debug!(a = current.id, b = other.id, "Skipping duplicate sensor pair");
            }
        }
    }

    info!(
        sensors = sensors.len(),
        pairs = adjacency.pairs_evaluated,
        edges = adjacency.edges.len(),
        "Adjacency built"
    );
    adjacency
}
