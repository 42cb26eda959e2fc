//! Event filtering — which trained edges light up for a set of active sensors.
//!
//! Works in the raw sensor-id space the adjacency pass produced, not in
//! dense vertex ids. Results are zero-padded with `(0, 0)` pairs to one common
//! width so the whole batch forms a dense `events × width × 2` array.
//!
//! Since `0` may be a legitimate sensor id, every event also records how many
//! of its pairs are real; use [`EventEdges::edges`] rather than scanning for
//! padding.

use hashbrown::HashSet;
use tracing::debug;

use crate::model::{RawEdge, SensorId};

/// Padding pair appended after the real edges of an event.
pub const PADDING: RawEdge = (0, 0);

/// Edges selected for one event, padded to the batch width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEdges {
    pub pairs: Vec<RawEdge>,
    /// Number of leading entries in `pairs` that are real edges.
    pub len: usize,
}

impl EventEdges {
    /// Real edges only, padding stripped.
    pub fn edges(&self) -> &[RawEdge] {
        &self.pairs[..self.len]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Fixed-width result of one `fit` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBatch {
    pub events: Vec<EventEdges>,
    /// Common edge dimension: the largest per-event edge count.
    pub width: usize,
}

impl EventBatch {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Filters a trained raw edge list against per-event active sensor sets.
#[derive(Debug, Clone, Copy)]
pub struct EventFilter<'a> {
    edges: &'a [RawEdge],
}

impl<'a> EventFilter<'a> {
    pub fn new(edges: &'a [RawEdge]) -> Self {
        Self { edges }
    }

    /// Select, per event, every edge whose endpoints are both active.
    pub fn fit<I, E>(&self, events: I) -> EventBatch
    where
        I: IntoIterator<Item = E>,
        E: IntoIterator<Item = SensorId>,
    {
        let mut selected: Vec<Vec<RawEdge>> = Vec::new();
        for (index, active) in events.into_iter().enumerate() {
            let active: HashSet<SensorId> = active.into_iter().collect();
            let edges: Vec<RawEdge> = self
                .edges
                .iter()
                .copied()
                .filter(|(a, b)| active.contains(a) && active.contains(b))
                .collect();
            debug!(event = index, active = active.len(), edges = edges.len(), "Event filtered");
            selected.push(edges);
        }

        let width = selected.iter().map(Vec::len).max().unwrap_or(0);
        let events = selected
            .into_iter()
            .map(|mut pairs| {
                let len = pairs.len();
                pairs.resize(width, PADDING);
                EventEdges { pairs, len }
            })
            .collect();

        EventBatch { events, width }
    }
}
