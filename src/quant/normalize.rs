//! Linear range normalization.
//!
//! ```text
//! signed   : v = 2 (x - lo) / (hi - lo) - 1      target [-1, 1]
//! unsigned : v =   (x - lo) / (hi - lo)          target [ 0, 1]
//! ```
//!
//! No clamping: a raw value outside the declared range lands outside the
//! target domain and is rejected later by the quantizer, which accepts
//! `[-1, 1]` for signed and `[0, 1]` for unsigned features.

use tracing::{debug, warn};

use crate::model::{FeatureDefinition, FeatureValue, IgrDatabase};
use crate::{Error, Result};

pub fn normalize(value: f64, range: (f64, f64), sign: bool) -> f64 {
    let (lo, hi) = range;
    if sign {
        2.0 * (value - lo) / (hi - lo) - 1.0
    } else {
        (value - lo) / (hi - lo)
    }
}

/// Inverse of [`normalize`].
pub fn denormalize(normalized: f64, range: (f64, f64), sign: bool) -> f64 {
    let (lo, hi) = range;
    if sign {
        (normalized + 1.0) / 2.0 * (hi - lo) + lo
    } else {
        normalized * (hi - lo) + lo
    }
}

fn in_domain(value: f64, sign: bool) -> bool {
    let lo = if sign { -1.0 } else { 0.0 };
    (lo..=1.0).contains(&value)
}

/// Normalize every vertex and edge column in place.
///
/// Static columns are rescaled with their definition's range and sign;
/// computed columns only advance to the normalized stage.
pub fn normalize_database(database: &mut IgrDatabase) -> Result<()> {
    let vertex_defs: Vec<&FeatureDefinition> =
        database.vertex_features.iter().filter(|d| d.is_static()).collect();
    for vertex in &mut database.vertices {
        normalize_row("vertex", vertex.id.0, &vertex_defs, &mut vertex.static_features)?;
    }

    let edge_defs: Vec<&FeatureDefinition> = database.edge_features.iter().collect();
    for edge in &mut database.edges {
        normalize_row("edge", edge.id.0, &edge_defs, &mut edge.features)?;
    }

    for def in vertex_defs.iter().chain(edge_defs.iter()) {
        debug!(feature = %def.name, kind = ?def.kind, range = ?def.range, sign = def.sign, "Column normalized");
    }
    Ok(())
}

fn normalize_row(
    what: &str,
    id: usize,
    definitions: &[&FeatureDefinition],
    columns: &mut [FeatureValue],
) -> Result<()> {
    if columns.len() != definitions.len() {
        return Err(Error::ShapeError(format!(
            "{what} {id} has {} feature columns, expected {}",
            columns.len(),
            definitions.len()
        )));
    }
    for (def, slot) in definitions.iter().zip(columns.iter_mut()) {
        let raw = slot.as_raw().ok_or_else(|| {
            Error::ShapeError(format!(
                "{what} {id} feature {:?} is {}, expected RAW",
                def.name,
                slot.stage_name()
            ))
        })?;
        let value = if def.is_static() {
            normalize(raw, def.range, def.sign)
        } else {
            raw
        };
        if !in_domain(value, def.sign) {
            warn!(
                feature = %def.name,
                raw,
                normalized = value,
                "Value outside the normalized domain; declared range does not cover the data"
            );
        }
        *slot = FeatureValue::Normalized(value);
    }
    Ok(())
}
