//! Fixed-point quantization of normalized values.
//!
//! ```text
//! signed,  v > 0 : level = floor(v · 2^(r-1) - 1)
//! signed,  v ≤ 0 : level = ceil (v · 2^(r-1))
//! unsigned       : level = floor(v · 2^r - 1)
//! ```
//!
//! The rounding is asymmetric around zero so that `v = 1.0` maps to the
//! largest positive level instead of overflowing. Levels are then written
//! as `r`-bit two's-complement [`Code`]s. These formulas are what the
//! downstream generator decodes; they must stay bit-exact.

use tracing::warn;

use crate::model::code::MAX_RESOLUTION;
use crate::model::{Code, FeatureDefinition, FeatureValue, IgrDatabase};
use crate::{Error, Result};

/// Integer level of a normalized value. Fails with `RangeError` unless
/// `value ∈ [-1, 1]` (signed) or `value ∈ [0, 1]` (unsigned); `NaN` is
/// never in range.
pub fn quantize_level(value: f64, resolution: u32, sign: bool) -> Result<i64> {
    if resolution == 0 || resolution > MAX_RESOLUTION {
        return Err(Error::SchemaError(format!(
            "resolution {resolution} outside 1..={MAX_RESOLUTION}"
        )));
    }
    let domain_lo = if sign { -1.0 } else { 0.0 };
    if !(domain_lo..=1.0).contains(&value) {
        return Err(Error::RangeError { value, resolution, sign });
    }

    let level = if sign {
        let scale = (1u64 << (resolution - 1)) as f64;
        if value > 0.0 {
            (value * scale - 1.0).floor()
        } else {
            (value * scale).ceil()
        }
    } else {
        let scale = (1u64 << resolution) as f64;
        (value * scale - 1.0).floor()
    };
    Ok(level as i64)
}

/// Quantize a normalized value into an `resolution`-bit code.
pub fn quantize(value: f64, resolution: u32, sign: bool) -> Result<Code> {
    Code::encode(quantize_level(value, resolution, sign)?, resolution)
}

/// Approximate inverse of [`quantize`].
///
/// Exact to within one quantization step for `|v| >= 1 step`. Closer to
/// zero the asymmetric rounding aliases neighbouring levels: signed values
/// in `(-step, step)` come back within two steps, and unsigned values below
/// one step share the all-ones code with `1.0`.
pub fn dequantize(code: &Code, sign: bool) -> f64 {
    let resolution = code.resolution();
    if sign {
        let scale = (1u64 << (resolution - 1)) as f64;
        let level = code.to_signed();
        if level >= 0 {
            (level + 1) as f64 / scale
        } else {
            level as f64 / scale
        }
    } else {
        let scale = (1u64 << resolution) as f64;
        (code.to_unsigned() + 1) as f64 / scale
    }
}

/// Quantize every normalized vertex and edge column in place.
pub fn quantize_database(database: &mut IgrDatabase) -> Result<()> {
    let vertex_defs: Vec<&FeatureDefinition> =
        database.vertex_features.iter().filter(|d| d.is_static()).collect();
    for vertex in &mut database.vertices {
        quantize_row("vertex", vertex.id.0, &vertex_defs, &mut vertex.static_features)?;
    }

    let edge_defs: Vec<&FeatureDefinition> = database.edge_features.iter().collect();
    for edge in &mut database.edges {
        quantize_row("edge", edge.id.0, &edge_defs, &mut edge.features)?;
    }
    Ok(())
}

fn quantize_row(
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
        let value = slot.as_normalized().ok_or_else(|| {
            Error::ShapeError(format!(
                "{what} {id} feature {:?} is {}, expected NORMALIZED",
                def.name,
                slot.stage_name()
            ))
        })?;
        let code = quantize(value, def.resolution, def.sign).inspect_err(|_| {
            warn!(feature = %def.name, what, id, value, "Quantization failed");
        })?;
        *slot = FeatureValue::Quantized(code);
    }
    Ok(())
}
