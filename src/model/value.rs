//! Feature column values, tagged with the pipeline stage they are in.

use serde::Serialize;
use smallvec::SmallVec;

use super::Code;

/// Per-vertex / per-edge feature values, in definition order.
pub type FeatureColumns = SmallVec<[FeatureValue; 4]>;

/// A single feature value.
///
/// The pipeline is one-way: `Raw → Normalized → Quantized`. Each stage
/// only accepts values from the previous one, so a column can never be
/// normalized or quantized twice.
///
/// Serialized untagged for inspection only. `Raw` and `Normalized` share a
/// wire form, so the type is not `Deserialize`; artifacts are
/// read back as [`crate::IgrArtifact`], whose values are all codes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Raw(f64),
    Normalized(f64),
    Quantized(Code),
}

impl FeatureValue {
    pub fn stage_name(&self) -> &'static str {
        match self {
            FeatureValue::Raw(_) => "RAW",
            FeatureValue::Normalized(_) => "NORMALIZED",
            FeatureValue::Quantized(_) => "QUANTIZED",
        }
    }

    pub fn as_raw(&self) -> Option<f64> {
        match self {
            FeatureValue::Raw(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_normalized(&self) -> Option<f64> {
        match self {
            FeatureValue::Normalized(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_code(&self) -> Option<&Code> {
        match self {
            FeatureValue::Quantized(c) => Some(c),
            _ => None,
        }
    }
}

impl From<f64> for FeatureValue { fn from(v: f64) -> Self { FeatureValue::Raw(v) } }
impl From<Code> for FeatureValue { fn from(c: Code) -> Self { FeatureValue::Quantized(c) } }

impl std::fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureValue::Raw(v) | FeatureValue::Normalized(v) => write!(f, "{v}"),
            FeatureValue::Quantized(c) => write!(f, "{c}"),
        }
    }
}
