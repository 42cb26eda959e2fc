//! Feature definitions — one per column of vertex or edge features.

use serde::{de, Deserialize, Deserializer, Serialize};

/// Where a feature's values come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// Read from the detector description (vertices) or stored per edge.
    /// Normalized against the declared range before quantization.
    Static,
    /// Derived by a metric; passed to the quantizer without normalization.
    Computed,
}

/// Declaration of one feature column.
///
/// The position of a definition inside its list is the canonical column
/// order for every vertex/edge carrying that feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDefinition {
    pub name: String,
    pub kind: FeatureKind,
    /// Width of the encoded bit string.
    pub resolution: u32,
    /// Signed features normalize to `[-1, 1]`, unsigned ones to `[0, 1]`.
    #[serde(deserialize_with = "deserialize_sign")]
    pub sign: bool,
    /// Declared `(lo, hi)` range of raw values.
    pub range: (f64, f64),
}

impl FeatureDefinition {
    pub fn new(
        name: impl Into<String>,
        kind: FeatureKind,
        resolution: u32,
        sign: bool,
        range: (f64, f64),
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            resolution,
            sign,
            range,
        }
    }

    pub fn is_static(&self) -> bool {
        self.kind == FeatureKind::Static
    }
}

/// Detector descriptions write the sign either as a JSON boolean or as 0/1.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignRepr {
    Bool(bool),
    Int(i64),
}

fn deserialize_sign<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match SignRepr::deserialize(deserializer)? {
        SignRepr::Bool(b) => Ok(b),
        SignRepr::Int(0) => Ok(false),
        SignRepr::Int(1) => Ok(true),
        SignRepr::Int(other) => Err(de::Error::custom(format!(
            "sign must be a boolean or 0/1, got {other}"
        ))),
    }
}
