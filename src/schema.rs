//! Detector description validation.
//!
//! Structural validation runs the description through a JSON Schema
//! (`jsonschema`), collecting every violation. Semantic checks the schema
//! language cannot express (unique ids, ordered ranges) run afterwards.
//! Any failure is a `SchemaError`; there is no recovery.

use hashbrown::HashSet;
use serde_json::{json, Value};

use crate::model::code::MAX_RESOLUTION;
use crate::model::{DetectorDescription, FeatureDefinition};
use crate::{Error, Result};

/// JSON Schema every detector description must satisfy.
pub fn detector_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "DetectorDescription",
        "type": "object",
        "required": ["sensors", "features"],
        "properties": {
            "sensors": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "features"],
                    "properties": {
                        "id": { "type": "integer" },
                        "features": { "type": "object" }
                    }
                }
            },
            "features": {
                "type": "array",
                "items": feature_definition_schema()
            }
        }
    })
}

fn feature_definition_schema() -> Value {
    json!({
        "type": "object",
        "required": ["name", "kind", "resolution", "sign", "range"],
        "properties": {
            "name": { "type": "string", "minLength": 1 },
            "kind": { "enum": ["static", "computed"] },
            "resolution": { "type": "integer", "minimum": 1, "maximum": MAX_RESOLUTION },
            "sign": {
                "oneOf": [
                    { "type": "boolean" },
                    { "enum": [0, 1] }
                ]
            },
            "range": {
                "type": "array",
                "items": { "type": "number" },
                "minItems": 2,
                "maxItems": 2
            }
        }
    })
}

/// Validate `instance` against `schema`, then decode and check it semantically.
pub fn validate_detector(schema: &Value, instance: &Value) -> Result<DetectorDescription> {
    let validator = jsonschema::validator_for(schema)
        .map_err(|e| Error::SchemaError(format!("invalid detector schema: {e}")))?;
    let errors: Vec<String> = validator
        .iter_errors(instance)
        .map(|e| format!("{}: {}", e.instance_path, e))
        .collect();
    if !errors.is_empty() {
        return Err(Error::SchemaError(errors.join("; ")));
    }

    let description: DetectorDescription = serde_json::from_value(instance.clone())
        .map_err(|e| Error::SchemaError(format!("detector description: {e}")))?;

    let mut ids = HashSet::with_capacity(description.sensors.len());
    for sensor in &description.sensors {
        if !ids.insert(sensor.id) {
            return Err(Error::SchemaError(format!("duplicate sensor id {}", sensor.id)));
        }
    }
    validate_definitions(&description.features)?;

    Ok(description)
}

/// Checks over a whole definition list: each entry valid, names unique.
pub fn validate_definitions(definitions: &[FeatureDefinition]) -> Result<()> {
    let mut names = HashSet::with_capacity(definitions.len());
    for def in definitions {
        validate_definition(def)?;
        if !names.insert(def.name.as_str()) {
            return Err(Error::SchemaError(format!("duplicate feature name {:?}", def.name)));
        }
    }
    Ok(())
}

/// Checks a single definition: resolution bounds and a non-empty finite range.
pub fn validate_definition(def: &FeatureDefinition) -> Result<()> {
    if def.name.is_empty() {
        return Err(Error::SchemaError("feature name must not be empty".into()));
    }
    if def.resolution == 0 || def.resolution > MAX_RESOLUTION {
        return Err(Error::SchemaError(format!(
            "feature {:?}: resolution {} outside 1..={MAX_RESOLUTION}",
            def.name, def.resolution
        )));
    }
    let (lo, hi) = def.range;
    if !lo.is_finite() || !hi.is_finite() || lo >= hi {
        return Err(Error::SchemaError(format!(
            "feature {:?}: range [{lo}, {hi}] must be finite with lo < hi",
            def.name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeatureKind;

    fn valid() -> Value {
        json!({
            "sensors": [
                { "id": 10, "features": { "x": 0.0, "y": 1.0 } },
                { "id": 11, "features": { "x": 2.0, "y": 3.0 } }
            ],
            "features": [
                { "name": "x", "kind": "static", "resolution": 8, "sign": 1, "range": [-5, 5] },
                { "name": "y", "kind": "static", "resolution": 8, "sign": false, "range": [0, 5] }
            ]
        })
    }

    #[test]
    fn test_valid_description() {
        let desc = validate_detector(&detector_schema(), &valid()).unwrap();
        assert_eq!(desc.sensors.len(), 2);
        assert_eq!(desc.features[0].name, "x");
        assert!(desc.features[0].sign);
    }

    #[test]
    fn test_missing_sensors_rejected() {
        let err = validate_detector(&detector_schema(), &json!({ "features": [] })).unwrap_err();
        assert!(matches!(err, Error::SchemaError(_)));
    }

    #[test]
    fn test_bad_kind_rejected() {
        let mut v = valid();
        v["features"][0]["kind"] = json!("dynamic");
        assert!(matches!(
            validate_detector(&detector_schema(), &v),
            Err(Error::SchemaError(_))
        ));
    }

    #[test]
    fn test_duplicate_sensor_rejected() {
        let mut v = valid();
        v["sensors"][1]["id"] = json!(10);
        let err = validate_detector(&detector_schema(), &v).unwrap_err();
        assert!(err.to_string().contains("duplicate sensor id 10"));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut v = valid();
        v["features"][1]["range"] = json!([5, 5]);
        assert!(matches!(
            validate_detector(&detector_schema(), &v),
            Err(Error::SchemaError(_))
        ));
    }

    #[test]
    fn test_definition_resolution_bounds() {
        let def = FeatureDefinition::new("d", FeatureKind::Static, 0, false, (0.0, 1.0));
        assert!(validate_definition(&def).is_err());
        let def = FeatureDefinition::new("d", FeatureKind::Static, 33, false, (0.0, 1.0));
        assert!(validate_definition(&def).is_err());
        let def = FeatureDefinition::new("d", FeatureKind::Static, 32, false, (0.0, 1.0));
        assert!(validate_definition(&def).is_ok());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let defs = vec![
            FeatureDefinition::new("d", FeatureKind::Static, 4, false, (0.0, 1.0)),
            FeatureDefinition::new("d", FeatureKind::Computed, 4, false, (0.0, 1.0)),
        ];
        assert!(validate_definitions(&defs).is_err());
    }
}
