use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Field names of a prediction record, in wire order.
pub const PREDICTION_FIELDS: [&str; 5] = ["model_family", "layer", "row", "col", "value"];

/// A predicted super-weight coordinate and its synthesized value.
///
/// Coordinates are unsigned, so the non-negativity invariant holds by type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuperWeightPrediction {
    pub model_family: String,
    pub layer: u32,
    pub row: u32,
    pub col: u32,
    pub value: f64,
}

/// A constraint a prediction record violates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordViolation {
    EmptyModelFamily,
    NonFiniteValue,
}

impl std::fmt::Display for RecordViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyModelFamily => write!(f, "model_family must be a non-empty string"),
            Self::NonFiniteValue => write!(f, "value must be a finite number"),
        }
    }
}

impl SuperWeightPrediction {
    pub fn new(model_family: impl Into<String>, layer: u32, row: u32, col: u32, value: f64) -> Self {
        Self {
            model_family: model_family.into(),
            layer,
            row,
            col,
            value,
        }
    }

    /// `(layer, row, col)` triple.
    #[inline]
    pub fn coordinate(&self) -> (u32, u32, u32) {
        (self.layer, self.row, self.col)
    }

    /// Checks every constraint and returns all violations at once.
    pub fn validate(&self) -> Result<(), Vec<RecordViolation>> {
        let mut violations = Vec::new();
        if self.model_family.trim().is_empty() {
            violations.push(RecordViolation::EmptyModelFamily);
        }
        if !self.value.is_finite() {
            violations.push(RecordViolation::NonFiniteValue);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// JSON Schema (draft 2020-12) describing the wire record.
    pub fn json_schema() -> Value {
        json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "title": "SuperWeightPrediction",
            "type": "object",
            "properties": {
                "model_family": {"type": "string"},
                "layer": {"type": "integer", "minimum": 0},
                "row": {"type": "integer", "minimum": 0},
                "col": {"type": "integer", "minimum": 0},
                "value": {"type": "number"},
            },
            "required": PREDICTION_FIELDS,
            "additionalProperties": true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_exactly_five_fields() {
        let p = SuperWeightPrediction::new("Llama-7B", 2, 3968, 7003, -17.328);
        let value = serde_json::to_value(&p).expect("serialize");
        let obj = value.as_object().expect("object");

        assert_eq!(obj.len(), 5);
        for field in PREDICTION_FIELDS {
            assert!(obj.contains_key(field), "missing {}", field);
        }
        assert_eq!(obj["layer"], 2);
        assert_eq!(obj["model_family"], "Llama-7B");
    }

    #[test]
    fn test_negative_coordinates_rejected_on_parse() {
        let line = r#"{"model_family":"X","layer":-1,"row":0,"col":0,"value":1.0}"#;
        assert!(serde_json::from_str::<SuperWeightPrediction>(line).is_err());
    }

    #[test]
    fn test_validate_collects_all_violations() {
        let ok = SuperWeightPrediction::new("Gemma", 0, 0, 0, 1.5);
        assert!(ok.validate().is_ok());

        let bad = SuperWeightPrediction::new("  ", 0, 0, 0, f64::NAN);
        let violations = bad.validate().expect_err("should be invalid");
        assert_eq!(
            violations,
            vec![
                RecordViolation::EmptyModelFamily,
                RecordViolation::NonFiniteValue
            ]
        );
        assert!(violations[0].to_string().contains("model_family"));
    }

    #[test]
    fn test_json_schema_shape() {
        let schema = SuperWeightPrediction::json_schema();
        assert_eq!(schema["title"], "SuperWeightPrediction");
        assert_eq!(schema["properties"]["row"]["minimum"], 0);
        assert_eq!(
            schema["required"].as_array().map(|a| a.len()),
            Some(PREDICTION_FIELDS.len())
        );
    }

    #[test]
    fn test_coordinate() {
        let p = SuperWeightPrediction::new("Phi", 1, 2, 3, 0.0);
        assert_eq!(p.coordinate(), (1, 2, 3));
    }
}
