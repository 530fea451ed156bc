//! Detection run parameters uploaded to the detector process, and the bundled
//! schema that gates them.
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DETECTION_SCHEMA: &str = include_str!("../../res/schemas/detection_config.schema.json");

/// Field names follow the detector's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(rename = "BoardName")]
    pub board_name: String,
    #[serde(rename = "CfgFile")]
    pub cfg_file: String,
    #[serde(rename = "CorrectRate")]
    pub correct_rate: f32,
    #[serde(rename = "Delay4CAP")]
    pub capture_delay: i16,
    #[serde(rename = "NameFile")]
    pub name_file: String,
    #[serde(rename = "NotifyAPI")]
    pub notify_api: String,
    #[serde(rename = "Port")]
    pub port: u16,
    #[serde(rename = "QUEUE_ENTRY_LIMIT_MIN")]
    pub queue_entry_limit_min: i16,
    #[serde(rename = "Src")]
    pub src: String,
    #[serde(rename = "TIME_FORCUS")]
    pub time_focus: i16,
    #[serde(rename = "TIME_SKIP")]
    pub time_skip: i16,
    #[serde(rename = "Threshold")]
    pub threshold: f32,
    #[serde(rename = "WeightFile")]
    pub weight_file: String,
    #[serde(rename = "Status", default)]
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer to the offending value; empty for the document root.
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("schema parse error: {0}")]
    Parse(String),
    #[error("schema compile error: {0}")]
    Compile(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("cfg error")]
    Invalid(Vec<Violation>),
    #[error("{0}")]
    Decode(String),
}

pub struct DetectionSchema {
    validator: jsonschema::Validator,
}

impl DetectionSchema {
    pub fn bundled() -> Result<Self, SchemaError> {
        let schema: Value =
            serde_json::from_str(DETECTION_SCHEMA).map_err(|e| SchemaError::Parse(e.to_string()))?;
        let validator =
            jsonschema::validator_for(&schema).map_err(|e| SchemaError::Compile(e.to_string()))?;
        Ok(Self { validator })
    }

    pub fn violations(&self, candidate: &Value) -> Vec<Violation> {
        self.validator
            .iter_errors(candidate)
            .map(|e| Violation {
                path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect()
    }

    /// Validates first, then decodes. A payload with any violation is never
    /// turned into a `DetectionConfig`.
    pub fn check(&self, candidate: &Value) -> Result<DetectionConfig, DetectionError> {
        let violations = self.violations(candidate);
        if !violations.is_empty() {
            return Err(DetectionError::Invalid(violations));
        }
        DetectionConfig::deserialize(candidate).map_err(|e| DetectionError::Decode(e.to_string()))
    }
}

impl DetectionConfig {
    pub fn to_payload(&self) -> Result<String, DetectionError> {
        serde_json::to_string(self).map_err(|e| DetectionError::Decode(e.to_string()))
    }
}
