use super::ConfigError;

const CONFIG_SCHEMA: &str = include_str!("../../../res/schemas/config.schema.json");

/// Checks the raw TOML document against the bundled schema before any typed
/// decoding, so structural mistakes are reported with their location.
pub(crate) fn validate_toml(toml_text: &str, context: &str) -> Result<(), ConfigError> {
    let schema_value: serde_json::Value = serde_json::from_str(CONFIG_SCHEMA)
        .map_err(|e| ConfigError::Invalid(format!("schema parse error: {e}")))?;
    let schema = jsonschema::validator_for(&schema_value)
        .map_err(|e| ConfigError::Invalid(format!("schema compile error: {e}")))?;

    let toml_value: toml::Value = toml::from_str(toml_text)?;
    let json_value = serde_json::to_value(toml_value)
        .map_err(|e| ConfigError::Invalid(format!("schema input error: {e}")))?;

    let messages: Vec<String> = schema
        .iter_errors(&json_value)
        .take(5)
        .map(|e| format!("{} ({})", e, e.instance_path))
        .collect();
    if !messages.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "schema validation failed for {context}: {}",
            messages.join("; ")
        )));
    }

    Ok(())
}
