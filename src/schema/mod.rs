//! JSON Schema validation for generated files
//!
//! Schemas are embedded at compile time. The schema type is picked from the
//! file name, so `patlang validate schema category_towns.json` needs no flag.

use std::sync::LazyLock;

use serde_json::Value;

use crate::error::{PatternError, Result};

const LANGUAGE_SCHEMA: &str = include_str!("../../schemas/pattern-language.schema.json");
const SEQUENCES_SCHEMA: &str = include_str!("../../schemas/pattern-sequences.schema.json");
const CATEGORY_SCHEMA: &str = include_str!("../../schemas/category.schema.json");
const UIA_SCHEMA: &str = include_str!("../../schemas/uia-pattern-list.schema.json");

/// Schema type names accepted by [`validate_by_type`]
pub const SCHEMA_TYPES: [&str; 4] = ["language", "sequences", "category", "uia"];

static SCHEMAS: LazyLock<Vec<(&'static str, &'static str)>> = LazyLock::new(|| {
    vec![
        ("language", LANGUAGE_SCHEMA),
        ("sequences", SEQUENCES_SCHEMA),
        ("category", CATEGORY_SCHEMA),
        ("uia", UIA_SCHEMA),
    ]
});

/// Schema type for a generated file name
pub fn detect_schema_type(filename: &str) -> Option<&'static str> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    if name.contains("pattern_language") {
        Some("language")
    } else if name.contains("pattern_sequences") {
        Some("sequences")
    } else if name.starts_with("category_") {
        Some("category")
    } else if name.contains("uia_pattern_list") {
        Some("uia")
    } else {
        None
    }
}

/// Raw schema document for a type
pub fn schema_for(schema_type: &str) -> Result<Value> {
    let source = SCHEMAS
        .iter()
        .find(|(name, _)| *name == schema_type)
        .map(|(_, source)| *source)
        .ok_or_else(|| PatternError::UnknownSchema(schema_type.to_string()))?;
    Ok(serde_json::from_str(source)?)
}

/// Validate a JSON value; every violation is reported with its location
pub fn validate_value(instance: &Value, schema_type: &str) -> Result<()> {
    let schema = schema_for(schema_type)?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| PatternError::Schema(vec![format!("invalid schema: {}", e)]))?;

    let errors: Vec<String> = validator
        .iter_errors(instance)
        .map(|e| {
            let path = e.instance_path.to_string();
            if path.is_empty() {
                e.to_string()
            } else {
                format!("{}: {}", path, e)
            }
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(PatternError::Schema(errors))
    }
}

/// Parse and validate file content
pub fn validate_by_type(content: &str, schema_type: &str) -> Result<()> {
    let instance: Value = serde_json::from_str(content)?;
    validate_value(&instance, schema_type)
}
