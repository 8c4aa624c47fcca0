//! Error types
//!
//! Library-level errors. Command handlers wrap these in `anyhow` with file
//! context; extraction itself never fails on malformed content.

use thiserror::Error;

/// Errors produced by the pattern language library
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("Schema validation failed:\n{}", .0.join("\n"))]
    Schema(Vec<String>),

    #[error("Unknown schema type: {0}")]
    UnknownSchema(String),

    #[error("Pattern not found: {0}")]
    PatternNotFound(String),

    #[error("Pattern number {0} is outside 1..=253")]
    NumberOutOfRange(u32),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Invalid pattern data: {0}")]
    InvalidData(String),
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, PatternError>;
