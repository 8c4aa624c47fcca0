//! Project configuration
//!
//! Read from `.patlang.config.json` in the working directory. Every field
//! has a default, so a missing or partial file is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::DEFAULT_SALIENCE_LIMIT;
use crate::salience::DEFAULT_GESTALT_THRESHOLD;
use crate::sequences::LANGUAGE_FILE;

/// Default config file name
pub const CONFIG_FILE: &str = ".patlang.config.json";

fn default_html_dir() -> PathBuf {
    PathBuf::from("apl")
}

fn default_markdown_dir() -> PathBuf {
    PathBuf::from("markdown/apl")
}

fn default_uia_dir() -> PathBuf {
    PathBuf::from("markdown/uia")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_corpus_file() -> PathBuf {
    PathBuf::from(LANGUAGE_FILE)
}

fn default_limit() -> usize {
    DEFAULT_SALIENCE_LIMIT
}

fn default_threshold() -> f64 {
    DEFAULT_GESTALT_THRESHOLD
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Legacy HTML pattern pages (`aplN.htm`)
    #[serde(default = "default_html_dir")]
    pub html_dir: PathBuf,

    /// Markdown pattern pages (`aplNNN.md`)
    #[serde(default = "default_markdown_dir")]
    pub markdown_dir: PathBuf,

    /// UI/UX adaptation pages
    #[serde(default = "default_uia_dir")]
    pub uia_dir: PathBuf,

    /// Where generated JSON and rendered pages go
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Generated language document read by the query commands and server
    #[serde(default = "default_corpus_file")]
    pub corpus_file: PathBuf,

    /// Replacement for the built-in sequence table (JSON or YAML)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_file: Option<PathBuf>,

    #[serde(default)]
    pub salience: SalienceConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            html_dir: default_html_dir(),
            markdown_dir: default_markdown_dir(),
            uia_dir: default_uia_dir(),
            output_dir: default_output_dir(),
            corpus_file: default_corpus_file(),
            language_file: None,
            salience: SalienceConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Query defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalienceConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    #[serde(default = "default_threshold")]
    pub gestalt_threshold: f64,
}

impl Default for SalienceConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            gestalt_threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load config from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save config to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load(CONFIG_FILE).unwrap_or_default()
    }

    /// `corpus_file`, resolved against `output_dir` when relative
    pub fn corpus_path(&self) -> PathBuf {
        if self.corpus_file.is_absolute() {
            self.corpus_file.clone()
        } else {
            self.output_dir.join(&self.corpus_file)
        }
    }
}
