#![forbid(unsafe_code)]

//! # Pattern Language toolkit
//!
//! Tools for working with Christopher Alexander's "A Pattern Language" as
//! structured data.
//!
//! ## Features
//!
//! - **Extraction**: legacy HTML and Markdown pattern pages into typed records
//! - **Sequences**: the 36 author sequences and the relationship graph they imply
//! - **Salience**: context-driven relevance ranking, gestalt clusters and emergence
//! - **Rendering**: restructured pattern pages, sequence pages and an index
//! - **REST API**: read-only JSON endpoints over a generated corpus
//!
//! ## Example
//!
//! ```rust,no_run
//! use patlang::{load_markdown_corpus, build_language, LanguageTable, SalienceEngine};
//!
//! fn main() -> anyhow::Result<()> {
//!     let table = LanguageTable::builtin()?;
//!     let corpus = load_markdown_corpus("markdown/apl".as_ref())?;
//!     let (language, _report) = build_language(&table, corpus.into_patterns())?;
//!
//!     let engine = SalienceEngine::new(language.patterns);
//!     let report = engine.track_emergence(&["apl1".into(), "apl2".into(), "apl3".into()]);
//!     println!("{}", report.interpretation);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod commands;
pub mod config;
pub mod corpus;
pub mod error;
pub mod extract;
pub mod render;
pub mod salience;
pub mod schema;
pub mod sequences;
pub mod validate;

// Re-exports
pub use api::{build_router, AppState};
pub use config::Config;
pub use corpus::{
    load_corpus, load_markdown_corpus, Category, Pattern, PatternLanguage, Sequence,
};
pub use error::{PatternError, Result};
pub use extract::{extract, extract_html, extract_markdown, ExtractedPattern, SourceFormat};
pub use render::Renderer;
pub use salience::{
    EmergenceReport, GestaltCluster, PatternContext, SalienceEngine, SalienceScore,
};
pub use sequences::{build_language, build_relationships, LanguageTable, RelationshipReport};
pub use validate::{check_coverage, check_sequences, validate_structure};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
