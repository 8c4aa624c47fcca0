//! Pattern corpus
//!
//! Typed records for the generated JSON files and the loader that turns a
//! directory of pattern pages into those records.

pub mod loader;
pub mod types;

pub use loader::{
    find_pattern_files, html_path, load_corpus, load_markdown_corpus, markdown_path,
    number_from_file_name, uia_path, LoadedCorpus,
};
pub use types::*;
