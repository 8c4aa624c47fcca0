//! Sequences and relationships
//!
//! The sequence table, the relationship builder that derives each pattern's
//! neighbours from sequence order, and the UIA pattern list.

pub mod builder;
pub mod table;
pub mod uia;

pub use builder::{
    build_language, build_relationships, write_outputs, RelationshipReport, SkippedLink,
    LANGUAGE_FILE, SEQUENCES_FILE,
};
pub use table::{CategoryText, LanguageTable};
pub use uia::{uia_pattern_list, UiaEntry, UiaList, UIA_LIST_FILE};
