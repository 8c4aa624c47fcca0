//! Relationship and language builder
//!
//! Turns the sequence table plus the extracted patterns into the generated
//! language document. Relationship lists come only from sequence order:
//! within a sequence each pattern precedes the next one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::table::LanguageTable;
use crate::corpus::{
    write_pretty_json, Category, CategoryEntry, Pattern, PatternLanguage, Sequence, SequencesFile,
    PATTERN_COUNT,
};
use crate::error::Result;

/// Name of the complete generated document
pub const LANGUAGE_FILE: &str = "pattern_language_generated.json";

/// Name of the sequences-only document
pub const SEQUENCES_FILE: &str = "pattern_sequences.json";

/// A consecutive pair that could not be linked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLink {
    pub sequence: u16,
    pub from: u16,
    pub to: u16,
}

/// Outcome of a relationship build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationshipReport {
    /// Distinct edges created
    pub links: usize,
    /// Pairs dropped because an endpoint is not in the corpus
    pub skipped: Vec<SkippedLink>,
}

impl RelationshipReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

fn push_unique(list: &mut Vec<u16>, number: u16) -> bool {
    if list.contains(&number) {
        false
    } else {
        list.push(number);
        true
    }
}

/// Recompute `preceding_patterns` / `following_patterns` from sequence order.
///
/// Existing lists are cleared first. A pattern in several sequences gets the
/// union of its edges, first occurrence order. Pairs with an endpoint missing
/// from `patterns` are reported and skipped, never raised.
pub fn build_relationships(patterns: &mut [Pattern], sequences: &[Sequence]) -> RelationshipReport {
    let index: HashMap<u16, usize> = patterns
        .iter()
        .enumerate()
        .map(|(i, p)| (p.number, i))
        .collect();

    for pattern in patterns.iter_mut() {
        pattern.preceding_patterns.clear();
        pattern.following_patterns.clear();
    }

    let mut report = RelationshipReport::default();

    for sequence in sequences {
        for pair in sequence.patterns.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let (Some(&from_idx), Some(&to_idx)) = (index.get(&from), index.get(&to)) else {
                warn!(
                    sequence = sequence.id,
                    from, to, "sequence references a pattern missing from the corpus"
                );
                report.skipped.push(SkippedLink {
                    sequence: sequence.id,
                    from,
                    to,
                });
                continue;
            };

            let added = push_unique(&mut patterns[from_idx].following_patterns, to);
            push_unique(&mut patterns[to_idx].preceding_patterns, from);
            if added {
                report.links += 1;
            }
        }
    }

    debug!(
        links = report.links,
        skipped = report.skipped.len(),
        "built relationships"
    );
    report
}

/// Assemble the complete language document.
///
/// Patterns are ordered by number, categories are stamped onto patterns that
/// lack one, sequences are attached to their categories and relationships are
/// rebuilt.
pub fn build_language(
    table: &LanguageTable,
    mut patterns: Vec<Pattern>,
) -> Result<(PatternLanguage, RelationshipReport)> {
    patterns.sort_by_key(|p| p.number);
    for pattern in &mut patterns {
        if pattern.category.is_none() {
            pattern.category = Category::for_number(pattern.number);
        }
        if pattern.id.is_empty() {
            pattern.id = Pattern::id_for(pattern.number);
        }
    }

    let report = build_relationships(&mut patterns, &table.sequences);

    let categories = Category::ALL
        .into_iter()
        .map(|category| {
            let text = table.category_text(category);
            CategoryEntry {
                name: category,
                description: text.map(|t| t.description.clone()).unwrap_or_default(),
                process: text.map(|t| t.process.clone()).unwrap_or_default(),
                pattern_range: category.pattern_range(),
                sequences: table.sequences_in(category).cloned().collect(),
            }
        })
        .collect();

    let mut meta_pattern = table.meta_pattern.clone();
    if meta_pattern.following_patterns.is_empty() {
        meta_pattern.following_patterns = (1..=PATTERN_COUNT).collect();
    }

    let language = PatternLanguage {
        meta_pattern,
        categories,
        sequences: table.sequences.clone(),
        patterns,
        usage_instructions: table.usage_instructions.clone(),
    };
    language.validate()?;

    info!(
        patterns = language.patterns.len(),
        sequences = language.sequences.len(),
        "built pattern language"
    );
    Ok((language, report))
}

/// Write the language document, the sequences file and one file per
/// category into `dir`, replacing existing files. Returns the paths written.
pub fn write_outputs(language: &PatternLanguage, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let path = dir.join(LANGUAGE_FILE);
    language.write_json(&path)?;
    written.push(path);

    let path = dir.join(SEQUENCES_FILE);
    write_pretty_json(
        &path,
        &SequencesFile {
            sequences: language.sequences.clone(),
        },
    )?;
    written.push(path);

    for category in &language.categories {
        let path = dir.join(category.name.file_name());
        write_pretty_json(&path, category)?;
        written.push(path);
    }

    Ok(written)
}
