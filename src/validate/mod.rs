//! Corpus checks
//!
//! Page layout, number coverage and sequence integrity. Every check reports;
//! none of them modify data.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::corpus::{Pattern, PatternLanguage, PATTERN_COUNT};

/// Number of author-defined sequences
pub const SEQUENCE_COUNT: u16 = 36;

static PATTERN_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+Pattern:\s+\d+\s+-\s+.+$").unwrap());
static NARROWER_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^##\s+Narrower:").unwrap());
static PROBLEM_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^##\s+Problem:").unwrap());
static SOLUTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^##\s+Solution:").unwrap());
static BROADER_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^##\s+Broader:").unwrap());
static ANY_SECTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^##").unwrap());

// ============================================================================
// Page structure
// ============================================================================

/// Restructured-layout checks for one page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructureReport {
    pub has_pattern_title: bool,
    pub has_narrower_header: bool,
    pub has_problem_header: bool,
    pub has_problem_bold: bool,
    pub has_solution_header: bool,
    pub has_solution_bold: bool,
    pub has_broader_header: bool,
}

impl StructureReport {
    pub fn is_valid(&self) -> bool {
        self.missing().is_empty()
    }

    /// Names of the failed checks
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (self.has_pattern_title, "has_pattern_title"),
            (self.has_narrower_header, "has_narrower_header"),
            (self.has_problem_header, "has_problem_header"),
            (self.has_problem_bold, "has_problem_bold"),
            (self.has_solution_header, "has_solution_header"),
            (self.has_solution_bold, "has_solution_bold"),
            (self.has_broader_header, "has_broader_header"),
        ]
        .into_iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, name)| name)
        .collect()
    }
}

/// Check a page against the restructured layout
pub fn validate_structure(content: &str) -> StructureReport {
    StructureReport {
        has_pattern_title: PATTERN_TITLE.is_match(content),
        has_narrower_header: NARROWER_HEADER.is_match(content),
        has_problem_header: PROBLEM_HEADER.is_match(content),
        has_problem_bold: section_opens_bold(content, &PROBLEM_HEADER),
        has_solution_header: SOLUTION_HEADER.is_match(content),
        has_solution_bold: section_opens_bold(content, &SOLUTION_HEADER),
        has_broader_header: BROADER_HEADER.is_match(content),
    }
}

/// Whether the first line of a section body starts with `**`
fn section_opens_bold(content: &str, header: &Regex) -> bool {
    let Some(found) = header.find(content) else {
        return false;
    };
    let rest = &content[found.end()..];
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => return false,
    };
    let body = match ANY_SECTION.find(rest) {
        Some(next) => &rest[..next.start()],
        None => rest,
    };
    body.trim()
        .lines()
        .next()
        .is_some_and(|line| line.trim().starts_with("**"))
}

// ============================================================================
// Coverage
// ============================================================================

/// Number coverage over 1..=253
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub present: usize,
    pub missing: Vec<u16>,
    pub duplicates: Vec<u16>,
    pub out_of_range: Vec<u16>,
}

impl CoverageReport {
    /// Exactly one record per number, nothing outside the range
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.duplicates.is_empty() && self.out_of_range.is_empty()
    }
}

pub fn check_coverage(patterns: &[Pattern]) -> CoverageReport {
    let mut counts: BTreeMap<u16, usize> = BTreeMap::new();
    let mut out_of_range = BTreeSet::new();

    for pattern in patterns {
        if (1..=PATTERN_COUNT).contains(&pattern.number) {
            *counts.entry(pattern.number).or_insert(0) += 1;
        } else {
            out_of_range.insert(pattern.number);
        }
    }

    CoverageReport {
        present: counts.len(),
        missing: (1..=PATTERN_COUNT)
            .filter(|n| !counts.contains_key(n))
            .collect(),
        duplicates: counts
            .iter()
            .filter(|(_, &count)| count > 1)
            .map(|(&n, _)| n)
            .collect(),
        out_of_range: out_of_range.into_iter().collect(),
    }
}

// ============================================================================
// Sequences
// ============================================================================

/// A sequence integrity problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SequenceIssue {
    /// Referenced pattern number has no record
    MissingPattern { sequence: u16, number: u16 },
    /// Sequence id outside 1..=36
    IdOutOfRange { sequence: u16 },
    /// Pattern number outside the sequence's category range
    CategoryMismatch { sequence: u16, number: u16 },
}

impl std::fmt::Display for SequenceIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceIssue::MissingPattern { sequence, number } => {
                write!(f, "sequence {} references missing pattern {}", sequence, number)
            }
            SequenceIssue::IdOutOfRange { sequence } => {
                write!(f, "sequence id {} is outside 1..={}", sequence, SEQUENCE_COUNT)
            }
            SequenceIssue::CategoryMismatch { sequence, number } => {
                write!(f, "sequence {} contains pattern {} from another category", sequence, number)
            }
        }
    }
}

pub fn check_sequences(language: &PatternLanguage) -> Vec<SequenceIssue> {
    let known: BTreeSet<u16> = language.patterns.iter().map(|p| p.number).collect();
    let mut issues = Vec::new();

    for sequence in &language.sequences {
        if !(1..=SEQUENCE_COUNT).contains(&sequence.id) {
            issues.push(SequenceIssue::IdOutOfRange {
                sequence: sequence.id,
            });
        }
        let range = sequence.category.range();
        for &number in &sequence.patterns {
            if !known.contains(&number) {
                issues.push(SequenceIssue::MissingPattern {
                    sequence: sequence.id,
                    number,
                });
            }
            if !range.contains(&number) {
                issues.push(SequenceIssue::CategoryMismatch {
                    sequence: sequence.id,
                    number,
                });
            }
        }
    }

    issues
}
