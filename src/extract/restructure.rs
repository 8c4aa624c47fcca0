//! Restructuring heuristics
//!
//! Alexander's prose opens with a paragraph that ties the pattern to larger
//! patterns (usually introduced by `. . .`) and closes with one that points at
//! the smaller patterns completing it. These helpers carve those passages out
//! of a legacy discussion so a page can be rewritten into the
//! Narrower / Problem / Solution / Broader layout.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::markdown::PatternSections;

/// Used when no introductory passage can be found
pub const DEFAULT_NARROWER: &str =
    "This pattern helps to complete the larger patterns in which it is embedded.";

/// Used when a legacy page states only its solution
pub const DEFAULT_PROBLEM: &str = "This pattern addresses a fundamental need in the system.";

/// Used when no concluding passage can be found
pub const DEFAULT_BROADER: &str =
    "To complete this pattern, use the related patterns listed below to implement the necessary details.";

/// Longest closing paragraph still treated as a conclusion
const MAX_CONCLUSION_CHARS: usize = 500;

/// How many trailing sentences are searched for references
const SENTENCE_WINDOW: usize = 9;

/// Leading ellipsis marker
static LEADING_DOTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.\s*\.\s*\.\s*").unwrap());

static DOTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\s*\.\s*\.").unwrap());

static PUBLISHER_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+A Pattern Language is published").unwrap());

/// An uppercase pattern name followed by its number: `TOWN HALL (44)`
static NAMED_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][A-Z\s]+\(\d+\)").unwrap());

static IMPERATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(make|give|shape|provide|arrange|build|place|use|create)\b").unwrap()
});

/// A page rewritten into the restructured layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestructuredPattern {
    pub number: u16,
    pub name: String,
    pub asterisks: String,
    pub narrower: String,
    pub problem: String,
    pub problem_discussion: String,
    pub solution: String,
    pub broader: String,
    pub related: String,
}

/// First paragraph is the problem statement; everything after it the solution
pub fn split_problem_and_solution(section: &str) -> (String, String) {
    match section.split_once("\n\n") {
        Some((first, rest)) => (first.trim().to_string(), rest.trim().to_string()),
        None => (section.trim().to_string(), String::new()),
    }
}

/// Split the introductory passage off a discussion.
/// Returns `(narrower, remaining)`; `narrower` is empty when none is found.
pub fn extract_narrower_context(discussion: &str) -> (String, String) {
    if let Some(dots) = LEADING_DOTS.find(discussion) {
        let body = &discussion[dots.end()..];
        if let Some(end) = body.find("\n\n").filter(|end| *end > 0) {
            return (
                body[..end].trim().to_string(),
                body[end..].trim().to_string(),
            );
        }
    }

    if let Some((first, rest)) = discussion.split_once("\n\n") {
        if NAMED_REFERENCE.is_match(first) {
            return (first.trim().to_string(), rest.trim().to_string());
        }
    }

    (String::new(), discussion.to_string())
}

/// Split the concluding passage off a discussion.
/// Returns `(broader, remaining)`, falling back to [`DEFAULT_BROADER`].
pub fn extract_broader_context(discussion: &str) -> (String, String) {
    if let Some(dots) = DOTS.find(discussion) {
        let tail = &discussion[dots.start()..];
        let end = PUBLISHER_NOTE
            .find(tail)
            .map(|m| m.start())
            .unwrap_or(tail.len());
        let candidate = tail[..end].trim();
        if NAMED_REFERENCE.is_match(candidate) {
            return (
                candidate.to_string(),
                discussion[..dots.start()].trim().to_string(),
            );
        }
    }

    if let Some(split) = trailing_reference_sentences(discussion) {
        return split;
    }

    let paragraphs: Vec<&str> = discussion.split("\n\n").collect();
    if let Some((last, rest)) = paragraphs.split_last() {
        if !rest.is_empty()
            && NAMED_REFERENCE.is_match(last)
            && last.chars().count() < MAX_CONCLUSION_CHARS
        {
            return (last.trim().to_string(), rest.join("\n\n").trim().to_string());
        }
    }

    (DEFAULT_BROADER.to_string(), discussion.to_string())
}

/// Walk back over the last sentences while they carry pattern references,
/// stopping early at one that uses an imperative verb
fn trailing_reference_sentences(discussion: &str) -> Option<(String, String)> {
    let sentences: Vec<&str> = discussion.split(". ").collect();
    let lower = sentences.len().saturating_sub(SENTENCE_WINDOW);
    let mut collected: Vec<&str> = Vec::new();

    for i in (lower..sentences.len()).rev() {
        let sentence = sentences[i];
        if NAMED_REFERENCE.is_match(sentence) {
            collected.insert(0, sentence);
            if IMPERATIVE.is_match(sentence) {
                return Some((
                    terminate(&collected.join(". ")),
                    terminate(&sentences[..i].join(". ")),
                ));
            }
        } else {
            if collected.is_empty() {
                return None;
            }
            return Some((
                terminate(&collected.join(". ")),
                terminate(&sentences[..=i].join(". ")),
            ));
        }
    }

    None
}

fn terminate(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() || text.ends_with('.') {
        text.to_string()
    } else {
        format!("{}.", text)
    }
}

/// Rewrite parsed sections into the restructured layout.
/// Pages already in that layout keep their sections as they are.
pub fn restructure(sections: &PatternSections) -> RestructuredPattern {
    let asterisks = "*".repeat(sections.asterisks as usize);

    if sections.is_restructured() {
        let (problem, problem_discussion) = split_problem_and_solution(&sections.problem_section);
        return RestructuredPattern {
            number: sections.number,
            name: sections.name.clone(),
            asterisks,
            narrower: non_empty_or(&sections.narrower_section, DEFAULT_NARROWER),
            problem: unbold(&problem),
            problem_discussion,
            solution: unbold(sections.restructured_solution()),
            broader: non_empty_or(&sections.broader_section, DEFAULT_BROADER),
            related: sections.related_section.clone(),
        };
    }

    let (problem, solution, discussion) = sections.legacy_statements();
    let (narrower, remaining) = extract_narrower_context(&discussion);
    let (broader, problem_discussion) = extract_broader_context(&remaining);

    RestructuredPattern {
        number: sections.number,
        name: sections.name.clone(),
        asterisks,
        narrower: non_empty_or(&narrower, DEFAULT_NARROWER),
        problem: non_empty_or(&unbold(&problem), DEFAULT_PROBLEM),
        problem_discussion,
        solution: unbold(&solution),
        broader: non_empty_or(&broader, DEFAULT_BROADER),
        related: sections.related_section.clone(),
    }
}

fn non_empty_or(text: &str, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text.trim().to_string()
    }
}

fn unbold(text: &str) -> String {
    text.replace("**", "").trim().to_string()
}
