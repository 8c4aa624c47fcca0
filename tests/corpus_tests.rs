//! End-to-end corpus tests
//!
//! Build a full corpus from generated markdown pages and check the
//! properties the toolkit guarantees.

use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use patlang::corpus::{load_markdown_corpus, PATTERN_COUNT};
use patlang::schema::{detect_schema_type, validate_by_type};
use patlang::sequences::{write_outputs, LANGUAGE_FILE};
use patlang::{
    build_language, check_coverage, check_sequences, extract_markdown, LanguageTable,
    PatternContext, PatternLanguage, SalienceEngine,
};

// =============================================================================
// Fixtures
// =============================================================================

fn write_pages(dir: &Path) {
    for number in 1..=PATTERN_COUNT {
        let stars = "*".repeat((number % 3) as usize);
        let page = format!(
            "# {number} - PATTERN {number}{stars}\n\n## Problem\n\n**Problem statement {number}.**\n\nSolution statement {number}.\n\n## Discussion\n\nDiscussion of pattern {number}.\n"
        );
        std::fs::write(dir.join(format!("apl{:03}.md", number)), page).unwrap();
    }
}

fn build_corpus() -> (TempDir, PatternLanguage) {
    let dir = TempDir::new().unwrap();
    write_pages(dir.path());
    let corpus = load_markdown_corpus(dir.path()).unwrap();
    let table = LanguageTable::builtin().unwrap();
    let (language, _) = build_language(&table, corpus.into_patterns()).unwrap();
    (dir, language)
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Extraction
// =============================================================================

#[test]
fn test_extraction_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write_pages(dir.path());

    let page = std::fs::read_to_string(dir.path().join("apl012.md")).unwrap();
    assert_eq!(extract_markdown(&page), extract_markdown(&page));

    let first = load_markdown_corpus(dir.path()).unwrap().into_patterns();
    let second = load_markdown_corpus(dir.path()).unwrap().into_patterns();
    assert_eq!(first, second);
}

#[test]
fn test_untitled_pages_are_skipped() {
    let dir = TempDir::new().unwrap();
    write_pages(dir.path());
    std::fs::write(dir.path().join("apl254.md"), "no title\n").unwrap();

    let corpus = load_markdown_corpus(dir.path()).unwrap();
    assert_eq!(corpus.len(), PATTERN_COUNT as usize);
    assert_eq!(corpus.skipped.len(), 1);
}

// =============================================================================
// Coverage and relationships
// =============================================================================

#[test]
fn test_total_pattern_coverage() {
    let (_dir, language) = build_corpus();
    let report = check_coverage(&language.patterns);
    assert!(report.is_complete());
    assert_eq!(report.present, 253);

    let twelve = language.find_by_number(12).unwrap();
    assert_eq!(twelve.name, "PATTERN 12");
    assert_eq!(twelve.asterisks, 0);
    assert_eq!(twelve.problem, "Problem statement 12.");
    assert_eq!(twelve.solution, "Solution statement 12.");
    assert_eq!(language.find_by_number(13).unwrap().asterisks, 1);
}

#[test]
fn test_sequence_path_invariant() {
    let (_dir, language) = build_corpus();
    assert!(check_sequences(&language).is_empty());

    for sequence in &language.sequences {
        for pair in sequence.patterns.windows(2) {
            let first = language.find_by_number(pair[0]).unwrap();
            let second = language.find_by_number(pair[1]).unwrap();
            assert!(
                first.following_patterns.contains(&pair[1]),
                "sequence {}: {} should precede {}",
                sequence.id,
                pair[0],
                pair[1]
            );
            assert!(second.preceding_patterns.contains(&pair[0]));
        }
    }
}

#[test]
fn test_outputs_round_trip_and_match_schemas() {
    let (_dir, language) = build_corpus();
    let out = TempDir::new().unwrap();
    let written = write_outputs(&language, out.path()).unwrap();
    assert_eq!(written.len(), 5);

    for path in &written {
        let name = path.file_name().unwrap().to_string_lossy();
        let kind = detect_schema_type(&name).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        validate_by_type(&content, kind).unwrap();
    }

    let reloaded = PatternLanguage::from_json(out.path().join(LANGUAGE_FILE)).unwrap();
    assert_eq!(reloaded, language);
}

// =============================================================================
// Scoring
// =============================================================================

#[test]
fn test_focus_never_lowers_salience() {
    let (_dir, language) = build_corpus();
    let engine = SalienceEngine::new(language.patterns.clone());
    let base = PatternContext::default()
        .with_category("Towns")
        .with_keywords(["statement"]);

    for pattern in language.patterns.iter().step_by(7) {
        let without = engine.compute_salience(&pattern.id, &base);
        let focused = base.clone().with_focus([pattern.id.clone()]);
        let with = engine.compute_salience(&pattern.id, &focused);
        assert!(with.score >= without.score, "{}", pattern.id);
        assert!(with.score - without.score > 10.0 - 1e-9);
    }
}

#[test]
fn test_gestalt_cluster_size_bound() {
    let (_dir, language) = build_corpus();
    let engine = SalienceEngine::new(language.patterns);
    let candidates = ids(&["apl2", "apl3", "apl4", "apl5", "apl95", "apl96", "apl205"]);

    for threshold in [0.0, 0.3, 0.6, 0.9] {
        for cluster in engine.detect_gestalt_patterns(&candidates, threshold) {
            assert!(cluster.size >= 2);
            assert!(cluster.size <= candidates.len());
            assert_eq!(cluster.size, cluster.patterns.len());
        }
    }
}

#[test]
fn test_emergence_over_connected_towns() {
    let (_dir, language) = build_corpus();
    let engine = SalienceEngine::new(language.patterns);
    let report = engine.track_emergence(&ids(&["apl2", "apl3", "apl4"]));

    assert!(report.sequence_coherence > 0.0);
    assert_eq!(report.emergence_detected, report.sequence_coherence > 0.5);
    assert_eq!(report.categories_involved, vec!["Towns"]);
}
