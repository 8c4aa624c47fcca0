//! Markdown rendering
//!
//! Pattern pages, sequence pages and the pattern index are rendered from
//! Handlebars templates embedded at compile time. Templates only lay text
//! out; every derived value is computed here into a typed context first.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use handlebars::Handlebars;
use serde::{Deserialize, Serialize};

use crate::corpus::{Category, Pattern, PatternHierarchies, PatternLanguage, Sequence};
use crate::error::Result;
use crate::extract::{ExtractedPattern, RestructuredPattern};
use crate::sequences::LanguageTable;

const LEGACY_TEMPLATE: &str = "legacy-pattern";
const RESTRUCTURED_TEMPLATE: &str = "restructured-pattern";
const SEQUENCE_TEMPLATE: &str = "sequence";
const INDEX_TEMPLATE: &str = "index";

const TEMPLATES: [(&str, &str); 4] = [
    (LEGACY_TEMPLATE, include_str!("../../templates/legacy-pattern.md.hbs")),
    (RESTRUCTURED_TEMPLATE, include_str!("../../templates/restructured-pattern.md.hbs")),
    (SEQUENCE_TEMPLATE, include_str!("../../templates/sequence.md.hbs")),
    (INDEX_TEMPLATE, include_str!("../../templates/index.md.hbs")),
];

/// Filler for patterns absent from the corpus
pub const MISSING_DETAILS: &str = "Pattern details not available.";

/// Domain placeholder used by archetypal pattern templates
const DOMAIN_PLACEHOLDER: &str = "{{domains}}";

/// Longest problem excerpt shown in a sequence's algorithm list
const EXCERPT_CHARS: usize = 200;

/// Markdown file name of a pattern page
pub fn page_file_name(number: u16) -> String {
    format!("apl{:03}.md", number)
}

/// File name of a rendered sequence page
pub fn sequence_file_name(id: u16) -> String {
    format!("sequence_{:02}.md", id)
}

// ============================================================================
// Template contexts
// ============================================================================

#[derive(Serialize)]
struct LegacyPage<'a> {
    number: u16,
    title: String,
    problem: &'a str,
    solution: &'a str,
    discussion: &'a str,
    related: &'a str,
}

#[derive(Serialize)]
struct SequenceEntry {
    position: usize,
    number: u16,
    file: String,
    title: String,
    problem: String,
    excerpt: String,
    solution: String,
}

#[derive(Serialize)]
struct SequencePage<'a> {
    id: u16,
    heading: &'a str,
    description: &'a str,
    category: &'static str,
    scale: &'a str,
    focus: &'a str,
    purpose: &'a str,
    role: &'a str,
    pattern_list: String,
    pattern_count: usize,
    plural: bool,
    emergent_phenomena: &'a str,
    patterns: Vec<SequenceEntry>,
    first_title: String,
    last_title: String,
    category_role: &'static str,
    size_label: &'static str,
    position: usize,
    total: usize,
    scope: &'static str,
    previous: Option<u16>,
    next: Option<u16>,
    cross_link: Option<String>,
}

#[derive(Serialize)]
struct IndexRow<'a> {
    number: u16,
    name: &'a str,
    file: String,
    category: &'static str,
    asterisks: String,
}

#[derive(Serialize)]
struct IndexCategory<'a> {
    name: &'static str,
    start: u16,
    end: u16,
    description: &'a str,
    sequence_ids: String,
    file: String,
}

#[derive(Serialize)]
struct IndexSequence<'a> {
    id: u16,
    heading: &'a str,
    category: &'static str,
    pattern_list: String,
    emergent_phenomena: &'a str,
}

/// Archetypal pattern file listed in the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchetypeSummary {
    pub count: usize,
    /// Link target, the file name as given
    pub file: String,
}

#[derive(Deserialize)]
struct ArchetypeFile {
    #[serde(default)]
    patterns: Vec<serde_json::Value>,
}

impl ArchetypeSummary {
    /// Count the records of an `archetypal_patterns.json` file
    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let data: ArchetypeFile = serde_json::from_reader(reader)?;
        Ok(Self {
            count: data.patterns.len(),
            file: path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
        })
    }
}

#[derive(Serialize)]
struct IndexPage<'a> {
    meta_name: &'a str,
    meta_asterisks: String,
    rows: Vec<IndexRow<'a>>,
    categories: Vec<IndexCategory<'a>>,
    sequence_count: usize,
    sequences: Vec<IndexSequence<'a>>,
    hierarchies: &'a PatternHierarchies,
    two_star_count: usize,
    one_star_count: usize,
    no_star_count: usize,
    archetypes: Option<&'a ArchetypeSummary>,
    placeholder: &'static str,
}

// ============================================================================
// Renderer
// ============================================================================

/// Template registry with every page template loaded
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        for (name, source) in TEMPLATES {
            registry.register_template_string(name, source)?;
        }
        Ok(Self { registry })
    }

    /// Legacy page completed from its HTML source, titled in upper case.
    /// `related` is the existing related-patterns block, heading included,
    /// kept verbatim.
    pub fn render_legacy_page(&self, pattern: &ExtractedPattern, related: &str) -> Result<String> {
        let page = LegacyPage {
            number: pattern.number,
            title: pattern.title.to_uppercase(),
            problem: &pattern.problem,
            solution: &pattern.solution,
            discussion: &pattern.discussion,
            related: related.trim(),
        };
        Ok(self.registry.render(LEGACY_TEMPLATE, &page)?)
    }

    /// Page in the Narrower / Problem / Solution / Broader layout
    pub fn render_restructured(&self, pattern: &RestructuredPattern) -> Result<String> {
        Ok(self.registry.render(RESTRUCTURED_TEMPLATE, pattern)?)
    }

    /// Overview page of one sequence
    pub fn render_sequence(
        &self,
        table: &LanguageTable,
        language: &PatternLanguage,
        sequence: &Sequence,
    ) -> Result<String> {
        let text = table.category_text(sequence.category);

        let siblings: Vec<&Sequence> = language
            .sequences
            .iter()
            .filter(|s| s.category == sequence.category)
            .collect();
        let position = siblings
            .iter()
            .position(|s| s.id == sequence.id)
            .map_or(1, |i| i + 1);
        let total = siblings.len().max(1);

        let patterns: Vec<SequenceEntry> = sequence
            .patterns
            .iter()
            .enumerate()
            .map(|(i, &number)| sequence_entry(i + 1, number, language.find_by_number(number)))
            .collect();

        let previous = sequence
            .id
            .checked_sub(1)
            .and_then(|id| language.sequence(id));
        let next = sequence
            .id
            .checked_add(1)
            .and_then(|id| language.sequence(id));

        let page = SequencePage {
            id: sequence.id,
            heading: &sequence.heading,
            description: &sequence.description,
            category: sequence.category.as_str(),
            scale: text.map_or("", |t| t.scale.as_str()),
            focus: text.map_or("", |t| t.focus.as_str()),
            purpose: text.map_or("", |t| t.purpose.as_str()),
            role: text.map_or("", |t| t.role.as_str()),
            pattern_list: join_numbers(&sequence.patterns),
            pattern_count: patterns.len(),
            plural: patterns.len() != 1,
            emergent_phenomena: &sequence.emergent_phenomena,
            first_title: patterns.first().map(|p| p.title.to_lowercase()).unwrap_or_default(),
            last_title: patterns.last().map(|p| p.title.to_lowercase()).unwrap_or_default(),
            patterns,
            category_role: category_role(sequence.category, position, total),
            size_label: size_label(sequence.patterns.len()),
            position,
            total,
            scope: scope(position, total),
            previous: previous.map(|s| s.id),
            next: next.map(|s| s.id),
            cross_link: cross_link(sequence, previous, next),
        };

        Ok(self.registry.render(SEQUENCE_TEMPLATE, &page)?)
    }

    /// Reference index of all patterns, categories and sequences
    pub fn render_index(&self, language: &PatternLanguage) -> Result<String> {
        self.render_index_with_archetypes(language, None)
    }

    /// Index with an archetypal patterns section when `archetypes` is given
    pub fn render_index_with_archetypes(
        &self,
        language: &PatternLanguage,
        archetypes: Option<&ArchetypeSummary>,
    ) -> Result<String> {
        let mut patterns: Vec<&Pattern> = language.patterns.iter().collect();
        patterns.sort_by_key(|p| p.number);

        let rows = patterns
            .iter()
            .map(|p| IndexRow {
                number: p.number,
                name: &p.name,
                file: page_file_name(p.number),
                category: p.category().map_or("", |c| c.as_str()),
                asterisks: "*".repeat(p.asterisks as usize),
            })
            .collect();

        let categories = Category::ALL
            .iter()
            .map(|&category| {
                let entry = language.category(category);
                let ids: Vec<u16> = language
                    .sequences
                    .iter()
                    .filter(|s| s.category == category)
                    .map(|s| s.id)
                    .collect();
                let range = category.pattern_range();
                IndexCategory {
                    name: category.as_str(),
                    start: range.start,
                    end: range.end,
                    description: entry.map_or("", |e| e.description.as_str()),
                    sequence_ids: id_span(&ids),
                    file: category.file_name(),
                }
            })
            .collect();

        let sequences = language
            .sequences
            .iter()
            .map(|s| IndexSequence {
                id: s.id,
                heading: &s.heading,
                category: s.category.as_str(),
                pattern_list: join_numbers(&s.patterns),
                emergent_phenomena: &s.emergent_phenomena,
            })
            .collect();

        let stars = |n: u8| patterns.iter().filter(|p| p.asterisks == n).count();
        let page = IndexPage {
            meta_name: &language.meta_pattern.name,
            meta_asterisks: "*".repeat(language.meta_pattern.asterisks as usize),
            rows,
            categories,
            sequence_count: language.sequences.len(),
            sequences,
            hierarchies: &language.usage_instructions.pattern_hierarchies,
            two_star_count: stars(2),
            one_star_count: stars(1),
            no_star_count: stars(0),
            archetypes,
            placeholder: DOMAIN_PLACEHOLDER,
        };

        Ok(self.registry.render(INDEX_TEMPLATE, &page)?)
    }
}

fn sequence_entry(position: usize, number: u16, pattern: Option<&Pattern>) -> SequenceEntry {
    let (title, problem, solution) = match pattern {
        Some(p) => (
            p.name.clone(),
            non_empty_or(&p.problem, MISSING_DETAILS),
            non_empty_or(&p.solution, MISSING_DETAILS),
        ),
        None => (
            format!("Pattern {}", number),
            MISSING_DETAILS.to_string(),
            MISSING_DETAILS.to_string(),
        ),
    };

    SequenceEntry {
        position,
        number,
        file: page_file_name(number),
        excerpt: excerpt(&problem),
        title,
        problem,
        solution,
    }
}

fn non_empty_or(text: &str, fallback: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}

fn join_numbers(numbers: &[u16]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `1-15` for a contiguous run, a comma list otherwise
fn id_span(ids: &[u16]) -> String {
    match (ids.first(), ids.last()) {
        (Some(first), Some(last))
            if ids.len() > 1
                && last.checked_sub(*first).map(usize::from) == Some(ids.len() - 1)
                && ids.windows(2).all(|w| w[0] < w[1]) =>
        {
            format!("{}-{}", first, last)
        }
        _ => join_numbers(ids),
    }
}

fn size_label(count: usize) -> &'static str {
    match count {
        0..=3 => "a focused intervention",
        4..=7 => "a moderate-scale transformation",
        _ => "a comprehensive design process",
    }
}

/// Thirds of the category's sequence list
fn scope(position: usize, total: usize) -> &'static str {
    if position * 3 <= total {
        "Foundational"
    } else if position * 3 <= total * 2 {
        "Developmental"
    } else {
        "Refinement"
    }
}

fn category_role(category: Category, position: usize, total: usize) -> &'static str {
    match (category, scope(position, total)) {
        (Category::Towns, "Foundational") => {
            "This early sequence establishes fundamental regional and urban structure."
        }
        (Category::Towns, "Developmental") => {
            "This mid-level sequence shapes neighborhoods and communities."
        }
        (Category::Towns, _) => "This later sequence details public spaces and local amenities.",
        (Category::Buildings, "Foundational") => {
            "This sequence addresses building arrangement and overall form."
        }
        (Category::Buildings, "Developmental") => {
            "This sequence shapes internal spatial organization."
        }
        (Category::Buildings, _) => "This sequence refines building details and character.",
        (Category::Construction, "Foundational") | (Category::Construction, "Developmental") => {
            "This sequence establishes structural framework and approach."
        }
        (Category::Construction, _) => "This sequence addresses construction details and finishes.",
    }
}

/// Note for sequences sitting on a category boundary
fn cross_link(
    sequence: &Sequence,
    previous: Option<&Sequence>,
    next: Option<&Sequence>,
) -> Option<String> {
    if let Some(next) = next.filter(|n| n.category != sequence.category) {
        return Some(format!(
            "**Cross-Category**: Transitions from {} to {} (Sequence {})",
            sequence.category, next.category, next.id
        ));
    }
    previous
        .filter(|p| p.category != sequence.category)
        .map(|p| {
            format!(
                "**Cross-Category**: Builds upon {} patterns (Sequence {})",
                p.category, p.id
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequences::build_language;

    fn language() -> (LanguageTable, PatternLanguage) {
        let table = LanguageTable::builtin().unwrap();
        let mut first = Pattern::new(1, "INDEPENDENT REGIONS");
        first.asterisks = 2;
        first.problem = "Metropolitan regions will not come to balance until each one is small and autonomous enough to be an independent sphere of culture.".to_string();
        first.solution = "Wherever possible, work toward the evolution of independent regions in the world.".to_string();
        let patterns = vec![first, Pattern::new(2, "THE DISTRIBUTION OF TOWNS")];
        let (language, _) = build_language(&table, patterns).unwrap();
        (table, language)
    }

    #[test]
    fn test_restructured_page_round_trips_layout() {
        let pattern = RestructuredPattern {
            number: 1,
            name: "INDEPENDENT REGIONS".to_string(),
            asterisks: "**".to_string(),
            narrower: "This pattern helps to complete the larger patterns in which it is embedded.".to_string(),
            problem: "Metropolitan regions will not come to balance.".to_string(),
            problem_discussion: "Details of the argument.".to_string(),
            solution: "Work toward independent regions.".to_string(),
            broader: "Use THE DISTRIBUTION OF TOWNS (2).".to_string(),
            related: "- [2 - THE DISTRIBUTION OF TOWNS](apl002.md)".to_string(),
        };
        let page = Renderer::new().unwrap().render_restructured(&pattern).unwrap();

        assert!(page.starts_with("# Pattern: 1 - INDEPENDENT REGIONS**\n"));
        assert!(page.contains("## Problem:\n\n**Metropolitan regions will not come to balance.**"));
        assert!(page.contains("## Solution:\n\n**Work toward independent regions.**"));
        assert!(page.contains("### Related Patterns\n\n- [2 - THE DISTRIBUTION OF TOWNS](apl002.md)"));
        assert!(crate::validate::validate_structure(&page).is_valid());
    }

    #[test]
    fn test_legacy_page() {
        let pattern = ExtractedPattern {
            number: 12,
            title: "Community of 7000".to_string(),
            problem: "Individuals have no effective voice.".to_string(),
            solution: "Decentralize city governments.".to_string(),
            discussion: "A long argument.".to_string(),
            ..Default::default()
        };
        let related = "## Related Patterns\n\n- [13 - SUBCULTURE BOUNDARY](apl013.md)\n";
        let page = Renderer::new()
            .unwrap()
            .render_legacy_page(&pattern, related)
            .unwrap();

        assert!(page.starts_with("# 12 - COMMUNITY OF 7000\n\n## Problem\n\nIndividuals have no effective voice."));
        assert!(page.contains("Decentralize city governments."));
        assert!(page.contains("## Discussion\n\nA long argument."));
        assert!(page.trim_end().ends_with("- [13 - SUBCULTURE BOUNDARY](apl013.md)"));
    }

    #[test]
    fn test_sequence_page() {
        let (table, language) = language();
        let renderer = Renderer::new().unwrap();
        let sequence = language.sequence(1).unwrap();
        let page = renderer.render_sequence(&table, &language, sequence).unwrap();

        assert!(page.starts_with("# Sequence 1: "));
        assert!(page.contains("- **Category**: Towns"));
        assert!(page.contains("1. **Pattern 1: INDEPENDENT REGIONS**"));
        assert!(page.contains("[Pattern 1: INDEPENDENT REGIONS](../apl/apl001.md)"));
        assert!(page.contains("a focused intervention"));
        assert!(page.contains("- **Position**: 1 of 15 sequences in Towns category"));
        assert!(page.contains("- **Scope**: Foundational patterns"));
        assert!(page.contains("**Next Sequence (2)**"));
        assert!(!page.contains("**Previous Sequence"));
        assert!(page.contains("This sequence establishes constraints and context for Buildings patterns"));
    }

    #[test]
    fn test_sequence_page_fills_missing_patterns() {
        let (table, language) = language();
        let renderer = Renderer::new().unwrap();
        let sequence = language.sequence(16).unwrap();
        let page = renderer.render_sequence(&table, &language, sequence).unwrap();

        assert!(page.contains(MISSING_DETAILS));
        assert!(page.contains("**Cross-Category**: Builds upon Towns patterns (Sequence 15)"));
        assert!(page.contains("This sequence bridges between Towns and Construction"));
    }

    #[test]
    fn test_index_page() {
        let (_, language) = language();
        let page = Renderer::new().unwrap().render_index(&language).unwrap();

        assert!(page.starts_with("# Pattern Index: Complete Reference"));
        assert!(page.contains("| 1 | [INDEPENDENT REGIONS](markdown/apl/apl001.md) | Towns | ** |"));
        assert!(page.contains("#### Towns (Patterns 1-94)"));
        assert!(page.contains("**Sequences**: 1-15"));
        assert!(page.contains("[View all Buildings patterns](category_buildings.json)"));
        assert!(page.contains("#### Sequence 36: "));
    }

    #[test]
    fn test_index_archetype_section() {
        let (_, language) = language();
        let renderer = Renderer::new().unwrap();
        assert!(!renderer.render_index(&language).unwrap().contains("### Archetypal Patterns"));

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("archetypal_patterns.json");
        std::fs::write(
            &path,
            r#"{"patterns": [{"pattern_id": "apl1"}, {"pattern_id": "apl2"}, {"pattern_id": "apl3"}]}"#,
        )
        .unwrap();
        let summary = ArchetypeSummary::load(&path).unwrap();
        assert_eq!(summary.count, 3);

        let page = renderer
            .render_index_with_archetypes(&language, Some(&summary))
            .unwrap();
        assert!(page.contains("**Total**: 3 archetypal patterns with domain transformations"));
        assert!(page.contains("placeholders like `{{domains}}`"));
        assert!(page.contains("[View archetypal patterns](archetypal_patterns.json)"));
    }

    #[test]
    fn test_index_with_unordered_sequence_ids() {
        let mut table = LanguageTable::builtin().unwrap();
        table.sequences[..15].reverse();
        let (language, _) = build_language(&table, vec![Pattern::new(1, "INDEPENDENT REGIONS")]).unwrap();

        let page = Renderer::new().unwrap().render_index(&language).unwrap();
        assert!(page.contains("**Sequences**: 15, 14, 13"));
        assert!(page.contains("**Sequences**: 16-28"));
    }

    #[test]
    fn test_sequence_page_with_last_possible_id() {
        let (table, mut language) = language();
        let mut last = language.sequences[0].clone();
        last.id = u16::MAX;
        language.sequences.push(last.clone());

        let page = Renderer::new()
            .unwrap()
            .render_sequence(&table, &language, &last)
            .unwrap();
        assert!(page.starts_with(&format!("# Sequence {}: ", u16::MAX)));
        assert!(!page.contains("**Next Sequence"));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(page_file_name(7), "apl007.md");
        assert_eq!(sequence_file_name(3), "sequence_03.md");
        assert_eq!(id_span(&[16, 17, 18]), "16-18");
        assert_eq!(id_span(&[1, 3]), "1, 3");
        assert_eq!(id_span(&[3, 2, 1]), "3, 2, 1");
        assert_eq!(id_span(&[1, 1, 3]), "1, 1, 3");
        assert_eq!(scope(1, 15), "Foundational");
        assert_eq!(scope(8, 15), "Developmental");
        assert_eq!(scope(15, 15), "Refinement");
        assert_eq!(size_label(9), "a comprehensive design process");
        assert!(excerpt(&"x".repeat(250)).ends_with("..."));
    }
}
