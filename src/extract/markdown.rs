//! Markdown Extractor
//!
//! Two heading layouts are in circulation:
//!
//! ```text
//! # 12 - COMMUNITY OF 7000            # Pattern: 12 - COMMUNITY OF 7000
//! ## Problem                          ## Narrower:
//! ## Discussion                       ## Problem:
//! ## Related Patterns                 ## Solution:
//!                                     ## Broader:
//!                                     ### Related Patterns
//! ```
//!
//! The legacy layout puts the problem and solution statements together under
//! `## Problem`; the restructured layout gives each its own bold section.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::restructure::{extract_narrower_context, split_problem_and_solution};
use super::ExtractedPattern;
use crate::corpus::{MAX_ASTERISKS, PATTERN_COUNT};

/// `# 1 - INDEPENDENT REGIONS**` or `# Pattern: 1 - INDEPENDENT REGIONS`
static TITLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^#\s+(?:Pattern:\s*)?(\d+)\s*-\s*(.+?)\s*$").unwrap()
});

/// `# 12610010 - Independent domains`
static UIA_TITLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s+(\d+)\s+-\s+(.+)$").unwrap());

/// Section heading, level 2 or 3, optional trailing colon
static HEADING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{2,3}\s*(.+?)\s*:?\s*$").unwrap());

/// `[apl012](apl012.md)` style links and `(12)` references, in document order
static REFERENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"apl0*(\d{1,3})\b|\((\d{1,3})\)").unwrap());

/// Raw sections of one markdown pattern page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSections {
    pub number: u16,
    pub name: String,
    pub asterisks: u8,
    /// Text between the title and the first section heading
    pub preamble: String,
    pub problem_section: String,
    pub solution_section: String,
    pub discussion_section: String,
    pub related_section: String,
    pub narrower_section: String,
    pub broader_section: String,
}

impl PatternSections {
    /// Whether the page already uses the `## Narrower:` / `## Solution:` layout
    pub fn is_restructured(&self) -> bool {
        !self.narrower_section.is_empty()
            || !self.solution_section.is_empty()
            || !self.broader_section.is_empty()
    }

    /// Problem, solution and discussion of a legacy-layout page.
    ///
    /// The solution comes from the text after the problem statement, else
    /// from the lead paragraph under the title. When the lead paragraph is
    /// the solution and no Discussion section exists, the Problem section
    /// body is the discussion.
    pub fn legacy_statements(&self) -> (String, String, String) {
        let (problem, solution) = split_problem_and_solution(&self.problem_section);
        if !solution.is_empty() || self.preamble.is_empty() {
            return (problem, solution, self.discussion_section.clone());
        }

        if self.discussion_section.is_empty() {
            (String::new(), self.preamble.clone(), self.problem_section.clone())
        } else {
            (problem, self.preamble.clone(), self.discussion_section.clone())
        }
    }

    /// Solution section of a restructured page, else the lead paragraph
    pub fn restructured_solution(&self) -> &str {
        if self.solution_section.is_empty() {
            &self.preamble
        } else {
            &self.solution_section
        }
    }
}

/// Split a page into its title and named sections.
/// Returns `None` when no numbered title is present.
pub fn parse_sections(content: &str) -> Option<PatternSections> {
    let title = TITLE_PATTERN.captures(content)?;
    let number = title[1].parse::<u16>().ok()?;
    let (name, asterisks) = split_title(&title[2]);

    let mut sections = PatternSections {
        number,
        name,
        asterisks,
        ..Default::default()
    };

    let (preamble, named) = split_sections(content);
    sections.preamble = preamble;

    for (heading, body) in named {
        let slot = match heading.to_lowercase().as_str() {
            "problem" => &mut sections.problem_section,
            "solution" => &mut sections.solution_section,
            "discussion" => &mut sections.discussion_section,
            "related patterns" => &mut sections.related_section,
            "narrower" => &mut sections.narrower_section,
            "broader" => &mut sections.broader_section,
            _ => continue,
        };
        if slot.is_empty() {
            *slot = body;
        }
    }

    Some(sections)
}

/// Extract a pattern from a markdown page
pub fn extract_markdown(content: &str) -> Option<ExtractedPattern> {
    let sections = parse_sections(content)?;
    let related = related_numbers(&sections.related_section);

    let extracted = if sections.is_restructured() {
        let (problem, details) = split_problem_and_solution(&sections.problem_section);
        let (solution, _) = split_problem_and_solution(sections.restructured_solution());
        let discussion = if sections.discussion_section.is_empty() {
            details
        } else {
            sections.discussion_section.clone()
        };
        ExtractedPattern {
            number: sections.number,
            title: sections.name,
            asterisks: sections.asterisks,
            problem: strip_bold(&problem),
            solution: strip_bold(&solution),
            discussion,
            narrower: sections.narrower_section,
            broader: sections.broader_section,
            related,
        }
    } else {
        let (problem, solution, discussion) = sections.legacy_statements();
        let (narrower, _) = extract_narrower_context(&discussion);
        ExtractedPattern {
            number: sections.number,
            title: sections.name,
            asterisks: sections.asterisks,
            problem: strip_bold(&problem),
            solution: strip_bold(&solution),
            discussion,
            narrower,
            broader: String::new(),
            related,
        }
    };

    Some(extracted)
}

/// Parse a UIA page heading into its identifier and name
pub fn parse_uia_heading(content: &str) -> Option<(String, String)> {
    let first_line = content.lines().next()?.trim();
    let caps = UIA_TITLE_PATTERN.captures(first_line)?;
    Some((caps[1].to_string(), caps[2].trim().to_string()))
}

/// Separate trailing confidence asterisks from a title.
/// A fully bold title (`**NAME**`) carries no confidence marker.
fn split_title(raw: &str) -> (String, u8) {
    let raw = raw.trim();
    if raw.len() > 4 && raw.starts_with("**") && raw.ends_with("**") {
        return (raw[2..raw.len() - 2].trim().to_string(), 0);
    }

    let name = raw.trim_end_matches('*');
    let stars = (raw.len() - name.len()).min(MAX_ASTERISKS as usize) as u8;
    (name.trim().to_string(), stars)
}

/// Walk the page line by line, pairing each heading with its body.
/// A body runs to the next heading; trailing `---` rules are dropped.
/// Returns the untitled lead text and the named sections.
fn split_sections(content: &str) -> (String, Vec<(String, String)>) {
    let mut preamble = Vec::new();
    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in content.lines() {
        if let Some(caps) = HEADING_PATTERN.captures(line) {
            if let Some((heading, body)) = current.take() {
                sections.push((heading, finish_body(&body)));
            }
            current = Some((caps[1].to_string(), Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        } else if !TITLE_PATTERN.is_match(line) {
            preamble.push(line);
        }
    }

    if let Some((heading, body)) = current {
        sections.push((heading, finish_body(&body)));
    }

    (finish_body(&preamble), sections)
}

fn finish_body(lines: &[&str]) -> String {
    let mut body = lines.join("\n").trim().to_string();
    while let Some(rest) = body.strip_suffix("---") {
        body = rest.trim_end().to_string();
    }
    body
}

fn strip_bold(text: &str) -> String {
    text.replace("**", "").trim().to_string()
}

/// Pattern numbers referenced in a related-patterns section, first mention order
pub fn related_numbers(section: &str) -> Vec<u16> {
    let mut seen = HashSet::new();
    REFERENCE_PATTERN
        .captures_iter(section)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .filter_map(|m| m.as_str().parse::<u16>().ok())
        .filter(|n| (1..=PATTERN_COUNT).contains(n))
        .filter(|n| seen.insert(*n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = "# 3 - CITY COUNTRY FINGERS**

## Problem

**Continuous sprawling urbanization destroys life, and makes cities unbearable.**

Keep interlocking fingers of farmland and urban land.

## Discussion

. . . this pattern helps to shape INDEPENDENT REGIONS (1).

The fingers should be narrow.

## Related Patterns

- [apl001](apl001.md) INDEPENDENT REGIONS
- [apl004](apl004.md) AGRICULTURAL VALLEYS
- MOSAIC OF SUBCULTURES (8)
";

    const RESTRUCTURED: &str = "# Pattern: 12 - COMMUNITY OF 7000

## Narrower:

. . . the community is embedded in MOSAIC OF SUBCULTURES (8).

## Problem:

**Individuals have no effective voice in any community of more than 5000-10,000 persons.**

Background on local government.

## Solution:

**Decentralize city governments.**

## Broader:

Give each community a TOWN HALL (44).

---

### Related Patterns

- [apl044](apl044.md)
";

    #[test]
    fn test_legacy_layout() {
        let pattern = extract_markdown(LEGACY).unwrap();
        assert_eq!(pattern.number, 3);
        assert_eq!(pattern.title, "CITY COUNTRY FINGERS");
        assert_eq!(pattern.asterisks, 2);
        assert_eq!(
            pattern.problem,
            "Continuous sprawling urbanization destroys life, and makes cities unbearable."
        );
        assert_eq!(pattern.solution, "Keep interlocking fingers of farmland and urban land.");
        assert!(pattern.discussion.ends_with("The fingers should be narrow."));
        assert_eq!(pattern.narrower, "this pattern helps to shape INDEPENDENT REGIONS (1).");
        assert_eq!(pattern.related, vec![1, 4, 8]);
    }

    #[test]
    fn test_restructured_layout() {
        let pattern = extract_markdown(RESTRUCTURED).unwrap();
        assert_eq!(pattern.number, 12);
        assert_eq!(pattern.asterisks, 0);
        assert!(pattern.problem.starts_with("Individuals have no effective voice"));
        assert_eq!(pattern.solution, "Decentralize city governments.");
        assert_eq!(pattern.discussion, "Background on local government.");
        assert_eq!(pattern.broader, "Give each community a TOWN HALL (44).");
        assert_eq!(pattern.related, vec![44]);
    }

    #[test]
    fn test_sections_stop_at_next_heading() {
        let sections = parse_sections(RESTRUCTURED).unwrap();
        assert!(sections.is_restructured());
        assert!(!sections.broader_section.contains("---"));
        assert!(!sections.problem_section.contains("Decentralize"));
    }

    #[test]
    fn test_fully_bold_title() {
        let sections = parse_sections("# 7 - **THE COUNTRYSIDE**\n").unwrap();
        assert_eq!(sections.name, "THE COUNTRYSIDE");
        assert_eq!(sections.asterisks, 0);
        assert!(!sections.is_restructured());
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let pattern = extract_markdown("# 9 - SCATTERED WORK\n").unwrap();
        assert_eq!(pattern.problem, "");
        assert_eq!(pattern.solution, "");
        assert_eq!(pattern.discussion, "");
        assert!(pattern.related.is_empty());
    }

    #[test]
    fn test_lead_paragraph_is_solution() {
        let page = "# 7 - THE COUNTRYSIDE\n\nTreat the countryside as a commons.\n\n## Discussion\n\nLong argument.\n";
        let pattern = extract_markdown(page).unwrap();
        assert_eq!(pattern.solution, "Treat the countryside as a commons.");
        assert_eq!(pattern.problem, "");
        assert_eq!(pattern.discussion, "Long argument.");
    }

    #[test]
    fn test_lead_paragraph_with_problem_section_only() {
        let page = "# 16 - WEB OF PUBLIC TRANSPORTATION\n\n**Treat the web as a whole.**\n\n## Problem\n\nTransport is fragmented.\n";
        let pattern = extract_markdown(page).unwrap();
        assert_eq!(pattern.solution, "Treat the web as a whole.");
        assert_eq!(pattern.discussion, "Transport is fragmented.");

        let sections = parse_sections(page).unwrap();
        assert_eq!(sections.preamble, "**Treat the web as a whole.**");
        assert!(!sections.is_restructured());
    }

    #[test]
    fn test_missing_title() {
        assert!(extract_markdown("## Problem\n\nNo title here.\n").is_none());
    }

    #[test]
    fn test_related_numbers_filters_range() {
        assert_eq!(related_numbers("(0) (254) apl253 (12) apl012"), vec![253, 12]);
    }

    #[test]
    fn test_parse_uia_heading() {
        assert_eq!(
            parse_uia_heading("# 12610010 - Independent domains\n\nBody"),
            Some(("12610010".to_string(), "Independent domains".to_string()))
        );
        assert_eq!(parse_uia_heading("Independent domains"), None);
    }
}
