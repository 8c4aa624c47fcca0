//! Pattern Extractor
//!
//! Converts one semi-structured source document (legacy HTML or Markdown)
//! into a normalized pattern record. Extraction is purely structural: each
//! field is located by a list of regexes tried in order, and any field that
//! cannot be found comes back as an empty string. A document without a
//! title yields `None`, which callers treat as "skip this document".

pub mod html;
pub mod markdown;
pub mod restructure;

use std::path::Path;

use serde::Serialize;

use crate::corpus::Pattern;

pub use html::{clean_html_text, extract_html};
pub use markdown::{extract_markdown, parse_sections, parse_uia_heading, PatternSections};
pub use restructure::{
    extract_broader_context, extract_narrower_context, restructure, split_problem_and_solution,
    RestructuredPattern,
};

/// Source document markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Html,
    Markdown,
}

impl SourceFormat {
    /// Detect from the file extension, falling back to sniffing the content
    pub fn detect(path: &Path, content: &str) -> SourceFormat {
        match path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .as_deref()
        {
            Some("htm") | Some("html") => SourceFormat::Html,
            Some("md") | Some("markdown") => SourceFormat::Markdown,
            _ => {
                let head: String = content.chars().take(512).collect::<String>().to_lowercase();
                if head.contains("<html") || head.contains("<title>") {
                    SourceFormat::Html
                } else {
                    SourceFormat::Markdown
                }
            }
        }
    }
}

/// Fields recovered from one source document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedPattern {
    pub number: u16,
    pub title: String,
    pub asterisks: u8,
    pub problem: String,
    pub solution: String,
    pub discussion: String,
    /// Introductory paragraph pointing at larger patterns
    pub narrower: String,
    /// Closing paragraph pointing at smaller patterns
    pub broader: String,
    /// Pattern numbers referenced from the related-patterns section
    pub related: Vec<u16>,
}

impl ExtractedPattern {
    /// Convert into a corpus record. Relationship lists stay empty; they
    /// come from the sequence table, not from the document.
    pub fn into_pattern(self) -> Pattern {
        let mut pattern = Pattern::new(self.number, self.title.to_uppercase());
        pattern.asterisks = self.asterisks;
        pattern.problem = self.problem;
        pattern.solution = self.solution;
        pattern.discussion = self.discussion;
        pattern.context = self.narrower;
        pattern
    }
}

/// Extract a document in the given format
pub fn extract(content: &str, format: SourceFormat) -> Option<ExtractedPattern> {
    match format {
        SourceFormat::Html => extract_html(content),
        SourceFormat::Markdown => extract_markdown(content),
    }
}

/// Try each regex in order and return the first non-empty cleaned capture
pub(crate) fn first_capture<F>(patterns: &[regex::Regex], content: &str, clean: F) -> String
where
    F: Fn(&str) -> String,
{
    patterns
        .iter()
        .filter_map(|re| re.captures(content))
        .filter_map(|caps| caps.get(1).map(|m| clean(m.as_str())))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(
            SourceFormat::detect(Path::new("apl/apl12.htm"), ""),
            SourceFormat::Html
        );
        assert_eq!(
            SourceFormat::detect(Path::new("markdown/apl/apl012.md"), ""),
            SourceFormat::Markdown
        );
        assert_eq!(
            SourceFormat::detect(Path::new("stdin"), "<HTML><TITLE>1 Independent Regions</TITLE>"),
            SourceFormat::Html
        );
        assert_eq!(
            SourceFormat::detect(Path::new("stdin"), "# 1 - INDEPENDENT REGIONS"),
            SourceFormat::Markdown
        );
    }

    #[test]
    fn test_into_pattern_uppercases_title() {
        let extracted = ExtractedPattern {
            number: 1,
            title: "Independent Regions".to_string(),
            asterisks: 2,
            problem: "Metropolitan regions will not come to balance".to_string(),
            ..Default::default()
        };
        let pattern = extracted.into_pattern();
        assert_eq!(pattern.id, "apl1");
        assert_eq!(pattern.name, "INDEPENDENT REGIONS");
        assert_eq!(pattern.asterisks, 2);
        assert!(pattern.preceding_patterns.is_empty());
    }
}
