//! HTML Extractor
//!
//! Reads the legacy HTML pattern pages. The markup convention is:
//! the page `<TITLE>` holds "<number> <name>", the bold problem and
//! solution statements are `h3` headings (or `span class=h3class`) on
//! either side of a `Therefore:` marker, and the discussion sits between
//! `threedots.jpg` divider images, in `h6` blocks or plain paragraphs.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{first_capture, ExtractedPattern};

/// Page title: `<TITLE>12 Community of 7000</TITLE>`
static TITLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<TITLE>\s*(\d+)\s+([^<]+)</TITLE>").unwrap());

/// Problem statement candidates, most specific first
static PROBLEM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?is)<h3[^>]*>([^<]*)</h3>.*?<h3[^>]*>Therefore:</h3>").unwrap(),
        Regex::new(r"(?is)<span class=h3class>([^<]*)</span>.*?<span class=h3class>Therefore:</span>")
            .unwrap(),
        Regex::new(r"(?is)<b>([^<]*)</b>.*?<b>Therefore:</b>").unwrap(),
    ]
});

/// Solution statement candidates; the body may contain simple inline tags
static SOLUTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(
            r"(?is)<h3[^>]*>Therefore:</h3>\s*<[^>]*>\s*<h3[^>]*>([^<]+(?:<[^>]+>[^<]*</[^>]+>[^<]*)*)</h3>",
        )
        .unwrap(),
        Regex::new(
            r"(?is)<span class=h3class>Therefore:</span>.*?<span class=h3class>([^<]+(?:<[^>]+>[^<]*</[^>]+>[^<]*)*)</span>",
        )
        .unwrap(),
        Regex::new(r"(?is)<b>Therefore:</b>.*?<b>([^<]+)</b>").unwrap(),
    ]
});

/// Section divider image
static DOTS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<IMG SRC="[^"]*threedots\.jpg"[^>]*>"#).unwrap());

/// Copyright footer that closes the page body
static FOOTER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<div align="center">\s*<h4><I>A Pattern Language</i>"#).unwrap()
});

static PARAGRAPH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<P[^>]*>(.*?)</P>").unwrap());

static H6_SPAN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<span class=h6class>(.*?)</span>").unwrap());

/// A "(12)" style pattern reference
static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(\d+\)").unwrap());

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static SQUARED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<SUP>\s*2\s*</SUP>").unwrap());

static SUP_OPEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<SUP>").unwrap());

static ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

static WHITESPACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Footer text that leaks into discussion blocks
const FOOTER_PREFIX: &str = "A Pattern Language";

/// Extract a pattern from a legacy HTML page.
/// Returns `None` when the page has no numbered title.
pub fn extract_html(content: &str) -> Option<ExtractedPattern> {
    let title = TITLE_PATTERN.captures(content)?;
    let number = title[1].parse::<u16>().ok()?;
    let name = clean_html_text(&title[2]);

    Some(ExtractedPattern {
        number,
        title: name,
        problem: first_capture(&PROBLEM_PATTERNS, content, clean_html_text),
        solution: first_capture(&SOLUTION_PATTERNS, content, clean_html_text),
        discussion: extract_discussion(content),
        ..Default::default()
    })
}

/// Remove tags, decode entities and collapse whitespace
pub fn clean_html_text(text: &str) -> String {
    let text = SQUARED_PATTERN.replace_all(text, "²");
    let text = SUP_OPEN_PATTERN.replace_all(&text, "^");
    let text = TAG_PATTERN.replace_all(&text, "");
    let text = decode_entities(&text);
    WHITESPACE_PATTERN.replace_all(&text, " ").trim().to_string()
}

fn decode_entities(text: &str) -> String {
    ENTITY_PATTERN
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(entity)
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "nbsp" => ' ',
        "quot" => '"',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "apos" => '\'',
        "mdash" => '—',
        "ndash" => '–',
        "hellip" => '…',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "eacute" => 'é',
        _ => return None,
    })
}

/// Collected discussion paragraphs, skipping text already covered
#[derive(Default)]
struct DiscussionParts(Vec<String>);

impl DiscussionParts {
    fn push(&mut self, text: String) {
        self.0.push(text);
    }

    fn push_unique(&mut self, text: String) {
        let seen = self
            .0
            .iter()
            .any(|part| part.contains(text.as_str()) || text.contains(part.as_str()));
        if !seen {
            self.0.push(text);
        }
    }

    fn join(self) -> String {
        self.0.join("\n\n")
    }
}

fn is_body_text(text: &str, min_chars: usize) -> bool {
    !text.is_empty() && text.chars().count() > min_chars && !text.starts_with(FOOTER_PREFIX)
}

/// Whether the last 30 characters carry a pattern reference,
/// which marks the closing "smaller patterns" paragraph
fn ends_with_reference(text: &str) -> bool {
    let start = text
        .char_indices()
        .rev()
        .nth(29)
        .map(|(i, _)| i)
        .unwrap_or(0);
    REFERENCE_PATTERN.is_match(&text[start..])
}

fn extract_discussion(content: &str) -> String {
    let dividers: Vec<_> = DOTS_PATTERN.find_iter(content).collect();
    let Some(first) = dividers.first() else {
        return String::new();
    };

    let start = first.end();
    let section = if dividers.len() > 1 {
        &content[start..dividers[dividers.len() - 1].start()]
    } else if let Some(footer) = FOOTER_PATTERN.find(&content[start..]) {
        &content[start..start + footer.start()]
    } else {
        &content[start..]
    };

    let mut parts = DiscussionParts::default();
    let h6_start = section.find("<h6>");

    // h6 block, which is often left unclosed
    if let Some(pos) = h6_start {
        let h6_content = &section[pos + "<h6>".len()..];
        let h6_text = match h6_content.find("</h6>") {
            Some(end) => &h6_content[..end],
            None => h6_content,
        };

        for caps in PARAGRAPH_PATTERN.captures_iter(h6_text) {
            let text = clean_html_text(&caps[1]);
            if is_body_text(&text, 10) && !ends_with_reference(&text) {
                parts.push(text);
            }
        }

        for loose in PARAGRAPH_PATTERN.split(h6_text) {
            let text = clean_html_text(loose);
            if is_body_text(&text, 20) {
                parts.push_unique(text);
            }
        }
    }

    for caps in H6_SPAN_PATTERN.captures_iter(section) {
        let text = clean_html_text(&caps[1]);
        if is_body_text(&text, 10) {
            parts.push_unique(text);
        }
    }

    // Plain paragraphs ahead of any h6 block
    let before_h6 = match h6_start {
        Some(pos) => &section[..pos],
        None => section,
    };
    for caps in PARAGRAPH_PATTERN.captures_iter(before_h6) {
        let text = clean_html_text(&caps[1]);
        if is_body_text(&text, 10) {
            parts.push_unique(text);
        }
    }

    // Text sitting between tags outside any paragraph
    let loose = PARAGRAPH_PATTERN.replace_all(before_h6, "");
    let text = clean_html_text(&loose);
    if text.chars().count() > 20 {
        parts.push_unique(text);
    }

    parts.join()
}
