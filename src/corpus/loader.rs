//! Corpus discovery and loading
//!
//! Finds the numbered pattern pages in a directory (`apl012.md`, `apl12.htm`)
//! and extracts each one. Files are parsed in parallel; the result is always
//! ordered by pattern number so repeated runs produce identical output.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use glob::Pattern as GlobPattern;
use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::types::{Pattern, PATTERN_COUNT};
use crate::error::Result;
use crate::extract::{extract, ExtractedPattern, SourceFormat};

static PATTERN_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^apl(\d+)\.(md|htm|html)$").unwrap());

static MARKDOWN_GLOB: LazyLock<GlobPattern> = LazyLock::new(|| GlobPattern::new("apl*.md").unwrap());

static HTML_GLOB: LazyLock<GlobPattern> = LazyLock::new(|| GlobPattern::new("apl*.htm*").unwrap());

/// Markdown page for a pattern number (`apl012.md`)
pub fn markdown_path(dir: &Path, number: u16) -> PathBuf {
    dir.join(format!("apl{:03}.md", number))
}

/// Legacy HTML page for a pattern number (`apl12.htm`)
pub fn html_path(dir: &Path, number: u16) -> PathBuf {
    dir.join(format!("apl{}.htm", number))
}

/// UIA page for a sequence position (`12610120.md` for 12)
pub fn uia_path(dir: &Path, sequence: u16) -> PathBuf {
    dir.join(format!("1261{:03}0.md", sequence))
}

/// Pattern number encoded in a page file name
pub fn number_from_file_name(name: &str) -> Option<u16> {
    PATTERN_FILE
        .captures(name)
        .and_then(|caps| caps[1].parse().ok())
}

/// Numbered pattern pages of one format in `dir`, sorted by file name.
/// The glob selects the format, the file name must carry a pattern number.
pub fn find_pattern_files(dir: &Path, format: SourceFormat) -> Vec<PathBuf> {
    let matcher: &GlobPattern = match format {
        SourceFormat::Markdown => &*MARKDOWN_GLOB,
        SourceFormat::Html => &*HTML_GLOB,
    };

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            matcher.matches(&name) && PATTERN_FILE.is_match(&name)
        })
        .map(|e| e.into_path())
        .collect();

    files.sort();
    files
}

/// Result of loading a directory of pattern pages
#[derive(Debug, Default)]
pub struct LoadedCorpus {
    /// Extracted pages, ordered by pattern number
    pub documents: Vec<(PathBuf, ExtractedPattern)>,
    /// Pages that were skipped: unreadable, untitled or duplicate numbers
    pub skipped: Vec<PathBuf>,
}

impl LoadedCorpus {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Convert the extracted pages into corpus records
    pub fn into_patterns(self) -> Vec<Pattern> {
        self.documents
            .into_iter()
            .map(|(_, extracted)| extracted.into_pattern())
            .collect()
    }
}

/// Load and extract every pattern page of one format in `dir`
pub fn load_corpus(dir: &Path, format: SourceFormat) -> Result<LoadedCorpus> {
    if !dir.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("pattern directory not found: {}", dir.display()),
        )
        .into());
    }

    let files = find_pattern_files(dir, format);
    debug!(dir = %dir.display(), files = files.len(), "discovered pattern files");

    let results: Vec<(PathBuf, Option<ExtractedPattern>)> = files
        .par_iter()
        .map(|path| {
            let extracted = match fs::read_to_string(path) {
                Ok(content) => extract(&content, format),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not read pattern file");
                    None
                }
            };
            (path.clone(), extracted)
        })
        .collect();

    let mut corpus = LoadedCorpus::default();
    let mut parsed = Vec::new();
    for (path, extracted) in results {
        match extracted {
            Some(pattern) => parsed.push((path, pattern)),
            None => {
                warn!(path = %path.display(), "no pattern title found, skipping");
                corpus.skipped.push(path);
            }
        }
    }

    parsed.sort_by(|(a_path, a), (b_path, b)| a.number.cmp(&b.number).then(a_path.cmp(b_path)));

    let mut seen = HashSet::new();
    for (path, pattern) in parsed {
        if !(1..=PATTERN_COUNT).contains(&pattern.number) {
            warn!(path = %path.display(), number = pattern.number, "pattern number out of range, skipping");
            corpus.skipped.push(path);
        } else if seen.insert(pattern.number) {
            corpus.documents.push((path, pattern));
        } else {
            warn!(path = %path.display(), number = pattern.number, "duplicate pattern number, skipping");
            corpus.skipped.push(path);
        }
    }

    info!(
        loaded = corpus.documents.len(),
        skipped = corpus.skipped.len(),
        "loaded pattern corpus"
    );
    Ok(corpus)
}

/// Load the markdown pages in `dir` as corpus records
pub fn load_markdown_corpus(dir: &Path) -> Result<LoadedCorpus> {
    load_corpus(dir, SourceFormat::Markdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_paths() {
        let dir = Path::new("markdown/apl");
        assert_eq!(markdown_path(dir, 7), dir.join("apl007.md"));
        assert_eq!(html_path(Path::new("apl"), 7), Path::new("apl").join("apl7.htm"));
        assert_eq!(uia_path(dir, 12), dir.join("12610120.md"));
        assert_eq!(number_from_file_name("apl012.md"), Some(12));
        assert_eq!(number_from_file_name("apl_index.md"), None);
    }

    #[test]
    fn test_load_sorts_and_skips() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        write(dir, "apl002.md", "# 2 - THE DISTRIBUTION OF TOWNS\n");
        write(dir, "apl001.md", "# 1 - INDEPENDENT REGIONS**\n");
        write(dir, "apl003.md", "no title in this one\n");
        write(dir, "apl_index.md", "# 4 - NOT A PATTERN PAGE\n");
        write(dir, "notes.txt", "# 5 - IGNORED\n");

        let corpus = load_markdown_corpus(dir).unwrap();
        let numbers: Vec<u16> = corpus.documents.iter().map(|(_, p)| p.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(corpus.skipped, vec![dir.join("apl003.md")]);

        let patterns = corpus.into_patterns();
        assert_eq!(patterns[0].id, "apl1");
        assert_eq!(patterns[0].asterisks, 2);
    }

    #[test]
    fn test_find_pattern_files_by_format() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        write(dir, "apl005.md", "");
        write(dir, "apl5.htm", "");
        write(dir, "apl6.html", "");
        write(dir, "apl_notes.md", "");
        write(dir, "apl7.md.bak", "");

        assert_eq!(
            find_pattern_files(dir, SourceFormat::Markdown),
            vec![dir.join("apl005.md")]
        );
        assert_eq!(
            find_pattern_files(dir, SourceFormat::Html),
            vec![dir.join("apl5.htm"), dir.join("apl6.html")]
        );
    }

    #[test]
    fn test_out_of_range_numbers_skipped() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        write(dir, "apl001.md", "# 1 - INDEPENDENT REGIONS\n");
        write(dir, "apl000.md", "# 0 - THE LANGUAGE\n");
        write(dir, "apl300.md", "# 300 - BEYOND THE BOOK\n");

        let corpus = load_markdown_corpus(dir).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.documents[0].1.number, 1);
        assert_eq!(corpus.skipped, vec![dir.join("apl000.md"), dir.join("apl300.md")]);
    }

    #[test]
    fn test_duplicate_numbers_keep_first() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        write(dir, "apl001.md", "# 1 - INDEPENDENT REGIONS\n");
        write(dir, "apl01.md", "# 1 - COPY\n");

        let corpus = load_markdown_corpus(dir).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.documents[0].1.title, "INDEPENDENT REGIONS");
        assert_eq!(corpus.skipped.len(), 1);
    }

    #[test]
    fn test_missing_directory() {
        assert!(load_markdown_corpus(Path::new("/nonexistent/patterns")).is_err());
    }
}
