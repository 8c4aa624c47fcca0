//! Implements `patlang generate`: builds the pattern language from the
//! markdown pages and writes the JSON outputs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;

use crate::corpus::load_markdown_corpus;
use crate::sequences::{build_language, write_outputs, LanguageTable};
use crate::validate::check_coverage;

/// Options for the generate command
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub markdown_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Replacement sequence table
    pub language_file: Option<PathBuf>,
}

/// Execute the generate command
pub fn execute_generate(options: GenerateOptions) -> Result<()> {
    println!("{} Loading pattern pages...", style("→").cyan());

    let table = LanguageTable::load_or_builtin(options.language_file.as_deref())
        .context("Failed to load sequence table")?;
    let corpus = load_markdown_corpus(&options.markdown_dir)
        .with_context(|| format!("Failed to read {}", options.markdown_dir.display()))?;

    if corpus.is_empty() {
        eprintln!(
            "{} No pattern pages found in {}",
            style("✗").red(),
            options.markdown_dir.display()
        );
        std::process::exit(1);
    }
    for path in &corpus.skipped {
        println!("{} Skipped {}", style("⚠").yellow(), path.display());
    }

    let (language, report) = build_language(&table, corpus.into_patterns())?;
    let written = write_outputs(&language, &options.output_dir)?;

    println!(
        "{} Built {} patterns in {} sequences",
        style("✓").green(),
        language.patterns.len(),
        language.sequences.len()
    );
    println!("  Relationships: {}", report.links);
    if !report.is_complete() {
        println!(
            "{} {} sequence links skipped (pattern missing from corpus)",
            style("⚠").yellow(),
            report.skipped.len()
        );
    }

    let coverage = check_coverage(&language.patterns);
    if !coverage.missing.is_empty() {
        println!(
            "{} {} pattern numbers have no page",
            style("⚠").yellow(),
            coverage.missing.len()
        );
    }

    for path in written {
        println!("{} Wrote {}", style("✓").green(), path.display());
    }

    Ok(())
}
