//! Implements `patlang restructure`: rewrites pattern pages into the
//! Narrower / Problem / Solution / Broader layout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;
use tracing::{debug, warn};

use super::output::print_diff;
use crate::corpus::{find_pattern_files, number_from_file_name};
use crate::extract::{parse_sections, restructure, SourceFormat};
use crate::render::Renderer;
use crate::validate::validate_structure;

/// Options for the restructure command
#[derive(Debug, Clone)]
pub struct RestructureOptions {
    pub markdown_dir: PathBuf,
    /// Restrict to these pattern numbers
    pub numbers: Vec<u16>,
    /// Print diffs instead of writing
    pub dry_run: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RestructureSummary {
    pub rewritten: usize,
    pub unchanged: usize,
    pub skipped: Vec<PathBuf>,
    /// Rewritten pages that still fail the layout checks
    pub invalid: Vec<PathBuf>,
}

/// Execute the restructure command
pub fn execute_restructure(options: RestructureOptions) -> Result<()> {
    let summary = restructure_pages(&options)?;

    let verb = if options.dry_run { "Would restructure" } else { "Restructured" };
    println!("{} {} {} patterns", style("✓").green(), verb, summary.rewritten);
    if summary.unchanged > 0 {
        println!("  Already restructured: {}", summary.unchanged);
    }
    if !summary.skipped.is_empty() {
        println!("{} Skipped {} pages without a title:", style("⚠").yellow(), summary.skipped.len());
        for path in &summary.skipped {
            println!("    {}", path.display());
        }
    }
    if !summary.invalid.is_empty() {
        eprintln!(
            "{} {} pages do not match the restructured layout:",
            style("✗").red(),
            summary.invalid.len()
        );
        for path in &summary.invalid {
            eprintln!("    {}", path.display());
        }
    }

    Ok(())
}

/// Restructure every selected page, writing unless `dry_run` is set
pub fn restructure_pages(options: &RestructureOptions) -> Result<RestructureSummary> {
    let renderer = Renderer::new()?;
    let mut summary = RestructureSummary::default();

    for path in find_pattern_files(&options.markdown_dir, SourceFormat::Markdown) {
        let number = path
            .file_name()
            .and_then(|n| number_from_file_name(&n.to_string_lossy()));
        if !options.numbers.is_empty() && !number.is_some_and(|n| options.numbers.contains(&n)) {
            continue;
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let Some(sections) = parse_sections(&content) else {
            warn!(path = %path.display(), "no pattern title, skipping");
            summary.skipped.push(path);
            continue;
        };

        let page = renderer.render_restructured(&restructure(&sections))?;
        if page == content {
            summary.unchanged += 1;
            continue;
        }
        if !validate_structure(&page).is_valid() {
            summary.invalid.push(path.clone());
        }

        if options.dry_run {
            print_diff(&path, &content, &page);
        } else {
            std::fs::write(&path, &page)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            debug!(path = %path.display(), "restructured page");
        }
        summary.rewritten += 1;
    }

    Ok(summary)
}
