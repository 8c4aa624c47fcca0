//! Implements `patlang complete`: fills markdown pages that have neither a
//! Problem nor a Discussion section from their legacy HTML source.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;
use tracing::{debug, warn};

use super::output::{print_diff, progress_bar};
use crate::corpus::{find_pattern_files, html_path, number_from_file_name};
use crate::extract::{extract_html, SourceFormat};
use crate::render::Renderer;

const RELATED_HEADING: &str = "## Related Patterns";

/// Options for the complete command
#[derive(Debug, Clone)]
pub struct CompleteOptions {
    pub html_dir: PathBuf,
    pub markdown_dir: PathBuf,
    /// Restrict to these pattern numbers
    pub numbers: Vec<u16>,
    /// Print diffs instead of writing
    pub dry_run: bool,
}

/// A page counts as incomplete when it has neither section
pub fn is_incomplete(content: &str) -> bool {
    !content.contains("## Problem") && !content.contains("## Discussion")
}

/// The existing related-patterns block, heading included
pub fn related_block(content: &str) -> &str {
    content
        .find(RELATED_HEADING)
        .map_or("", |pos| &content[pos..])
}

enum Outcome {
    Written,
    Failed(String),
}

/// Execute the complete command
pub fn execute_complete(options: CompleteOptions) -> Result<()> {
    let pages: Vec<(u16, PathBuf)> = find_pattern_files(&options.markdown_dir, SourceFormat::Markdown)
        .into_iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy().into_owned();
            number_from_file_name(&name).map(|n| (n, path))
        })
        .filter(|(n, _)| options.numbers.is_empty() || options.numbers.contains(n))
        .collect();

    let mut incomplete = Vec::new();
    for (number, path) in pages {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if is_incomplete(&content) {
            incomplete.push((number, path, content));
        }
    }

    println!(
        "{} Found {} incomplete patterns to process",
        style("→").cyan(),
        incomplete.len()
    );
    if incomplete.is_empty() {
        return Ok(());
    }

    let renderer = Renderer::new()?;
    let bar = (!options.dry_run).then(|| progress_bar(incomplete.len()));

    let mut completed = 0;
    let mut failures = Vec::new();
    for (number, path, content) in &incomplete {
        if let Some(bar) = &bar {
            bar.set_message(format!("apl{:03}", number));
        }
        match complete_page(&renderer, &options, *number, path, content)? {
            Outcome::Written => completed += 1,
            Outcome::Failed(reason) => {
                warn!(number, %reason, "pattern not completed");
                failures.push((*number, reason));
            }
        }
        if let Some(bar) = &bar {
            bar.inc(1);
        }
    }
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let verb = if options.dry_run { "Would complete" } else { "Completed" };
    println!("{} {}: {} patterns", style("✓").green(), verb, completed);
    if !failures.is_empty() {
        println!("{} Failed: {} patterns", style("✗").red(), failures.len());
        for (number, reason) in &failures {
            println!("    {}: {}", number, reason);
        }
    }

    Ok(())
}

fn complete_page(
    renderer: &Renderer,
    options: &CompleteOptions,
    number: u16,
    path: &Path,
    content: &str,
) -> Result<Outcome> {
    let source = html_path(&options.html_dir, number);
    let Ok(html) = std::fs::read_to_string(&source) else {
        return Ok(Outcome::Failed(format!("HTML file not found: {}", source.display())));
    };
    let Some(pattern) = extract_html(&html) else {
        return Ok(Outcome::Failed(format!(
            "no title found in {}",
            source.display()
        )));
    };

    let page = renderer.render_legacy_page(&pattern, related_block(content))?;
    debug!(number, path = %path.display(), "completed page");

    if options.dry_run {
        print_diff(path, content, &page);
    } else {
        std::fs::write(path, page)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(Outcome::Written)
}
