//! Shared terminal output for the command handlers

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use similar::{ChangeTag, TextDiff};

use crate::corpus::{Pattern, PatternLanguage};

/// Load the generated language document, naming the file on failure
pub fn load_language(path: &Path) -> Result<PatternLanguage> {
    PatternLanguage::from_json(path).with_context(|| {
        format!(
            "Failed to load {} (run `patlang generate` first)",
            path.display()
        )
    })
}

/// Print a colored unified diff of a pending rewrite
pub fn print_diff(path: &Path, old: &str, new: &str) {
    let diff = TextDiff::from_lines(old, new);
    println!("{}", style(format!("--- {}", path.display())).red());
    println!("{}", style(format!("+++ {}", path.display())).green());

    for hunk in diff.unified_diff().context_radius(2).iter_hunks() {
        println!("{}", style(hunk.header()).cyan());
        for change in hunk.iter_changes() {
            let line = change.to_string_lossy();
            let line = line.trim_end_matches('\n');
            match change.tag() {
                ChangeTag::Delete => println!("{}", style(format!("-{}", line)).red()),
                ChangeTag::Insert => println!("{}", style(format!("+{}", line)).green()),
                ChangeTag::Equal => println!(" {}", line),
            }
        }
    }
}

/// Progress bar for a batch over `len` files
pub fn progress_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    if let Ok(progress_style) =
        ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        bar.set_style(progress_style.progress_chars("=> "));
    }
    bar
}

/// `  12: COMMUNITY OF 7000 **`
pub fn pattern_line(pattern: &Pattern) -> String {
    let stars = "*".repeat(pattern.asterisks as usize);
    if stars.is_empty() {
        format!("  {:>3}: {}", pattern.number, pattern.name)
    } else {
        format!("  {:>3}: {} {}", pattern.number, pattern.name, style(stars).yellow())
    }
}
