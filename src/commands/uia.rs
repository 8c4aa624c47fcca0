//! Implements `patlang uia`: lists the UIA pages by sequence position.

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::corpus::write_pretty_json;
use crate::sequences::uia_pattern_list;

/// Options for the uia command
#[derive(Debug, Clone)]
pub struct UiaOptions {
    pub uia_dir: PathBuf,
    pub output: PathBuf,
}

/// Execute the uia command
pub fn execute_uia(options: UiaOptions) -> Result<()> {
    let list = uia_pattern_list(&options.uia_dir);

    if list.entries.is_empty() {
        eprintln!(
            "{} No UIA pages found in {}",
            style("✗").red(),
            options.uia_dir.display()
        );
        std::process::exit(1);
    }

    write_pretty_json(&options.output, &list.entries)?;
    println!(
        "{} Wrote {} entries to {}",
        style("✓").green(),
        list.entries.len(),
        options.output.display()
    );
    if !list.missing.is_empty() {
        println!(
            "{} {} positions have no page or heading",
            style("⚠").yellow(),
            list.missing.len()
        );
    }

    Ok(())
}
