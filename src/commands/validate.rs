//! Implements `patlang validate`: page layout, corpus integrity and schema
//! checks. Exits with status 1 when a check fails.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;

use super::output::load_language;
use crate::corpus::find_pattern_files;
use crate::extract::SourceFormat;
use crate::schema::{self, SCHEMA_TYPES};
use crate::validate::{check_coverage, check_sequences, validate_structure};

/// Validate subcommand types
#[derive(Debug, Clone)]
pub enum ValidateSubcommand {
    /// A page, or every page in a directory, against the restructured layout
    Structure { path: PathBuf },
    /// Number coverage and sequence integrity of a generated language file
    Corpus { file: PathBuf },
    /// A generated JSON file against its schema
    Schema {
        file: PathBuf,
        schema_type: Option<String>,
    },
}

/// Execute the validate command
pub fn execute_validate(subcommand: ValidateSubcommand) -> Result<()> {
    let ok = match subcommand {
        ValidateSubcommand::Structure { path } => validate_pages(&path)?,
        ValidateSubcommand::Corpus { file } => validate_corpus(&file)?,
        ValidateSubcommand::Schema { file, schema_type } => {
            validate_schema(&file, schema_type.as_deref())?
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn validate_pages(path: &Path) -> Result<bool> {
    let pages = if path.is_dir() {
        find_pattern_files(path, SourceFormat::Markdown)
    } else {
        vec![path.to_path_buf()]
    };

    let mut failed = 0;
    for page in &pages {
        let content = std::fs::read_to_string(page)
            .with_context(|| format!("Failed to read {}", page.display()))?;
        let report = validate_structure(&content);
        if !report.is_valid() {
            failed += 1;
            println!("{} {}", style("✗").red(), page.display());
            for check in report.missing() {
                println!("    {}", check);
            }
        }
    }

    if failed == 0 {
        println!(
            "{} {} pages match the restructured layout",
            style("✓").green(),
            pages.len()
        );
    } else {
        println!(
            "\n{} {} of {} pages failed",
            style("✗").red(),
            failed,
            pages.len()
        );
    }
    Ok(failed == 0)
}

fn validate_corpus(file: &Path) -> Result<bool> {
    // Loading enforces the record invariants
    let language = match load_language(file) {
        Ok(language) => language,
        Err(e) => {
            println!("{} {:#}", style("✗").red(), e);
            return Ok(false);
        }
    };
    let mut ok = true;

    let coverage = check_coverage(&language.patterns);
    if coverage.is_complete() {
        println!(
            "{} All {} patterns present exactly once",
            style("✓").green(),
            coverage.present
        );
    } else {
        ok = false;
        println!("{} Pattern coverage incomplete", style("✗").red());
        if !coverage.missing.is_empty() {
            println!("    missing: {}", join(&coverage.missing));
        }
        if !coverage.duplicates.is_empty() {
            println!("    duplicates: {}", join(&coverage.duplicates));
        }
        if !coverage.out_of_range.is_empty() {
            println!("    out of range: {}", join(&coverage.out_of_range));
        }
    }

    let issues = check_sequences(&language);
    if issues.is_empty() {
        println!(
            "{} {} sequences reference known patterns",
            style("✓").green(),
            language.sequences.len()
        );
    } else {
        ok = false;
        println!("{} {} sequence issues", style("✗").red(), issues.len());
        for issue in &issues {
            println!("    {}", issue);
        }
    }

    Ok(ok)
}

fn validate_schema(file: &Path, schema_type: Option<&str>) -> Result<bool> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let filename = file.to_string_lossy();

    let Some(schema_type) = schema_type.or_else(|| schema::detect_schema_type(&filename)) else {
        eprintln!(
            "{} Unknown file type. Pass --type with one of: {}",
            style("✗").red(),
            SCHEMA_TYPES.join(", ")
        );
        return Ok(false);
    };

    match schema::validate_by_type(&content, schema_type) {
        Ok(()) => {
            println!(
                "{} {} file is valid",
                style("✓").green(),
                schema_type.to_uppercase()
            );
            Ok(true)
        }
        Err(e) => {
            eprintln!("{} {}", style("✗").red(), e);
            Ok(false)
        }
    }
}

fn join(numbers: &[u16]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
