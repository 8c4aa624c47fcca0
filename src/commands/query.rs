//! Implements `patlang show`, `patlang list` and `patlang search` over the
//! generated language document.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use console::style;

use super::output::{load_language, pattern_line};
use crate::corpus::{Category, Pattern, PatternLanguage};

/// Options shared by the query commands
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Generated language document
    pub corpus: PathBuf,
    /// Output as JSON
    pub json: bool,
}

/// Query subcommand types
#[derive(Debug, Clone)]
pub enum QuerySubcommand {
    Show { number: u16 },
    List { category: Option<Category> },
    Search { query: String },
}

/// Execute a query command
pub fn execute_query(options: QueryOptions, subcommand: QuerySubcommand) -> Result<()> {
    let language = load_language(&options.corpus)?;

    match subcommand {
        QuerySubcommand::Show { number } => show_pattern(&language, number, options.json),
        QuerySubcommand::List { category } => list_patterns(&language, category, options.json),
        QuerySubcommand::Search { query } => search(&language, &query, options.json),
    }
}

fn show_pattern(language: &PatternLanguage, number: u16, json: bool) -> Result<()> {
    let pattern = language
        .find_by_number(number)
        .ok_or_else(|| anyhow!("Pattern {} not found", number))?;

    if json {
        println!("{}", serde_json::to_string_pretty(pattern)?);
        return Ok(());
    }

    let stars = "*".repeat(pattern.asterisks as usize);
    println!(
        "{} {}",
        style(format!("{} - {}", pattern.number, pattern.name)).bold(),
        style(stars).yellow()
    );
    println!("{}", "=".repeat(60));
    if let Some(category) = pattern.category() {
        println!("Category: {}", category);
    }

    if !pattern.problem.is_empty() {
        println!("\n{}", style("Problem").bold());
        println!("  {}", pattern.problem);
    }
    if !pattern.solution.is_empty() {
        println!("\n{}", style("Solution").bold());
        println!("  {}", pattern.solution);
    }

    print_links(language, "Preceded by", &pattern.preceding_patterns);
    print_links(language, "Followed by", &pattern.following_patterns);

    let sequences = language.sequences_containing(pattern.number);
    if !sequences.is_empty() {
        println!("\n{}", style("Sequences").bold());
        for sequence in sequences {
            println!("  {}: {}", sequence.id, sequence.heading);
        }
    }

    Ok(())
}

fn print_links(language: &PatternLanguage, label: &str, numbers: &[u16]) {
    if numbers.is_empty() {
        return;
    }
    println!("\n{}", style(label).bold());
    for &number in numbers {
        match language.find_by_number(number) {
            Some(p) => println!("{}", pattern_line(p)),
            None => println!("  {:>3}: {}", number, style("(not loaded)").dim()),
        }
    }
}

fn list_patterns(language: &PatternLanguage, category: Option<Category>, json: bool) -> Result<()> {
    let patterns: Vec<&Pattern> = language
        .patterns
        .iter()
        .filter(|p| category.is_none_or(|c| p.category() == Some(c)))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&patterns)?);
        return Ok(());
    }

    println!("Found {} patterns:\n", patterns.len());
    for pattern in patterns {
        println!("{}", pattern_line(pattern));
    }
    Ok(())
}

/// Case-insensitive substring match over name, problem and solution
pub fn matches_query(pattern: &Pattern, query: &str) -> bool {
    let needle = query.to_lowercase();
    [&pattern.name, &pattern.problem, &pattern.solution]
        .iter()
        .any(|text| text.to_lowercase().contains(&needle))
}

fn search(language: &PatternLanguage, query: &str, json: bool) -> Result<()> {
    let results: Vec<&Pattern> = language
        .patterns
        .iter()
        .filter(|p| matches_query(p, query))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("Found {} patterns matching '{}':\n", results.len(), query);
    for pattern in results {
        println!("{}", pattern_line(pattern));
    }
    Ok(())
}
