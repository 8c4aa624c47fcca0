//! Implements `patlang salience`, `patlang gestalt` and `patlang emergence`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use console::style;

use crate::salience::{PatternContext, SalienceEngine};

/// Options shared by the scoring commands
#[derive(Debug, Clone)]
pub struct ScoreOptions {
    /// Generated language document
    pub corpus: PathBuf,
    /// Output as JSON
    pub json: bool,
}

/// Scoring subcommand types
#[derive(Debug, Clone)]
pub enum ScoreSubcommand {
    Salience {
        focus: Vec<String>,
        category: Option<String>,
        keywords: Vec<String>,
        domain: Option<String>,
        limit: usize,
    },
    Gestalt {
        ids: Vec<String>,
        threshold: f64,
    },
    Emergence {
        ids: Vec<String>,
    },
}

/// Parse a gestalt similarity threshold, accepting only finite values in 0..=1
pub fn parse_threshold(s: &str) -> std::result::Result<f64, String> {
    let threshold: f64 = s.trim().parse().map_err(|_| format!("`{}` is not a number", s))?;
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(format!("threshold must be between 0 and 1, got {}", s))
    }
}

/// Execute a scoring command
pub fn execute_score(options: ScoreOptions, subcommand: ScoreSubcommand) -> Result<()> {
    if let ScoreSubcommand::Gestalt { threshold, .. } = &subcommand {
        if !(0.0..=1.0).contains(threshold) {
            bail!("Gestalt threshold must be between 0 and 1, got {}", threshold);
        }
    }

    let engine = SalienceEngine::load(&options.corpus).with_context(|| {
        format!(
            "Failed to load {} (run `patlang generate` first)",
            options.corpus.display()
        )
    })?;

    match subcommand {
        ScoreSubcommand::Salience {
            focus,
            category,
            keywords,
            domain,
            limit,
        } => {
            let mut context = PatternContext {
                domain,
                ..PatternContext::default()
            }
            .with_focus(focus)
            .with_keywords(keywords);
            if let Some(category) = category {
                context = context.with_category(category);
            }
            salience(&engine, &context, limit, options.json)
        }
        ScoreSubcommand::Gestalt { ids, threshold } => {
            check_ids(&engine, &ids);
            gestalt(&engine, &ids, threshold, options.json)
        }
        ScoreSubcommand::Emergence { ids } => {
            check_ids(&engine, &ids);
            emergence(&engine, &ids, options.json)
        }
    }
}

/// Exit on the first id missing from the corpus
fn check_ids(engine: &SalienceEngine, ids: &[String]) {
    if let Some(unknown) = ids.iter().find(|id| !engine.contains(id)) {
        eprintln!("{} Unknown pattern: {}", style("✗").red(), unknown);
        std::process::exit(1);
    }
}

fn name_of<'a>(engine: &'a SalienceEngine, id: &str) -> &'a str {
    engine.get(id).map_or("", |p| p.name.as_str())
}

fn salience(engine: &SalienceEngine, context: &PatternContext, limit: usize, json: bool) -> Result<()> {
    let scores = engine.rank_patterns_by_salience(context, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&scores)?);
        return Ok(());
    }

    if scores.is_empty() {
        println!("{} No pattern scored above zero", style("⚠").yellow());
        return Ok(());
    }

    for (rank, score) in scores.iter().enumerate() {
        println!(
            "{:>3}. {:<8} {:>6.2}  {}",
            rank + 1,
            score.pattern_id,
            score.score,
            style(name_of(engine, &score.pattern_id)).bold()
        );
        for reason in &score.reasons {
            println!("              {}", style(reason).dim());
        }
    }
    Ok(())
}

fn gestalt(engine: &SalienceEngine, ids: &[String], threshold: f64, json: bool) -> Result<()> {
    let clusters = engine.detect_gestalt_patterns(ids, threshold);

    if json {
        println!("{}", serde_json::to_string_pretty(&clusters)?);
        return Ok(());
    }

    println!(
        "{} {} gestalt clusters at threshold {:.2}",
        style("→").cyan(),
        clusters.len(),
        threshold
    );
    for (i, cluster) in clusters.iter().enumerate() {
        println!(
            "\n  Cluster {} ({} patterns, coherence {:.3})",
            i + 1,
            cluster.size,
            cluster.coherence
        );
        for id in &cluster.patterns {
            println!("    {:<8} {}", id, name_of(engine, id));
        }
    }
    Ok(())
}

fn emergence(engine: &SalienceEngine, ids: &[String], json: bool) -> Result<()> {
    let report = engine.track_emergence(ids);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let marker = if report.emergence_detected {
        style("✓").green()
    } else {
        style("✗").red()
    };
    println!("{} {}", marker, report.interpretation);
    println!("  Emergence score:    {:.3}", report.emergence_score);
    println!("  Sequence coherence: {:.3}", report.sequence_coherence);
    println!("  Categories:         {}", report.categories_involved.join(", "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("0.6"), Ok(0.6));
        assert_eq!(parse_threshold("0"), Ok(0.0));
        assert_eq!(parse_threshold("1"), Ok(1.0));
        assert!(parse_threshold("1.5").is_err());
        assert!(parse_threshold("-0.1").is_err());
        assert!(parse_threshold("NaN").is_err());
        assert!(parse_threshold("high").is_err());
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let options = ScoreOptions {
            corpus: PathBuf::from("does-not-exist.json"),
            json: true,
        };
        let err = execute_score(
            options,
            ScoreSubcommand::Gestalt {
                ids: vec!["apl1".to_string(), "apl2".to_string()],
                threshold: f64::NAN,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("between 0 and 1"));
    }
}
