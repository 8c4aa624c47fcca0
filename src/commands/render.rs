//! Implements `patlang render`: the pattern index and one page per sequence.

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;

use super::output::load_language;
use crate::render::{sequence_file_name, ArchetypeSummary, Renderer};
use crate::sequences::LanguageTable;

/// Options for the render command
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Generated language document
    pub corpus: PathBuf,
    /// Replacement sequence table
    pub language_file: Option<PathBuf>,
}

/// Render subcommand types
#[derive(Debug, Clone)]
pub enum RenderSubcommand {
    Index {
        output: PathBuf,
        /// `archetypal_patterns.json` to summarize in the index
        archetypes: Option<PathBuf>,
    },
    Sequences { output_dir: PathBuf },
}

/// Execute the render command
pub fn execute_render(options: RenderOptions, subcommand: RenderSubcommand) -> Result<()> {
    let language = load_language(&options.corpus)?;
    let renderer = Renderer::new()?;

    match subcommand {
        RenderSubcommand::Index { output, archetypes } => {
            let archetypes = archetypes
                .map(|path| {
                    ArchetypeSummary::load(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))
                })
                .transpose()?;
            let page = renderer.render_index_with_archetypes(&language, archetypes.as_ref())?;
            std::fs::write(&output, page)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("{} Index written to {}", style("✓").green(), output.display());
        }
        RenderSubcommand::Sequences { output_dir } => {
            let table = LanguageTable::load_or_builtin(options.language_file.as_deref())
                .context("Failed to load sequence table")?;
            std::fs::create_dir_all(&output_dir)?;

            for sequence in &language.sequences {
                let page = renderer.render_sequence(&table, &language, sequence)?;
                let path = output_dir.join(sequence_file_name(sequence.id));
                std::fs::write(&path, page)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            println!(
                "{} {} sequence pages written to {}",
                style("✓").green(),
                language.sequences.len(),
                output_dir.display()
            );
        }
    }

    Ok(())
}
