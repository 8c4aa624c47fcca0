//! Implements `patlang init` for project initialization.

use std::path::PathBuf;

use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::config::{Config, CONFIG_FILE};

/// Options for the init command
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Force overwrite existing config
    pub force: bool,
    /// Skip interactive prompts
    pub yes: bool,
    /// Directory holding the HTML pages
    pub html_dir: Option<PathBuf>,
    /// Directory holding the markdown pages
    pub markdown_dir: Option<PathBuf>,
    /// Output directory for generated files
    pub output_dir: Option<PathBuf>,
}

/// Execute the init command
pub fn execute_init(options: InitOptions) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE);

    if config_path.exists() && !options.force {
        if options.yes {
            eprintln!(
                "{} Config file already exists. Use --force to overwrite.",
                style("✗").red()
            );
            std::process::exit(1);
        }

        let overwrite = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} already exists. Overwrite?", CONFIG_FILE))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("{} Keeping existing config", style("→").dim());
            return Ok(());
        }
    }

    let mut config = Config::default();
    apply_cli_options(&mut config, &options);

    config.save(&config_path)?;
    println!("{} Created {}", style("✓").green(), config_path.display());

    for (label, dir) in [
        ("HTML pages", &config.html_dir),
        ("Markdown pages", &config.markdown_dir),
    ] {
        if !dir.exists() {
            println!(
                "{} {} directory {} does not exist yet",
                style("⚠").yellow(),
                label,
                dir.display()
            );
        }
    }

    println!("\n{}", style("Next steps:").bold());
    println!(
        "  1. Run {} to fill incomplete pages from HTML",
        style("patlang complete").cyan()
    );
    println!(
        "  2. Run {} to build the JSON corpus",
        style("patlang generate").cyan()
    );
    println!(
        "  3. Run {} to query it over HTTP",
        style("patlang serve").cyan()
    );

    Ok(())
}

fn apply_cli_options(config: &mut Config, options: &InitOptions) {
    if let Some(dir) = &options.html_dir {
        config.html_dir = dir.clone();
    }
    if let Some(dir) = &options.markdown_dir {
        config.markdown_dir = dir.clone();
    }
    if let Some(dir) = &options.output_dir {
        config.output_dir = dir.clone();
    }
}
