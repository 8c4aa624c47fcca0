#![forbid(unsafe_code)]
//! Pattern Language command line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use patlang::commands::{
    execute_complete, execute_generate, execute_init, execute_query, execute_render,
    execute_restructure, execute_score, execute_serve, execute_uia, execute_validate,
    parse_threshold, CompleteOptions, GenerateOptions, InitOptions, QueryOptions, QuerySubcommand,
    RenderOptions, RenderSubcommand, RestructureOptions, ScoreOptions, ScoreSubcommand,
    ServeOptions, UiaOptions, ValidateSubcommand,
};
use patlang::config::CONFIG_FILE;
use patlang::sequences::UIA_LIST_FILE;
use patlang::{Category, Config};

#[derive(Parser)]
#[command(name = "patlang")]
#[command(about = "Extract, relate, score and serve the patterns of A Pattern Language")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Generated language document (defaults to the configured corpus file)
    #[arg(long, global = true, env = "PATLANG_CORPUS")]
    corpus: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,

        /// Skip interactive prompts
        #[arg(short = 'y', long)]
        yes: bool,

        /// Directory holding the HTML pages
        #[arg(long)]
        html_dir: Option<PathBuf>,

        /// Directory holding the markdown pages
        #[arg(long)]
        markdown_dir: Option<PathBuf>,

        /// Output directory for generated files
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Fill incomplete markdown pages from their HTML source
    Complete {
        /// Only these pattern numbers
        numbers: Vec<u16>,

        #[arg(long)]
        html_dir: Option<PathBuf>,

        #[arg(long)]
        markdown_dir: Option<PathBuf>,

        /// Show a diff instead of writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Rewrite pages into the Narrower / Problem / Solution / Broader layout
    Restructure {
        /// Only these pattern numbers
        numbers: Vec<u16>,

        #[arg(long)]
        markdown_dir: Option<PathBuf>,

        /// Show a diff instead of writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Build the pattern language and write the JSON files
    Generate {
        #[arg(long)]
        markdown_dir: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sequence table replacing the built-in one (JSON or YAML)
        #[arg(long)]
        language_file: Option<PathBuf>,
    },

    /// Build the UIA pattern list
    Uia {
        #[arg(long)]
        uia_dir: Option<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate pages, the corpus or a generated file
    Validate {
        #[command(subcommand)]
        target: ValidateCommands,
    },

    /// Show one pattern
    Show {
        number: u16,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List patterns
    List {
        /// Only patterns in this category
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search pattern names, problems and solutions
    Search {
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rank patterns by salience in a context
    Salience {
        /// Pattern ids in focus (apl12)
        #[arg(short, long)]
        focus: Vec<String>,

        /// Current category
        #[arg(long)]
        category: Option<String>,

        /// Keywords to match
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,

        #[arg(long)]
        domain: Option<String>,

        /// Number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Cluster patterns by similarity
    Gestalt {
        #[arg(required = true, num_args = 2..)]
        ids: Vec<String>,

        /// Similarity threshold in 0..=1
        #[arg(short, long, value_parser = parse_threshold)]
        threshold: Option<f64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Measure emergence along a sequence of patterns
    Emergence {
        #[arg(required = true)]
        ids: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render markdown pages
    Render {
        #[command(subcommand)]
        target: RenderCommands,

        /// Sequence table replacing the built-in one (JSON or YAML)
        #[arg(long)]
        language_file: Option<PathBuf>,
    },

    /// Serve the REST API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum ValidateCommands {
    /// Check pages against the restructured layout
    Structure {
        /// A page or a directory of pages
        path: Option<PathBuf>,
    },
    /// Check number coverage and sequence integrity
    Corpus {
        /// Generated language document
        file: Option<PathBuf>,
    },
    /// Check a generated JSON file against its schema
    Schema {
        file: PathBuf,

        /// Schema type (language, sequences, category, uia)
        #[arg(long = "type")]
        schema_type: Option<String>,
    },
}

#[derive(Subcommand)]
enum RenderCommands {
    /// Pattern index
    Index {
        #[arg(short, long, default_value = "PATTERN_INDEX.md")]
        output: PathBuf,

        /// Archetypal patterns file to summarize
        #[arg(long)]
        archetypes: Option<PathBuf>,
    },
    /// One page per sequence
    Sequences {
        #[arg(short, long, default_value = "markdown/sequences")]
        output: PathBuf,
    },
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse().map_err(|e: patlang::PatternError| e.to_string())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };
    let corpus = cli.corpus.clone().unwrap_or_else(|| config.corpus_path());

    match cli.command {
        Commands::Init {
            force,
            yes,
            html_dir,
            markdown_dir,
            output_dir,
        } => {
            execute_init(InitOptions {
                force,
                yes,
                html_dir,
                markdown_dir,
                output_dir,
            })?;
        }

        Commands::Complete {
            numbers,
            html_dir,
            markdown_dir,
            dry_run,
        } => {
            execute_complete(CompleteOptions {
                html_dir: html_dir.unwrap_or(config.html_dir),
                markdown_dir: markdown_dir.unwrap_or(config.markdown_dir),
                numbers,
                dry_run,
            })?;
        }

        Commands::Restructure {
            numbers,
            markdown_dir,
            dry_run,
        } => {
            execute_restructure(RestructureOptions {
                markdown_dir: markdown_dir.unwrap_or(config.markdown_dir),
                numbers,
                dry_run,
            })?;
        }

        Commands::Generate {
            markdown_dir,
            output,
            language_file,
        } => {
            execute_generate(GenerateOptions {
                markdown_dir: markdown_dir.unwrap_or(config.markdown_dir),
                output_dir: output.unwrap_or(config.output_dir),
                language_file: language_file.or(config.language_file),
            })?;
        }

        Commands::Uia { uia_dir, output } => {
            execute_uia(UiaOptions {
                uia_dir: uia_dir.unwrap_or(config.uia_dir),
                output: output.unwrap_or_else(|| config.output_dir.join(UIA_LIST_FILE)),
            })?;
        }

        Commands::Validate { target } => {
            let subcommand = match target {
                ValidateCommands::Structure { path } => ValidateSubcommand::Structure {
                    path: path.unwrap_or(config.markdown_dir),
                },
                ValidateCommands::Corpus { file } => ValidateSubcommand::Corpus {
                    file: file.unwrap_or(corpus),
                },
                ValidateCommands::Schema { file, schema_type } => {
                    ValidateSubcommand::Schema { file, schema_type }
                }
            };
            execute_validate(subcommand)?;
        }

        Commands::Show { number, json } => {
            execute_query(QueryOptions { corpus, json }, QuerySubcommand::Show { number })?;
        }

        Commands::List { category, json } => {
            execute_query(QueryOptions { corpus, json }, QuerySubcommand::List { category })?;
        }

        Commands::Search { query, json } => {
            execute_query(QueryOptions { corpus, json }, QuerySubcommand::Search { query })?;
        }

        Commands::Salience {
            focus,
            category,
            keywords,
            domain,
            limit,
            json,
        } => {
            execute_score(
                ScoreOptions { corpus, json },
                ScoreSubcommand::Salience {
                    focus,
                    category,
                    keywords,
                    domain,
                    limit: limit.unwrap_or(config.salience.default_limit),
                },
            )?;
        }

        Commands::Gestalt {
            ids,
            threshold,
            json,
        } => {
            execute_score(
                ScoreOptions { corpus, json },
                ScoreSubcommand::Gestalt {
                    ids,
                    threshold: threshold.unwrap_or(config.salience.gestalt_threshold),
                },
            )?;
        }

        Commands::Emergence { ids, json } => {
            execute_score(ScoreOptions { corpus, json }, ScoreSubcommand::Emergence { ids })?;
        }

        Commands::Render {
            target,
            language_file,
        } => {
            let subcommand = match target {
                RenderCommands::Index { output, archetypes } => {
                    RenderSubcommand::Index { output, archetypes }
                }
                RenderCommands::Sequences { output } => {
                    RenderSubcommand::Sequences { output_dir: output }
                }
            };
            execute_render(
                RenderOptions {
                    corpus,
                    language_file: language_file.or(config.language_file),
                },
                subcommand,
            )?;
        }

        Commands::Serve { host, port } => {
            execute_serve(ServeOptions {
                corpus,
                host: host.unwrap_or(config.server.host),
                port: port.unwrap_or(config.server.port),
                salience_limit: config.salience.default_limit,
                gestalt_threshold: config.salience.gestalt_threshold,
            })
            .await?;
        }
    }

    Ok(())
}
