//! CLI command implementations
//!
//! Each command is in its own submodule. Handlers take an options struct,
//! print with `console` markers and return `anyhow::Result`.

pub mod complete;
pub mod generate;
pub mod init;
pub mod output;
pub mod query;
pub mod render;
pub mod restructure;
pub mod salience;
pub mod serve;
pub mod uia;
pub mod validate;

pub use complete::{execute_complete, CompleteOptions};
pub use generate::{execute_generate, GenerateOptions};
pub use init::{execute_init, InitOptions};
pub use query::{execute_query, QueryOptions, QuerySubcommand};
pub use render::{execute_render, RenderOptions, RenderSubcommand};
pub use restructure::{execute_restructure, RestructureOptions};
pub use salience::{execute_score, parse_threshold, ScoreOptions, ScoreSubcommand};
pub use serve::{execute_serve, ServeOptions};
pub use uia::{execute_uia, UiaOptions};
pub use validate::{execute_validate, ValidateSubcommand};
