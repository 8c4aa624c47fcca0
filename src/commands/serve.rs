//! Implements `patlang serve`: the REST API over a generated corpus.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;

use crate::api::{self, AppState};
use crate::salience::SalienceEngine;

/// Options for the serve command
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// Generated language document
    pub corpus: PathBuf,
    pub host: String,
    pub port: u16,
    /// Default number of salience results
    pub salience_limit: usize,
    /// Default gestalt similarity threshold
    pub gestalt_threshold: f64,
}

/// Execute the serve command
pub async fn execute_serve(options: ServeOptions) -> Result<()> {
    let engine = SalienceEngine::load(&options.corpus).with_context(|| {
        format!(
            "Failed to load {} (run `patlang generate` first)",
            options.corpus.display()
        )
    })?;
    let addr: SocketAddr = format!("{}:{}", options.host, options.port)
        .parse()
        .with_context(|| format!("Invalid address {}:{}", options.host, options.port))?;

    println!(
        "{} Serving {} patterns on http://{}",
        style("→").cyan(),
        engine.len(),
        addr
    );

    let state = AppState::new(engine).with_defaults(options.salience_limit, options.gestalt_threshold);
    api::serve(state, addr).await?;
    Ok(())
}
