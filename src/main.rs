use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use word2vec_trainer::config::Config;
use word2vec_trainer::Pipeline;

/// Train word2vec embeddings on a directory of text files and inspect them.
#[derive(Parser, Debug)]
#[command(name = "word2vec_trainer", version)]
struct Cli {
    /// Path to the json file holding corpus, training and query parameters
    config: PathBuf,
}

fn main() -> Result<()> {

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let params = Config::new(&cli.config)
        .with_context(|| format!("building parameters from '{}'", cli.config.display()))?
        .get_params();

    let sim = Pipeline::run(&params).context("training failed")?;
    Pipeline::inspect(&sim, &params.queries);
    Ok(())
}
