//! Evaluation CLI: score predictions against SQL ground truth and report P/R/F1.

use anyhow::Result;
use clap::Parser;
use schemalign::commands::{self, EvaluateArgs};
use schemalign::Config;

#[derive(Parser, Debug)]
#[command(name = "evaluate")]
#[command(about = "Compute precision/recall/F1, cross-check with the LLM and chart F1 per db_id")]
struct Args {
    #[command(flatten)]
    evaluate: EvaluateArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load_or_default()?;
    log::info!("Metrics directory: {}", config.paths.metrics_dir.display());

    commands::evaluate(&config, &args.evaluate).await?;
    Ok(())
}
