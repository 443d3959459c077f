use anyhow::Result;
use clap::{Parser, Subcommand};
use schemalign::commands::{self, EvaluateArgs, ExtractArgs};
use schemalign::Config;

/// Schema-alignment evaluation: extract tables, ask the model, score the answers.
#[derive(Parser, Debug)]
#[command(name = "schemalign", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ground-truth tables from SQL plus model predictions per question
    Extract(ExtractArgs),
    /// Metrics, LLM cross-check, per-database F1 and chart
    Evaluate(EvaluateArgs),
    /// Extract, then evaluate (default)
    Run {
        #[command(flatten)]
        extract: ExtractArgs,
        #[command(flatten)]
        evaluate: EvaluateArgs,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logger from environment variable or default to info level
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    let cli = Cli::parse();
    let config = Config::load_or_default()?;
    log::info!("Starting Schemalign v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Input: {}", config.paths.input.display());

    match cli.command.unwrap_or(Command::Run {
        extract: ExtractArgs::default(),
        evaluate: EvaluateArgs::default(),
    }) {
        Command::Extract(args) => {
            commands::extract(&config, &args).await?;
        }
        Command::Evaluate(args) => {
            commands::evaluate(&config, &args).await?;
        }
        Command::Run { extract, evaluate } => {
            commands::extract(&config, &extract).await?;
            commands::evaluate(&config, &evaluate).await?;
        }
    }

    log::info!("Process completed successfully!");
    Ok(())
}
