use anyhow::Result;
use clap::Parser;
use schemalign::commands::{self, ExtractArgs};
use schemalign::Config;

#[derive(Parser, Debug)]
#[command(name = "extract")]
#[command(about = "Extract ground-truth tables from SQL and predicted tables from the model")]
struct Args {
    #[command(flatten)]
    extract: ExtractArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    let args = Args::parse();
    let config = Config::load_or_default()?;
    log::info!("Configuration loaded successfully");
    log::info!("Resolver model: {}", config.llm.resolver_model);

    commands::extract(&config, &args.extract).await?;
    Ok(())
}
