use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sheetfeed::app::AppContext;
use sheetfeed::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let default_directive = if cli.verbose { "sheetfeed=debug" } else { "sheetfeed=info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init => {
            commands::init(config_path)?;
        }
        Commands::Check { path } => {
            commands::check(&path)?;
        }
        Commands::Build(args) => {
            let config = commands::load_config(config_path)?;
            let ctx = AppContext::new(&config)?;
            commands::build(&ctx, &args).await?;
        }
        Commands::Run { workers, report } => {
            let config = commands::load_config(config_path)?;
            let ctx = Arc::new(AppContext::new(&config)?);
            commands::run_all(ctx, &config, workers, report).await?;
        }
        Commands::Watch {
            interval,
            no_initial_build,
            workers,
        } => {
            let config = commands::load_config(config_path)?;
            let ctx = Arc::new(AppContext::new(&config)?);
            commands::watch(ctx, &config, &interval, no_initial_build, workers).await?;
        }
    }

    Ok(())
}
