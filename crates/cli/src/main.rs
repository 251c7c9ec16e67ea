use clap::{Parser, Subcommand};
use pricetrack_core::DEFAULT_CONFIG_PATH;
use std::path::PathBuf;

mod commands;

use commands::{CloneTableArgs, CredentialsArgs, FetchArgs, RecordArgs, RenameEntityArgs};

#[derive(Parser)]
#[command(name = "pricetrack")]
#[command(about = "Price and inventory tracking utilities", long_about = None)]
struct Cli {
    /// Credential/config file path
    #[arg(long, global = true, env = "PRICETRACK_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stamp entities with the time an event was observed
    Record(RecordArgs),
    /// Change an entity id in every table that references it
    RenameEntity(RenameEntityArgs),
    /// Copy a table with a subset of its columns
    CloneTable(CloneTableArgs),
    /// Fetch a URL with retries
    Fetch(FetchArgs),
    /// Print values from the credential file
    Credentials(CredentialsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Record(args) => commands::run_record(args, &cli.config).await?,
        Commands::RenameEntity(args) => commands::run_rename_entity(args, &cli.config).await?,
        Commands::CloneTable(args) => commands::run_clone_table(args, &cli.config).await?,
        Commands::Fetch(args) => commands::run_fetch(args, &cli.config).await?,
        Commands::Credentials(args) => commands::run_credentials(&args, &cli.config)?,
    }

    Ok(())
}
