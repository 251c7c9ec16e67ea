//! Rename-entity command.

use anyhow::{Context, Result};
use clap::Args;
use pricetrack_core::ConfigLoader;
use pricetrack_data::{PgConnector, SchemaAdmin};
use std::path::Path;

/// Arguments for the rename-entity command.
#[derive(Args, Debug, Clone)]
pub struct RenameEntityArgs {
    /// Current entity id
    pub old: String,

    /// Replacement entity id
    pub new: String,
}

/// Runs the rename-entity command.
///
/// # Errors
/// Returns an error if the ids are invalid or the update fails.
pub async fn run_rename_entity(args: RenameEntityArgs, config_path: &Path) -> Result<()> {
    let config = ConfigLoader::load_from(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let admin = SchemaAdmin::new(PgConnector::from_credentials(&config.postgres));
    let updated = admin.rename_entity(&args.old, &args.new).await?;

    println!("Renamed {} to {} ({updated} row(s) updated)", args.old, args.new);
    Ok(())
}
