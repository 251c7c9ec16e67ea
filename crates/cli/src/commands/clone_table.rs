//! Clone-table command.
//!
//! Copies a table, optionally keeping only some columns in a new order.

use anyhow::{Context, Result};
use clap::Args;
use pricetrack_core::ConfigLoader;
use pricetrack_data::{CloneTableRequest, PgConnector, SchemaAdmin};
use std::path::Path;

/// Arguments for the clone-table command.
#[derive(Args, Debug, Clone)]
pub struct CloneTableArgs {
    /// Source table, as `table` or `schema.table`
    pub source: String,

    /// Columns to keep, comma separated, in output order (default: all)
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// Primary key column (default: the source table's key)
    #[arg(long)]
    pub primary_key: Option<String>,

    /// Name of the new table (default: source name with a random suffix)
    #[arg(long)]
    pub new_name: Option<String>,
}

impl CloneTableArgs {
    fn to_request(&self) -> CloneTableRequest {
        let mut request = CloneTableRequest::new(&self.source);
        if let Some(columns) = &self.columns {
            request = request.with_columns(columns.iter().cloned());
        }
        if let Some(pk) = &self.primary_key {
            request = request.with_primary_key(pk);
        }
        if let Some(name) = &self.new_name {
            request = request.with_new_name(name);
        }
        request
    }
}

/// Runs the clone-table command.
///
/// # Errors
/// Returns an error if the request is invalid or the copy fails.
pub async fn run_clone_table(args: CloneTableArgs, config_path: &Path) -> Result<()> {
    let config = ConfigLoader::load_from(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let admin = SchemaAdmin::new(PgConnector::from_credentials(&config.postgres));
    let target = admin.clone_table(&args.to_request()).await?;

    println!("Created {target} from {}", args.source);
    Ok(())
}
