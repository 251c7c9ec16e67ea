//! Fetch command.
//!
//! Downloads a page with retries and optionally saves the body.

use anyhow::{Context, Result};
use clap::Args;
use pricetrack_core::{write_to_file, ConfigLoader, FetchTimeout};
use pricetrack_fetch::HttpFetcher;
use std::path::{Path, PathBuf};

/// Arguments for the fetch command.
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// URL to request
    pub url: String,

    /// Seconds per attempt, or `auto` (also `-1`) to allow 1s, 2s, 3s, ...
    #[arg(long, allow_negative_numbers = true)]
    pub timeout: Option<FetchTimeout>,

    /// Maximum number of attempts
    #[arg(long)]
    pub attempts: Option<u32>,

    /// File to write the response body to
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Runs the fetch command.
///
/// # Errors
/// Returns an error if no attempt got a response or the body cannot be saved.
pub async fn run_fetch(args: FetchArgs, config_path: &Path) -> Result<()> {
    let config = ConfigLoader::load_from(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let timeout = args.timeout.unwrap_or(config.http.timeout);
    let attempts = args.attempts.unwrap_or(config.http.max_attempts);
    tracing::info!(url = %args.url, %timeout, attempts, "fetching");

    let fetcher = HttpFetcher::new(&config.http)?;
    let outcome = fetcher.fetch_with(&args.url, timeout, attempts).await;
    let attempts_used = outcome.attempts_used;
    let page = outcome.into_page(&args.url)?;

    let body = page.text();
    println!(
        "{} after {attempts_used} attempt(s), {} bytes",
        page.status,
        page.body.len()
    );

    if let Some(output) = &args.output {
        let (dir, filename) = split_output(output)?;
        let path = write_to_file(dir, &filename, &body)?;
        println!("Saved to {}", path.display());
    }

    Ok(())
}

fn split_output(output: &Path) -> Result<(PathBuf, String)> {
    let filename = output
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("output path has no file name: {}", output.display()))?;
    let dir = output.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok((dir, filename.to_string()))
}
