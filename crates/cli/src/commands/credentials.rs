//! Credentials command.
//!
//! Prints values from the credential file with passwords masked.

use anyhow::{anyhow, Result};
use clap::Args;
use pricetrack_core::{CredentialSelection, CredentialStore, Section};
use std::collections::BTreeMap;
use std::path::Path;

/// Arguments for the credentials command.
#[derive(Args, Debug, Clone)]
pub struct CredentialsArgs {
    /// Values to print as `SECTION.KEY` (default: everything)
    #[arg(value_name = "SECTION.KEY")]
    pub keys: Vec<String>,

    /// Print passwords instead of masking them
    #[arg(long)]
    pub reveal: bool,
}

/// Runs the credentials command.
///
/// # Errors
/// Returns an error if the file cannot be read or a requested value is missing.
pub fn run_credentials(args: &CredentialsArgs, config_path: &Path) -> Result<()> {
    let store = CredentialStore::load(config_path)?;

    if args.keys.is_empty() {
        print_sections(store.all(), args.reveal);
        return Ok(());
    }

    let grouped = group_keys(&args.keys)?;
    let key_refs: Vec<Vec<&str>> = grouped
        .iter()
        .map(|(_, keys)| keys.iter().map(String::as_str).collect())
        .collect();
    let request: Vec<(&str, &[&str])> = grouped
        .iter()
        .zip(&key_refs)
        .map(|((section, _), keys)| (section.as_str(), keys.as_slice()))
        .collect();

    match store.select(&request)? {
        CredentialSelection::Single(value) => {
            let key = &args.keys[0];
            println!("{}", display_value(key, &value, args.reveal));
        }
        CredentialSelection::Sections(sections) => print_sections(&sections, args.reveal),
    }
    Ok(())
}

fn group_keys(raw: &[String]) -> Result<Vec<(String, Vec<String>)>> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for item in raw {
        let (section, key) = item
            .split_once('.')
            .ok_or_else(|| anyhow!("expected SECTION.KEY, got {item:?}"))?;
        match grouped.iter_mut().find(|(s, _)| s == section) {
            Some((_, keys)) => keys.push(key.to_string()),
            None => grouped.push((section.to_string(), vec![key.to_string()])),
        }
    }
    Ok(grouped)
}

fn print_sections(sections: &BTreeMap<String, Section>, reveal: bool) {
    for (name, values) in sections {
        println!("[{name}]");
        for (key, value) in values {
            println!("{key} = {}", display_value(key, value, reveal));
        }
        println!();
    }
}

fn display_value<'a>(key: &str, value: &'a str, reveal: bool) -> &'a str {
    if !reveal && key.to_ascii_lowercase().contains("password") {
        "***"
    } else {
        value
    }
}
