//! Record command.
//!
//! Stamps entities with the time an event was observed.

use anyhow::{Context, Result};
use clap::Args;
use pricetrack_core::{parse_timestamp, ConfigLoader};
use pricetrack_data::{EntityStamps, PgConnector, TimestampRepository};
use std::path::Path;

/// Arguments for the record command.
#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// Event column to stamp: wm_data, match_to_az, az_comp_price, az_fees or az_lowest_offer
    #[arg(long)]
    pub tag: String,

    /// Entity ids, each optionally followed by `=TIMESTAMP`
    #[arg(required = true, value_name = "ID[=TIMESTAMP]")]
    pub entities: Vec<String>,
}

/// Runs the record command.
///
/// # Errors
/// Returns an error if an argument is malformed, the tag is unknown, or the write fails.
pub async fn run_record(args: RecordArgs, config_path: &Path) -> Result<()> {
    let stamps = parse_entities(&args.entities)?;
    let config = ConfigLoader::load_from(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let repo = TimestampRepository::new(PgConnector::from_credentials(&config.postgres));
    let written = repo.record_events_for_tag(stamps, &args.tag).await?;

    println!("Stamped {written} row(s) in {}", args.tag);
    Ok(())
}

/// Bare ids are stamped with the current time; any `ID=TIMESTAMP` argument
/// switches the whole batch to explicit timestamps, where `ID=` means now.
fn parse_entities(raw: &[String]) -> Result<EntityStamps> {
    if !raw.iter().any(|arg| arg.contains('=')) {
        return Ok(EntityStamps::Bare(raw.to_vec()));
    }

    let pairs = raw
        .iter()
        .map(|arg| match arg.split_once('=') {
            Some((id, ts)) => {
                let at = parse_timestamp(ts).with_context(|| format!("in argument {arg:?}"))?;
                Ok((id.to_string(), at))
            }
            None => Ok((arg.clone(), None)),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(EntityStamps::Stamped(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_bare_ids() {
        let stamps = parse_entities(&strings(&["B00A", "B00B"])).unwrap();
        assert_eq!(stamps, EntityStamps::Bare(strings(&["B00A", "B00B"])));
    }

    #[test]
    fn test_mixed_ids_and_timestamps() {
        let stamps = parse_entities(&strings(&["B00A=2024-01-01 00:00:30", "B00B", "B00C="])).unwrap();
        let EntityStamps::Stamped(pairs) = stamps else {
            panic!("expected explicit timestamps");
        };
        assert_eq!(pairs.len(), 3);
        assert!(pairs[0].1.is_some());
        assert_eq!(pairs[1], ("B00B".to_string(), None));
        assert_eq!(pairs[2], ("B00C".to_string(), None));
    }

    #[test]
    fn test_bad_timestamp() {
        let err = parse_entities(&strings(&["B00A=yesterday"])).unwrap_err();
        assert!(format!("{err:#}").contains("yesterday"));
    }
}
