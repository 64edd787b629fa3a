use chrono::{DateTime, Utc};
use clap::Args;
use std::path::{Path, PathBuf};
use vitalog_core::HealthStore;

use super::{load_config, load_store, CliResult};

/// How many past checks to read when reconstructing the gate.
const HISTORY_LIMIT: usize = 50;

#[derive(Args)]
pub struct CadenceArgs {
    /// Exported records (JSON)
    #[arg(long)]
    data: PathBuf,
    /// Evaluate at this instant (RFC 3339) instead of now
    #[arg(long)]
    now: Option<DateTime<Utc>>,
    /// Print the status message only
    #[arg(long)]
    text: bool,
}

pub fn run(args: CadenceArgs, config_path: Option<&Path>) -> CliResult {
    let config = load_config(config_path)?;
    let gate = config.cadence_gate()?;
    let store = load_store(&args.data, &config)?;

    let history = store.hairline_checks(HISTORY_LIMIT)?;
    let status = gate.check(&history, args.now.unwrap_or_else(Utc::now));

    if args.text {
        println!("{}", status.message);
    } else {
        println!("{}", serde_json::to_string_pretty(&status)?);
    }
    Ok(())
}
