use clap::Args;
use std::path::{Path, PathBuf};
use vitalog_core::HealthStore;

use super::{load_config, load_store, CliResult};

#[derive(Args)]
pub struct ProfileArgs {
    /// Exported records (JSON)
    #[arg(long)]
    data: PathBuf,
}

pub fn run(args: ProfileArgs, config_path: Option<&Path>) -> CliResult {
    let config = load_config(config_path)?;
    let store = load_store(&args.data, &config)?;

    match store.profile() {
        Ok(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
        Err(e) if e.needs_onboarding() => {
            println!("no transformation profile yet; complete onboarding first");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
