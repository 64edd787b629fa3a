use clap::Subcommand;
use std::path::Path;
use vitalog_core::Config;

use super::{config_path, load_config, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "cadence.min_days", "ui.color_scheme")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
    /// Print the config file location
    Path,
}

pub fn run(action: ConfigAction, path: Option<&Path>) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let config = load_config(path)?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = load_config(path)?;
            config.set(&key, &value)?;
            config.save_to(&config_path(path)?)?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = load_config(path)?;
            println!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Reset => {
            Config::default().save_to(&config_path(path)?)?;
            println!("config reset to defaults");
        }
        ConfigAction::Path => {
            println!("{}", config_path(path)?.display());
        }
    }
    Ok(())
}
