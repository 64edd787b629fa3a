use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "vitalog", version, about = "Vitalog CLI")]
struct Cli {
    /// Config file (defaults to ~/.config/vitalog/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Routine adherence over a trailing window
    Adherence(commands::adherence::AdherenceArgs),
    /// Whether a new hairline check may be logged
    Cadence(commands::cadence::CadenceArgs),
    /// Mood calendar for a month
    Calendar(commands::calendar::CalendarArgs),
    /// Transformation profile
    Profile(commands::profile::ProfileArgs),
    /// Blood pressure validation
    Vitals {
        #[command(subcommand)]
        action: commands::vitals::VitalsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Adherence(args) => commands::adherence::run(args, config_path),
        Commands::Cadence(args) => commands::cadence::run(args, config_path),
        Commands::Calendar(args) => commands::calendar::run(args, config_path),
        Commands::Profile(args) => commands::profile::run(args, config_path),
        Commands::Vitals { action } => commands::vitals::run(action),
        Commands::Config { action } => commands::config::run(action, config_path),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
