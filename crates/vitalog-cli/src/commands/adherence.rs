use clap::Args;
use std::path::{Path, PathBuf};
use vitalog_core::{build_series, prefetch_checklists, AdherenceSummary, DayBucket};

use super::{load_config, load_store, local_now, CliResult};

#[derive(Args)]
pub struct AdherenceArgs {
    /// Exported records (JSON)
    #[arg(long)]
    data: PathBuf,
    /// Window length in days (defaults to adherence.window_days)
    #[arg(long)]
    days: Option<u32>,
    /// Treat this day (YYYY-MM-DD) as today
    #[arg(long)]
    today: Option<DayBucket>,
    /// Print a bar chart instead of JSON
    #[arg(long)]
    text: bool,
}

pub fn run(args: AdherenceArgs, config_path: Option<&Path>) -> CliResult {
    let config = load_config(config_path)?;
    let store = load_store(&args.data, &config)?;
    let window = args.days.unwrap_or(config.adherence.window_days);
    let now = local_now(args.today);

    let resolved = prefetch_checklists(&store, window, &now)?;
    let series = build_series(window, &now, |day| resolved.get(&day).cloned());
    let summary = AdherenceSummary::from_points(series);

    if args.text {
        for point in &summary.points {
            let bar = "#".repeat(usize::from(point.value) / 5);
            println!("{}  {:>3}%  {}", point.date, point.value, bar);
        }
        println!("average {}%  best {}%  complete days {}", summary.average, summary.best, summary.completed_days);
    } else {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
