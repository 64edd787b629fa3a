use chrono::Local;
use clap::Args;
use std::path::{Path, PathBuf};
use vitalog_core::{build_month_grid, month_range, DayBucket, HealthStore, Week, YearMonth};

use super::{load_config, load_store, local_now, CliResult};

#[derive(Args)]
pub struct CalendarArgs {
    /// Exported records (JSON)
    #[arg(long)]
    data: PathBuf,
    /// Month to show (YYYY-MM), defaults to the current month
    #[arg(long)]
    month: Option<YearMonth>,
    /// Treat this day (YYYY-MM-DD) as today
    #[arg(long)]
    today: Option<DayBucket>,
    /// Print a text grid instead of JSON
    #[arg(long)]
    text: bool,
}

pub fn run(args: CalendarArgs, config_path: Option<&Path>) -> CliResult {
    let config = load_config(config_path)?;
    let store = load_store(&args.data, &config)?;
    let now = local_now(args.today);
    let month = args.month.unwrap_or_else(|| YearMonth::containing(&now));

    let entries = store.mood_entries(month_range(month, &Local))?;
    let grid = build_month_grid(month, &entries, &now);

    if args.text {
        print!("{}", render(month, &grid));
    } else {
        println!("{}", serde_json::to_string_pretty(&grid)?);
    }
    Ok(())
}

/// Sunday-first text grid. `*` marks a day with an entry, brackets mark today.
fn render(month: YearMonth, grid: &[Week]) -> String {
    let mut out = format!("{month}\n  Su   Mo   Tu   We   Th   Fr   Sa\n");
    for week in grid {
        let row: Vec<String> = week
            .iter()
            .map(|cell| match cell.date {
                None => "     ".to_string(),
                Some(day) => {
                    let n = day.date().format("%e").to_string();
                    let mark = if cell.has_entry { '*' } else { ' ' };
                    if cell.is_today {
                        format!("[{n}]{mark}")
                    } else {
                        format!(" {n} {mark}")
                    }
                }
            })
            .collect();
        out.push_str(row.join("").trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use vitalog_core::MoodEntry;

    #[test]
    fn render_marks_entries_and_today() {
        let month = YearMonth::new(2021, 9).unwrap();
        let now = Utc.with_ymd_and_hms(2021, 9, 2, 12, 0, 0).unwrap();
        let entries = vec![MoodEntry {
            recorded_at: Utc.with_ymd_and_hms(2021, 9, 1, 9, 0, 0).unwrap(),
            mood_label: "ok".into(),
        }];
        let text = render(month, &build_month_grid(month, &entries, &now));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "2021-09");
        assert_eq!(lines.len(), 2 + 5);
        assert!(lines[2].contains("  1 *"));
        assert!(lines[2].contains("[ 2]"));
    }
}
