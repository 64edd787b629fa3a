use clap::Subcommand;
use vitalog_core::BpReading;

use super::CliResult;

#[derive(Subcommand)]
pub enum VitalsAction {
    /// Validate and classify a blood pressure reading
    Check {
        /// Reading as SYS/DIA or SYS/DIA/PULSE (e.g. "120/80/72")
        reading: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: VitalsAction) -> CliResult {
    match action {
        VitalsAction::Check { reading, json } => {
            let reading: BpReading = reading.parse()?;
            let category = reading.category();
            if json {
                let out = serde_json::json!({ "reading": reading, "category": category });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{reading}: {}", category.label());
            }
        }
    }
    Ok(())
}
