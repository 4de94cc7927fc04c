pub mod cards;
pub mod config;
pub mod decks;
pub mod import;
pub mod languages;
pub mod models;
pub mod startup;

use anyhow::Result;
use serde_json::json;

use lexicard_lib::import::{ImportRun, RunState};

use crate::OutputFormat;

/// Print the outcome of one run
pub fn print_run(run: &ImportRun, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output = match run.state() {
                RunState::Completed(summary) => json!({
                    "status": "completed",
                    "mode": format!("{:?}", run.mode()).to_lowercase(),
                    "message": summary.message(),
                    "summary": summary,
                }),
                RunState::Failed(error) => json!({
                    "status": "failed",
                    "mode": format!("{:?}", run.mode()).to_lowercase(),
                    "error": error,
                }),
                RunState::Idle | RunState::Running => json!({ "status": "incomplete" }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if let Some(message) = run.user_message() {
                println!("{}", message);
            }
        }
    }

    Ok(())
}
