use anyhow::Result;
use chrono::Local;
use serde_json::json;

use lexicard_lib::flashcards::HostCollection;
use lexicard_lib::import::{AutoImport, StartupOutcome};
use lexicard_lib::settings::SettingsStore;

use super::print_run;
use crate::app::{App, Backend};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let outcome = match &app.backend {
        Backend::Local(storage) => run_once(&app.settings, storage),
        Backend::Anki(anki) => run_once(&app.settings, anki),
    };

    match outcome {
        StartupOutcome::Finished(run) => print_run(&run, format)?,
        StartupOutcome::Skipped(reason) => {
            log::info!("Startup import skipped: {:?}", reason);
            if let OutputFormat::Json = format {
                let output = json!({ "status": "skipped", "reason": format!("{:?}", reason) });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
    }

    Ok(())
}

fn run_once<C: HostCollection>(settings: &SettingsStore, collection: &C) -> StartupOutcome {
    AutoImport::new().run_on_startup(settings, collection, Local::now().date_naive())
}
