use anyhow::{Context, Result};
use serde_json::json;

use crate::app::{App, Backend};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    // (name, field names when known)
    let models: Vec<(String, Option<Vec<String>>)> = match &app.backend {
        Backend::Local(storage) => storage
            .list_models()
            .context("Failed to list card models")?
            .into_iter()
            .map(|m| (m.name, Some(m.fields)))
            .collect(),
        Backend::Anki(anki) => anki
            .model_names()
            .with_context(|| format!("Failed to list note types from {}", anki.url()))?
            .into_iter()
            .map(|name| (name, None))
            .collect(),
    };
    let selected = app.load_settings().selected_model;

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = models
                .iter()
                .map(|(name, fields)| {
                    json!({
                        "name": name,
                        "fields": fields,
                        "selected": *name == selected,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if models.is_empty() {
                println!("No card models found.");
                return Ok(());
            }
            for (name, fields) in &models {
                let marker = if *name == selected { "* " } else { "  " };
                match fields {
                    Some(fields) => println!("{}{} ({})", marker, name, fields.join(", ")),
                    None => println!("{}{}", marker, name),
                }
            }
        }
    }

    Ok(())
}
