use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

use crate::app::App;
use crate::OutputFormat;

pub fn run_show(app: &App, format: &OutputFormat) -> Result<()> {
    let settings = app.settings.get();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&Value::Object(settings))?);
        }
        OutputFormat::Plain => {
            println!("# {}", app.settings.path().display());
            let width = settings.keys().map(|k| k.len()).max().unwrap_or(0);
            for (key, value) in &settings {
                println!("{:<width$} = {}", key, value, width = width);
            }
        }
    }

    Ok(())
}

pub fn run_set(app: &App, key: &str, value: &str) -> Result<()> {
    let value = parse_value(value);
    let mut updates = Map::new();
    updates.insert(key.to_string(), value.clone());

    if !app.settings.update(updates) {
        bail!("Failed to update {}", app.settings.path().display());
    }
    println!("{} = {}", key, value);
    Ok(())
}

pub fn run_init(app: &App, format: &OutputFormat) -> Result<()> {
    let added = app
        .settings
        .ensure_defaults()
        .with_context(|| format!("Failed to initialize {}", app.settings.path().display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&added)?),
        OutputFormat::Plain if added.is_empty() => println!("All settings already present."),
        OutputFormat::Plain => println!("Added defaults for: {}", added.join(", ")),
    }

    Ok(())
}

/// JSON when it parses (`true`, `7`, `["a"]`), otherwise a plain string
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
