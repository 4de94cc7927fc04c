use anyhow::{bail, Context, Result};
use serde_json::json;

use crate::app::{App, Backend};
use crate::OutputFormat;

pub fn run(app: &App, create: Option<&str>, format: &OutputFormat) -> Result<()> {
    if let Some(name) = create {
        match &app.backend {
            Backend::Local(storage) => {
                storage
                    .create_deck(name)
                    .with_context(|| format!("Failed to create deck {}", name))?;
            }
            Backend::Anki(_) => bail!("Create decks in Anki itself"),
        }
    }

    // (name, card count when known)
    let decks: Vec<(String, Option<usize>)> = match &app.backend {
        Backend::Local(storage) => storage
            .list_decks()
            .context("Failed to list decks")?
            .into_iter()
            .map(|d| (d.name, Some(d.card_count)))
            .collect(),
        Backend::Anki(anki) => anki
            .deck_names()
            .with_context(|| format!("Failed to list decks from {}", anki.url()))?
            .into_iter()
            .map(|name| (name, None))
            .collect(),
    };
    let selected = app.load_settings().selected_deck;

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = decks
                .iter()
                .map(|(name, count)| {
                    json!({
                        "name": name,
                        "cardCount": count,
                        "selected": *name == selected,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if decks.is_empty() {
                println!("No decks found.");
                return Ok(());
            }
            for (name, count) in &decks {
                let marker = if *name == selected { "* " } else { "  " };
                match count {
                    Some(count) => println!("{}{} ({} cards)", marker, name, count),
                    None => println!("{}{}", marker, name),
                }
            }
        }
    }

    Ok(())
}
