use anyhow::{bail, Context, Result};
use serde_json::json;

use lexicard_lib::flashcards::Flashcard;

use crate::app::{App, Backend};
use crate::OutputFormat;

pub fn run(app: &App, deck_name: Option<&str>, format: &OutputFormat) -> Result<()> {
    let storage = match &app.backend {
        Backend::Local(storage) => storage,
        Backend::Anki(_) => bail!("Browse cards in Anki itself"),
    };

    let cards: Vec<Flashcard> = match deck_name {
        Some(name) => {
            let deck = storage
                .find_deck(name)
                .context("Failed to list decks")?
                .with_context(|| format!("Deck '{}' not found", name))?;
            storage.list_cards(deck.id).context("Failed to list cards")?
        }
        None => storage.list_all_cards().context("Failed to list cards")?,
    };

    match format {
        OutputFormat::Json => {
            let mut output = Vec::new();
            for card in &cards {
                let state = storage.get_card_state(card.id)?;
                output.push(json!({
                    "id": card.id.to_string(),
                    "front": card.front,
                    "back": card.back,
                    "tags": card.tags,
                    "easeFactor": state.ease_factor,
                }));
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No cards found.");
                return Ok(());
            }
            for card in &cards {
                let state = storage.get_card_state(card.id)?;
                let back = card.back.replace('\n', " / ");
                let tags = if card.tags.is_empty() {
                    String::new()
                } else {
                    format!("  #{}", card.tags.join(" #"))
                };
                println!(
                    "{} -> {}  ({}%){}",
                    card.front,
                    back,
                    state.ease_factor / 10,
                    tags
                );
            }
            println!("\n{} cards", cards.len());
        }
    }

    Ok(())
}
