//! File-backed flashcard collection
//!
//! Directory structure:
//! ```text
//! collection/
//! ├── decks.json           # Array of all decks
//! ├── models.json          # Array of card models
//! ├── cards/
//! │   └── {card-id}.json   # Individual card files
//! └── states/
//!     └── {card-id}.json   # Card spaced repetition state
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use super::collection::{CollectionError, HostCollection};
use super::models::*;

pub type Result<T> = std::result::Result<T, CollectionError>;

/// Deck created on first use, matching the host application's default
pub const DEFAULT_DECK_NAME: &str = "Default";

/// Storage manager for a collection directory
pub struct FlashcardStorage {
    base_path: PathBuf,
}

impl FlashcardStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Get the default collection directory
    pub fn default_collection_dir() -> Option<PathBuf> {
        dirs::data_local_dir().map(|p| p.join("lexicard").join("collection"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn cards_dir(&self) -> PathBuf {
        self.base_path.join("cards")
    }

    fn states_dir(&self) -> PathBuf {
        self.base_path.join("states")
    }

    fn decks_path(&self) -> PathBuf {
        self.base_path.join("decks.json")
    }

    fn models_path(&self) -> PathBuf {
        self.base_path.join("models.json")
    }

    fn card_path(&self, card_id: Uuid) -> PathBuf {
        self.cards_dir().join(format!("{}.json", card_id))
    }

    fn state_path(&self, card_id: Uuid) -> PathBuf {
        self.states_dir().join(format!("{}.json", card_id))
    }

    /// Create the directory layout and seed the default deck and model
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.cards_dir())?;
        fs::create_dir_all(self.states_dir())?;

        if !self.decks_path().exists() {
            let decks = vec![Deck::new(DEFAULT_DECK_NAME.to_string())];
            fs::write(self.decks_path(), serde_json::to_string_pretty(&decks)?)?;
        }

        if !self.models_path().exists() {
            let models = vec![CardModel::basic()];
            fs::write(self.models_path(), serde_json::to_string_pretty(&models)?)?;
        }

        Ok(())
    }

    // ==================== Deck Operations ====================

    /// List all decks
    pub fn list_decks(&self) -> Result<Vec<Deck>> {
        let decks_path = self.decks_path();
        if !decks_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&decks_path)?;
        let decks: Vec<Deck> = serde_json::from_str(&content)?;
        Ok(decks)
    }

    /// Find a deck by exact name
    pub fn find_deck(&self, name: &str) -> Result<Option<Deck>> {
        Ok(self.list_decks()?.into_iter().find(|d| d.name == name))
    }

    /// Create a new deck, or return the existing one with that name
    pub fn create_deck(&self, name: &str) -> Result<Deck> {
        self.init()?;

        if let Some(existing) = self.find_deck(name)? {
            return Ok(existing);
        }

        let deck = Deck::new(name.to_string());
        let mut decks = self.list_decks()?;
        decks.push(deck.clone());
        self.write_decks(&decks)?;

        log::info!("Created deck {}", name);
        Ok(deck)
    }

    fn write_decks(&self, decks: &[Deck]) -> Result<()> {
        fs::write(self.decks_path(), serde_json::to_string_pretty(decks)?)?;
        Ok(())
    }

    /// Update the card count for a deck
    fn update_deck_card_count(&self, deck_id: Uuid) -> Result<()> {
        let count = self.list_cards(deck_id)?.len();
        let mut decks = self.list_decks()?;
        let deck = decks
            .iter_mut()
            .find(|d| d.id == deck_id)
            .ok_or_else(|| CollectionError::DeckNotFound(deck_id.to_string()))?;
        deck.card_count = count;
        deck.updated_at = Utc::now();
        self.write_decks(&decks)
    }

    // ==================== Model Operations ====================

    /// List all card models
    pub fn list_models(&self) -> Result<Vec<CardModel>> {
        let models_path = self.models_path();
        if !models_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&models_path)?;
        let models: Vec<CardModel> = serde_json::from_str(&content)?;
        Ok(models)
    }

    /// Add or replace a card model
    pub fn save_model(&self, model: CardModel) -> Result<()> {
        self.init()?;

        let mut models = self.list_models()?;
        models.retain(|m| m.name != model.name);
        models.push(model);
        fs::write(self.models_path(), serde_json::to_string_pretty(&models)?)?;
        Ok(())
    }

    // ==================== Card Operations ====================

    /// List all cards (across all decks)
    pub fn list_all_cards(&self) -> Result<Vec<Flashcard>> {
        let cards_dir = self.cards_dir();
        if !cards_dir.exists() {
            return Ok(Vec::new());
        }

        let mut cards = Vec::new();
        for entry in fs::read_dir(&cards_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                let content = fs::read_to_string(&path)?;
                let card: Flashcard = serde_json::from_str(&content)?;
                cards.push(card);
            }
        }

        Ok(cards)
    }

    /// List all cards in a deck, in insertion order
    pub fn list_cards(&self, deck_id: Uuid) -> Result<Vec<Flashcard>> {
        let mut cards: Vec<Flashcard> = self
            .list_all_cards()?
            .into_iter()
            .filter(|c| c.deck_id == deck_id)
            .collect();
        cards.sort_by(|a, b| a.position.cmp(&b.position));
        Ok(cards)
    }

    /// Get the state for a card
    pub fn get_card_state(&self, card_id: Uuid) -> Result<CardState> {
        let state_path = self.state_path(card_id);
        if !state_path.exists() {
            return Ok(CardState::new(card_id, None));
        }

        let content = fs::read_to_string(&state_path)?;
        let state: CardState = serde_json::from_str(&content)?;
        Ok(state)
    }
}

impl HostCollection for FlashcardStorage {
    type DeckId = Uuid;
    type NoteId = Uuid;

    fn is_loaded(&self) -> bool {
        self.decks_path().exists() && self.cards_dir().is_dir()
    }

    fn deck_id(&self, name: &str) -> Result<Option<Uuid>> {
        Ok(self.find_deck(name)?.map(|d| d.id))
    }

    fn card_model(&self, name: &str) -> Result<Option<CardModel>> {
        Ok(self.list_models()?.into_iter().find(|m| m.name == name))
    }

    fn find_cards_by_front(&self, front: &str) -> Result<Vec<Uuid>> {
        Ok(self
            .list_all_cards()?
            .into_iter()
            .filter(|c| c.front == front)
            .map(|c| c.id)
            .collect())
    }

    fn add_card(&self, model: &CardModel, draft: &FlashcardDraft, deck: &Uuid) -> Result<Uuid> {
        if !self.list_decks()?.iter().any(|d| d.id == *deck) {
            return Err(CollectionError::DeckNotFound(deck.to_string()));
        }

        let position = next_position(self.list_cards(*deck)?.len());

        let mut card = Flashcard::new(
            *deck,
            model.name.clone(),
            draft.front.clone(),
            draft.back.clone(),
        );
        card.position = position;
        card.tags = draft.tags.clone();

        fs::write(self.card_path(card.id), serde_json::to_string_pretty(&card)?)?;

        let state = CardState::new(card.id, draft.ease_factor);
        fs::write(
            self.state_path(card.id),
            serde_json::to_string_pretty(&state)?,
        )?;

        self.update_deck_card_count(*deck)?;

        Ok(card.id)
    }
}

/// Position for a card appended after `count` cards
fn next_position(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}
