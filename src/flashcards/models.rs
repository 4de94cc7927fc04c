//! Data models for the flashcard side of an import

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ease factor given to new cards, in permille (2500 = 250%)
pub const DEFAULT_EASE_FACTOR: i32 = 2500;

/// A deck is a named collection of flashcards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub card_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deck {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            card_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A card model (note type): a name and its ordered field names
///
/// The first field holds the term, the second its translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardModel {
    pub name: String,
    pub fields: Vec<String>,
}

impl CardModel {
    pub fn new(name: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            name: name.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// The built-in two-field model
    pub fn basic() -> Self {
        Self::new("Basic", &["Front", "Back"])
    }

    pub fn front_field(&self) -> Option<&str> {
        self.fields.first().map(String::as_str)
    }

    pub fn back_field(&self) -> Option<&str> {
        self.fields.get(1).map(String::as_str)
    }
}

/// A flashcard stored in the file-backed collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub model_name: String,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Flashcard {
    pub fn new(deck_id: Uuid, model_name: String, front: String, back: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            deck_id,
            model_name,
            front,
            back,
            tags: Vec::new(),
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Status of a card in the spaced repetition system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CardStatus {
    /// Never reviewed
    #[default]
    New,
    Learning,
    Review,
}

/// Scheduling state for a card
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardState {
    pub card_id: Uuid,
    /// Ease factor in permille (2500 = 250%)
    #[serde(default = "default_ease_factor")]
    pub ease_factor: i32,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub status: CardStatus,
}

fn default_ease_factor() -> i32 {
    DEFAULT_EASE_FACTOR
}

impl CardState {
    pub fn new(card_id: Uuid, ease_factor: Option<i32>) -> Self {
        Self {
            card_id,
            ease_factor: ease_factor.unwrap_or(DEFAULT_EASE_FACTOR),
            due_date: Utc::now(),
            status: CardStatus::New,
        }
    }
}

/// A card built from one term, not yet written to any collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardDraft {
    pub front: String,
    pub back: String,
    /// Only set when ease adjustment is on
    pub ease_factor: Option<i32>,
    pub tags: Vec<String>,
}

/// How terms are turned into cards
///
/// Built fresh for every run and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisConfig {
    pub model_name: String,
    pub deck_name: String,
    pub allow_duplicates: bool,
    /// Append the term's lexicon tag after `extra_tags`
    pub import_source_tags: bool,
    /// Derive the ease factor from the term's status
    pub adjust_ease: bool,
    pub extra_tags: Vec<String>,
    /// Drop repeated tags, keeping the first occurrence
    pub dedupe_tags: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            model_name: "Basic".to_string(),
            deck_name: "Default".to_string(),
            allow_duplicates: false,
            import_source_tags: false,
            adjust_ease: false,
            extra_tags: Vec::new(),
            dedupe_tags: false,
        }
    }
}
