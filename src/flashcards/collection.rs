//! The interface an import writes cards through

use thiserror::Error;

use super::models::{CardModel, FlashcardDraft};

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AnkiConnect error: {0}")]
    Api(String),

    #[error("Deck not found: {0}")]
    DeckNotFound(String),

    #[error("Card rejected: {0}")]
    Rejected(String),
}

/// A flashcard collection that cards can be looked up in and added to
///
/// The duplicate check and the insert are separate calls. Nothing holds the
/// collection between them, so a concurrent writer can still add the same
/// front field in that window.
pub trait HostCollection {
    type DeckId: Clone + std::fmt::Debug;
    type NoteId: std::fmt::Debug;

    /// Whether the collection is open and can be written to
    fn is_loaded(&self) -> bool;

    /// Resolve a deck by name
    fn deck_id(&self, name: &str) -> Result<Option<Self::DeckId>, CollectionError>;

    /// Resolve a card model by name
    fn card_model(&self, name: &str) -> Result<Option<CardModel>, CollectionError>;

    /// Cards whose front field equals `front` exactly (case-sensitive)
    fn find_cards_by_front(&self, front: &str) -> Result<Vec<Self::NoteId>, CollectionError>;

    /// Add a card built from `draft` to `deck`
    fn add_card(
        &self,
        model: &CardModel,
        draft: &FlashcardDraft,
        deck: &Self::DeckId,
    ) -> Result<Self::NoteId, CollectionError>;

    /// Line break used inside field values
    fn line_break(&self) -> &str {
        "\n"
    }
}
