//! Flashcard synthesis and host collections
//!
//! This module provides:
//! - The host collection interface the importer writes through
//! - A file-backed collection (decks, card models, cards, card states)
//! - An AnkiConnect client for writing straight into a running Anki
//! - The synthesizer turning lexicon terms into cards

pub mod anki_connect;
pub mod collection;
pub mod models;
pub mod storage;
pub mod synthesizer;

pub use anki_connect::AnkiConnect;
pub use collection::{CollectionError, HostCollection};
pub use models::*;
pub use storage::FlashcardStorage;
pub use synthesizer::{
    ease_for_status, synthesize, SkipReason, SynthesisError, SynthesisReport, Synthesizer,
    TermFailure, TermOutcome,
};
