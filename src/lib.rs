//! Import LUTE vocabulary into flashcard decks
//!
//! The lexicon reader pulls filtered terms out of a `lute.db` file, the
//! synthesizer turns them into cards for a [`flashcards::HostCollection`], and
//! the import orchestrator sequences both from persisted settings.

pub mod flashcards;
pub mod import;
pub mod lexicon;
pub mod settings;

#[cfg(test)]
mod test_support;

pub use flashcards::{AnkiConnect, FlashcardStorage, HostCollection};
pub use import::{AutoImport, ImportOrchestrator, ImportRequest, ImportSummary};
pub use settings::{ImportSettings, SettingsStore};
