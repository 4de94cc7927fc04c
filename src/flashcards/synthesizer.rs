//! Turns lexicon terms into flashcards
//!
//! Terms arrive already filtered by the lexicon reader. The synthesizer only
//! applies the language selection, duplicate suppression and tagging, and
//! records one [`TermOutcome`] per term. Per-term failures never abort a run.

use std::collections::HashSet;

use thiserror::Error;

use super::collection::{CollectionError, HostCollection};
use super::models::{CardModel, FlashcardDraft, SynthesisConfig};
use crate::lexicon::{LanguageId, TermRecord};

/// Separator LUTE puts between the words of a multi-word term
pub const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// Ease given to a status 3 term
const BASE_EASE: i64 = 2500;
/// Ease change per status step away from 3
const EASE_STEP: i64 = 150;
const EASE_CENTER_STATUS: i64 = 3;
const MAX_EASE: i64 = 3000;

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),
}

pub type Result<T> = std::result::Result<T, SynthesisError>;

/// Why a term produced no card without anything going wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    LanguageMismatch,
    Duplicate,
}

/// Why a term produced no card because something went wrong
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermFailure {
    /// The term could not be turned into a draft
    RecordMapping(String),
    /// The collection rejected the lookup or the insert
    Insertion(String),
}

/// Result of processing a single term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermOutcome {
    Inserted,
    Skipped(SkipReason),
    Failed(TermFailure),
}

/// Per-term outcomes of one synthesizer run, in input order
#[derive(Debug, Clone, Default)]
pub struct SynthesisReport {
    pub outcomes: Vec<(i64, TermOutcome)>,
}

impl SynthesisReport {
    /// Number of cards added to the collection
    pub fn inserted(&self) -> usize {
        self.count(|o| matches!(o, TermOutcome::Inserted))
    }

    pub fn language_skips(&self) -> usize {
        self.count(|o| matches!(o, TermOutcome::Skipped(SkipReason::LanguageMismatch)))
    }

    pub fn duplicates(&self) -> usize {
        self.count(|o| matches!(o, TermOutcome::Skipped(SkipReason::Duplicate)))
    }

    pub fn failures(&self) -> usize {
        self.count(|o| matches!(o, TermOutcome::Failed(_)))
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    fn count(&self, pred: impl Fn(&TermOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Ease factor for a term status, in permille
///
/// Status 3 maps to 250%, each step is 15%, capped at 300%. Codes outside the
/// documented set go through the same formula; there is no lower bound.
pub fn ease_for_status(status: i64) -> i32 {
    let ease = status
        .saturating_sub(EASE_CENTER_STATUS)
        .saturating_mul(EASE_STEP)
        .saturating_add(BASE_EASE)
        .min(MAX_EASE);
    i32::try_from(ease).unwrap_or(i32::MIN)
}

/// Front field: the term text without U+200B separators
pub fn sanitize_front(text: &str) -> String {
    text.replace(ZERO_WIDTH_SPACE, "")
}

/// Back field: the translation without U+200B, with CRLF turned into `line_break`
pub fn sanitize_back(translation: &str, line_break: &str) -> String {
    translation
        .replace(ZERO_WIDTH_SPACE, "")
        .replace("\r\n", line_break)
}

/// Extra tags in order, then the term's own tag when importing source tags
pub fn compose_tags(config: &SynthesisConfig, term: &TermRecord) -> Vec<String> {
    let mut tags = config.extra_tags.clone();

    if config.import_source_tags {
        if let Some(tag) = term.tag_text.as_deref().filter(|t| !t.is_empty()) {
            tags.push(tag.to_string());
        }
    }

    if config.dedupe_tags {
        let mut seen = HashSet::new();
        tags.retain(|t| seen.insert(t.clone()));
    }

    tags
}

/// Writes cards for one run into a host collection
pub struct Synthesizer<'a, C: HostCollection> {
    collection: &'a C,
    config: &'a SynthesisConfig,
}

impl<'a, C: HostCollection> Synthesizer<'a, C> {
    pub fn new(collection: &'a C, config: &'a SynthesisConfig) -> Self {
        Self { collection, config }
    }

    /// Add a card for every term of `language`
    ///
    /// Fails only when the collection cannot be asked for the deck or card
    /// model. A deck or model that does not exist fails each term instead.
    pub fn synthesize(&self, terms: &[TermRecord], language: LanguageId) -> Result<SynthesisReport> {
        log::info!("Starting to create cards in deck: {}", self.config.deck_name);

        let target = self.resolve_target()?;
        if let Err(missing) = &target {
            log::error!("{}; no cards can be created", missing);
        }

        let mut report = SynthesisReport::default();
        for term in terms {
            let outcome = match &target {
                _ if term.language_id != language => {
                    TermOutcome::Skipped(SkipReason::LanguageMismatch)
                }
                Ok((deck, model)) => self.process_term(term, model, deck),
                Err(missing) => TermOutcome::Failed(TermFailure::RecordMapping(missing.clone())),
            };
            match &outcome {
                TermOutcome::Inserted => log::info!("Card created for term: {}", term.text),
                TermOutcome::Skipped(reason) => {
                    log::debug!("Skipped term {}: {:?}", term.text, reason)
                }
                TermOutcome::Failed(TermFailure::RecordMapping(e)) => {
                    log::error!("Error creating card for term {}: {}", term.text, e)
                }
                TermOutcome::Failed(TermFailure::Insertion(e)) => {
                    log::error!("Error adding card for term {}: {}", term.text, e)
                }
            }
            report.outcomes.push((term.id, outcome));
        }

        log::info!(
            "Total {} cards successfully added to deck {} ({} duplicates, {} other languages, {} failed)",
            report.inserted(),
            self.config.deck_name,
            report.duplicates(),
            report.language_skips(),
            report.failures()
        );

        Ok(report)
    }

    /// Deck id and card model, or the message for whichever is missing
    fn resolve_target(&self) -> Result<std::result::Result<(C::DeckId, CardModel), String>> {
        let Some(deck) = self.collection.deck_id(&self.config.deck_name)? else {
            return Ok(Err(format!("Deck not found: {}", self.config.deck_name)));
        };
        let Some(model) = self.collection.card_model(&self.config.model_name)? else {
            return Ok(Err(format!("Card model not found: {}", self.config.model_name)));
        };
        Ok(Ok((deck, model)))
    }

    fn process_term(&self, term: &TermRecord, model: &CardModel, deck: &C::DeckId) -> TermOutcome {
        let mut draft = match self.build_draft(term, model) {
            Ok(draft) => draft,
            Err(failure) => return TermOutcome::Failed(failure),
        };

        if !self.config.allow_duplicates {
            match self.collection.find_cards_by_front(&draft.front) {
                Ok(existing) if !existing.is_empty() => {
                    return TermOutcome::Skipped(SkipReason::Duplicate)
                }
                Ok(_) => {}
                Err(e) => return TermOutcome::Failed(TermFailure::Insertion(e.to_string())),
            }
        }

        draft.tags = compose_tags(self.config, term);

        match self.collection.add_card(model, &draft, deck) {
            Ok(_) => TermOutcome::Inserted,
            Err(e) => TermOutcome::Failed(TermFailure::Insertion(e.to_string())),
        }
    }

    fn build_draft(
        &self,
        term: &TermRecord,
        model: &CardModel,
    ) -> std::result::Result<FlashcardDraft, TermFailure> {
        if model.back_field().is_none() {
            return Err(TermFailure::RecordMapping(format!(
                "card model {} needs a front and a back field",
                model.name
            )));
        }

        let front = sanitize_front(&term.text);
        if front.trim().is_empty() {
            return Err(TermFailure::RecordMapping(format!(
                "term {} has no text",
                term.id
            )));
        }

        Ok(FlashcardDraft {
            front,
            back: sanitize_back(&term.translation, self.collection.line_break()),
            ease_factor: self.config.adjust_ease.then(|| ease_for_status(term.status)),
            tags: Vec::new(),
        })
    }
}

/// Add a card for every term of `language` to `collection`
pub fn synthesize<C: HostCollection>(
    collection: &C,
    terms: &[TermRecord],
    language: LanguageId,
    config: &SynthesisConfig,
) -> Result<SynthesisReport> {
    Synthesizer::new(collection, config).synthesize(terms, language)
}
