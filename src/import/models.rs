use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::flashcards::SynthesisConfig;
use crate::lexicon::{FilterConfig, LanguageId, LanguageRecord, LexiconSnapshot};
use crate::settings::ImportSettings;

use super::orchestrator::ImportError;

/// Number of sample terms listed in a preview
const PREVIEW_SAMPLE_SIZE: usize = 10;

/// Earliest creation date a run imports
///
/// `None` means today only.
pub fn cutoff_date(today: NaiveDate, last_days: Option<u32>) -> NaiveDate {
    match last_days {
        Some(days) => today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN),
        None => today,
    }
}

/// How the user picked the language to import
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageChoice {
    Id(LanguageId),
    Name(String),
}

impl LanguageChoice {
    /// Resolve against the languages present in `snapshot`
    ///
    /// An id is taken as-is; a name has to match one of the present languages.
    pub fn resolve(&self, snapshot: &LexiconSnapshot) -> Result<LanguageId, ImportError> {
        match self {
            LanguageChoice::Id(id) => Ok(*id),
            LanguageChoice::Name(name) => snapshot
                .language_by_name(name)
                .map(|l| l.id)
                .ok_or_else(|| ImportError::LanguageNotFound(name.clone())),
        }
    }
}

/// Everything one run needs, fixed before the run starts
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub source_path: PathBuf,
    pub filter: FilterConfig,
    /// `None` picks the only language present, if there is exactly one
    pub language: Option<LanguageChoice>,
    pub synthesis: SynthesisConfig,
}

impl ImportRequest {
    pub fn from_settings(settings: &ImportSettings, today: NaiveDate) -> Result<Self, ImportError> {
        let source_path = settings.source_path().ok_or(ImportError::SourceNotSet)?;
        let cutoff = cutoff_date(today, settings.last_days);

        Ok(Self {
            source_path,
            filter: settings.filter_config(cutoff),
            language: settings.selected_lang.map(LanguageChoice::Id),
            synthesis: settings.synthesis_config(),
        })
    }

    pub(crate) fn resolve_language(&self, snapshot: &LexiconSnapshot) -> Result<LanguageId, ImportError> {
        match &self.language {
            Some(choice) => choice.resolve(snapshot),
            None => match snapshot.languages.as_slice() {
                [only] => Ok(only.id),
                _ => Err(ImportError::NoLanguageSelected),
            },
        }
    }
}

/// What a finished run did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Terms returned by the lexicon, all languages
    pub terms_loaded: usize,
    pub cards_inserted: usize,
    pub duplicates: usize,
    pub failures: usize,
    pub deck_name: String,
    pub language_id: Option<LanguageId>,
}

impl ImportSummary {
    pub fn empty(deck_name: &str) -> Self {
        Self {
            terms_loaded: 0,
            cards_inserted: 0,
            duplicates: 0,
            failures: 0,
            deck_name: deck_name.to_string(),
            language_id: None,
        }
    }

    /// Terms that produced no card, whatever the reason
    pub fn ignored(&self) -> usize {
        self.terms_loaded.saturating_sub(self.cards_inserted)
    }

    pub fn message(&self) -> String {
        if self.terms_loaded == 0 {
            return "No new terms found.".to_string();
        }
        format!(
            "Total {} cards successfully added to deck {}\n(ignored {} duplicates)",
            self.cards_inserted,
            self.deck_name,
            self.ignored()
        )
    }
}

/// Languages and terms a run would pick up, without touching the collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub term_count: usize,
    pub languages: Vec<LanguagePreview>,
    /// First few term texts, in lexicon order
    pub sample_terms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagePreview {
    pub id: LanguageId,
    pub name: String,
    pub term_count: usize,
}

impl ImportPreview {
    pub fn from_snapshot(snapshot: &LexiconSnapshot) -> Self {
        let counts: BTreeMap<LanguageId, usize> = snapshot.term_counts();
        let languages = snapshot
            .languages
            .iter()
            .map(|LanguageRecord { id, display_name }| LanguagePreview {
                id: *id,
                name: display_name.clone(),
                term_count: counts.get(id).copied().unwrap_or(0),
            })
            .collect();

        Self {
            term_count: snapshot.terms.len(),
            languages,
            sample_terms: snapshot
                .terms
                .iter()
                .take(PREVIEW_SAMPLE_SIZE)
                .map(|t| t.text.clone())
                .collect(),
        }
    }
}
