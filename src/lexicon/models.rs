//! Data models for the lexicon reader

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// LUTE language id (`LgID`)
pub type LanguageId = i64;

/// Status codes used by LUTE for a term's learning stage
pub mod status {
    /// Seen but never rated
    pub const UNKNOWN: i64 = 0;
    /// First learning stage
    pub const LEARNING_MIN: i64 = 1;
    /// Last learning stage
    pub const LEARNING_MAX: i64 = 5;
    pub const IGNORED: i64 = 98;
    pub const WELL_KNOWN: i64 = 99;
}

/// One vocabulary entry read from the lexicon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermRecord {
    /// Surface form; multi-word terms are joined with U+200B
    pub text: String,
    pub translation: String,
    pub language_id: LanguageId,
    pub created_at: NaiveDateTime,
    /// At most one tag per term in the lexicon shape we read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_changed_at: Option<NaiveDateTime>,
    pub text_lowercase: String,
    pub id: i64,
    pub status: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub romanization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Only set when the terms were read in parents-only mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

/// A language that appears among the returned terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageRecord {
    pub id: LanguageId,
    pub display_name: String,
}

/// Filter flags applied when reading terms
///
/// Built fresh for every read and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Only return terms that are the parent of some other term
    pub parents_only: bool,
    pub allow_empty_translation: bool,
    /// Also return terms with status 98 (ignored) and 99 (well known)
    pub include_well_known_or_ignored: bool,
    /// Also return terms with status 0
    pub include_unknown_status: bool,
    /// Earliest creation date a term must have
    pub cutoff_date: NaiveDate,
}

impl FilterConfig {
    /// A filter with every flag off and the given cutoff
    pub fn new(cutoff_date: NaiveDate) -> Self {
        Self {
            parents_only: false,
            allow_empty_translation: false,
            include_well_known_or_ignored: false,
            include_unknown_status: false,
            cutoff_date,
        }
    }

    /// Check a term against every active predicate
    pub fn accepts(&self, term: &TermRecord) -> bool {
        if term.created_at.date() < self.cutoff_date {
            return false;
        }
        if !self.allow_empty_translation && term.translation.is_empty() {
            return false;
        }
        if !self.include_well_known_or_ignored && term.status > status::LEARNING_MAX {
            return false;
        }
        if !self.include_unknown_status && term.status < status::LEARNING_MIN {
            return false;
        }
        true
    }
}

/// Terms and languages returned by one read of the lexicon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexiconSnapshot {
    pub terms: Vec<TermRecord>,
    pub languages: Vec<LanguageRecord>,
}

impl LexiconSnapshot {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms belonging to one language, in read order
    pub fn terms_for_language(&self, language_id: LanguageId) -> impl Iterator<Item = &TermRecord> {
        self.terms
            .iter()
            .filter(move |t| t.language_id == language_id)
    }

    /// Number of terms per language id
    pub fn term_counts(&self) -> BTreeMap<LanguageId, usize> {
        let mut counts = BTreeMap::new();
        for term in &self.terms {
            *counts.entry(term.language_id).or_insert(0) += 1;
        }
        counts
    }

    /// Look up a language by its display name (case-insensitive)
    pub fn language_by_name(&self, name: &str) -> Option<&LanguageRecord> {
        let name_lower = name.to_lowercase();
        self.languages
            .iter()
            .find(|l| l.display_name.to_lowercase() == name_lower)
    }
}
