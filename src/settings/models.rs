//! Typed settings and the filter and synthesis configs derived from them

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::flashcards::SynthesisConfig;
use crate::lexicon::{FilterConfig, LanguageId};

/// Value stored for the lexicon path until one has been picked
pub const UNSET_SOURCE_PATH: &str = "Open file manager";

/// Every setting the importer reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    #[serde(rename = "lutedb_path", default = "default_source_path")]
    pub source_path: String,
    #[serde(default)]
    pub parents_only: bool,
    #[serde(rename = "empty_translation", default)]
    pub allow_empty_translation: bool,
    #[serde(default)]
    pub allow_duplicates: bool,
    #[serde(rename = "import_tags", default)]
    pub import_source_tags: bool,
    #[serde(default = "default_deck")]
    pub selected_deck: String,
    #[serde(default = "default_model")]
    pub selected_model: String,
    #[serde(default)]
    pub adjust_ease: bool,
    #[serde(rename = "include_WKI", default)]
    pub include_well_known_or_ignored: bool,
    #[serde(default)]
    pub include_unknown: bool,
    #[serde(default)]
    pub selected_lang: Option<LanguageId>,
    /// Only import terms created in the last N days
    #[serde(default)]
    pub last_days: Option<u32>,
    /// Extra tags added to every card
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub auto_import_on_startup: bool,
    #[serde(default)]
    pub dedupe_tags: bool,
}

fn default_source_path() -> String {
    UNSET_SOURCE_PATH.to_string()
}

fn default_deck() -> String {
    "Default".to_string()
}

fn default_model() -> String {
    "Basic".to_string()
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            source_path: default_source_path(),
            parents_only: false,
            allow_empty_translation: false,
            allow_duplicates: false,
            import_source_tags: false,
            selected_deck: default_deck(),
            selected_model: default_model(),
            adjust_ease: false,
            include_well_known_or_ignored: false,
            include_unknown: false,
            selected_lang: None,
            last_days: None,
            tags: Vec::new(),
            auto_import_on_startup: false,
            dedupe_tags: false,
        }
    }
}

impl ImportSettings {
    /// The lexicon path, unless it is still the unset placeholder
    pub fn source_path(&self) -> Option<PathBuf> {
        let path = self.source_path.trim();
        if path.is_empty() || path == UNSET_SOURCE_PATH {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }

    pub fn filter_config(&self, cutoff_date: NaiveDate) -> FilterConfig {
        FilterConfig {
            parents_only: self.parents_only,
            allow_empty_translation: self.allow_empty_translation,
            include_well_known_or_ignored: self.include_well_known_or_ignored,
            include_unknown_status: self.include_unknown,
            cutoff_date,
        }
    }

    pub fn synthesis_config(&self) -> SynthesisConfig {
        SynthesisConfig {
            model_name: self.selected_model.clone(),
            deck_name: self.selected_deck.clone(),
            allow_duplicates: self.allow_duplicates,
            import_source_tags: self.import_source_tags,
            adjust_ease: self.adjust_ease,
            extra_tags: self.tags.clone(),
            dedupe_tags: self.dedupe_tags,
        }
    }
}
