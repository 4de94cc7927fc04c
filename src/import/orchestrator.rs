//! Sequencing of one import run: lexicon read, then card synthesis
//!
//! Every run starts from `Idle` and ends in `Completed` or `Failed`; nothing
//! carries over between runs except the startup guard in [`AutoImport`].

use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use super::models::{ImportPreview, ImportRequest, ImportSummary};
use crate::flashcards::{synthesize, HostCollection, SynthesisError};
use crate::lexicon::{self, FilterConfig, LexiconError};
use crate::settings::SettingsStore;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Lexicon error: {0}")]
    Lexicon(#[from] LexiconError),

    #[error("{0}")]
    Synthesis(#[from] SynthesisError),

    #[error("No language selected and the lexicon holds more than one")]
    NoLanguageSelected,

    #[error("LUTE database path is not set")]
    SourceNotSet,

    #[error("Language not found in lexicon: {0}")]
    LanguageNotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Started by the user, who always gets a message back
    Interactive,
    /// Started once per session; failures are only logged
    Automatic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed(ImportSummary),
    Failed(String),
}

impl RunState {
    fn label(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Completed(_) => "completed",
            RunState::Failed(_) => "failed",
        }
    }
}

/// One pass through the state machine
#[derive(Debug, Clone)]
pub struct ImportRun {
    mode: ImportMode,
    state: RunState,
}

impl ImportRun {
    fn new(mode: ImportMode) -> Self {
        Self {
            mode,
            state: RunState::Idle,
        }
    }

    fn transition(&mut self, next: RunState) {
        log::debug!(
            "{:?} import: {} -> {}",
            self.mode,
            self.state.label(),
            next.label()
        );
        self.state = next;
    }

    pub fn mode(&self) -> ImportMode {
        self.mode
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn summary(&self) -> Option<&ImportSummary> {
        match &self.state {
            RunState::Completed(summary) => Some(summary),
            _ => None,
        }
    }

    /// The single end-of-run message, if this run shows one
    ///
    /// Interactive runs always have one. Automatic runs stay quiet on failure.
    pub fn user_message(&self) -> Option<String> {
        match (&self.state, self.mode) {
            (RunState::Completed(summary), _) => Some(summary.message()),
            (RunState::Failed(e), ImportMode::Interactive) => Some(format!("Import failed: {}", e)),
            _ => None,
        }
    }
}

/// Read the lexicon without writing anything
pub fn preview(path: &Path, filter: &FilterConfig) -> Result<ImportPreview, ImportError> {
    let snapshot = lexicon::fetch(path, filter)?;
    Ok(ImportPreview::from_snapshot(&snapshot))
}

/// Runs imports into one host collection
pub struct ImportOrchestrator<'a, C: HostCollection> {
    collection: &'a C,
}

impl<'a, C: HostCollection> ImportOrchestrator<'a, C> {
    pub fn new(collection: &'a C) -> Self {
        Self { collection }
    }

    pub fn run_interactive(&self, request: &ImportRequest) -> ImportRun {
        self.run(request, ImportMode::Interactive)
    }

    pub fn run(&self, request: &ImportRequest, mode: ImportMode) -> ImportRun {
        let mut run = ImportRun::new(mode);
        run.transition(RunState::Running);

        match self.execute(request) {
            Ok(summary) => {
                log::info!("{}", summary.message());
                run.transition(RunState::Completed(summary));
            }
            Err(e) => {
                log::error!("Import from {} failed: {}", request.source_path.display(), e);
                run.transition(RunState::Failed(e.to_string()));
            }
        }

        run
    }

    fn execute(&self, request: &ImportRequest) -> Result<ImportSummary, ImportError> {
        let snapshot = lexicon::fetch(&request.source_path, &request.filter)?;
        if snapshot.is_empty() {
            return Ok(ImportSummary::empty(&request.synthesis.deck_name));
        }

        let language = request.resolve_language(&snapshot)?;
        log::info!(
            "{} of {} terms belong to language {}",
            snapshot.terms_for_language(language).count(),
            snapshot.terms.len(),
            language
        );
        let report = synthesize(self.collection, &snapshot.terms, language, &request.synthesis)?;

        Ok(ImportSummary {
            terms_loaded: snapshot.terms.len(),
            cards_inserted: report.inserted(),
            duplicates: report.duplicates(),
            failures: report.failures(),
            deck_name: request.synthesis.deck_name.clone(),
            language_id: Some(language),
        })
    }
}

/// Why the startup import did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupSkip {
    AlreadyRan,
    CollectionNotLoaded,
    Disabled,
    SourceNotSet,
}

#[derive(Debug, Clone)]
pub enum StartupOutcome {
    Skipped(StartupSkip),
    Finished(ImportRun),
}

/// Startup import, at most once per session
#[derive(Debug, Default)]
pub struct AutoImport {
    has_run: bool,
}

impl AutoImport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_run(&self) -> bool {
        self.has_run
    }

    /// Run the startup import if every precondition holds
    ///
    /// Checked in order: not run yet, collection loaded, flag enabled, source
    /// path set. A failed check touches neither the lexicon nor the collection.
    pub fn run_on_startup<C: HostCollection>(
        &mut self,
        store: &SettingsStore,
        collection: &C,
        today: NaiveDate,
    ) -> StartupOutcome {
        if self.has_run {
            return StartupOutcome::Skipped(StartupSkip::AlreadyRan);
        }
        if !collection.is_loaded() {
            log::warn!("Auto-import skipped: collection is not loaded");
            return StartupOutcome::Skipped(StartupSkip::CollectionNotLoaded);
        }

        let settings = store.load();
        if !settings.auto_import_on_startup {
            log::debug!("Auto-import disabled");
            return StartupOutcome::Skipped(StartupSkip::Disabled);
        }

        let request = match ImportRequest::from_settings(&settings, today) {
            Ok(request) => request,
            Err(e) => {
                log::error!("Auto-import failed: {}", e);
                return StartupOutcome::Skipped(StartupSkip::SourceNotSet);
            }
        };

        self.has_run = true;
        log::info!("Starting auto-import from {}", request.source_path.display());
        StartupOutcome::Finished(ImportOrchestrator::new(collection).run(&request, ImportMode::Automatic))
    }
}
