//! Import runs, interactive and at startup
//!
//! Data flows one way: settings, then the lexicon, then the host collection.

mod models;
mod orchestrator;

pub use models::{
    cutoff_date, ImportPreview, ImportRequest, ImportSummary, LanguageChoice, LanguagePreview,
};
pub use orchestrator::{
    preview, AutoImport, ImportError, ImportMode, ImportOrchestrator, ImportRun, RunState,
    StartupOutcome, StartupSkip,
};
