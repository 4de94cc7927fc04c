//! Persisted import settings
//!
//! Settings live in a JSON file whose keys match the LUTE importer add-on's
//! `config.json`, so an existing add-on config can be pointed at directly.

mod models;
mod storage;

pub use models::*;
pub use storage::{SettingsError, SettingsStore};
