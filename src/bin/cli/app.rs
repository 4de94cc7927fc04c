use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use lexicard_lib::flashcards::{AnkiConnect, FlashcardStorage};
use lexicard_lib::settings::{ImportSettings, SettingsStore};

/// Where cards are written
pub enum Backend {
    Local(FlashcardStorage),
    Anki(AnkiConnect),
}

/// Shared application state for CLI commands
pub struct App {
    pub settings: SettingsStore,
    pub backend: Backend,
}

impl App {
    pub fn new(
        config_path: Option<&Path>,
        collection_dir: Option<&Path>,
        anki_url: Option<&str>,
        front_field: &str,
    ) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => SettingsStore::default_path().context("Failed to get config directory")?,
        };
        let settings = SettingsStore::new(config_path);

        let backend = match anki_url {
            Some(url) => Backend::Anki(AnkiConnect::new(url).with_front_field(front_field)),
            None => {
                let dir = match collection_dir {
                    Some(dir) => dir.to_path_buf(),
                    None => FlashcardStorage::default_collection_dir()
                        .context("Failed to get data directory")?,
                };
                let storage = FlashcardStorage::new(dir);
                storage
                    .init()
                    .context("Failed to initialize card collection")?;
                Backend::Local(storage)
            }
        };

        Ok(Self { settings, backend })
    }

    pub fn load_settings(&self) -> ImportSettings {
        self.settings.load()
    }

    /// Lexicon path from the command line, else from settings
    pub fn source_path(&self, path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => self.load_settings().source_path().context(
                "LUTE database path is not set; pass --path or run `config set lutedb_path <file>`",
            ),
        }
    }
}
