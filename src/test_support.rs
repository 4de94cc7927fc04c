//! Fixtures shared by the unit tests: a throwaway `lute.db` and a temporary collection

use std::cell::Cell;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use tempfile::TempDir;

use crate::flashcards::{
    CardModel, CollectionError, FlashcardDraft, FlashcardStorage, HostCollection,
};
use crate::lexicon::LEXICON_FILE_NAME;

const LEXICON_SCHEMA: &str = r#"
    CREATE TABLE languages (
        LgID INTEGER PRIMARY KEY,
        LgName TEXT NOT NULL
    );
    CREATE TABLE words (
        WoID INTEGER PRIMARY KEY,
        WoLgID INTEGER NOT NULL,
        WoText TEXT NOT NULL,
        WoTextLC TEXT NOT NULL,
        WoStatus INTEGER NOT NULL,
        WoTranslation TEXT,
        WoRomanization TEXT,
        WoTokenCount INTEGER,
        WoCreated TEXT NOT NULL,
        WoStatusChanged TEXT
    );
    CREATE TABLE tags (
        TgID INTEGER PRIMARY KEY,
        TgText TEXT NOT NULL,
        TgComment TEXT
    );
    CREATE TABLE wordtags (
        WtWoID INTEGER NOT NULL,
        WtTgID INTEGER NOT NULL
    );
    CREATE TABLE wordimages (
        WiID INTEGER PRIMARY KEY,
        WiWoID INTEGER NOT NULL,
        WiSource TEXT
    );
    CREATE TABLE wordparents (
        WpWoID INTEGER NOT NULL,
        WpParentWoID INTEGER NOT NULL
    );
"#;

/// A `lute.db` inside a temporary directory
pub struct LexiconFixture {
    _dir: TempDir,
    path: PathBuf,
    conn: Connection,
}

impl LexiconFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(LEXICON_FILE_NAME);
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(LEXICON_SCHEMA).unwrap();
        Self {
            _dir: dir,
            path,
            conn,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn add_language(&self, id: i64, name: &str) {
        self.conn
            .execute(
                "INSERT INTO languages (LgID, LgName) VALUES (?1, ?2)",
                params![id, name],
            )
            .unwrap();
    }

    pub fn add_term(
        &self,
        id: i64,
        language_id: i64,
        text: &str,
        translation: Option<&str>,
        status: i64,
        created: &str,
    ) {
        self.conn
            .execute(
                "INSERT INTO words (WoID, WoLgID, WoText, WoTextLC, WoStatus, WoTranslation, WoCreated, WoStatusChanged)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![id, language_id, text, text.to_lowercase(), status, translation, created],
            )
            .unwrap();
    }

    pub fn tag_term(&self, term_id: i64, tag: &str) {
        self.conn
            .execute("INSERT INTO tags (TgText) VALUES (?1)", params![tag])
            .unwrap();
        let tag_id = self.conn.last_insert_rowid();
        self.conn
            .execute(
                "INSERT INTO wordtags (WtWoID, WtTgID) VALUES (?1, ?2)",
                params![term_id, tag_id],
            )
            .unwrap();
    }

    pub fn add_parent(&self, term_id: i64, parent_id: i64) {
        self.conn
            .execute(
                "INSERT INTO wordparents (WpWoID, WpParentWoID) VALUES (?1, ?2)",
                params![term_id, parent_id],
            )
            .unwrap();
    }
}

/// A file-backed collection in a temporary directory
pub fn temp_collection() -> (FlashcardStorage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let storage = FlashcardStorage::new(temp_dir.path().join("collection"));
    storage.init().unwrap();
    (storage, temp_dir)
}

/// Wraps a collection and counts calls that read or write cards
pub struct CountingCollection<C> {
    pub inner: C,
    pub lookups: Cell<usize>,
    pub inserts: Cell<usize>,
    pub fail_inserts_for: Option<String>,
}

impl<C> CountingCollection<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            lookups: Cell::new(0),
            inserts: Cell::new(0),
            fail_inserts_for: None,
        }
    }
}

impl<C: HostCollection> HostCollection for CountingCollection<C> {
    type DeckId = C::DeckId;
    type NoteId = C::NoteId;

    fn is_loaded(&self) -> bool {
        self.inner.is_loaded()
    }

    fn deck_id(&self, name: &str) -> Result<Option<Self::DeckId>, CollectionError> {
        self.inner.deck_id(name)
    }

    fn card_model(&self, name: &str) -> Result<Option<CardModel>, CollectionError> {
        self.inner.card_model(name)
    }

    fn find_cards_by_front(&self, front: &str) -> Result<Vec<Self::NoteId>, CollectionError> {
        self.lookups.set(self.lookups.get() + 1);
        self.inner.find_cards_by_front(front)
    }

    fn add_card(
        &self,
        model: &CardModel,
        draft: &FlashcardDraft,
        deck: &Self::DeckId,
    ) -> Result<Self::NoteId, CollectionError> {
        self.inserts.set(self.inserts.get() + 1);
        if self.fail_inserts_for.as_deref() == Some(draft.front.as_str()) {
            return Err(CollectionError::Rejected(format!(
                "refusing to add {}",
                draft.front
            )));
        }
        self.inner.add_card(model, draft, deck)
    }

    fn line_break(&self) -> &str {
        self.inner.line_break()
    }
}
