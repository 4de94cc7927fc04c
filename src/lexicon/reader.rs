//! Read-only access to a LUTE `lute.db` file
//!
//! The lexicon keeps terms in `words`, with optional joins to `wordimages`,
//! `wordtags`/`tags` and `wordparents`. Terms are filtered in SQL; the
//! languages reported back are only the ones present in the filtered result.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OpenFlags, Row};
use thiserror::Error;

use super::models::{FilterConfig, LanguageId, LanguageRecord, LexiconSnapshot, TermRecord};

/// File name every LUTE lexicon database carries
pub const LEXICON_FILE_NAME: &str = "lute.db";

#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("Not a LUTE database, please select a lute.db file: {0}")]
    InvalidSource(PathBuf),

    #[error("Database connection error: {0}")]
    SourceUnavailable(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, LexiconError>;

const TERM_COLUMNS: &str = "w.WoText, w.WoTranslation, w.WoLgID, w.WoCreated, t.TgText, \
     w.WoStatusChanged, w.WoTextLC, w.WoID, w.WoStatus, w.WoRomanization, \
     w.WoTokenCount, wi.WiSource, t.TgComment";

const TERM_JOINS: &str = "LEFT JOIN wordimages AS wi ON w.WoID = wi.WiWoID
    LEFT JOIN wordtags AS wt ON w.WoID = wt.WtWoID
    LEFT JOIN tags AS t ON wt.WtTgID = t.TgID";

/// Reader over a single lexicon file
pub struct LexiconReader {
    conn: Connection,
    path: PathBuf,
}

impl LexiconReader {
    /// Open a lexicon read-only after checking its file name
    pub fn open(path: &Path) -> Result<Self> {
        validate_source(path)?;

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        log::info!("Connected to lexicon database: {}", path.display());

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Read every term accepted by `filter` and the languages they belong to
    pub fn fetch(&self, filter: &FilterConfig) -> Result<LexiconSnapshot> {
        let sql = build_term_query(filter);
        log::debug!("Executing term query: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let terms = stmt
            .query_map(params![format_cutoff(filter.cutoff_date)], |row| {
                term_from_row(row, filter.parents_only)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let languages = self.languages_for(&terms)?;

        log::info!(
            "Retrieved {} terms and {} languages from {}",
            terms.len(),
            languages.len(),
            self.path.display()
        );

        Ok(LexiconSnapshot { terms, languages })
    }

    /// Pair the language ids used by `terms` with their names
    fn languages_for(&self, terms: &[TermRecord]) -> Result<Vec<LanguageRecord>> {
        let used: BTreeSet<LanguageId> = terms.iter().map(|t| t.language_id).collect();
        if used.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self
            .conn
            .prepare("SELECT LgID, LgName FROM languages ORDER BY LgID")?;
        let catalog = stmt
            .query_map([], |row| {
                Ok(LanguageRecord {
                    id: row.get(0)?,
                    display_name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(catalog
            .into_iter()
            .filter(|lang| used.contains(&lang.id))
            .collect())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Open `path` and read the terms accepted by `filter`
pub fn fetch(path: &Path, filter: &FilterConfig) -> Result<LexiconSnapshot> {
    let result = LexiconReader::open(path).and_then(|reader| reader.fetch(filter));
    if let Err(e) = &result {
        log::error!("Failed to read lexicon {}: {}", path.display(), e);
    }
    result
}

/// Reject anything that is not named `lute.db` before touching the file
fn validate_source(path: &Path) -> Result<()> {
    let is_lexicon = path
        .file_name()
        .map_or(false, |name| name == LEXICON_FILE_NAME);
    if is_lexicon {
        Ok(())
    } else {
        Err(LexiconError::InvalidSource(path.to_path_buf()))
    }
}

/// Build the term query for `filter`; the cutoff date is bound as `?1`
pub fn build_term_query(filter: &FilterConfig) -> String {
    let base = if filter.parents_only {
        format!(
            "SELECT DISTINCT {TERM_COLUMNS}, wp.WpParentWoID
    FROM wordparents AS wp
    JOIN words AS w ON wp.WpParentWoID = w.WoID
    {TERM_JOINS}"
        )
    } else {
        format!(
            "SELECT {TERM_COLUMNS}, NULL AS WpParentWoID
    FROM words AS w
    {TERM_JOINS}"
        )
    };

    let mut conditions = vec!["w.WoTranslation IS NOT NULL", "w.WoCreated >= ?1"];

    if !filter.allow_empty_translation {
        conditions.push("w.WoTranslation <> ''");
    }

    // 98 and 99 are ignored / well known
    if !filter.include_well_known_or_ignored {
        conditions.push("w.WoStatus <= 5");
    }

    if !filter.include_unknown_status {
        conditions.push("w.WoStatus >= 1");
    }

    format!("{}\n    WHERE {}", base, conditions.join(" AND "))
}

fn format_cutoff(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn term_from_row(row: &Row, parents_only: bool) -> rusqlite::Result<TermRecord> {
    let created: String = row.get(3)?;
    let created_at = parse_timestamp(&created)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    let status_changed: Option<String> = row.get(5)?;

    Ok(TermRecord {
        text: row.get(0)?,
        translation: row.get(1)?,
        language_id: row.get(2)?,
        created_at,
        tag_text: row.get(4)?,
        status_changed_at: status_changed.and_then(|s| parse_timestamp(&s).ok()),
        text_lowercase: row.get(6)?,
        id: row.get(7)?,
        status: row.get(8)?,
        romanization: row.get(9)?,
        token_count: row.get(10)?,
        image_source: row.get(11)?,
        comment: row.get(12)?,
        parent_id: if parents_only { row.get(13)? } else { None },
    })
}

/// Parse a LUTE timestamp (`YYYY-MM-DD HH:MM:SS`, ISO `T` form or a bare date)
pub fn parse_timestamp(value: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::LexiconFixture;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_fixture() -> LexiconFixture {
        let fixture = LexiconFixture::new();
        fixture.add_language(1, "Spanish");
        fixture.add_language(2, "German");
        fixture.add_language(3, "French");

        fixture.add_term(1, 1, "hola", Some("hello"), 1, "2024-03-01 10:00:00");
        fixture.add_term(2, 1, "perro", Some("dog"), 3, "2024-03-02 10:00:00");
        fixture.add_term(3, 1, "gato", Some(""), 2, "2024-03-03 10:00:00");
        fixture.add_term(4, 1, "casa", None, 4, "2024-03-04 10:00:00");
        fixture.add_term(5, 2, "Hund", Some("dog"), 0, "2024-03-05 10:00:00");
        fixture.add_term(6, 2, "Katze", Some("cat"), 98, "2024-03-06 10:00:00");
        fixture.add_term(7, 2, "Haus", Some("house"), 99, "2024-01-01 10:00:00");
        fixture.add_term(8, 2, "Baum", Some("tree"), 5, "2023-12-31 23:59:59");
        fixture.add_term(9, 1, "perros", Some("dogs"), 3, "2024-03-07 10:00:00");
        fixture.add_term(10, 1, "gatos", Some("cats"), 1, "2024-03-08 10:00:00");
        fixture.add_parent(9, 2);
        fixture.add_parent(10, 3);
        fixture.add_parent(1, 2);
        fixture.tag_term(2, "noun");
        fixture
    }

    #[test]
    fn test_rejects_non_lexicon_file_name() {
        let filter = FilterConfig::new(date(2024, 1, 1));
        let result = fetch(Path::new("/tmp/not-a-lexicon.db"), &filter);
        assert!(matches!(result, Err(LexiconError::InvalidSource(_))));
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::TempDir::new().unwrap();
        let filter = FilterConfig::new(date(2024, 1, 1));
        let result = fetch(&dir.path().join(LEXICON_FILE_NAME), &filter);
        assert!(matches!(result, Err(LexiconError::SourceUnavailable(_))));
    }

    #[test]
    fn test_default_filter() {
        let fixture = sample_fixture();
        let filter = FilterConfig::new(date(2024, 1, 1));

        let snapshot = fetch(fixture.path(), &filter).unwrap();
        let mut ids: Vec<i64> = snapshot.terms.iter().map(|t| t.id).collect();
        ids.sort();

        // 3 empty translation, 4 null, 5 unknown, 6/7 ignored or known, 8 too old
        assert_eq!(ids, vec![1, 2, 9, 10]);
        assert_eq!(
            snapshot.languages,
            vec![LanguageRecord {
                id: 1,
                display_name: "Spanish".to_string()
            }]
        );
    }

    #[test]
    fn test_languages_only_include_present_ones() {
        let fixture = sample_fixture();
        let mut filter = FilterConfig::new(date(2024, 1, 1));
        filter.include_unknown_status = true;
        filter.include_well_known_or_ignored = true;

        let snapshot = fetch(fixture.path(), &filter).unwrap();
        let names: Vec<&str> = snapshot
            .languages
            .iter()
            .map(|l| l.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["Spanish", "German"]);
    }

    #[test]
    fn test_source_tag_is_read() {
        let fixture = sample_fixture();
        let filter = FilterConfig::new(date(2024, 1, 1));

        let snapshot = fetch(fixture.path(), &filter).unwrap();
        let perro = snapshot.terms.iter().find(|t| t.id == 2).unwrap();
        assert_eq!(perro.tag_text.as_deref(), Some("noun"));
        assert_eq!(perro.status, 3);
        assert_eq!(perro.parent_id, None);
    }

    #[test]
    fn test_parents_only_collapses_duplicates() {
        let fixture = sample_fixture();
        let mut filter = FilterConfig::new(date(2024, 1, 1));
        filter.parents_only = true;
        filter.allow_empty_translation = true;

        let snapshot = fetch(fixture.path(), &filter).unwrap();
        let mut ids: Vec<i64> = snapshot.terms.iter().map(|t| t.id).collect();
        ids.sort();

        // perro is the parent of two terms but appears once
        assert_eq!(ids, vec![2, 3]);
        assert!(snapshot.terms.iter().all(|t| t.parent_id == Some(t.id)));
    }

    #[test]
    fn test_every_flag_combination_respects_predicates() {
        let fixture = sample_fixture();
        let cutoffs = [date(2023, 1, 1), date(2024, 1, 1), date(2024, 3, 4), date(2025, 1, 1)];

        for mask in 0u8..16 {
            for cutoff in cutoffs {
                let filter = FilterConfig {
                    parents_only: mask & 1 != 0,
                    allow_empty_translation: mask & 2 != 0,
                    include_well_known_or_ignored: mask & 4 != 0,
                    include_unknown_status: mask & 8 != 0,
                    cutoff_date: cutoff,
                };

                let snapshot = fetch(fixture.path(), &filter).unwrap();
                for term in &snapshot.terms {
                    assert!(
                        filter.accepts(term),
                        "term {} violates {:?}",
                        term.id,
                        filter
                    );
                    if filter.parents_only {
                        assert_eq!(term.parent_id, Some(term.id));
                    }
                }

                let languages: BTreeSet<LanguageId> =
                    snapshot.terms.iter().map(|t| t.language_id).collect();
                let reported: BTreeSet<LanguageId> =
                    snapshot.languages.iter().map(|l| l.id).collect();
                assert_eq!(languages, reported);
            }
        }
    }

    #[test]
    fn test_query_binds_cutoff() {
        let filter = FilterConfig::new(date(2024, 5, 6));
        let sql = build_term_query(&filter);
        assert!(sql.contains("w.WoCreated >= ?1"));
        assert!(!sql.contains("2024-05-06"));
        assert!(sql.contains("w.WoStatus <= 5"));
        assert!(sql.contains("w.WoStatus >= 1"));
        assert!(sql.contains("w.WoTranslation <> ''"));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = date(2024, 2, 3).and_hms_opt(4, 5, 6).unwrap();
        assert_eq!(parse_timestamp("2024-02-03 04:05:06").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-02-03T04:05:06").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-02-03").unwrap(),
            date(2024, 2, 3).and_hms_opt(0, 0, 0).unwrap()
        );
        assert!(parse_timestamp("yesterday").is_err());
    }
}
