//! LUTE lexicon reader
//!
//! This module provides:
//! - The term and language records read from a `lute.db` file
//! - Filter construction from import flags (status, translation, cutoff date, parents only)
//! - Discovery of the languages actually present in a filtered result

pub mod models;
pub mod reader;

pub use models::*;
pub use reader::{fetch, LexiconError, LexiconReader, LEXICON_FILE_NAME};
