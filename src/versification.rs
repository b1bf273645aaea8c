//! Versification: how many verses each chapter has.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Lookup of the last legal verse of a chapter.
pub trait Versification {
    /// `None` when the chapter is unknown; callers treat that as unlimited.
    fn max_verse(&self, book: u32, chapter: u32) -> Option<u32>;
}

/// Versification that never limits verse numbers.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unlimited;

impl Versification for Unlimited {
    fn max_verse(&self, _book: u32, _chapter: u32) -> Option<u32> {
        None
    }
}

/// Verse counts per chapter, keyed by canonical book number. JSON form:
/// `{"1": [31, 25, 24]}` (Genesis 1 has 31 verses, chapter 2 has 25, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersificationTable {
    books: BTreeMap<u32, Vec<u32>>,
}

impl VersificationTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_book(mut self, book: u32, verse_counts: Vec<u32>) -> Self {
        self.books.insert(book, verse_counts);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let table: Self = serde_json::from_str(json)?;
        for (book, counts) in &table.books {
            if let Some(idx) = counts.iter().position(|count| *count == 0) {
                return Err(ConfigError::EmptyChapter {
                    book: *book,
                    chapter: idx as u32 + 1,
                });
            }
        }
        Ok(table)
    }

    pub fn chapter_count(&self, book: u32) -> Option<u32> {
        self.books.get(&book).map(|counts| counts.len() as u32)
    }
}

impl Versification for VersificationTable {
    fn max_verse(&self, book: u32, chapter: u32) -> Option<u32> {
        let index = chapter.checked_sub(1)? as usize;
        self.books.get(&book)?.get(index).copied()
    }
}

impl<V: Versification + ?Sized> Versification for Box<V> {
    fn max_verse(&self, book: u32, chapter: u32) -> Option<u32> {
        (**self).max_verse(book, chapter)
    }
}
