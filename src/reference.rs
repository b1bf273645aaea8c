//! Scripture references and the per-section reference cache.
//!
//! A section's cached range is derived from the chapter and verse number
//! runs of its content, continuing from the state the previous
//! non-introduction section ended in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{BOOK_FACTOR, CHAPTER_FACTOR, EditorConfig, MAX_CHAPTER, MAX_VERSE};
use crate::model::{Book, Run, Section, Text};
use crate::stylesheet::{Context, Stylesheet};

/// Encoded reference: `book * 1_000_000 + chapter * 1_000 + verse`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScrReference(u32);

impl ScrReference {
    /// Chapter and verse are clamped to what the encoding holds; the book
    /// saturates at `u32::MAX`.
    pub const fn new(book: u32, chapter: u32, verse: u32) -> Self {
        let chapter = if chapter > MAX_CHAPTER { MAX_CHAPTER } else { chapter };
        let verse = if verse > MAX_VERSE { MAX_VERSE } else { verse };
        Self(
            book.saturating_mul(BOOK_FACTOR)
                .saturating_add(chapter * CHAPTER_FACTOR + verse),
        )
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn book(self) -> u32 {
        self.0 / BOOK_FACTOR
    }

    pub const fn chapter(self) -> u32 {
        self.0 % BOOK_FACTOR / CHAPTER_FACTOR
    }

    pub const fn verse(self) -> u32 {
        self.0 % CHAPTER_FACTOR
    }
}

impl fmt::Display for ScrReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book(), self.chapter(), self.verse())
    }
}

/// A parsed chapter or verse number run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    Chapter(u32),
    /// A single verse has `first == last`; a bridge has `first < last`.
    Verse { first: u32, last: u32 },
}

impl Marker {
    pub fn is_bridge(self) -> bool {
        matches!(self, Marker::Verse { first, last } if first != last)
    }
}

/// True for runs carrying the chapter or verse number style, parsable or not.
pub fn is_marker_run(run: &Run, config: &EditorConfig) -> bool {
    run.style
        .as_deref()
        .is_some_and(|style| config.styles.is_marker_style(style))
}

/// Parses a marker run. Numbers the reference encoding cannot hold read as
/// unparsable.
pub fn marker_of(run: &Run, config: &EditorConfig) -> Option<Marker> {
    let style = run.style.as_deref()?;
    if style == config.styles.chapter_number {
        parse_number(&run.text)
            .filter(|&chapter| chapter <= MAX_CHAPTER)
            .map(Marker::Chapter)
    } else if style == config.styles.verse_number {
        let (first, last) = parse_verse_number(&run.text, config.bridge_separator)?;
        (last <= MAX_VERSE).then_some(Marker::Verse { first, last })
    } else {
        None
    }
}

fn parse_number(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Parses `"7"` or a bridge such as `"6-8"`. A bridge whose end does not
/// exceed its start reads as the single start verse.
pub fn parse_verse_number(text: &str, separator: char) -> Option<(u32, u32)> {
    match text.split_once(separator) {
        Some((first, last)) => {
            let first = parse_number(first)?;
            let last = parse_number(last).unwrap_or(first).max(first);
            Some((first, last))
        }
        None => parse_number(text).map(|verse| (verse, verse)),
    }
}

pub fn format_verse_number(first: u32, last: u32, separator: char) -> String {
    if first == last {
        first.to_string()
    } else {
        format!("{first}{separator}{last}")
    }
}

pub fn section_is_intro(section: &Section, stylesheet: &Stylesheet) -> bool {
    stylesheet.section_context(section) == Context::Introduction
}

/// `(chapter, verse)` carried into the section at `index`.
pub fn carried_state(book: &Book, index: usize, stylesheet: &Stylesheet) -> (u32, u32) {
    book.sections[..index.min(book.sections.len())]
        .iter()
        .rev()
        .find(|section| !section_is_intro(section, stylesheet))
        .map(|section| (section.ref_max.chapter(), section.ref_max.verse()))
        .unwrap_or((1, 0))
}

/// Computes the `(min, max)` range a section would cache, without storing it.
pub fn scan_section(
    book: &Book,
    index: usize,
    stylesheet: &Stylesheet,
    config: &EditorConfig,
) -> Option<(ScrReference, ScrReference)> {
    let section = book.sections.get(index)?;
    if section_is_intro(section, stylesheet) {
        let intro = ScrReference::new(book.canonical_num, 1, 0);
        return Some((intro, intro));
    }
    let carried = carried_state(book, index, stylesheet);
    Some(scan_content(book.canonical_num, &section.content, carried, config))
}

fn scan_content(
    book_num: u32,
    content: &Text,
    carried: (u32, u32),
    config: &EditorConfig,
) -> (ScrReference, ScrReference) {
    let (mut chapter, mut verse) = carried;
    let mut min: Option<ScrReference> = None;
    let mut max: Option<ScrReference> = None;

    for run in content.paragraphs.iter().flat_map(|p| p.runs.iter()) {
        match marker_of(run, config) {
            Some(Marker::Chapter(number)) => {
                chapter = number;
                verse = 1;
                let reference = ScrReference::new(book_num, chapter, verse);
                min.get_or_insert(reference);
                max = Some(reference);
            }
            Some(Marker::Verse { first, last }) => {
                min.get_or_insert(ScrReference::new(book_num, chapter, first));
                verse = last;
                max = Some(ScrReference::new(book_num, chapter, last));
            }
            None if !is_marker_run(run, config) && !run.text.trim().is_empty() => {
                verse = verse.max(1);
                let reference = ScrReference::new(book_num, chapter, verse);
                min.get_or_insert(reference);
                max = Some(max.map_or(reference, |m| m.max(reference)));
            }
            None => {}
        }
    }

    let fallback = ScrReference::new(book_num, carried.0, carried.1.max(1));
    (min.unwrap_or(fallback), max.unwrap_or(fallback))
}

pub fn recompute_references(
    book: &mut Book,
    index: usize,
    stylesheet: &Stylesheet,
    config: &EditorConfig,
) {
    let Some((min, max)) = scan_section(book, index, stylesheet, config) else {
        return;
    };
    if let Some(section) = book.sections.get_mut(index) {
        tracing::trace!(section = index, %min, %max, "recomputed references");
        section.ref_min = min;
        section.ref_max = max;
    }
}

/// Recomputes `from..` in order; each section's carried state depends on
/// its predecessor.
pub fn refresh_references(
    book: &mut Book,
    from: usize,
    stylesheet: &Stylesheet,
    config: &EditorConfig,
) {
    for index in from..book.sections.len() {
        recompute_references(book, index, stylesheet, config);
    }
}

/// Where a section starts, when that is not uniquely determined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartReference {
    Exact(ScrReference),
    /// Content opens with empty paragraphs before its first marker: the
    /// section may start at the carried reference or at the first marker.
    /// The cache holds `first_marker`.
    Ambiguous {
        carried: ScrReference,
        first_marker: ScrReference,
    },
}

impl StartReference {
    pub fn accepts(&self, reference: ScrReference) -> bool {
        match *self {
            StartReference::Exact(r) => r == reference,
            StartReference::Ambiguous {
                carried,
                first_marker,
            } => reference == carried || reference == first_marker,
        }
    }
}

pub fn start_reference_candidates(
    book: &Book,
    index: usize,
    stylesheet: &Stylesheet,
    config: &EditorConfig,
) -> Option<StartReference> {
    let section = book.sections.get(index)?;
    let (min, _) = scan_section(book, index, stylesheet, config)?;
    if section_is_intro(section, stylesheet) {
        return Some(StartReference::Exact(min));
    }

    let paragraphs = &section.content.paragraphs;
    let leading_empty = paragraphs.iter().take_while(|p| p.is_empty()).count();
    let opens_with_marker = paragraphs
        .get(leading_empty)
        .and_then(|p| p.runs.iter().find(|run| !run.is_empty()))
        .is_some_and(|run| marker_of(run, config).is_some());

    let (chapter, verse) = carried_state(book, index, stylesheet);
    let carried = ScrReference::new(book.canonical_num, chapter, verse.max(1));
    if leading_empty > 0 && opens_with_marker && carried != min {
        Some(StartReference::Ambiguous {
            carried,
            first_marker: min,
        })
    } else {
        Some(StartReference::Exact(min))
    }
}
