use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::error::{ConfigError, EditError, InvariantViolation, Result};
use crate::model::{Book, Paragraph, Scripture, Slot};
use crate::reference::refresh_references;
use crate::stylesheet::Stylesheet;
use crate::versification::Versification;

mod boundary;
mod content;
mod cursor;
mod inspect;
mod paste;
mod sections;
mod structure;
mod styles;
mod verses;

pub use boundary::ProblemKind;
pub use cursor::snap_to_word_boundary;
pub use paste::InsertOutcome;

use cursor::Anchor;
use inspect::{check_invariants, check_structure, paragraph_ref};
use structure::{BookEdit, ensure_scripture_initialized};

/// Index path to a character inside the document.
///
/// `section` is ignored (and kept at 0) for positions in a book title.
/// `offset` counts characters, not bytes, from the start of the paragraph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub book: usize,
    pub section: usize,
    pub slot: Slot,
    pub paragraph: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(book: usize, section: usize, slot: Slot, paragraph: usize, offset: usize) -> Self {
        let section = if slot == Slot::Title { 0 } else { section };
        Self {
            book,
            section,
            slot,
            paragraph,
            offset,
        }
    }

    pub fn title(book: usize, paragraph: usize, offset: usize) -> Self {
        Self::new(book, 0, Slot::Title, paragraph, offset)
    }

    pub fn heading(book: usize, section: usize, paragraph: usize, offset: usize) -> Self {
        Self::new(book, section, Slot::Heading, paragraph, offset)
    }

    pub fn content(book: usize, section: usize, paragraph: usize, offset: usize) -> Self {
        Self::new(book, section, Slot::Content, paragraph, offset)
    }

    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot {
            Slot::Title => write!(
                f,
                "book {} title paragraph {} offset {}",
                self.book, self.paragraph, self.offset
            ),
            slot => write!(
                f,
                "book {} section {} {:?} paragraph {} offset {}",
                self.book, self.section, slot, self.paragraph, self.offset
            ),
        }
    }
}

/// A range between two positions. The anchor may come after the end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub end: Position,
}

impl Selection {
    pub fn new(anchor: Position, end: Position) -> Self {
        Self { anchor, end }
    }

    pub fn point(position: Position) -> Self {
        Self::new(position, position)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.end
    }

    /// `(start, end)` in reading order.
    pub fn ordered(&self) -> (Position, Position) {
        if self.end < self.anchor {
            (self.end, self.anchor)
        } else {
            (self.anchor, self.end)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnsupportedReason {
    /// The selection spans texts with no single well-defined owner.
    AmbiguousSelection,
    /// The edit would mix incompatible contexts (title, introduction, scripture).
    ContextMismatch,
    /// The edit would move chapter or verse numbers into a heading.
    MarkersInHeading,
    /// The edit would join text across two books.
    CrossesBookBoundary,
    /// The edit would join title text with section text.
    TitleBoundary,
    /// A scripture section cannot precede the book's introduction.
    IntroductionOrder,
}

/// Result of a structural edit.
///
/// The cursor in [`EditOutcome::Applied`] is only a request; applying it is
/// up to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditOutcome {
    Applied(Position),
    NoOp,
    Unsupported(UnsupportedReason),
}

impl EditOutcome {
    pub fn cursor(&self) -> Option<Position> {
        match self {
            EditOutcome::Applied(position) => Some(*position),
            _ => None,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied(_))
    }
}

/// The structural editing engine. Owns the document while it is being
/// edited; each operation either commits completely or leaves the document
/// untouched.
pub struct ScriptureEditor {
    scripture: Scripture,
    stylesheet: Stylesheet,
    versification: Box<dyn Versification>,
    config: EditorConfig,
}

impl ScriptureEditor {
    pub fn new(
        scripture: Scripture,
        stylesheet: Stylesheet,
        versification: impl Versification + 'static,
    ) -> Self {
        Self::build(scripture, stylesheet, Box::new(versification), EditorConfig::default())
    }

    /// Like [`new`](Self::new) with a custom configuration, which is
    /// validated first.
    pub fn with_config(
        scripture: Scripture,
        stylesheet: Stylesheet,
        versification: impl Versification + 'static,
        config: EditorConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(scripture, stylesheet, Box::new(versification), config))
    }

    fn build(
        mut scripture: Scripture,
        stylesheet: Stylesheet,
        versification: Box<dyn Versification>,
        config: EditorConfig,
    ) -> Self {
        ensure_scripture_initialized(&mut scripture, &stylesheet, &config);
        for book in &mut scripture.books {
            refresh_references(book, 0, &stylesheet, &config);
        }
        Self {
            scripture,
            stylesheet,
            versification,
            config,
        }
    }

    pub fn scripture(&self) -> &Scripture {
        &self.scripture
    }

    pub fn into_scripture(self) -> Scripture {
        self.scripture
    }

    pub fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn paragraph(&self, position: &Position) -> Option<&Paragraph> {
        paragraph_ref(&self.scripture, position)
    }

    /// Reports the first violated document invariant, if any.
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantViolation> {
        check_invariants(&self.scripture, &self.stylesheet, &self.config)
    }

    /// Like [`check_invariants`](Self::check_invariants), without the
    /// ordering of sections by reference.
    pub fn check_structure(&self) -> std::result::Result<(), InvariantViolation> {
        check_structure(&self.scripture, &self.stylesheet, &self.config)
    }

    fn validate(&self, position: &Position) -> Result<()> {
        match self.paragraph(position) {
            Some(paragraph) if position.offset <= paragraph.char_len() => Ok(()),
            _ => Err(EditError::InvalidPosition(*position)),
        }
    }

    fn begin_edit(&self, book: usize, anchor: Anchor) -> Option<BookEdit<'_>> {
        let book = self.scripture.books.get(book)?.clone();
        Some(BookEdit::new(book, anchor, &self.stylesheet, &self.config))
    }

    /// Swaps a finished working copy in, refreshes its references and
    /// returns the tracked cursor as a document position.
    fn commit(&mut self, book_index: usize, (mut book, anchor): (Book, Anchor)) -> Position {
        refresh_references(&mut book, 0, &self.stylesheet, &self.config);
        if let Some(target) = self.scripture.books.get_mut(book_index) {
            *target = book;
        }
        debug_assert!(
            self.check_structure().is_ok(),
            "edit left the document inconsistent: {:?}",
            self.check_structure()
        );
        anchor.to_position(book_index)
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod editor_tests;





#[cfg(test)]
#[path = "editor/boundary_tests.rs"]
mod boundary_tests;

#[cfg(test)]
#[path = "editor/verse_tests.rs"]
mod verse_tests;
