//! Error types for the structural editing engine

use thiserror::Error;

use crate::editor::Position;
use crate::model::Slot;

/// Malformed edit requests.
///
/// Requests that are well formed but cannot or need not be carried out are
/// not errors; they are reported through
/// [`EditOutcome`](crate::editor::EditOutcome).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The position does not address a paragraph of the document
    #[error("Position does not address the document: {0}")]
    InvalidPosition(Position),

    /// The style name is not known to the stylesheet
    #[error("Unknown style: {0}")]
    UnknownStyle(String),

    /// A character style was used where a paragraph style is required
    #[error("'{0}' is a character style, not a paragraph style")]
    NotParagraphStyle(String),
}

/// Errors raised while loading configuration, stylesheets or versification tables.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A style name is defined twice
    #[error("Duplicate style: {0}")]
    DuplicateStyle(String),

    /// The verse bridge separator cannot be told apart from verse numbers
    #[error("Invalid verse bridge separator: {0:?}")]
    InvalidBridgeSeparator(char),

    /// A versification table lists a chapter without verses
    #[error("Book {book} chapter {chapter} has no verses")]
    EmptyChapter { book: u32, chapter: u32 },
}

/// A document invariant that does not hold. Apart from
/// [`OutOfOrder`](InvariantViolation::OutOfOrder), any of these observed after
/// an edit is a defect of the engine, not of the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The scripture holds no books
    #[error("Scripture has no books")]
    NoBooks,

    /// A book holds no sections
    #[error("Book {book} has no sections")]
    NoSections { book: usize },

    /// A title, heading or content text holds no paragraphs
    #[error("Book {book} section {section} has an empty {slot:?} text")]
    EmptyText {
        book: usize,
        section: usize,
        slot: Slot,
    },

    /// A paragraph's style belongs to the other slot kind
    #[error("Paragraph style '{style}' does not belong in {slot:?} (book {book}, section {section}, paragraph {paragraph})")]
    MisplacedParagraph {
        book: usize,
        section: usize,
        slot: Slot,
        paragraph: usize,
        style: String,
    },

    /// A heading paragraph holds a chapter or verse number
    #[error("Heading paragraph {paragraph} of book {book} section {section} holds a marker")]
    MarkerInHeading {
        book: usize,
        section: usize,
        paragraph: usize,
    },

    /// A section starts before its predecessor. Text edits that remove a
    /// chapter number can cause this.
    #[error("Section {section} of book {book} starts before the previous section")]
    OutOfOrder { book: usize, section: usize },

    /// The cached references differ from a fresh scan
    #[error("Stale references in book {book} section {section}")]
    StaleReferences { book: usize, section: usize },
}

/// Result type alias for edit operations
pub type Result<T> = std::result::Result<T, EditError>;
