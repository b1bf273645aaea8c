//! Structural editing for translated Scripture books.
//!
//! A [`Scripture`] holds books; a book holds a title and sections; each
//! section pairs a heading with content. Whether a paragraph belongs in a
//! heading or in content is decided by its style, so restyling, splitting,
//! pasting and deleting across boundaries all have to keep paragraphs in
//! the slot their style asks for. [`ScriptureEditor`] performs those edits
//! and keeps the chapter/verse range of every section current.
//!
//! Every operation either commits fully or leaves the document untouched,
//! and reports the cursor position the caller should move to.

pub mod config;
pub mod editor;
pub mod error;
pub mod model;
pub mod reference;
pub mod stylesheet;
pub mod versification;

pub use config::{EditorConfig, StyleNames};
pub use editor::{
    EditOutcome, InsertOutcome, Position, ProblemKind, ScriptureEditor, Selection,
    UnsupportedReason, snap_to_word_boundary,
};
pub use error::{ConfigError, EditError, InvariantViolation, Result};
pub use model::{Book, Paragraph, Run, Scripture, Section, Slot, Text, WsId};
pub use reference::{ScrReference, StartReference, start_reference_candidates};
pub use stylesheet::{Context, StyleInfo, StyleKind, Structure, Stylesheet};
pub use versification::{Unlimited, Versification, VersificationTable};
