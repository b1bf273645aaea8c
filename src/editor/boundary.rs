use serde::{Deserialize, Serialize};

use super::content::has_markers;
use super::cursor::{Anchor, TextLoc};
use super::inspect::{next_loc, previous_loc};
use super::structure::{BookEdit, placeholder_book};
use super::{EditOutcome, Position, ScriptureEditor, Selection, UnsupportedReason};
use crate::error::{EditError, Result};
use crate::model::{Book, Paragraph, Slot};
use crate::reference::refresh_references;

/// The edit that ran into a structural boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProblemKind {
    BackspaceAtStartOfParagraph,
    DeleteAtEndOfParagraph,
    ComplexRangeDeletion,
}

impl ScriptureEditor {
    /// Resolves a deletion the host editor cannot perform on its own because
    /// it crosses a paragraph, heading/content, section or book boundary.
    ///
    /// Backspace joins the paragraph at the selection start with the one
    /// before it in reading order, delete joins the paragraph at the
    /// selection end with the next one. A range deletion removes everything
    /// in between, drops the sections and books it fully encloses and merges
    /// what remains at both ends.
    pub fn on_structural_boundary_problem(
        &mut self,
        selection: &Selection,
        kind: ProblemKind,
    ) -> Result<EditOutcome> {
        let (start, end) = selection.ordered();
        self.validate(&start)?;
        self.validate(&end)?;
        match kind {
            ProblemKind::BackspaceAtStartOfParagraph => self.join_with_previous(&start),
            ProblemKind::DeleteAtEndOfParagraph => self.join_with_next(&end),
            ProblemKind::ComplexRangeDeletion if selection.is_collapsed() => Ok(EditOutcome::NoOp),
            ProblemKind::ComplexRangeDeletion if start.book == end.book => {
                self.delete_range(&start, &end)
            }
            ProblemKind::ComplexRangeDeletion => self.delete_across_books(&start, &end),
        }
    }

    fn join_with_previous(&mut self, position: &Position) -> Result<EditOutcome> {
        let book = &self.scripture.books[position.book];
        let loc = TextLoc::of(position);
        let first = if position.paragraph > 0 {
            (loc, position.paragraph - 1)
        } else {
            match previous_loc(loc) {
                None if position.book == 0 => return Ok(EditOutcome::NoOp),
                None => return Ok(refuse(UnsupportedReason::CrossesBookBoundary)),
                Some(previous) if previous.is_title() => {
                    return Ok(refuse(UnsupportedReason::TitleBoundary));
                }
                Some(previous) => {
                    let len = book.text(previous.section, previous.slot).map_or(0, |t| t.len());
                    (previous, len.saturating_sub(1))
                }
            }
        };
        self.join_pair(position.book, first, (loc, position.paragraph))
    }

    fn join_with_next(&mut self, position: &Position) -> Result<EditOutcome> {
        let book = &self.scripture.books[position.book];
        let loc = TextLoc::of(position);
        let len = book.text(loc.section, loc.slot).map_or(0, |t| t.len());
        let second = if position.paragraph + 1 < len {
            (loc, position.paragraph + 1)
        } else {
            match next_loc(book, loc) {
                None if position.book + 1 == self.scripture.books.len() => {
                    return Ok(EditOutcome::NoOp);
                }
                None => return Ok(refuse(UnsupportedReason::CrossesBookBoundary)),
                Some(_) if loc.is_title() => return Ok(refuse(UnsupportedReason::TitleBoundary)),
                Some(next) => (next, 0),
            }
        };
        self.join_pair(position.book, (loc, position.paragraph), second)
    }

    fn join_pair(
        &mut self,
        book_index: usize,
        first: (TextLoc, usize),
        second: (TextLoc, usize),
    ) -> Result<EditOutcome> {
        let anchor = Anchor::new(second.0, second.1, 0);
        let Some(mut edit) = self.begin_edit(book_index, anchor) else {
            return Err(EditError::InvalidPosition(anchor.to_position(book_index)));
        };
        if let Some(reason) = join_refusal(&edit, first, second) {
            return Ok(refuse(reason));
        }
        edit.join_paragraphs(first, second);
        edit.resolve_empty_texts();

        let finished = edit.finish();
        if self.scripture.books.get(book_index) == Some(&finished.0) {
            return Ok(EditOutcome::NoOp);
        }
        Ok(EditOutcome::Applied(self.commit(book_index, finished)))
    }

    fn delete_range(&mut self, start: &Position, end: &Position) -> Result<EditOutcome> {
        let Some(mut edit) = self.begin_edit(start.book, Anchor::from_position(start)) else {
            return Err(EditError::InvalidPosition(*start));
        };
        if let Err(reason) = delete_within_book(&mut edit, start, end) {
            return Ok(refuse(reason));
        }
        edit.resolve_empty_texts();
        let finished = edit.finish();
        Ok(EditOutcome::Applied(self.commit(start.book, finished)))
    }

    fn delete_across_books(&mut self, start: &Position, end: &Position) -> Result<EditOutcome> {
        let books = &self.scripture.books;
        let book_start = Position::title(start.book, 0, 0);
        let start_whole = *start == book_start;
        let end_of_end_book = book_end(end.book, &books[end.book]);
        let end_whole = *end == end_of_end_book;

        let mut replacement: Vec<Book> = Vec::new();
        let mut cursor = None;
        if !start_whole {
            let start_book_end = book_end(start.book, &books[start.book]);
            let Some(mut edit) = self.begin_edit(start.book, Anchor::from_position(start)) else {
                return Err(EditError::InvalidPosition(*start));
            };
            if let Err(reason) = delete_within_book(&mut edit, start, &start_book_end) {
                return Ok(refuse(reason));
            }
            edit.resolve_empty_texts();
            let (book, anchor) = edit.finish();
            cursor = Some(anchor.to_position(start.book));
            replacement.push(book);
        }
        if !end_whole {
            let end_book_start = Position::title(end.book, 0, 0);
            let Some(mut edit) = self.begin_edit(end.book, Anchor::new(TextLoc::title(), 0, 0)) else {
                return Err(EditError::InvalidPosition(*end));
            };
            if let Err(reason) = delete_within_book(&mut edit, &end_book_start, end) {
                return Ok(refuse(reason));
            }
            edit.resolve_empty_texts();
            replacement.push(edit.finish().0);
        }

        let removed = end.book - start.book + 1;
        if replacement.is_empty() && removed == self.scripture.books.len() {
            let canonical_num = self.scripture.books[start.book].canonical_num;
            tracing::debug!(canonical_num, "emptying the only remaining book");
            replacement.push(placeholder_book(canonical_num, &self.stylesheet, &self.config));
        }
        tracing::debug!(
            removed,
            kept = replacement.len(),
            "deleting range across books"
        );

        for book in &mut replacement {
            refresh_references(book, 0, &self.stylesheet, &self.config);
        }
        self.scripture
            .books
            .splice(start.book..=end.book, replacement);
        debug_assert!(
            self.check_structure().is_ok(),
            "edit left the document inconsistent: {:?}",
            self.check_structure()
        );

        let last_book = self.scripture.books.len() - 1;
        let cursor = cursor.unwrap_or_else(|| Position::title(start.book.min(last_book), 0, 0));
        Ok(EditOutcome::Applied(cursor))
    }
}

fn refuse(reason: UnsupportedReason) -> EditOutcome {
    tracing::debug!(?reason, "refusing boundary merge");
    EditOutcome::Unsupported(reason)
}

/// Position after the last character of a book.
fn book_end(book_index: usize, book: &Book) -> Position {
    let section = book.sections.len().saturating_sub(1);
    let (paragraph, offset) = book
        .sections
        .last()
        .and_then(|s| s.content.paragraphs.last().map(|p| (s.content.len() - 1, p.char_len())))
        .unwrap_or((0, 0));
    Position::content(book_index, section, paragraph, offset)
}

/// Why two paragraphs adjacent in reading order may not be joined, if they
/// may not.
fn join_refusal(
    edit: &BookEdit<'_>,
    first: (TextLoc, usize),
    second: (TextLoc, usize),
) -> Option<UnsupportedReason> {
    let a = edit.paragraph(first.0, first.1)?;
    let b = edit.paragraph(second.0, second.1)?;

    if first.0.section != second.0.section
        && !edit
            .section_context(first.0.section)
            .is_compatible_with(edit.section_context(second.0.section))
    {
        return Some(UnsupportedReason::ContextMismatch);
    }
    if !edit.paragraph_context(a).is_compatible_with(edit.paragraph_context(b)) {
        return Some(UnsupportedReason::ContextMismatch);
    }
    if first.0.slot == Slot::Heading
        && !a.is_empty()
        && !b.is_empty()
        && has_markers(&b.runs, edit.config)
    {
        return Some(UnsupportedReason::MarkersInHeading);
    }
    None
}

/// Deletes `start..end` (both in the same book) and merges what remains at
/// both ends. Enclosed sections are dropped; remainders of two headings or
/// of two contents are joined into one section.
fn delete_within_book(
    edit: &mut BookEdit<'_>,
    start: &Position,
    end: &Position,
) -> std::result::Result<(), UnsupportedReason> {
    let (ls, le) = (TextLoc::of(start), TextLoc::of(end));
    let (sp, ep) = (start.paragraph, end.paragraph);

    if ls == le {
        if sp == ep {
            edit.delete_in_paragraph(ls, sp, start.offset, end.offset);
            return Ok(());
        }
        let start_len = edit.paragraph(ls, sp).map_or(0, Paragraph::char_len);
        edit.delete_in_paragraph(ls, ep, 0, end.offset);
        for _ in sp + 1..ep {
            edit.remove_paragraph(ls, sp + 1);
        }
        edit.delete_in_paragraph(ls, sp, start.offset, start_len);
        edit.join_paragraphs((ls, sp), (ls, sp + 1));
        return Ok(());
    }

    let (si, se) = (ls.section, le.section);
    let merges = !ls.is_title() && si < se && (ls.slot == Slot::Heading || le.slot == Slot::Content);
    if merges && !edit.section_context(si).is_compatible_with(edit.section_context(se)) {
        return Err(UnsupportedReason::ContextMismatch);
    }
    tracing::debug!(from = si, to = se, "deleting range across sections");

    edit.trim_text(le, ep, end.offset);
    edit.truncate_text(ls, sp, start.offset);

    if ls.is_title() {
        if le.slot == Slot::Content {
            edit.clear_text(TextLoc::heading(se));
        }
        edit.remove_sections(0..se);
        return Ok(());
    }
    if si == se {
        return Ok(());
    }

    if ls.slot == Slot::Heading {
        edit.clear_text(TextLoc::content(si));
    }
    if le.slot == Slot::Content {
        edit.clear_text(TextLoc::heading(se));
    }
    edit.remove_sections(si + 1..se);
    if merges {
        edit.merge_with_previous(si + 1);
        if ls.slot == le.slot {
            edit.join_paragraphs((ls, sp), (ls, sp + 1));
        }
    }
    Ok(())
}
