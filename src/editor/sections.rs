use super::content::marker_extents;
use super::cursor::{Anchor, TextLoc};
use super::structure::BookEdit;
use super::{EditOutcome, Position, ScriptureEditor, UnsupportedReason};
use crate::error::{EditError, Result};
use crate::model::{Section, Slot};
use crate::reference::section_is_intro;
use crate::stylesheet::{Context, default_body_style, default_heading_style};

impl ScriptureEditor {
    /// Inserts a new section at `position`.
    ///
    /// In a title the section goes to the front of the book. In a heading
    /// the heading text from the position onward moves to a new following
    /// section (or, at the very start of the heading, an empty section is
    /// inserted before). In content the content from the position onward
    /// moves to a new following section with an empty heading. The cursor
    /// lands at the start of the new section's heading.
    pub fn create_section(&mut self, position: &Position, is_intro: bool) -> Result<EditOutcome> {
        self.validate(position)?;
        let book = &self.scripture.books[position.book];
        let context = if is_intro {
            Context::Introduction
        } else {
            Context::Scripture
        };

        if position.slot == Slot::Title {
            let first_is_intro = book
                .sections
                .first()
                .is_some_and(|s| section_is_intro(s, &self.stylesheet));
            if !is_intro && first_is_intro {
                tracing::debug!("refusing scripture section in front of the introduction");
                return Ok(EditOutcome::Unsupported(UnsupportedReason::IntroductionOrder));
            }
        } else if section_is_intro(&book.sections[position.section], &self.stylesheet) != is_intro {
            tracing::debug!(section = position.section, is_intro, "refusing section split: context mismatch");
            return Ok(EditOutcome::Unsupported(UnsupportedReason::ContextMismatch));
        }

        let anchor = Anchor::from_position(position);
        let Some(mut edit) = self.begin_edit(position.book, anchor) else {
            return Err(EditError::InvalidPosition(*position));
        };
        let new_section = match position.slot {
            Slot::Title => {
                let section = empty_section(&edit, context);
                edit.insert_section(0, section);
                0
            }
            Slot::Heading => split_heading(&mut edit, position, context),
            Slot::Content => split_content(&mut edit, position, context),
        };
        tracing::debug!(section = new_section, is_intro, "created section");
        edit.anchor = Anchor::new(TextLoc::heading(new_section), 0, 0);

        let finished = edit.finish();
        Ok(EditOutcome::Applied(self.commit(position.book, finished)))
    }
}

fn empty_section(edit: &BookEdit<'_>, context: Context) -> Section {
    let names = &edit.config.styles;
    Section::new(
        vec![edit.empty_paragraph(default_heading_style(context, names))],
        vec![edit.empty_paragraph(default_body_style(context, names))],
    )
}

/// Returns the index of the new section.
fn split_heading(edit: &mut BookEdit<'_>, position: &Position, context: Context) -> usize {
    let s = position.section;
    let heading = TextLoc::heading(s);
    let (p, offset) = (position.paragraph, position.offset);

    if p == 0 && offset == 0 {
        let section = empty_section(edit, context);
        edit.insert_section(s, section);
        return s;
    }

    let len = edit.paragraph(heading, p).map_or(0, |para| para.char_len());
    let style = edit
        .paragraph(heading, p)
        .map(|para| para.style.clone())
        .unwrap_or_default();
    let from = if offset == 0 {
        p
    } else if offset >= len {
        p + 1
    } else {
        edit.split_paragraph(heading, p, offset);
        p + 1
    };

    let body = edit.placeholder_body_after(&style);
    edit.insert_section(s + 1, Section::new(Vec::new(), vec![body]));
    let heading_len = edit.text_len(heading);
    if from < heading_len {
        edit.move_paragraphs(heading, from..heading_len, TextLoc::heading(s + 1), 0);
    } else {
        let empty = edit.empty_paragraph(&style);
        edit.insert_paragraph(TextLoc::heading(s + 1), 0, empty);
    }
    s + 1
}

/// Returns the index of the new section.
fn split_content(edit: &mut BookEdit<'_>, position: &Position, context: Context) -> usize {
    let s = position.section;
    let content = TextLoc::content(s);
    let p = position.paragraph;
    let offset = keep_markers_with_text(edit, content, p, position.offset);

    let len = edit.paragraph(content, p).map_or(0, |para| para.char_len());
    let style = edit
        .paragraph(content, p)
        .map(|para| para.style.clone())
        .unwrap_or_default();
    let from = if offset == 0 {
        p
    } else if offset >= len {
        p + 1
    } else {
        edit.split_paragraph(content, p, offset);
        p + 1
    };

    let heading = edit.empty_paragraph(default_heading_style(context, &edit.config.styles));
    edit.insert_section(s + 1, Section::new(vec![heading], Vec::new()));
    let content_len = edit.text_len(content);
    if from < content_len {
        edit.move_paragraphs(content, from..content_len, TextLoc::content(s + 1), 0);
    } else {
        let empty = edit.empty_paragraph(&style);
        edit.insert_paragraph(TextLoc::content(s + 1), 0, empty);
    }
    if edit.text_len(content) == 0 {
        let empty = edit.empty_paragraph(&style);
        edit.insert_paragraph(content, 0, empty);
    }
    s + 1
}

/// Moves a split offset back over chapter/verse numbers that end right at
/// it, so that numbers always stay with the text they introduce.
fn keep_markers_with_text(edit: &BookEdit<'_>, loc: TextLoc, idx: usize, offset: usize) -> usize {
    let Some(paragraph) = edit.paragraph(loc, idx) else {
        return offset;
    };
    let extents = marker_extents(&paragraph.runs, edit.config);
    let mut offset = offset;
    while let Some((start, _, _)) = extents.iter().find(|(_, end, _)| *end == offset) {
        offset = *start;
    }
    offset
}
