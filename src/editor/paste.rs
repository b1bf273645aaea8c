use serde::{Deserialize, Serialize};

use super::content::has_markers;
use super::cursor::{Anchor, TextLoc};
use super::styles::migrate_sections;
use super::{Position, ScriptureEditor};
use crate::error::{EditError, Result};
use crate::model::{Paragraph, Run, Slot};
use crate::stylesheet::{Context, StyleKind, Structure};

/// Result of inserting paragraphs whose structure differs from the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertOutcome {
    /// Inserted and relocated; carries the requested cursor.
    Done(Position),
    /// The paragraphs cannot go there; nothing changed.
    Fail,
    /// Every paragraph fits the target slot, the caller inserts them itself.
    DefaultToCaller,
}

impl ScriptureEditor {
    /// Inserts `incoming` at `target`, splitting the target paragraph, and
    /// moves every inserted paragraph whose style belongs in the other slot
    /// into a heading or content where it fits.
    pub fn on_insert_differing_paragraphs(
        &mut self,
        target: &Position,
        incoming: Vec<Paragraph>,
    ) -> Result<InsertOutcome> {
        self.validate(target)?;
        if incoming.is_empty() {
            return Ok(InsertOutcome::Fail);
        }

        let mut kinds = Vec::with_capacity(incoming.len());
        for paragraph in &incoming {
            let info = self
                .stylesheet
                .classify(&paragraph.style)
                .ok_or_else(|| EditError::UnknownStyle(paragraph.style.clone()))?;
            if info.kind == StyleKind::Character {
                return Err(EditError::NotParagraphStyle(paragraph.style.clone()));
            }
            kinds.push((info.structure, info.context));
        }

        if target.slot == Slot::Title {
            let fits = kinds.iter().all(|(_, context)| *context == Context::Title);
            return Ok(if fits {
                InsertOutcome::DefaultToCaller
            } else {
                InsertOutcome::Fail
            });
        }

        let slot_structure = match target.slot {
            Slot::Heading => Structure::Heading,
            _ => Structure::Body,
        };
        if kinds.iter().all(|(structure, _)| *structure == slot_structure) {
            return Ok(InsertOutcome::DefaultToCaller);
        }

        let owner = self
            .stylesheet
            .section_context(&self.scripture.books[target.book].sections[target.section]);
        if kinds.iter().any(|(_, context)| !context.is_compatible_with(owner)) {
            tracing::debug!(?owner, "refusing paste: context mismatch");
            return Ok(InsertOutcome::Fail);
        }
        let marked_heading = incoming.iter().zip(&kinds).any(|(paragraph, (structure, _))| {
            *structure == Structure::Heading && has_markers(&paragraph.runs, &self.config)
        });
        if marked_heading {
            tracing::debug!("refusing paste: verse numbers in a heading paragraph");
            return Ok(InsertOutcome::Fail);
        }

        let loc = TextLoc::of(target);
        let (s, p) = (target.section, target.paragraph);
        let Some(mut edit) = self.begin_edit(target.book, Anchor::from_position(target)) else {
            return Err(EditError::InvalidPosition(*target));
        };
        let count = incoming.len();
        tracing::debug!(section = s, paragraphs = count, "inserting differing paragraphs");

        edit.split_paragraph(loc, p, target.offset);
        for (i, mut paragraph) in incoming.into_iter().enumerate() {
            if paragraph.runs.is_empty() {
                paragraph.runs.push(Run::new_text("").with_ws(edit.config.vernacular_ws));
            }
            edit.insert_paragraph(loc, p + 1 + i, paragraph);
        }
        let last = p + count;
        let last_len = edit.paragraph(loc, last).map_or(0, Paragraph::char_len);
        edit.anchor = Anchor::new(loc, last, last_len);

        if edit.paragraph(loc, last + 1).is_some_and(Paragraph::is_empty) {
            edit.remove_paragraph(loc, last + 1);
        }
        if edit.paragraph(loc, p).is_some_and(Paragraph::is_empty) {
            edit.remove_paragraph(loc, p);
        }

        migrate_sections(&mut edit, s, s);
        edit.resolve_empty_texts();

        let finished = edit.finish();
        Ok(InsertOutcome::Done(self.commit(target.book, finished)))
    }
}
