use std::ops::Range;

use super::content::has_interior_markers;
use super::cursor::{Anchor, TextLoc};
use super::structure::BookEdit;
use super::{EditOutcome, Position, ScriptureEditor, Selection, UnsupportedReason};
use crate::error::{EditError, Result};
use crate::model::{Section, Slot};
use crate::stylesheet::{Context, StyleKind, Structure};

/// Paragraphs covered by a selection, grouped per text in reading order.
type Targets = Vec<(TextLoc, Range<usize>)>;

impl ScriptureEditor {
    /// Applies a paragraph style to every paragraph touched by `selection`,
    /// moving paragraphs between headings and content (and creating or
    /// merging sections) wherever the new style no longer fits its slot.
    ///
    /// The returned cursor follows the first selected character to its new
    /// place.
    pub fn apply_style(&mut self, selection: &Selection, style: &str) -> Result<EditOutcome> {
        let (start, end) = selection.ordered();
        self.validate(&start)?;
        self.validate(&end)?;
        let info = self
            .stylesheet
            .classify(style)
            .ok_or_else(|| EditError::UnknownStyle(style.to_string()))?;
        if info.kind == StyleKind::Character {
            return Err(EditError::NotParagraphStyle(style.to_string()));
        }
        let (structure, context) = (info.structure, info.context);

        let Some(mut targets) = self.selected_paragraphs(&start, &end) else {
            tracing::debug!(%style, "refusing restyle: selection has no single owner");
            return Ok(EditOutcome::Unsupported(UnsupportedReason::AmbiguousSelection));
        };

        let book = &self.scripture.books[start.book];
        for (loc, _) in &targets {
            let owner = if loc.is_title() {
                Context::Title
            } else {
                self.stylesheet.section_context(&book.sections[loc.section])
            };
            if !context.is_compatible_with(owner) {
                tracing::debug!(%style, ?owner, "refusing restyle: context mismatch");
                return Ok(EditOutcome::Unsupported(UnsupportedReason::ContextMismatch));
            }
        }

        let already_styled = targets.iter().all(|(loc, range)| {
            range.clone().all(|idx| {
                book.text(loc.section, loc.slot)
                    .and_then(|text| text.get(idx))
                    .is_some_and(|p| p.style == style)
            })
        });
        if already_styled {
            return Ok(EditOutcome::NoOp);
        }

        let (first_loc, first_range) = targets[0].clone();
        let mut anchor = Anchor::from_position(&start);
        if first_range.start != start.paragraph || first_loc != TextLoc::of(&start) {
            anchor = Anchor::new(first_loc, first_range.start, 0);
        }
        let Some(mut edit) = self.begin_edit(start.book, anchor) else {
            return Err(EditError::InvalidPosition(start));
        };

        if !selection.is_collapsed() {
            split_selection_edges(&mut edit, &mut targets, &start, &end, structure);
        }

        let mut changed = 0;
        for (loc, range) in &targets {
            for idx in range.clone() {
                let config = edit.config;
                let Some(paragraph) = edit.paragraph_mut(*loc, idx) else {
                    continue;
                };
                if paragraph.style == style {
                    continue;
                }
                if structure == Structure::Heading && has_interior_markers(&paragraph.runs, config) {
                    tracing::debug!(paragraph = idx, "skipping paragraph with verse numbers");
                    continue;
                }
                paragraph.style = style.to_string();
                changed += 1;
            }
        }
        if changed == 0 {
            return Ok(EditOutcome::NoOp);
        }

        let sections: Vec<usize> = targets
            .iter()
            .filter(|(loc, _)| !loc.is_title())
            .map(|(loc, _)| loc.section)
            .collect();
        if let (Some(first), Some(last)) = (sections.iter().min(), sections.iter().max()) {
            migrate_sections(&mut edit, *first, *last);
        }
        edit.resolve_empty_texts();

        let finished = edit.finish();
        Ok(EditOutcome::Applied(self.commit(start.book, finished)))
    }

    /// Resolves the selection to whole paragraphs. Supported shapes: one
    /// title, one section, or the content of a section followed by the
    /// heading of the next one.
    fn selected_paragraphs(&self, start: &Position, end: &Position) -> Option<Targets> {
        if start.book != end.book {
            return None;
        }
        let book = self.scripture.books.get(start.book)?;
        let (ls, le) = (TextLoc::of(start), TextLoc::of(end));
        let supported = ls == le
            || (!ls.is_title() && !le.is_title() && ls.section == le.section)
            || (ls.slot == Slot::Content && le.slot == Slot::Heading && le.section == ls.section + 1);
        if !supported {
            return None;
        }

        let mut targets: Targets = if ls == le {
            vec![(ls, start.paragraph..end.paragraph + 1)]
        } else {
            let len = book.text(ls.section, ls.slot)?.len();
            vec![
                (ls, start.paragraph..len),
                (le, 0..end.paragraph + 1),
            ]
        };

        let same_paragraph = ls == le && start.paragraph == end.paragraph;
        if !same_paragraph && end.offset == 0 {
            if let Some((_, range)) = targets.last_mut() {
                range.end -= 1;
            }
        }
        let start_len = book
            .text(ls.section, ls.slot)?
            .get(start.paragraph)?
            .char_len();
        if !same_paragraph && start_len > 0 && start.offset == start_len {
            let covered: usize = targets.iter().map(|(_, r)| r.len()).sum();
            if covered > 1 {
                targets[0].1.start += 1;
            }
        }
        targets.retain(|(_, range)| !range.is_empty());
        (!targets.is_empty()).then_some(targets)
    }
}

/// A paragraph only partly covered by a selection that changes its slot is
/// split, so only the covered part moves.
fn split_selection_edges(
    edit: &mut BookEdit<'_>,
    targets: &mut Targets,
    start: &Position,
    end: &Position,
    structure: Structure,
) {
    let moves = |loc: &TextLoc| !loc.is_title() && slot_structure(loc.slot) != structure;

    if let Some((loc, range)) = targets.last().cloned() {
        let last = range.end - 1;
        let len = edit.paragraph(loc, last).map_or(0, |p| p.char_len());
        if moves(&loc)
            && loc == TextLoc::of(end)
            && last == end.paragraph
            && end.offset > 0
            && end.offset < len
        {
            edit.split_paragraph(loc, last, end.offset);
        }
    }

    if let Some((loc, range)) = targets.first().cloned() {
        let len = edit
            .paragraph(loc, range.start)
            .map_or(0, |p| p.char_len());
        if moves(&loc)
            && loc == TextLoc::of(start)
            && range.start == start.paragraph
            && start.offset > 0
            && start.offset < len
            && edit.split_paragraph(loc, range.start, start.offset)
        {
            targets[0].1 = range.start + 1..range.end + 1;
        }
    }
}

fn slot_structure(slot: Slot) -> Structure {
    match slot {
        Slot::Heading => Structure::Heading,
        _ => Structure::Body,
    }
}

// ============================================================================
// Moving misplaced paragraphs between headings and content
// ============================================================================

/// Relocates every paragraph whose style no longer fits its slot, for the
/// sections `first..=last`. Sections are processed last first so that
/// sections created or merged along the way never shift unprocessed ones.
pub(crate) fn migrate_sections(edit: &mut BookEdit<'_>, first: usize, last: usize) {
    for s in (first..=last).rev() {
        if s >= edit.section_count() {
            continue;
        }
        while let Some(range) = last_misplaced_run(edit, TextLoc::content(s)) {
            promote_run(edit, s, range);
        }
        while let Some(range) = last_misplaced_run(edit, TextLoc::heading(s)) {
            if !demote_run(edit, s, range) {
                break;
            }
        }
    }
}

fn last_misplaced_run(edit: &BookEdit<'_>, loc: TextLoc) -> Option<Range<usize>> {
    let text = edit.text(loc)?;
    let end = text
        .paragraphs
        .iter()
        .rposition(|p| edit.is_misplaced(loc.slot, p))?
        + 1;
    let start = text.paragraphs[..end]
        .iter()
        .rposition(|p| !edit.is_misplaced(loc.slot, p))
        .map_or(0, |idx| idx + 1);
    Some(start..end)
}

/// Moves heading-styled paragraphs `range` out of the content of section
/// `s`. Chapter and verse numbers leading those paragraphs stay in content,
/// in front of the content paragraph that follows the promoted ones.
fn promote_run(edit: &mut BookEdit<'_>, s: usize, range: Range<usize>) {
    let content = TextLoc::content(s);
    let len = edit.text_len(content);
    let Range { start: a, end: b } = range;
    tracing::debug!(section = s, paragraphs = b - a, "promoting paragraphs to heading");

    let mut markers = Vec::new();
    for idx in a..b {
        markers.extend(edit.detach_leading_markers(content, idx));
    }
    let first_style = edit
        .paragraph(content, a)
        .map(|p| p.style.clone())
        .unwrap_or_default();
    let next_joins = s + 1 < edit.section_count()
        && edit
            .section_context(s + 1)
            .is_compatible_with(edit.section_context(s));

    let marker_home = if a > 0 && b < len {
        edit.insert_section(s + 1, Section::new(Vec::new(), Vec::new()));
        edit.move_paragraphs(content, b..len, TextLoc::content(s + 1), 0);
        edit.move_paragraphs(content, a..b, TextLoc::heading(s + 1), 0);
        TextLoc::content(s + 1)
    } else if a > 0 {
        if !next_joins {
            let body = edit.placeholder_body_after(&first_style);
            edit.insert_section(s + 1, Section::new(Vec::new(), vec![body]));
        }
        edit.move_paragraphs(content, a..b, TextLoc::heading(s + 1), 0);
        TextLoc::content(s + 1)
    } else if b < len {
        let at = edit.text_len(TextLoc::heading(s));
        edit.move_paragraphs(content, a..b, TextLoc::heading(s), at);
        content
    } else if next_joins {
        edit.move_paragraphs(content, a..b, TextLoc::heading(s + 1), 0);
        edit.merge_with_previous(s + 1);
        content
    } else {
        let at = edit.text_len(TextLoc::heading(s));
        edit.move_paragraphs(content, a..b, TextLoc::heading(s), at);
        let body = edit.placeholder_body_after(&first_style);
        edit.insert_paragraph(content, 0, body);
        content
    };
    edit.prepend_runs(marker_home, 0, markers);
}

/// Moves body-styled paragraphs `range` out of the heading of section `s`.
/// Returns false when section `s` was merged away.
fn demote_run(edit: &mut BookEdit<'_>, s: usize, range: Range<usize>) -> bool {
    let heading = TextLoc::heading(s);
    let content = TextLoc::content(s);
    let len = edit.text_len(heading);
    let Range { start: a, end: b } = range;
    tracing::debug!(section = s, paragraphs = b - a, "demoting paragraphs to content");

    let previous_joins = s > 0
        && edit
            .section_context(s - 1)
            .is_compatible_with(edit.section_context(s));
    if a == 0 && previous_joins {
        let at = edit.text_len(TextLoc::content(s - 1));
        edit.move_paragraphs(heading, a..b, TextLoc::content(s - 1), at);
        if edit.text_len(heading) == 0 {
            edit.merge_with_previous(s);
            return false;
        }
        return true;
    }

    if b < len {
        let content_len = edit.text_len(content);
        edit.insert_section(s + 1, Section::new(Vec::new(), Vec::new()));
        edit.move_paragraphs(heading, b..len, TextLoc::heading(s + 1), 0);
        edit.move_paragraphs(content, 0..content_len, TextLoc::content(s + 1), 0);
    }
    edit.move_paragraphs(heading, a..b, content, 0);
    if edit.text_len(heading) == 0 {
        let placeholder = edit.placeholder_heading(edit.section_context(s));
        edit.insert_paragraph(heading, 0, placeholder);
    }
    true
}
