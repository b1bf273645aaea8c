use super::content::{marker_extents, split_runs};
use super::cursor::{Anchor, TextLoc, snap_offset};
use super::{EditOutcome, Position, ScriptureEditor};
use crate::config::{EditorConfig, MAX_VERSE};
use crate::error::{EditError, Result};
use crate::model::{Book, Run, Slot, Text, WsId};
use crate::reference::{
    Marker, carried_state, format_verse_number, is_marker_run, marker_of, section_is_intro,
};
use crate::stylesheet::{Context, Stylesheet};

/// How a verse number gets into the paragraph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VerseEdit {
    Insert(u32),
    /// Widen the verse number run at `start..end` to `first-last`.
    Widen {
        start: usize,
        end: usize,
        first: u32,
        last: u32,
    },
}

impl VerseEdit {
    fn number(self) -> u32 {
        match self {
            VerseEdit::Insert(number) => number,
            VerseEdit::Widen { last, .. } => last,
        }
    }
}

impl ScriptureEditor {
    /// Inserts the next verse number at `point`, or widens a verse number
    /// right next to it into a bridge.
    ///
    /// The offset is snapped to a word boundary first. The number follows
    /// the last verse before the point in the same chapter; an identical
    /// number further on is removed, as it is being moved here. Numbers past
    /// the end of the chapter are refused as a no-op.
    pub fn insert_verse_number(&mut self, point: &Position) -> Result<EditOutcome> {
        self.validate(point)?;
        if point.slot != Slot::Content {
            return Ok(EditOutcome::NoOp);
        }
        let config = &self.config;
        let book = &self.scripture.books[point.book];
        let section = &book.sections[point.section];
        let Some(paragraph) = section.content.get(point.paragraph) else {
            return Err(EditError::InvalidPosition(*point));
        };
        if section_is_intro(section, &self.stylesheet)
            || self.stylesheet.context_of(&paragraph.style) == Some(Context::Introduction)
        {
            tracing::debug!(section = point.section, "no verse numbers in introductions");
            return Ok(EditOutcome::NoOp);
        }

        let extents = marker_extents(&paragraph.runs, config);
        let stops: Vec<usize> = extents
            .iter()
            .flat_map(|&(start, end, _)| [start, end])
            .collect();
        let chars: Vec<char> = paragraph.text().chars().collect();
        let offset = snap_offset(&chars, point.offset, &stops);

        let (chapter, last_verse) = verse_state_before(
            book,
            (point.section, point.paragraph, offset),
            &self.stylesheet,
            config,
        );
        if chapter == 0 {
            tracing::debug!("leaving chapter zero material alone");
            return Ok(EditOutcome::NoOp);
        }

        let widen = |extent: &(usize, usize, Option<Marker>)| match extent.2 {
            Some(Marker::Verse { first, last }) => Some(VerseEdit::Widen {
                start: extent.0,
                end: extent.1,
                first,
                last: last + 1,
            }),
            _ => None,
        };
        let plan = extents
            .iter()
            .filter(|extent| extent.1 == offset)
            .find_map(widen)
            .or_else(|| extents.iter().filter(|extent| extent.0 == offset).find_map(widen))
            .unwrap_or(VerseEdit::Insert(last_verse + 1));
        let number = plan.number();

        let max_verse = self.versification.max_verse(book.canonical_num, chapter);
        if number > MAX_VERSE || max_verse.is_some_and(|max| number > max) {
            tracing::debug!(chapter, number, ?max_verse, "verse number past end of chapter");
            return Ok(EditOutcome::NoOp);
        }

        let scan_from = match plan {
            VerseEdit::Widen { end, .. } => end,
            VerseEdit::Insert(_) => offset,
        };
        let duplicate = next_verse_marker(&section.content, point.paragraph, scan_from, config)
            .filter(|&(_, _, _, marker)| {
                marker == Marker::Verse {
                    first: number,
                    last: number,
                }
            });
        let ws = ws_at(&paragraph.runs, offset).unwrap_or(config.vernacular_ws);
        let verse_style = config.styles.verse_number.clone();
        let separator = config.bridge_separator;

        let loc = TextLoc::content(point.section);
        let anchor = Anchor::new(loc, point.paragraph, offset);
        let Some(mut edit) = self.begin_edit(point.book, anchor) else {
            return Err(EditError::InvalidPosition(*point));
        };
        if let Some((idx, start, end, _)) = duplicate {
            tracing::debug!(paragraph = idx, number, "moving verse number");
            edit.delete_in_paragraph(loc, idx, start, end);
        }
        match plan {
            VerseEdit::Widen {
                start, first, last, ..
            } => {
                let text = format_verse_number(first, last, separator);
                let len = text.chars().count();
                tracing::debug!(first, last, "widening verse number into bridge");
                edit.rewrite_marker(loc, point.paragraph, start, text);
                edit.anchor = Anchor::new(loc, point.paragraph, start + len);
            }
            VerseEdit::Insert(number) => {
                tracing::debug!(chapter, number, offset, "inserting verse number");
                let run = Run::styled(number.to_string(), verse_style).with_ws(ws);
                edit.insert_run(loc, point.paragraph, offset, run);
            }
        }

        let finished = edit.finish();
        Ok(EditOutcome::Applied(self.commit(point.book, finished)))
    }
}

/// `(chapter, last verse)` in force right before `offset`. Without a chapter
/// number in the section the state carried in from earlier sections
/// applies. Plain text after the chapter start counts as verse 1.
fn verse_state_before(
    book: &Book,
    (section, paragraph, offset): (usize, usize, usize),
    stylesheet: &Stylesheet,
    config: &EditorConfig,
) -> (u32, u32) {
    let content = &book.sections[section].content;
    let mut head = content.paragraphs[paragraph].runs.clone();
    split_runs(&mut head, offset);
    let earlier = content.paragraphs[..paragraph]
        .iter()
        .rev()
        .flat_map(|p| p.runs.iter().rev());

    let mut last_verse = None;
    let mut saw_text = false;
    for run in head.iter().rev().chain(earlier) {
        match marker_of(run, config) {
            Some(Marker::Chapter(chapter)) => {
                return (chapter, last_verse.unwrap_or(u32::from(saw_text)));
            }
            Some(Marker::Verse { last, .. }) => {
                last_verse.get_or_insert(last);
            }
            None if !is_marker_run(run, config) && !run.text.trim().is_empty() => {
                saw_text = true;
            }
            None => {}
        }
    }

    let (chapter, verse) = carried_state(book, section, stylesheet);
    let verse = last_verse.unwrap_or(if saw_text { verse.max(1) } else { verse });
    (chapter, verse)
}

/// First verse number at or after `from` in paragraph `paragraph`, or in a
/// later paragraph of the same content. A chapter number ends the search.
fn next_verse_marker(
    content: &Text,
    paragraph: usize,
    from: usize,
    config: &EditorConfig,
) -> Option<(usize, usize, usize, Marker)> {
    for (idx, p) in content.paragraphs.iter().enumerate().skip(paragraph) {
        for (start, end, marker) in marker_extents(&p.runs, config) {
            if idx == paragraph && start < from {
                continue;
            }
            match marker {
                Some(Marker::Chapter(_)) => return None,
                Some(marker) => return Some((idx, start, end, marker)),
                None => {}
            }
        }
    }
    None
}

/// Writing system of the text right before `offset`.
fn ws_at(runs: &[Run], offset: usize) -> Option<WsId> {
    let mut pos = 0;
    for run in runs {
        pos += run.char_len();
        if offset <= pos && !run.is_empty() {
            return Some(run.ws);
        }
    }
    runs.first().map(|run| run.ws)
}
