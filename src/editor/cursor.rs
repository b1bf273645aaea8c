use std::cmp::Ordering;

use super::Position;
use super::content::is_word_char;
use crate::model::Slot;

/// A text container inside one book.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct TextLoc {
    pub section: usize,
    pub slot: Slot,
}

impl TextLoc {
    pub fn title() -> Self {
        Self {
            section: 0,
            slot: Slot::Title,
        }
    }

    pub fn heading(section: usize) -> Self {
        Self {
            section,
            slot: Slot::Heading,
        }
    }

    pub fn content(section: usize) -> Self {
        Self {
            section,
            slot: Slot::Content,
        }
    }

    pub fn of(position: &Position) -> Self {
        match position.slot {
            Slot::Title => Self::title(),
            slot => Self {
                section: position.section,
                slot,
            },
        }
    }

    pub fn is_title(&self) -> bool {
        self.slot == Slot::Title
    }

    /// Rank in reading order: the title first, then heading before content
    /// for each section.
    pub fn rank(&self) -> usize {
        match self.slot {
            Slot::Title => 0,
            Slot::Heading => 1 + self.section * 2,
            Slot::Content => 2 + self.section * 2,
        }
    }
}

/// Book-local cursor tracked through the primitives of a working copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Anchor {
    pub loc: TextLoc,
    pub paragraph: usize,
    pub offset: usize,
}

impl Anchor {
    pub fn new(loc: TextLoc, paragraph: usize, offset: usize) -> Self {
        Self {
            loc,
            paragraph,
            offset,
        }
    }

    pub fn from_position(position: &Position) -> Self {
        Self::new(TextLoc::of(position), position.paragraph, position.offset)
    }

    pub fn to_position(self, book: usize) -> Position {
        Position::new(
            book,
            self.loc.section,
            self.loc.slot,
            self.paragraph,
            self.offset,
        )
    }
}

fn reading_key(position: &Position) -> (usize, usize, usize, usize) {
    (
        position.book,
        TextLoc::of(position).rank(),
        position.paragraph,
        position.offset,
    )
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        reading_key(self).cmp(&reading_key(other))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Snaps a character offset so that it never splits a word.
///
/// Word starts are positions where non-space text follows a space, so an
/// opening quotation mark stays with its word. An offset inside a word moves
/// back to the word start; an offset in trailing punctuation or whitespace
/// moves forward to the next word start (or the end of the text). The edges
/// of the text are always boundaries, and a snapped offset snaps to itself.
pub fn snap_to_word_boundary(text: &str, offset: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    snap_offset(&chars, offset, &[])
}

/// Like [`snap_to_word_boundary`], with extra boundaries (marker run edges)
/// that snapping never crosses.
pub(crate) fn snap_offset(chars: &[char], offset: usize, stops: &[usize]) -> usize {
    let len = chars.len();
    let offset = offset.min(len);
    if offset == 0 || offset == len || stops.contains(&offset) {
        return offset;
    }

    let prev = chars[offset - 1];
    let cur = chars[offset];
    if prev.is_whitespace() && !cur.is_whitespace() {
        return offset;
    }

    if !prev.is_whitespace() && !cur.is_whitespace() {
        let token_end = (offset..len)
            .find(|&idx| chars[idx].is_whitespace() || stops.contains(&idx))
            .unwrap_or(len);
        let rest_is_punctuation = !chars[offset..token_end].iter().any(|ch| is_word_char(*ch));
        if !rest_is_punctuation {
            let mut idx = offset;
            while idx > 0 && !chars[idx - 1].is_whitespace() && !stops.contains(&idx) {
                idx -= 1;
            }
            return idx;
        }
    }

    let mut idx = offset;
    while idx < len && !stops.contains(&idx) && !chars[idx].is_whitespace() {
        idx += 1;
    }
    while idx < len && !stops.contains(&idx) && chars[idx].is_whitespace() {
        idx += 1;
    }
    idx
}
