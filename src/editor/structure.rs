use std::ops::Range;

use super::content::{
    delete_chars, first_marker, leading_marker_runs, merge_back_translations,
    prune_and_merge_runs, runs_char_len, split_back_translations, split_runs,
};
use super::cursor::{Anchor, TextLoc};
use crate::config::EditorConfig;
use crate::model::{Book, Paragraph, Run, Scripture, Section, Slot, Text};
use crate::reference::{is_marker_run, refresh_references};
use crate::stylesheet::{Context, Structure, Stylesheet, default_body_style, default_heading_style};

// ============================================================================
// Public helper functions (used across modules)
// ============================================================================

/// Brings a freshly loaded document into a shape every operation can rely
/// on: at least one book, a title paragraph per book, at least one section
/// per book, at least one paragraph per heading and content, and at least
/// one run per paragraph.
pub(crate) fn ensure_scripture_initialized(
    scripture: &mut Scripture,
    stylesheet: &Stylesheet,
    config: &EditorConfig,
) {
    if scripture.books.is_empty() {
        scripture.books.push(placeholder_book(1, stylesheet, config));
    }
    for book in &mut scripture.books {
        if book.title.is_empty() {
            book.title.paragraphs.push(Paragraph::empty(
                &config.styles.title_main,
                config.vernacular_ws,
            ));
        }
        if book.sections.is_empty() {
            book.sections
                .push(placeholder_section(Context::Scripture, stylesheet, config));
        }
        for section in &mut book.sections {
            let context = stylesheet.section_context(section);
            if section.heading.is_empty() {
                section.heading.paragraphs.push(Paragraph::empty(
                    default_heading_style(context, &config.styles),
                    config.vernacular_ws,
                ));
            }
            if section.content.is_empty() {
                section.content.paragraphs.push(Paragraph::empty(
                    default_body_style(context, &config.styles),
                    config.vernacular_ws,
                ));
            }
        }
        let texts = std::iter::once(&mut book.title).chain(
            book.sections
                .iter_mut()
                .flat_map(|s| [&mut s.heading, &mut s.content]),
        );
        for paragraph in texts.flat_map(|text| text.paragraphs.iter_mut()) {
            if paragraph.runs.is_empty() {
                paragraph.runs.push(Run::new_text("").with_ws(config.vernacular_ws));
            }
        }
    }
}

pub(crate) fn placeholder_section(
    context: Context,
    stylesheet: &Stylesheet,
    config: &EditorConfig,
) -> Section {
    let heading_style = default_heading_style(context, &config.styles);
    let body_style = stylesheet.body_style_after(heading_style, &config.styles);
    Section::new(
        vec![Paragraph::empty(heading_style, config.vernacular_ws)],
        vec![Paragraph::empty(body_style, config.vernacular_ws)],
    )
}

pub(crate) fn placeholder_book(
    canonical_num: u32,
    stylesheet: &Stylesheet,
    config: &EditorConfig,
) -> Book {
    Book::new(canonical_num)
        .with_title(vec![Paragraph::empty(
            &config.styles.title_main,
            config.vernacular_ws,
        )])
        .with_sections(vec![placeholder_section(Context::Scripture, stylesheet, config)])
}

// ============================================================================
// Working copy of one book
// ============================================================================

/// A book being edited. Operations mutate a clone of the book through the
/// primitives below and only swap it into the document once they succeed.
/// Every primitive keeps `anchor` pointing at the same character.
pub(crate) struct BookEdit<'a> {
    pub book: Book,
    pub anchor: Anchor,
    pub stylesheet: &'a Stylesheet,
    pub config: &'a EditorConfig,
    /// Context of the first section when the edit began.
    opening_context: Context,
}

impl<'a> BookEdit<'a> {
    pub fn new(
        book: Book,
        anchor: Anchor,
        stylesheet: &'a Stylesheet,
        config: &'a EditorConfig,
    ) -> Self {
        let opening_context = book
            .sections
            .first()
            .map_or(Context::Scripture, |section| stylesheet.section_context(section));
        Self {
            book,
            anchor,
            stylesheet,
            config,
            opening_context,
        }
    }

    pub fn finish(mut self) -> (Book, Anchor) {
        self.normalize_anchor();
        (self.book, self.anchor)
    }

    // ------------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------------

    pub fn text(&self, loc: TextLoc) -> Option<&Text> {
        self.book.text(loc.section, loc.slot)
    }

    pub fn text_mut(&mut self, loc: TextLoc) -> Option<&mut Text> {
        self.book.text_mut(loc.section, loc.slot)
    }

    pub fn text_len(&self, loc: TextLoc) -> usize {
        self.text(loc).map_or(0, Text::len)
    }

    pub fn paragraph(&self, loc: TextLoc, idx: usize) -> Option<&Paragraph> {
        self.text(loc)?.get(idx)
    }

    pub fn paragraph_mut(&mut self, loc: TextLoc, idx: usize) -> Option<&mut Paragraph> {
        self.text_mut(loc)?.get_mut(idx)
    }

    pub fn section_count(&self) -> usize {
        self.book.sections.len()
    }

    pub fn section_context(&self, section: usize) -> Context {
        self.book
            .sections
            .get(section)
            .map_or(Context::Scripture, |s| self.stylesheet.section_context(s))
    }

    pub fn loc_context(&self, loc: TextLoc) -> Context {
        if loc.is_title() {
            Context::Title
        } else {
            self.section_context(loc.section)
        }
    }

    pub fn paragraph_context(&self, paragraph: &Paragraph) -> Context {
        self.stylesheet
            .context_of(&paragraph.style)
            .unwrap_or(Context::General)
    }

    /// True when the paragraph's style belongs in the other kind of slot.
    pub fn is_misplaced(&self, slot: Slot, paragraph: &Paragraph) -> bool {
        match (slot, self.stylesheet.structure_of(&paragraph.style)) {
            (Slot::Heading, Some(Structure::Body)) => true,
            (Slot::Content, Some(Structure::Heading)) => true,
            _ => false,
        }
    }

    pub fn empty_paragraph(&self, style: &str) -> Paragraph {
        Paragraph::empty(style, self.config.vernacular_ws)
    }

    pub fn placeholder_heading(&self, context: Context) -> Paragraph {
        self.empty_paragraph(default_heading_style(context, &self.config.styles))
    }

    /// Empty body paragraph to follow a heading of `heading_style`.
    pub fn placeholder_body_after(&self, heading_style: &str) -> Paragraph {
        self.empty_paragraph(
            self.stylesheet
                .body_style_after(heading_style, &self.config.styles),
        )
    }

    // ------------------------------------------------------------------------
    // Paragraph primitives
    // ------------------------------------------------------------------------

    /// Splits a paragraph at a character offset. The tail becomes a new
    /// paragraph with the same style right after it; back translations are
    /// divided by text.
    pub fn split_paragraph(&mut self, loc: TextLoc, idx: usize, offset: usize) -> bool {
        let config = self.config;
        let Some(paragraph) = self.paragraph_mut(loc, idx) else {
            return false;
        };
        let mut tail_runs = split_runs(&mut paragraph.runs, offset);
        let tail_marker = first_marker(&tail_runs, config);
        let tail_bts =
            split_back_translations(&mut paragraph.back_translations, tail_marker, config);
        prune_and_merge_runs(&mut paragraph.runs, config);
        prune_and_merge_runs(&mut tail_runs, config);

        let mut tail = Paragraph::new(paragraph.style.clone()).with_runs(tail_runs);
        tail.back_translations = tail_bts;

        if let Some(text) = self.text_mut(loc) {
            text.paragraphs.insert(idx + 1, tail);
        }
        if self.anchor.loc == loc {
            if self.anchor.paragraph == idx && self.anchor.offset >= offset {
                self.anchor.paragraph = idx + 1;
                self.anchor.offset -= offset;
            } else if self.anchor.paragraph > idx {
                self.anchor.paragraph += 1;
            }
        }
        true
    }

    pub fn insert_paragraph(&mut self, loc: TextLoc, at: usize, paragraph: Paragraph) {
        let Some(text) = self.text_mut(loc) else {
            return;
        };
        let at = at.min(text.len());
        text.paragraphs.insert(at, paragraph);
        if self.anchor.loc == loc && self.anchor.paragraph >= at {
            self.anchor.paragraph += 1;
        }
    }

    /// Removes one paragraph. A cursor inside it moves to the start of
    /// whatever takes its place.
    pub fn remove_paragraph(&mut self, loc: TextLoc, at: usize) -> Option<Paragraph> {
        let text = self.text_mut(loc)?;
        if at >= text.len() {
            return None;
        }
        let removed = text.paragraphs.remove(at);
        if self.anchor.loc == loc {
            if self.anchor.paragraph > at {
                self.anchor.paragraph -= 1;
            } else if self.anchor.paragraph == at {
                self.anchor.offset = 0;
            }
        }
        Some(removed)
    }

    /// Moves `range` of `from` so that it starts at index `at` of `to`. When
    /// both are the same text, `at` counts after the removal.
    pub fn move_paragraphs(&mut self, from: TextLoc, range: Range<usize>, to: TextLoc, at: usize) {
        if self.text(to).is_none() {
            return;
        }
        let Some(source) = self.text_mut(from) else {
            return;
        };
        let end = range.end.min(source.len());
        let start = range.start.min(end);
        let moved: Vec<Paragraph> = source.paragraphs.drain(start..end).collect();
        let count = moved.len();

        let mut carried = None;
        if self.anchor.loc == from {
            if (start..end).contains(&self.anchor.paragraph) {
                carried = Some(self.anchor.paragraph - start);
            } else if self.anchor.paragraph >= end {
                self.anchor.paragraph -= count;
            }
        }

        let Some(dest) = self.text_mut(to) else {
            return;
        };
        let at = at.min(dest.len());
        dest.paragraphs.splice(at..at, moved);

        match carried {
            Some(index) => {
                self.anchor.loc = to;
                self.anchor.paragraph = at + index;
            }
            None if self.anchor.loc == to && self.anchor.paragraph >= at => {
                self.anchor.paragraph += count;
            }
            None => {}
        }
    }

    /// Joins two paragraphs adjacent in reading order and leaves the cursor
    /// at the join point. An empty paragraph is dropped outright, so the
    /// other keeps its style and slot; otherwise the second is appended to
    /// the first, back translations included.
    pub fn join_paragraphs(&mut self, first: (TextLoc, usize), second: (TextLoc, usize)) {
        let config = self.config;
        let (first_loc, first_idx) = first;
        let (second_loc, second_idx) = second;
        let first_empty = self.paragraph(first_loc, first_idx).is_none_or(Paragraph::is_empty);
        let second_empty = self
            .paragraph(second_loc, second_idx)
            .is_none_or(Paragraph::is_empty);

        if second_empty {
            self.remove_paragraph(second_loc, second_idx);
            let len = self
                .paragraph(first_loc, first_idx)
                .map_or(0, Paragraph::char_len);
            self.anchor = Anchor::new(first_loc, first_idx, len);
            return;
        }
        if first_empty {
            self.remove_paragraph(first_loc, first_idx);
            let idx = if first_loc == second_loc {
                second_idx.saturating_sub(1)
            } else {
                second_idx
            };
            self.anchor = Anchor::new(second_loc, idx, 0);
            return;
        }

        let Some(absorbed) = self.remove_paragraph(second_loc, second_idx) else {
            return;
        };
        let Some(receiver) = self.paragraph_mut(first_loc, first_idx) else {
            return;
        };
        let join_offset = receiver.char_len();
        receiver.runs.extend(absorbed.runs);
        prune_and_merge_runs(&mut receiver.runs, config);
        merge_back_translations(&mut receiver.back_translations, absorbed.back_translations, config);
        self.anchor = Anchor::new(first_loc, first_idx, join_offset);
    }

    /// Takes the chapter/verse numbers off the start of a paragraph.
    pub fn detach_leading_markers(&mut self, loc: TextLoc, idx: usize) -> Vec<Run> {
        let config = self.config;
        let Some(paragraph) = self.paragraph_mut(loc, idx) else {
            return Vec::new();
        };
        let count = leading_marker_runs(&paragraph.runs, config);
        if count == 0 {
            return Vec::new();
        }
        let mut detached: Vec<Run> = paragraph.runs.drain(..count).collect();
        prune_and_merge_runs(&mut paragraph.runs, config);
        let len = runs_char_len(&detached);
        detached.retain(|run| !run.is_empty());

        if self.anchor.loc == loc && self.anchor.paragraph == idx {
            self.anchor.offset = self.anchor.offset.saturating_sub(len);
        }
        detached
    }

    pub fn prepend_runs(&mut self, loc: TextLoc, idx: usize, runs: Vec<Run>) {
        if runs.is_empty() {
            return;
        }
        let config = self.config;
        let len = runs_char_len(&runs);
        let Some(paragraph) = self.paragraph_mut(loc, idx) else {
            return;
        };
        paragraph.runs.splice(0..0, runs);
        prune_and_merge_runs(&mut paragraph.runs, config);
        if self.anchor.loc == loc && self.anchor.paragraph == idx {
            self.anchor.offset += len;
        }
    }

    /// Inserts `run` at a character offset, dividing the run it falls into.
    pub fn insert_run(&mut self, loc: TextLoc, idx: usize, offset: usize, run: Run) {
        let config = self.config;
        let len = run.char_len();
        let Some(paragraph) = self.paragraph_mut(loc, idx) else {
            return;
        };
        let mut tail = split_runs(&mut paragraph.runs, offset);
        paragraph.runs.push(run);
        paragraph.runs.append(&mut tail);
        prune_and_merge_runs(&mut paragraph.runs, config);
        if self.anchor.loc == loc && self.anchor.paragraph == idx && self.anchor.offset >= offset {
            self.anchor.offset += len;
        }
    }

    /// Replaces the text of the marker run starting at character `start`.
    pub fn rewrite_marker(&mut self, loc: TextLoc, idx: usize, start: usize, text: String) -> bool {
        let config = self.config;
        let Some(paragraph) = self.paragraph_mut(loc, idx) else {
            return false;
        };
        let mut pos = 0;
        for run in &mut paragraph.runs {
            if pos == start && is_marker_run(run, config) && !run.is_empty() {
                run.text = text;
                return true;
            }
            pos += run.char_len();
        }
        false
    }

    /// Deletes characters `from..to` of one paragraph.
    pub fn delete_in_paragraph(&mut self, loc: TextLoc, idx: usize, from: usize, to: usize) {
        let config = self.config;
        let Some(paragraph) = self.paragraph_mut(loc, idx) else {
            return;
        };
        delete_chars(&mut paragraph.runs, from, to);
        prune_and_merge_runs(&mut paragraph.runs, config);
        if self.anchor.loc == loc && self.anchor.paragraph == idx && self.anchor.offset > from {
            self.anchor.offset = self.anchor.offset.saturating_sub(to - from).max(from);
        }
    }

    /// Deletes everything from `(idx, offset)` to the end of the text.
    pub fn truncate_text(&mut self, loc: TextLoc, idx: usize, offset: usize) {
        let len = self.paragraph(loc, idx).map_or(0, Paragraph::char_len);
        self.delete_in_paragraph(loc, idx, offset, len);
        if let Some(text) = self.text_mut(loc) {
            text.paragraphs.truncate(idx + 1);
        }
        if self.anchor.loc == loc && self.anchor.paragraph > idx {
            self.anchor = Anchor::new(loc, idx, offset);
        }
    }

    /// Deletes everything from the start of the text to `(idx, offset)`.
    pub fn trim_text(&mut self, loc: TextLoc, idx: usize, offset: usize) {
        self.delete_in_paragraph(loc, idx, 0, offset);
        if let Some(text) = self.text_mut(loc) {
            text.paragraphs.drain(..idx.min(text.len()));
        }
        if self.anchor.loc == loc {
            if self.anchor.paragraph < idx {
                self.anchor.paragraph = 0;
                self.anchor.offset = 0;
            } else {
                self.anchor.paragraph -= idx;
            }
        }
    }

    /// Removes every paragraph of a text. The text must be refilled or
    /// resolved before the edit finishes.
    pub fn clear_text(&mut self, loc: TextLoc) {
        if let Some(text) = self.text_mut(loc) {
            text.paragraphs.clear();
        }
    }

    // ------------------------------------------------------------------------
    // Section primitives
    // ------------------------------------------------------------------------

    pub fn insert_section(&mut self, at: usize, section: Section) {
        let at = at.min(self.book.sections.len());
        self.book.sections.insert(at, section);
        if !self.anchor.loc.is_title() && self.anchor.loc.section >= at {
            self.anchor.loc.section += 1;
        }
    }

    /// Removes whole sections. A cursor inside them moves to the start of
    /// the section that follows.
    pub fn remove_sections(&mut self, range: Range<usize>) {
        let end = range.end.min(self.book.sections.len());
        let start = range.start.min(end);
        if start == end {
            return;
        }
        self.book.sections.drain(start..end);
        if self.anchor.loc.is_title() {
            return;
        }
        let section = self.anchor.loc.section;
        if section >= end {
            self.anchor.loc.section -= end - start;
        } else if section >= start {
            self.anchor = Anchor::new(TextLoc::heading(start), 0, 0);
        }
    }

    /// Appends the heading and content of `section` to those of the section
    /// before it and drops it.
    pub fn merge_with_previous(&mut self, section: usize) {
        if section == 0 || section >= self.book.sections.len() {
            return;
        }
        let removed = self.book.sections.remove(section);
        let previous = &mut self.book.sections[section - 1];
        let heading_len = previous.heading.len();
        let content_len = previous.content.len();
        previous.heading.paragraphs.extend(removed.heading.paragraphs);
        previous.content.paragraphs.extend(removed.content.paragraphs);

        if self.anchor.loc.is_title() {
            return;
        }
        if self.anchor.loc.section == section {
            self.anchor.loc.section = section - 1;
            self.anchor.paragraph += match self.anchor.loc.slot {
                Slot::Heading => heading_len,
                _ => content_len,
            };
        } else if self.anchor.loc.section > section {
            self.anchor.loc.section -= 1;
        }
    }

    /// True when the references of `first` and the section right after it
    /// meet without going backwards.
    fn references_meet(&self, first: usize) -> bool {
        match (self.book.sections.get(first), self.book.sections.get(first + 1)) {
            (Some(a), Some(b)) => a.ref_max() <= b.ref_min(),
            _ => false,
        }
    }

    /// Repairs texts left without paragraphs. A section without heading
    /// merges into the previous section, a section without content merges
    /// with the next one, when their contexts are compatible and their
    /// references meet; otherwise a placeholder paragraph fills the gap.
    /// Sections left with nothing at all are dropped unless they are the
    /// last of the book, which keeps the context the book opened with.
    pub fn resolve_empty_texts(&mut self) {
        if self.book.title.is_empty() {
            let title = self.empty_paragraph(&self.config.styles.title_main);
            self.book.title.paragraphs.push(title);
        }
        refresh_references(&mut self.book, 0, self.stylesheet, self.config);

        let mut s = 0;
        while s < self.book.sections.len() {
            let heading_empty = self.book.sections[s].heading.is_empty();
            let content_empty = self.book.sections[s].content.is_empty();
            let count = self.book.sections.len();
            match (heading_empty, content_empty) {
                (false, false) => s += 1,
                (true, true) if count > 1 => {
                    tracing::debug!(section = s, "dropping emptied section");
                    self.remove_sections(s..s + 1);
                }
                (true, true) => {
                    tracing::debug!(context = ?self.opening_context, "refilling emptied book");
                    let section = placeholder_section(self.opening_context, self.stylesheet, self.config);
                    self.book.sections[s] = section;
                    s += 1;
                }
                (true, false) => {
                    let context = self.section_context(s);
                    if s > 0
                        && self.section_context(s - 1).is_compatible_with(context)
                        && self.references_meet(s - 1)
                    {
                        tracing::debug!(section = s, "merging headingless section into previous");
                        self.merge_with_previous(s);
                    } else {
                        let heading = self.placeholder_heading(context);
                        self.book.sections[s].heading.paragraphs.push(heading);
                        s += 1;
                    }
                }
                (false, true) => {
                    let context = self.section_context(s);
                    if s + 1 < count
                        && self.section_context(s + 1).is_compatible_with(context)
                        && self.references_meet(s)
                    {
                        tracing::debug!(section = s, "merging contentless section with next");
                        self.merge_with_previous(s + 1);
                    } else {
                        let style = self.book.sections[s]
                            .heading
                            .paragraphs
                            .last()
                            .map(|p| p.style.clone())
                            .unwrap_or_default();
                        let body = self.placeholder_body_after(&style);
                        self.book.sections[s].content.paragraphs.push(body);
                        s += 1;
                    }
                }
            }
        }
    }

    /// Clamps the cursor into the document after paragraphs or sections it
    /// pointed into were removed.
    fn normalize_anchor(&mut self) {
        let sections = self.book.sections.len();
        if !self.anchor.loc.is_title() && self.anchor.loc.section >= sections {
            self.anchor = Anchor::new(TextLoc::content(sections.saturating_sub(1)), usize::MAX, 0);
        }
        let len = self.text_len(self.anchor.loc);
        if len == 0 {
            self.anchor = Anchor::new(TextLoc::title(), 0, 0);
            return;
        }
        if self.anchor.paragraph >= len {
            self.anchor.paragraph = len - 1;
            self.anchor.offset = usize::MAX;
        }
        let chars = self
            .paragraph(self.anchor.loc, self.anchor.paragraph)
            .map_or(0, Paragraph::char_len);
        self.anchor.offset = self.anchor.offset.min(chars);
    }
}
