use super::Position;
use super::cursor::TextLoc;
use crate::config::EditorConfig;
use crate::error::InvariantViolation;
use crate::model::{Book, Paragraph, Scripture, Slot};
use crate::reference::{is_marker_run, scan_section};
use crate::stylesheet::{Structure, Stylesheet};

pub fn paragraph_ref<'a>(scripture: &'a Scripture, position: &Position) -> Option<&'a Paragraph> {
    scripture
        .books
        .get(position.book)?
        .text(position.section, position.slot)?
        .get(position.paragraph)
}

/// The text before `loc` in reading order, within one book.
pub(crate) fn previous_loc(loc: TextLoc) -> Option<TextLoc> {
    match loc.slot {
        Slot::Title => None,
        Slot::Heading if loc.section == 0 => Some(TextLoc::title()),
        Slot::Heading => Some(TextLoc::content(loc.section - 1)),
        Slot::Content => Some(TextLoc::heading(loc.section)),
    }
}

/// The text after `loc` in reading order, within one book.
pub(crate) fn next_loc(book: &Book, loc: TextLoc) -> Option<TextLoc> {
    let next = match loc.slot {
        Slot::Title => TextLoc::heading(0),
        Slot::Heading => TextLoc::content(loc.section),
        Slot::Content => TextLoc::heading(loc.section + 1),
    };
    (next.section < book.sections.len()).then_some(next)
}

/// Checks every invariant, including that sections are ordered by their
/// first reference.
pub fn check_invariants(
    scripture: &Scripture,
    stylesheet: &Stylesheet,
    config: &EditorConfig,
) -> Result<(), InvariantViolation> {
    check_scripture(scripture, stylesheet, config, true)
}

/// Checks the invariants every edit maintains. Reference order is left out:
/// deleting a chapter number from the text can legitimately invert it.
pub fn check_structure(
    scripture: &Scripture,
    stylesheet: &Stylesheet,
    config: &EditorConfig,
) -> Result<(), InvariantViolation> {
    check_scripture(scripture, stylesheet, config, false)
}

fn check_scripture(
    scripture: &Scripture,
    stylesheet: &Stylesheet,
    config: &EditorConfig,
    ordered: bool,
) -> Result<(), InvariantViolation> {
    if scripture.books.is_empty() {
        return Err(InvariantViolation::NoBooks);
    }
    for (b, book) in scripture.books.iter().enumerate() {
        check_book(b, book, stylesheet, config, ordered)?;
    }
    Ok(())
}

fn check_book(
    b: usize,
    book: &Book,
    stylesheet: &Stylesheet,
    config: &EditorConfig,
    ordered: bool,
) -> Result<(), InvariantViolation> {
    if book.title.is_empty() {
        return Err(InvariantViolation::EmptyText {
            book: b,
            section: 0,
            slot: Slot::Title,
        });
    }
    if book.sections.is_empty() {
        return Err(InvariantViolation::NoSections { book: b });
    }

    for (s, section) in book.sections.iter().enumerate() {
        for slot in [Slot::Heading, Slot::Content] {
            let Some(text) = section.text(slot) else {
                continue;
            };
            if text.is_empty() {
                return Err(InvariantViolation::EmptyText {
                    book: b,
                    section: s,
                    slot,
                });
            }
            let expected = match slot {
                Slot::Heading => Structure::Heading,
                _ => Structure::Body,
            };
            for (p, paragraph) in text.paragraphs.iter().enumerate() {
                if stylesheet
                    .structure_of(&paragraph.style)
                    .is_some_and(|structure| structure != expected)
                {
                    return Err(InvariantViolation::MisplacedParagraph {
                        book: b,
                        section: s,
                        slot,
                        paragraph: p,
                        style: paragraph.style.clone(),
                    });
                }
                if slot == Slot::Heading
                    && paragraph
                        .runs
                        .iter()
                        .any(|run| is_marker_run(run, config) && !run.is_empty())
                {
                    return Err(InvariantViolation::MarkerInHeading {
                        book: b,
                        section: s,
                        paragraph: p,
                    });
                }
            }
        }

        if scan_section(book, s, stylesheet, config) != Some((section.ref_min(), section.ref_max())) {
            return Err(InvariantViolation::StaleReferences { book: b, section: s });
        }
        if ordered && s > 0 && section.ref_min() < book.sections[s - 1].ref_min() {
            return Err(InvariantViolation::OutOfOrder { book: b, section: s });
        }
    }
    Ok(())
}
