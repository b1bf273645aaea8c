use super::*;

use super::cursor::TextLoc;
use crate::config::StyleNames;
use crate::model::{Run, Section, Text};
use crate::stylesheet::Context;
use crate::versification::VersificationTable;

fn heading(text: &str) -> Paragraph {
    Paragraph::new("Section Head").with_text(text)
}

fn body(text: &str) -> Paragraph {
    Paragraph::new("Paragraph").with_text(text)
}

fn book(canonical_num: u32, name: &str, sections: Vec<Section>) -> Book {
    Book::new(canonical_num)
        .with_title(vec![Paragraph::new("Title Main").with_text(name)])
        .with_sections(sections)
}

fn editor_with(books: Vec<Book>) -> ScriptureEditor {
    ScriptureEditor::new(
        Scripture::new().with_books(books),
        Stylesheet::standard(&StyleNames::default()),
        VersificationTable::new(),
    )
}

fn single_book(sections: Vec<Section>) -> ScriptureEditor {
    editor_with(vec![book(1, "Genesis", sections)])
}

fn texts(text: &Text) -> Vec<String> {
    text.paragraphs.iter().map(Paragraph::text).collect()
}

fn backspace(editor: &mut ScriptureEditor, at: Position) -> Result<EditOutcome> {
    editor.on_structural_boundary_problem(
        &Selection::point(at),
        ProblemKind::BackspaceAtStartOfParagraph,
    )
}

fn delete(editor: &mut ScriptureEditor, at: Position) -> Result<EditOutcome> {
    editor.on_structural_boundary_problem(&Selection::point(at), ProblemKind::DeleteAtEndOfParagraph)
}

fn delete_range(editor: &mut ScriptureEditor, from: Position, to: Position) -> Result<EditOutcome> {
    editor.on_structural_boundary_problem(
        &Selection::new(from, to),
        ProblemKind::ComplexRangeDeletion,
    )
}

#[test]
fn backspace_into_empty_heading_merges_sections() {
    let mut editor = single_book(vec![
        Section::new(vec![heading("First")], vec![body("One.")]),
        Section::new(vec![Paragraph::new("Section Head")], vec![body("Two.")]),
    ]);

    let outcome = backspace(&mut editor, Position::content(0, 1, 0, 0)).unwrap();

    assert_eq!(outcome, EditOutcome::Applied(Position::content(0, 0, 1, 0)));
    let sections = &editor.scripture().books[0].sections;
    assert_eq!(sections.len(), 1);
    assert_eq!(texts(&sections[0].heading), vec!["First"]);
    assert_eq!(texts(&sections[0].content), vec!["One.", "Two."]);
}

#[test]
fn backspace_joins_paragraphs_within_content() {
    let mut editor = single_book(vec![Section::new(
        vec![heading("Head")],
        vec![body("One."), body("Two.")],
    )]);

    let outcome = backspace(&mut editor, Position::content(0, 0, 1, 0)).unwrap();

    assert_eq!(outcome, EditOutcome::Applied(Position::content(0, 0, 0, 4)));
    assert_eq!(
        texts(&editor.scripture().books[0].sections[0].content),
        vec!["One.Two."]
    );
}

#[test]
fn backspace_at_first_heading_stops_at_title() {
    let mut editor = single_book(vec![Section::new(vec![heading("Head")], vec![body("Text.")])]);

    assert_eq!(
        backspace(&mut editor, Position::heading(0, 0, 0, 0)),
        Ok(EditOutcome::Unsupported(UnsupportedReason::TitleBoundary))
    );
}

#[test]
fn backspace_at_book_start() {
    let mut editor = editor_with(vec![
        book(1, "Genesis", vec![Section::new(vec![heading("A")], vec![body("a")])]),
        book(2, "Exodus", vec![Section::new(vec![heading("B")], vec![body("b")])]),
    ]);

    assert_eq!(
        backspace(&mut editor, Position::title(0, 0, 0)),
        Ok(EditOutcome::NoOp)
    );
    assert_eq!(
        backspace(&mut editor, Position::title(1, 0, 0)),
        Ok(EditOutcome::Unsupported(UnsupportedReason::CrossesBookBoundary))
    );
}

#[test]
fn delete_at_heading_end_pulls_content_up() {
    let mut editor = single_book(vec![Section::new(vec![heading("Head")], vec![body("Body")])]);

    let outcome = delete(&mut editor, Position::heading(0, 0, 0, 4)).unwrap();

    assert_eq!(outcome, EditOutcome::Applied(Position::heading(0, 0, 0, 4)));
    let section = &editor.scripture().books[0].sections[0];
    assert_eq!(texts(&section.heading), vec!["HeadBody"]);
    assert_eq!(section.content.len(), 1);
    assert!(section.content.paragraphs[0].is_empty());
    assert_eq!(section.content.paragraphs[0].style, "Paragraph");
}

#[test]
fn verse_numbers_never_join_into_heading() {
    let mut editor = single_book(vec![Section::new(
        vec![heading("Head")],
        vec![Paragraph::new("Paragraph").with_runs(vec![Run::chapter(1), Run::new_text("Text")])],
    )]);
    let before = editor.scripture().clone();

    assert_eq!(
        delete(&mut editor, Position::heading(0, 0, 0, 4)),
        Ok(EditOutcome::Unsupported(UnsupportedReason::MarkersInHeading))
    );
    assert_eq!(editor.scripture(), &before);
}

#[test]
fn introduction_and_scripture_do_not_join() {
    let mut editor = single_book(vec![
        Section::new(
            vec![Paragraph::new("Intro Section Head").with_text("About")],
            vec![Paragraph::new("Intro Paragraph").with_text("Intro text")],
        ),
        Section::new(vec![heading("Creation")], vec![body("Text.")]),
    ]);

    assert_eq!(
        backspace(&mut editor, Position::heading(0, 1, 0, 0)),
        Ok(EditOutcome::Unsupported(UnsupportedReason::ContextMismatch))
    );
}

#[test]
fn delete_at_end_of_last_book_is_noop() {
    let mut editor = single_book(vec![Section::new(vec![heading("Head")], vec![body("End")])]);

    assert_eq!(
        delete(&mut editor, Position::content(0, 0, 0, 3)),
        Ok(EditOutcome::NoOp)
    );
}

#[test]
fn heading_to_heading_deletion_drops_a_section() {
    let mut editor = single_book(vec![
        Section::new(vec![heading("H0")], vec![body("A")]),
        Section::new(vec![heading("H1")], vec![body("B")]),
        Section::new(vec![heading("H2")], vec![body("C")]),
    ]);

    let outcome = delete_range(
        &mut editor,
        Position::heading(0, 0, 0, 0),
        Position::heading(0, 1, 0, 0),
    )
    .unwrap();

    assert_eq!(outcome, EditOutcome::Applied(Position::heading(0, 0, 0, 0)));
    let sections = &editor.scripture().books[0].sections;
    assert_eq!(sections.len(), 2);
    assert_eq!(texts(&sections[0].heading), vec!["H1"]);
    assert_eq!(texts(&sections[0].content), vec!["B"]);
    assert_eq!(texts(&sections[1].heading), vec!["H2"]);
}

#[test]
fn collapsed_range_deletion_is_noop() {
    let mut editor = single_book(vec![Section::new(vec![heading("Head")], vec![body("Text")])]);
    let at = Position::content(0, 0, 0, 2);

    assert_eq!(delete_range(&mut editor, at, at), Ok(EditOutcome::NoOp));
}

#[test]
fn range_within_paragraph_deletes_characters() {
    let mut editor = single_book(vec![Section::new(vec![heading("Head")], vec![body("Hello world")])]);

    // Ends may be given in either order.
    let outcome = delete_range(
        &mut editor,
        Position::content(0, 0, 0, 7),
        Position::content(0, 0, 0, 2),
    )
    .unwrap();

    assert_eq!(outcome, EditOutcome::Applied(Position::content(0, 0, 0, 2)));
    assert_eq!(
        texts(&editor.scripture().books[0].sections[0].content),
        vec!["Heorld"]
    );
}

#[test]
fn content_to_content_deletion_merges_sections() {
    let mut editor = single_book(vec![
        Section::new(vec![heading("H0")], vec![body("Alpha beta")]),
        Section::new(vec![heading("H1")], vec![body("Gamma delta")]),
    ]);

    let outcome = delete_range(
        &mut editor,
        Position::content(0, 0, 0, 6),
        Position::content(0, 1, 0, 6),
    )
    .unwrap();

    assert_eq!(outcome, EditOutcome::Applied(Position::content(0, 0, 0, 6)));
    let sections = &editor.scripture().books[0].sections;
    assert_eq!(sections.len(), 1);
    assert_eq!(texts(&sections[0].heading), vec!["H0"]);
    assert_eq!(texts(&sections[0].content), vec!["Alpha delta"]);
}

#[test]
fn deletion_across_books_keeps_both_remainders() {
    let mut editor = editor_with(vec![
        book(1, "Genesis", vec![Section::new(vec![heading("A")], vec![body("Alpha beta")])]),
        book(2, "Exodus", vec![Section::new(vec![heading("B")], vec![body("Gamma delta")])]),
    ]);

    let outcome = delete_range(
        &mut editor,
        Position::content(0, 0, 0, 6),
        Position::content(1, 0, 0, 6),
    )
    .unwrap();

    assert_eq!(outcome, EditOutcome::Applied(Position::content(0, 0, 0, 6)));
    let books = &editor.scripture().books;
    assert_eq!(books.len(), 2);
    assert_eq!(texts(&books[0].sections[0].content), vec!["Alpha "]);
    assert_eq!(texts(&books[1].sections[0].content), vec!["delta"]);
    assert_eq!(editor.check_invariants(), Ok(()));
}

#[test]
fn deleting_everything_leaves_placeholder_book() {
    let mut editor = editor_with(vec![
        book(1, "Genesis", vec![Section::new(vec![heading("A")], vec![body("Alpha")])]),
        book(2, "Exodus", vec![Section::new(vec![heading("B")], vec![body("Beta")])]),
    ]);

    let outcome = delete_range(
        &mut editor,
        Position::title(0, 0, 0),
        Position::content(1, 0, 0, 4),
    )
    .unwrap();

    assert_eq!(outcome, EditOutcome::Applied(Position::title(0, 0, 0)));
    let books = &editor.scripture().books;
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].canonical_num, 1);
    assert_eq!(books[0].sections.len(), 1);
    assert!(books[0].sections[0].content.paragraphs[0].is_empty());
    assert_eq!(editor.check_invariants(), Ok(()));
}

/// Clears `cleared` in a working copy of the first book and repairs it.
fn resolved_after_clearing(editor: &ScriptureEditor, cleared: &[TextLoc]) -> Book {
    let book = editor.scripture().books[0].clone();
    let anchor = Anchor::new(TextLoc::content(0), 0, 0);
    let mut edit = BookEdit::new(book, anchor, editor.stylesheet(), editor.config());
    for &loc in cleared {
        edit.clear_text(loc);
    }
    edit.resolve_empty_texts();
    edit.finish().0
}

fn verses(first: Vec<Run>) -> Paragraph {
    Paragraph::new("Paragraph").with_runs(first)
}

#[test]
fn backspace_keeps_sections_whose_references_do_not_meet() {
    let mut editor = single_book(vec![
        Section::new(
            vec![heading("First")],
            vec![verses(vec![
                Run::chapter(1),
                Run::new_text("One. "),
                Run::verse(5),
                Run::new_text("Five."),
            ])],
        ),
        Section::new(
            vec![Paragraph::new("Section Head")],
            vec![verses(vec![Run::verse(3), Run::new_text("Three.")])],
        ),
    ]);
    let before = editor.scripture().clone();

    let outcome = backspace(&mut editor, Position::content(0, 1, 0, 0)).unwrap();

    assert_eq!(outcome, EditOutcome::NoOp);
    assert_eq!(editor.scripture(), &before);
    assert_eq!(editor.scripture().books[0].sections.len(), 2);
}

#[test]
fn contentless_section_merges_only_when_references_meet() {
    let sections = |next_verse: u32| {
        vec![
            Section::new(
                vec![heading("First")],
                vec![verses(vec![
                    Run::chapter(1),
                    Run::new_text("One. "),
                    Run::verse(5),
                    Run::new_text("Five."),
                ])],
            ),
            Section::new(vec![heading("Later")], vec![body("Gone")]),
            Section::new(
                vec![heading("Next")],
                vec![verses(vec![Run::verse(next_verse), Run::new_text("More.")])],
            ),
        ]
    };

    let editor = single_book(sections(3));
    let book = resolved_after_clearing(&editor, &[TextLoc::content(1)]);
    assert_eq!(book.sections.len(), 3);
    assert_eq!(texts(&book.sections[1].heading), vec!["Later"]);
    assert_eq!(texts(&book.sections[1].content), vec![""]);
    assert_eq!(book.sections[1].content.paragraphs[0].style, "Paragraph");

    let editor = single_book(sections(6));
    let book = resolved_after_clearing(&editor, &[TextLoc::content(1)]);
    assert_eq!(book.sections.len(), 2);
    assert_eq!(texts(&book.sections[1].heading), vec!["Later", "Next"]);
    assert_eq!(texts(&book.sections[1].content), vec!["6More."]);
}

#[test]
fn emptied_introduction_book_keeps_an_introduction_section() {
    let editor = single_book(vec![Section::new(
        vec![Paragraph::new("Intro Section Head").with_text("About")],
        vec![Paragraph::new("Intro Paragraph").with_text("This book.")],
    )]);

    let book = resolved_after_clearing(
        &editor,
        &[TextLoc::heading(0), TextLoc::content(0)],
    );

    assert_eq!(book.sections.len(), 1);
    assert_eq!(book.sections[0].heading.paragraphs[0].style, "Intro Section Head");
    assert_eq!(
        editor.stylesheet().section_context(&book.sections[0]),
        Context::Introduction
    );
    assert!(book.sections[0].content.paragraphs[0].is_empty());
}
