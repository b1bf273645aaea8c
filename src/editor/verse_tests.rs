use super::*;

use crate::config::StyleNames;
use crate::model::{Run, Section};
use crate::reference::ScrReference;
use crate::versification::VersificationTable;

fn heading(text: &str) -> Paragraph {
    Paragraph::new("Section Head").with_text(text)
}

fn body(runs: Vec<Run>) -> Paragraph {
    Paragraph::new("Paragraph").with_runs(runs)
}

fn editor_with_versification(
    sections: Vec<Section>,
    versification: VersificationTable,
) -> ScriptureEditor {
    let book = Book::new(1)
        .with_title(vec![Paragraph::new("Title Main").with_text("Genesis")])
        .with_sections(sections);
    ScriptureEditor::new(
        Scripture::new().with_books(vec![book]),
        Stylesheet::standard(&StyleNames::default()),
        versification,
    )
}

fn editor_with(sections: Vec<Section>) -> ScriptureEditor {
    editor_with_versification(sections, VersificationTable::new().with_book(1, vec![31, 25]))
}

fn content_runs(editor: &ScriptureEditor, section: usize, paragraph: usize) -> &[Run] {
    &editor.scripture().books[0].sections[section].content.paragraphs[paragraph].runs
}

#[test]
fn number_snaps_to_start_of_word() {
    let mut editor = editor_with(vec![Section::new(
        vec![heading("Head")],
        vec![body(vec![Run::new_text("This is a test paragraph.")])],
    )]);

    // Inside "is"
    let outcome = editor
        .insert_verse_number(&Position::content(0, 0, 0, 6))
        .unwrap();

    assert_eq!(outcome, EditOutcome::Applied(Position::content(0, 0, 0, 6)));
    assert_eq!(
        content_runs(&editor, 0, 0),
        [
            Run::new_text("This "),
            Run::verse(2),
            Run::new_text("is a test paragraph."),
        ]
    );
}

#[test]
fn number_past_end_of_chapter_is_refused() {
    let mut editor = editor_with_versification(
        vec![Section::new(
            vec![heading("Head")],
            vec![body(vec![
                Run::chapter(1),
                Run::new_text("Text "),
                Run::verse(22),
                Run::new_text("Last words."),
            ])],
        )],
        VersificationTable::new().with_book(1, vec![22]),
    );
    let before = editor.scripture().clone();

    assert_eq!(
        editor.insert_verse_number(&Position::content(0, 0, 0, 19)),
        Ok(EditOutcome::NoOp)
    );
    assert_eq!(editor.scripture(), &before);
}

#[test]
fn number_follows_previous_verse() {
    let mut editor = editor_with(vec![Section::new(
        vec![heading("Head")],
        vec![body(vec![
            Run::chapter(1),
            Run::verse(1),
            Run::new_text("In the beginning God created."),
        ])],
    )]);

    // At "God"
    let outcome = editor
        .insert_verse_number(&Position::content(0, 0, 0, 19))
        .unwrap();

    assert_eq!(outcome, EditOutcome::Applied(Position::content(0, 0, 0, 20)));
    assert_eq!(
        content_runs(&editor, 0, 0),
        [
            Run::chapter(1),
            Run::verse(1),
            Run::new_text("In the beginning "),
            Run::verse(2),
            Run::new_text("God created."),
        ]
    );
    assert_eq!(
        editor.scripture().books[0].sections[0].ref_max(),
        ScrReference::new(1, 1, 2)
    );
}

#[test]
fn number_next_to_verse_widens_it_into_bridge() {
    let mut editor = editor_with(vec![Section::new(
        vec![heading("Head")],
        vec![body(vec![Run::chapter(1), Run::verse(1), Run::new_text("Text")])],
    )]);

    let outcome = editor
        .insert_verse_number(&Position::content(0, 0, 0, 2))
        .unwrap();

    assert_eq!(outcome, EditOutcome::Applied(Position::content(0, 0, 0, 4)));
    assert_eq!(
        content_runs(&editor, 0, 0),
        [Run::chapter(1), Run::verse("1-2"), Run::new_text("Text")]
    );
    assert_eq!(
        editor.scripture().books[0].sections[0].ref_max(),
        ScrReference::new(1, 1, 2)
    );
}

#[test]
fn later_duplicate_number_is_moved_here() {
    let mut editor = editor_with(vec![Section::new(
        vec![heading("Head")],
        vec![body(vec![
            Run::chapter(1),
            Run::verse(1),
            Run::new_text("aaa bbb "),
            Run::verse(2),
            Run::new_text("ccc"),
        ])],
    )]);

    let outcome = editor
        .insert_verse_number(&Position::content(0, 0, 0, 6))
        .unwrap();

    assert_eq!(outcome, EditOutcome::Applied(Position::content(0, 0, 0, 7)));
    assert_eq!(
        content_runs(&editor, 0, 0),
        [
            Run::chapter(1),
            Run::verse(1),
            Run::new_text("aaa "),
            Run::verse(2),
            Run::new_text("bbb ccc"),
        ]
    );
}

#[test]
fn first_verse_after_chapter_number() {
    let mut editor = editor_with(vec![Section::new(
        vec![heading("Head")],
        vec![body(vec![Run::chapter(2), Run::new_text("Text")])],
    )]);

    let outcome = editor
        .insert_verse_number(&Position::content(0, 0, 0, 1))
        .unwrap();

    assert_eq!(outcome, EditOutcome::Applied(Position::content(0, 0, 0, 2)));
    assert_eq!(
        content_runs(&editor, 0, 0),
        [Run::chapter(2), Run::verse(1), Run::new_text("Text")]
    );
    assert_eq!(
        editor.scripture().books[0].sections[0].ref_min(),
        ScrReference::new(1, 2, 1)
    );
}

#[test]
fn chapter_zero_is_left_alone() {
    let mut editor = editor_with(vec![Section::new(
        vec![heading("Head")],
        vec![body(vec![Run::chapter(0), Run::new_text("Superscription")])],
    )]);

    assert_eq!(
        editor.insert_verse_number(&Position::content(0, 0, 0, 1)),
        Ok(EditOutcome::NoOp)
    );
}

#[test]
fn only_scripture_content_takes_verse_numbers() {
    let mut editor = editor_with(vec![
        Section::new(
            vec![Paragraph::new("Intro Section Head").with_text("About")],
            vec![Paragraph::new("Intro Paragraph").with_text("Intro text")],
        ),
        Section::new(
            vec![heading("Head")],
            vec![body(vec![Run::chapter(1), Run::new_text("Text")])],
        ),
    ]);
    let before = editor.scripture().clone();

    for point in [
        Position::title(0, 0, 0),
        Position::heading(0, 1, 0, 0),
        Position::content(0, 0, 0, 0),
    ] {
        assert_eq!(editor.insert_verse_number(&point), Ok(EditOutcome::NoOp));
    }
    assert_eq!(editor.scripture(), &before);
}

#[test]
fn number_past_largest_encodable_verse_is_refused() {
    let mut editor = editor_with_versification(
        vec![Section::new(
            vec![heading("Head")],
            vec![body(vec![
                Run::chapter(1),
                Run::new_text("Text "),
                Run::verse(999),
                Run::new_text("Last words."),
            ])],
        )],
        VersificationTable::new(),
    );
    let before = editor.scripture().clone();

    assert_eq!(
        editor.insert_verse_number(&Position::content(0, 0, 0, 20)),
        Ok(EditOutcome::NoOp)
    );
    assert_eq!(editor.scripture(), &before);
}
