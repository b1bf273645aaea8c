use proptest::prelude::*;

use scripture_structure::{
    Book, EditOutcome, InsertOutcome, Paragraph, Position, ProblemKind, Run, Scripture,
    ScriptureEditor, Section, Selection, Slot, StyleNames, Stylesheet, Unlimited,
};

const HEADING_STYLES: [&str; 2] = ["Section Head", "Parallel Passage Reference"];
const BODY_STYLES: [&str; 2] = ["Paragraph", "Line1"];
const WORDS: [&str; 6] = ["light ", "darkness ", "waters ", "and ", "God ", "said "];

/// Shape of a generated section: heading paragraph count, and for each
/// content paragraph its word count and whether it opens with a verse.
type SectionShape = (usize, Vec<(usize, bool)>);

#[derive(Clone, Debug)]
enum Op {
    Restyle { at: (usize, usize), to: (usize, usize), style: usize },
    CreateSection { at: (usize, usize) },
    Backspace { at: (usize, usize) },
    Delete { at: (usize, usize) },
    DeleteRange { from: (usize, usize), to: (usize, usize) },
    InsertVerse { at: (usize, usize) },
    Paste { at: (usize, usize), headings: Vec<bool> },
}

fn seed() -> impl Strategy<Value = (usize, usize)> {
    (any::<usize>(), any::<usize>())
}

fn op(with_range_deletion: bool) -> BoxedStrategy<Op> {
    let common = prop_oneof![
        (seed(), seed(), 0..4usize).prop_map(|(at, to, style)| Op::Restyle { at, to, style }),
        seed().prop_map(|at| Op::CreateSection { at }),
        seed().prop_map(|at| Op::Backspace { at }),
        seed().prop_map(|at| Op::Delete { at }),
        seed().prop_map(|at| Op::InsertVerse { at }),
        (seed(), prop::collection::vec(any::<bool>(), 1..4))
            .prop_map(|(at, headings)| Op::Paste { at, headings }),
    ];
    if with_range_deletion {
        prop_oneof![
            5 => common,
            1 => (seed(), seed()).prop_map(|(from, to)| Op::DeleteRange { from, to }),
        ]
        .boxed()
    } else {
        common.boxed()
    }
}

fn shapes() -> impl Strategy<Value = Vec<SectionShape>> {
    prop::collection::vec(
        (
            1..3usize,
            prop::collection::vec((0..6usize, any::<bool>()), 1..4),
        ),
        1..5,
    )
}

fn words(count: usize, offset: usize) -> String {
    (0..count).map(|i| WORDS[(i + offset) % WORDS.len()]).collect()
}

/// Builds a single book whose verse numbers increase through the book.
fn build_editor(shapes: &[SectionShape]) -> ScriptureEditor {
    let mut verse = 1;
    let mut sections = Vec::new();
    for (s, (headings, paragraphs)) in shapes.iter().enumerate() {
        let heading = (0..*headings)
            .map(|h| Paragraph::new(HEADING_STYLES[h % 2]).with_text(words(2, s + h)))
            .collect();
        let content = paragraphs
            .iter()
            .enumerate()
            .map(|(p, &(count, opens_with_verse))| {
                let mut runs = Vec::new();
                if s == 0 && p == 0 {
                    runs.push(Run::chapter(1));
                }
                if opens_with_verse {
                    verse += 1;
                    runs.push(Run::verse(verse));
                }
                runs.push(Run::new_text(words(count, p)));
                Paragraph::new(BODY_STYLES[p % 2]).with_runs(runs)
            })
            .collect();
        sections.push(Section::new(heading, content));
    }
    let book = Book::new(1)
        .with_title(vec![Paragraph::new("Title Main").with_text("Genesis")])
        .with_sections(sections);
    ScriptureEditor::new(
        Scripture::new().with_books(vec![book]),
        Stylesheet::standard(&StyleNames::default()),
        Unlimited,
    )
}

/// Every paragraph of the first book in reading order.
fn paragraph_positions(editor: &ScriptureEditor) -> Vec<(Position, usize)> {
    let book = &editor.scripture().books[0];
    let mut positions = Vec::new();
    for (p, paragraph) in book.title.paragraphs.iter().enumerate() {
        positions.push((Position::title(0, p, 0), paragraph.char_len()));
    }
    for (s, section) in book.sections.iter().enumerate() {
        for (slot, text) in [(Slot::Heading, &section.heading), (Slot::Content, &section.content)] {
            for (p, paragraph) in text.paragraphs.iter().enumerate() {
                positions.push((Position::new(0, s, slot, p, 0), paragraph.char_len()));
            }
        }
    }
    positions
}

fn pick(editor: &ScriptureEditor, (paragraph, offset): (usize, usize)) -> Position {
    let positions = paragraph_positions(editor);
    let (position, len) = positions[paragraph % positions.len()];
    position.with_offset(offset % (len + 1))
}

fn apply(editor: &mut ScriptureEditor, op: &Op) -> Option<Position> {
    let outcome = match op {
        Op::Restyle { at, to, style } => {
            let style = [HEADING_STYLES, BODY_STYLES].concat()[*style];
            let selection = Selection::new(pick(editor, *at), pick(editor, *to));
            editor.apply_style(&selection, style)
        }
        Op::CreateSection { at } => {
            let at = pick(editor, *at);
            editor.create_section(&at, false)
        }
        Op::Backspace { at } => editor.on_structural_boundary_problem(
            &Selection::point(pick(editor, *at)),
            ProblemKind::BackspaceAtStartOfParagraph,
        ),
        Op::Delete { at } => editor.on_structural_boundary_problem(
            &Selection::point(pick(editor, *at)),
            ProblemKind::DeleteAtEndOfParagraph,
        ),
        Op::DeleteRange { from, to } => editor.on_structural_boundary_problem(
            &Selection::new(pick(editor, *from), pick(editor, *to)),
            ProblemKind::ComplexRangeDeletion,
        ),
        Op::InsertVerse { at } => {
            let at = pick(editor, *at);
            editor.insert_verse_number(&at)
        }
        Op::Paste { at, headings } => {
            let incoming = headings
                .iter()
                .map(|&heading| {
                    let style = if heading { HEADING_STYLES[0] } else { BODY_STYLES[0] };
                    Paragraph::new(style).with_text("pasted text")
                })
                .collect();
            let at = pick(editor, *at);
            let outcome = editor
                .on_insert_differing_paragraphs(&at, incoming)
                .expect("pasting known styles");
            return match outcome {
                InsertOutcome::Done(cursor) => Some(cursor),
                InsertOutcome::Fail | InsertOutcome::DefaultToCaller => None,
            };
        }
    };
    match outcome.expect("positions are valid") {
        EditOutcome::Applied(cursor) => Some(cursor),
        EditOutcome::NoOp | EditOutcome::Unsupported(_) => None,
    }
}

fn assert_cursor_valid(editor: &ScriptureEditor, cursor: Position) -> Result<(), TestCaseError> {
    let paragraph = editor.paragraph(&cursor);
    prop_assert!(paragraph.is_some(), "cursor {} points nowhere", cursor);
    prop_assert!(paragraph.is_some_and(|p| cursor.offset <= p.char_len()));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn edits_keep_document_well_formed(
        shapes in shapes(),
        ops in prop::collection::vec(op(true), 1..12),
    ) {
        let mut editor = build_editor(&shapes);
        prop_assert_eq!(editor.check_invariants(), Ok(()));
        for op in &ops {
            let cursor = apply(&mut editor, op);
            prop_assert_eq!(editor.check_structure(), Ok(()), "after {:?}", op);
            if let Some(cursor) = cursor {
                assert_cursor_valid(&editor, cursor)?;
            }
        }
    }

    #[test]
    fn edits_keeping_text_keep_sections_ordered(
        shapes in shapes(),
        ops in prop::collection::vec(op(false), 1..12),
    ) {
        let mut editor = build_editor(&shapes);
        for op in &ops {
            apply(&mut editor, op);
            prop_assert_eq!(editor.check_invariants(), Ok(()), "after {:?}", op);
        }
    }

    #[test]
    fn unsupported_and_noop_edits_change_nothing(
        shapes in shapes(),
        op in op(true),
    ) {
        let mut editor = build_editor(&shapes);
        let before = editor.scripture().clone();
        if apply(&mut editor, &op).is_none() {
            prop_assert_eq!(editor.scripture(), &before);
        }
    }
}
