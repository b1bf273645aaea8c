//! Document model for translated Scripture books.
//!
//! The tree is strictly owned: a [`Scripture`] owns its [`Book`]s, a book owns
//! its title [`Text`] and its [`Section`]s, a section owns exactly one heading
//! and one content text, a text owns [`Paragraph`]s and a paragraph owns its
//! [`Run`]s. Content is addressed by index paths (see
//! [`Position`](crate::editor::Position)); there are no back-pointers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{CHAPTER_NUMBER, VERSE_NUMBER};
use crate::reference::ScrReference;

/// Writing system identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WsId(pub u32);

/// The text containers a paragraph can live in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Title,
    Heading,
    Content,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    /// Character style; `None` means the paragraph's style applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default)]
    pub ws: WsId,
}

impl Run {
    pub fn new_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
            ws: WsId::default(),
        }
    }

    pub fn styled(text: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Some(style.into()),
            ws: WsId::default(),
        }
    }

    /// A chapter number run using the standard style name.
    pub fn chapter(number: impl ToString) -> Self {
        Self::styled(number.to_string(), CHAPTER_NUMBER)
    }

    /// A verse number (or bridge, e.g. `"6-8"`) run using the standard style name.
    pub fn verse(number: impl ToString) -> Self {
        Self::styled(number.to_string(), VERSE_NUMBER)
    }

    pub fn with_ws(mut self, ws: WsId) -> Self {
        self.ws = ws;
        self
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn has_style(&self, name: &str) -> bool {
        self.style.as_deref() == Some(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub style: String,
    pub runs: Vec<Run>,
    /// Back translations keyed by writing system. Each is a run sequence of
    /// its own and may carry chapter/verse numbers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub back_translations: BTreeMap<WsId, Vec<Run>>,
}

impl Paragraph {
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            runs: Vec::new(),
            back_translations: BTreeMap::new(),
        }
    }

    /// An empty paragraph holding a single empty run.
    pub fn empty(style: impl Into<String>, ws: WsId) -> Self {
        Self::new(style).with_runs(vec![Run::new_text("").with_ws(ws)])
    }

    pub fn with_runs(mut self, runs: Vec<Run>) -> Self {
        self.runs = runs;
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_runs(vec![Run::new_text(text)])
    }

    pub fn with_back_translation(mut self, ws: WsId, runs: Vec<Run>) -> Self {
        self.back_translations.insert(ws, runs);
        self
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.runs.iter().map(Run::char_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(Run::is_empty)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Text {
    pub paragraphs: Vec<Paragraph>,
}

impl Text {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        self.paragraphs.get_mut(index)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub heading: Text,
    pub content: Text,
    #[serde(skip)]
    pub(crate) ref_min: ScrReference,
    #[serde(skip)]
    pub(crate) ref_max: ScrReference,
}

impl Section {
    pub fn new(heading: Vec<Paragraph>, content: Vec<Paragraph>) -> Self {
        Self {
            heading: Text::new(heading),
            content: Text::new(content),
            ref_min: ScrReference::default(),
            ref_max: ScrReference::default(),
        }
    }

    /// First reference covered by the content. Kept fresh by the editor.
    pub fn ref_min(&self) -> ScrReference {
        self.ref_min
    }

    /// Last reference covered by the content. Kept fresh by the editor.
    pub fn ref_max(&self) -> ScrReference {
        self.ref_max
    }

    pub fn text(&self, slot: Slot) -> Option<&Text> {
        match slot {
            Slot::Heading => Some(&self.heading),
            Slot::Content => Some(&self.content),
            Slot::Title => None,
        }
    }

    pub fn text_mut(&mut self, slot: Slot) -> Option<&mut Text> {
        match slot {
            Slot::Heading => Some(&mut self.heading),
            Slot::Content => Some(&mut self.content),
            Slot::Title => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Canonical book number (1 = Genesis).
    pub canonical_num: u32,
    pub title: Text,
    pub sections: Vec<Section>,
}

impl Book {
    pub fn new(canonical_num: u32) -> Self {
        Self {
            canonical_num,
            title: Text::default(),
            sections: Vec::new(),
        }
    }

    pub fn with_title(mut self, paragraphs: Vec<Paragraph>) -> Self {
        self.title = Text::new(paragraphs);
        self
    }

    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = sections;
        self
    }

    /// The text addressed by `slot`; `section` is ignored for the title.
    pub fn text(&self, section: usize, slot: Slot) -> Option<&Text> {
        match slot {
            Slot::Title => Some(&self.title),
            _ => self.sections.get(section)?.text(slot),
        }
    }

    pub fn text_mut(&mut self, section: usize, slot: Slot) -> Option<&mut Text> {
        match slot {
            Slot::Title => Some(&mut self.title),
            _ => self.sections.get_mut(section)?.text_mut(slot),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scripture {
    pub books: Vec<Book>,
}

impl Scripture {
    pub fn new() -> Self {
        Self { books: Vec::new() }
    }

    pub fn with_books(mut self, books: Vec<Book>) -> Self {
        self.books = books;
        self
    }

    pub fn book(&self, index: usize) -> Option<&Book> {
        self.books.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraph_text_concatenates_runs() {
        let paragraph = Paragraph::new("Paragraph").with_runs(vec![
            Run::chapter(3),
            Run::verse("4-5"),
            Run::new_text("Grace and peace."),
        ]);
        assert_eq!(paragraph.text(), "34-5Grace and peace.");
        assert_eq!(paragraph.char_len(), 20);
        assert!(!paragraph.is_empty());
        assert!(Paragraph::empty("Paragraph", WsId(1)).is_empty());
    }

    #[test]
    fn book_text_addresses_title_independently_of_section() {
        let book = Book::new(1)
            .with_title(vec![Paragraph::new("Title Main").with_text("Genesis")])
            .with_sections(vec![Section::new(
                vec![Paragraph::new("Section Head").with_text("Creation")],
                vec![Paragraph::new("Paragraph").with_text("text")],
            )]);
        assert_eq!(book.text(7, Slot::Title).map(Text::len), Some(1));
        assert_eq!(
            book.text(0, Slot::Heading).and_then(|t| t.get(0)).map(Paragraph::text),
            Some("Creation".to_string())
        );
        assert!(book.text(1, Slot::Content).is_none());
    }

    #[test]
    fn model_deserializes_without_reference_cache() {
        let json = r#"{
            "books": [{
                "canonical_num": 40,
                "title": [{"style": "Title Main", "runs": [{"text": "Matthew"}]}],
                "sections": [{
                    "heading": [{"style": "Section Head", "runs": [{"text": "Genealogy"}]}],
                    "content": [{"style": "Paragraph", "runs": [
                        {"text": "1", "style": "Chapter Number"},
                        {"text": "The book of the genealogy", "ws": 2}
                    ]}]
                }]
            }]
        }"#;
        let scripture: Scripture = serde_json::from_str(json).expect("valid fixture");
        let section = &scripture.books[0].sections[0];
        assert_eq!(section.content.paragraphs[0].runs[1].ws, WsId(2));
        assert_eq!(section.ref_min(), ScrReference::default());
    }
}
