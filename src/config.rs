//! Configuration for the structural editing engine
//!
//! Reference encoding limits are compile-time constants. Everything a host
//! project may reasonably customise (marker style names, the verse bridge
//! separator, the back translation delimiter) lives in [`EditorConfig`],
//! which deserializes from JSON with every field optional.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::WsId;

/// Multiplier of the book number in an encoded reference.
pub const BOOK_FACTOR: u32 = 1_000_000;

/// Multiplier of the chapter number in an encoded reference.
pub const CHAPTER_FACTOR: u32 = 1_000;

/// Largest chapter number the reference encoding can hold.
pub const MAX_CHAPTER: u32 = 999;

/// Largest verse number the reference encoding can hold.
pub const MAX_VERSE: u32 = 999;

/// Highest canonical book number (Revelation).
pub const MAX_CANONICAL_BOOK: u32 = 66;

pub const SECTION_HEAD: &str = "Section Head";
pub const INTRO_SECTION_HEAD: &str = "Intro Section Head";
pub const PARAGRAPH: &str = "Paragraph";
pub const INTRO_PARAGRAPH: &str = "Intro Paragraph";
pub const TITLE_MAIN: &str = "Title Main";
pub const CHAPTER_NUMBER: &str = "Chapter Number";
pub const VERSE_NUMBER: &str = "Verse Number";

/// Names of the styles the engine creates or recognises by name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleNames {
    pub section_head: String,
    pub intro_section_head: String,
    pub paragraph: String,
    pub intro_paragraph: String,
    pub title_main: String,
    pub chapter_number: String,
    pub verse_number: String,
}

impl Default for StyleNames {
    fn default() -> Self {
        Self {
            section_head: SECTION_HEAD.to_string(),
            intro_section_head: INTRO_SECTION_HEAD.to_string(),
            paragraph: PARAGRAPH.to_string(),
            intro_paragraph: INTRO_PARAGRAPH.to_string(),
            title_main: TITLE_MAIN.to_string(),
            chapter_number: CHAPTER_NUMBER.to_string(),
            verse_number: VERSE_NUMBER.to_string(),
        }
    }
}

impl StyleNames {
    pub fn is_marker_style(&self, name: &str) -> bool {
        name == self.chapter_number || name == self.verse_number
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Separator between the two numbers of a verse bridge (`6-8`).
    pub bridge_separator: char,
    /// Inserted between two back translations when their paragraphs merge.
    pub back_translation_separator: String,
    /// Writing system of runs the engine synthesises.
    pub vernacular_ws: WsId,
    pub styles: StyleNames,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            bridge_separator: '-',
            back_translation_separator: " ".to_string(),
            vernacular_ws: WsId::default(),
            styles: StyleNames::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sep = self.bridge_separator;
        if sep.is_ascii_digit() || sep.is_whitespace() {
            return Err(ConfigError::InvalidBridgeSeparator(sep));
        }
        if self.styles.chapter_number == self.styles.verse_number {
            return Err(ConfigError::DuplicateStyle(self.styles.verse_number.clone()));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_bridge_separator(mut self, separator: char) -> Self {
        self.bridge_separator = separator;
        self
    }

    #[must_use]
    pub fn with_vernacular_ws(mut self, ws: WsId) -> Self {
        self.vernacular_ws = ws;
        self
    }
}
