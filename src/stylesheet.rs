//! Style classification.
//!
//! The stylesheet is read-only to the engine. It answers one question per
//! style name: does the style belong in a heading or in body text, and in
//! which context (title, introduction, scripture) may it be used.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::StyleNames;
use crate::error::ConfigError;
use crate::model::Section;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Structure {
    Heading,
    Body,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Context {
    Title,
    Introduction,
    Scripture,
    General,
}

impl Context {
    /// Equal contexts are compatible; `General` mixes with everything except
    /// the title.
    pub fn is_compatible_with(self, other: Context) -> bool {
        if self == other {
            return true;
        }
        if self == Context::Title || other == Context::Title {
            return false;
        }
        self == Context::General || other == Context::General
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleKind {
    #[default]
    Paragraph,
    Character,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleInfo {
    pub name: String,
    pub structure: Structure,
    pub context: Context,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_style: Option<String>,
    #[serde(default)]
    pub kind: StyleKind,
}

impl StyleInfo {
    pub fn paragraph(name: impl Into<String>, structure: Structure, context: Context) -> Self {
        Self {
            name: name.into(),
            structure,
            context,
            next_style: None,
            kind: StyleKind::Paragraph,
        }
    }

    pub fn character(name: impl Into<String>, context: Context) -> Self {
        Self {
            name: name.into(),
            structure: Structure::Body,
            context,
            next_style: None,
            kind: StyleKind::Character,
        }
    }

    #[must_use]
    pub fn with_next_style(mut self, next: impl Into<String>) -> Self {
        self.next_style = Some(next.into());
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct Stylesheet {
    styles: HashMap<String, StyleInfo>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in Scripture stylesheet, using `names` for the styles the
    /// engine refers to by name.
    pub fn standard(names: &StyleNames) -> Self {
        use Context::*;
        use Structure::*;

        let mut sheet = Self::new();
        let entries = [
            StyleInfo::paragraph(&names.section_head, Heading, Scripture)
                .with_next_style(&names.paragraph),
            StyleInfo::paragraph("Section Head Major", Heading, Scripture)
                .with_next_style(&names.section_head),
            StyleInfo::paragraph("Parallel Passage Reference", Heading, Scripture)
                .with_next_style(&names.paragraph),
            StyleInfo::paragraph(&names.paragraph, Body, Scripture),
            StyleInfo::paragraph("Line1", Body, Scripture).with_next_style("Line1"),
            StyleInfo::paragraph("Line2", Body, Scripture).with_next_style("Line1"),
            StyleInfo::paragraph(&names.intro_section_head, Heading, Introduction)
                .with_next_style(&names.intro_paragraph),
            StyleInfo::paragraph(&names.intro_paragraph, Body, Introduction),
            StyleInfo::paragraph(&names.title_main, Body, Title),
            StyleInfo::paragraph("Title Secondary", Body, Title),
            StyleInfo::paragraph("Remark", Body, General),
            StyleInfo::character(&names.chapter_number, Scripture),
            StyleInfo::character(&names.verse_number, Scripture),
            StyleInfo::character("Emphasis", General),
        ];
        for info in entries {
            sheet.insert(info);
        }
        sheet
    }

    /// Loads a stylesheet from a JSON array of style records.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let infos: Vec<StyleInfo> = serde_json::from_str(json)?;
        let mut sheet = Self::new();
        for info in infos {
            let name = info.name.clone();
            if sheet.insert(info).is_some() {
                return Err(ConfigError::DuplicateStyle(name));
            }
        }
        Ok(sheet)
    }

    pub fn insert(&mut self, info: StyleInfo) -> Option<StyleInfo> {
        self.styles.insert(info.name.clone(), info)
    }

    pub fn classify(&self, name: &str) -> Option<&StyleInfo> {
        self.styles.get(name)
    }

    pub fn structure_of(&self, name: &str) -> Option<Structure> {
        self.classify(name).map(|info| info.structure)
    }

    pub fn context_of(&self, name: &str) -> Option<Context> {
        self.classify(name).map(|info| info.context)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Context of a section: taken from the first heading paragraph whose
    /// style has a specific context, else from the first such content
    /// paragraph. Sections made only of general or unknown styles count as
    /// Scripture.
    pub fn section_context(&self, section: &Section) -> Context {
        section
            .heading
            .paragraphs
            .iter()
            .chain(section.content.paragraphs.iter())
            .filter_map(|p| self.context_of(&p.style))
            .find(|ctx| *ctx != Context::General)
            .unwrap_or(Context::Scripture)
    }

    /// Body style for a paragraph that follows `heading_style`: the heading's
    /// `next_style` when that is a body style, else the context default.
    pub fn body_style_after<'a>(&'a self, heading_style: &str, names: &'a StyleNames) -> &'a str {
        let info = self.classify(heading_style);
        if let Some(next) = info.and_then(|i| i.next_style.as_deref())
            && self.structure_of(next) == Some(Structure::Body)
        {
            return next;
        }
        let context = info.map(|i| i.context).unwrap_or(Context::Scripture);
        default_body_style(context, names)
    }
}

pub fn default_heading_style(context: Context, names: &StyleNames) -> &str {
    match context {
        Context::Introduction => &names.intro_section_head,
        _ => &names.section_head,
    }
}

pub fn default_body_style(context: Context, names: &StyleNames) -> &str {
    match context {
        Context::Introduction => &names.intro_paragraph,
        Context::Title => &names.title_main,
        _ => &names.paragraph,
    }
}
