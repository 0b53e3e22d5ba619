//! Structured data accumulated from one markup document.

use crate::classify::Extracted;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Word type of conjugated verb forms (`ging`, `gehst`).
pub const CONJUGATED_FORM: &str = "Konjugierte Form";
/// Word type of declined noun and adjective forms (`Häuser`, `großen`).
pub const DECLINED_FORM: &str = "Deklinierte Form";
/// Word type of past participles used as headwords (`gegangen`).
pub const PARTIZIP_II: &str = "Partizip II";

/// Entries of a numbered block, keyed by 1-based sequence number.
pub type Numbered<T> = BTreeMap<u32, T>;

/// Inflection table attributes (`Genus`, `Nominativ Plural`, `Präsens_ich`, ...).
pub type Overview = BTreeMap<String, String>;

static EMPTY_OVERVIEW: Overview = BTreeMap::new();
static EMPTY_MEANINGS: Numbered<Meaning> = BTreeMap::new();
static EMPTY_TEXTS: Numbered<String> = BTreeMap::new();

/// One sense from the meanings block, with its optional usage notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meaning {
    pub notes: Option<String>,
    pub text: String,
}

impl Meaning {
    pub fn new(notes: Option<&str>, text: &str) -> Self {
        Meaning {
            notes: notes.map(str::to_string),
            text: text.to_string(),
        }
    }
}

impl fmt::Display for Meaning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.notes {
            Some(notes) => write!(f, "<i>{}</i> {}", notes, self.text),
            None => write!(f, "{}", self.text),
        }
    }
}

/// Sections a record can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    WordType,
    Conjugated,
    Alternative,
    BasicForm,
    Overview,
    Audio,
    Meanings,
    Examples,
    Synonyms,
    Translation,
}

impl Section {
    pub fn label(self) -> &'static str {
        match self {
            Section::WordType => "type",
            Section::Conjugated => "conjugated",
            Section::Alternative => "alternative",
            Section::BasicForm => "basic form",
            Section::Overview => "overview",
            Section::Audio => "audio",
            Section::Meanings => "meanings",
            Section::Examples => "examples",
            Section::Synonyms => "synonyms",
            Section::Translation => "translation",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Result of one extraction pass.
///
/// A section that never appeared in the document is absent; a block section
/// whose header appeared but held no matching lines is present and empty.
/// Only the first occurrence of each section is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    word_type: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    conjugated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    alternative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    basic_form: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    overview: Option<Overview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meanings: Option<Numbered<Meaning>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    examples: Option<Numbered<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    synonyms: Option<Numbered<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    translation: Option<String>,
}

/// Store `value` unless the slot already holds an earlier occurrence.
fn keep_first<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}

impl Record {
    /// Fold one classifier result into the record.
    ///
    /// Returns false when the section was already present and the value was
    /// discarded.
    pub(crate) fn accumulate(&mut self, value: Extracted) -> bool {
        match value {
            Extracted::Conjugated { word_type } => {
                let first = !self.conjugated;
                self.conjugated = true;
                if let Some(word_type) = word_type {
                    keep_first(&mut self.word_type, word_type);
                }
                first
            }
            Extracted::BasicForm(word) => keep_first(&mut self.basic_form, word),
            Extracted::Alternative(word) => keep_first(&mut self.alternative, word),
            Extracted::WordType(word_type) => keep_first(&mut self.word_type, word_type),
            Extracted::Overview(overview) => keep_first(&mut self.overview, overview),
            Extracted::Audio(file) => keep_first(&mut self.audio, file),
            Extracted::Meanings(meanings) => keep_first(&mut self.meanings, meanings),
            Extracted::Examples(examples) => keep_first(&mut self.examples, examples),
            Extracted::Synonyms(synonyms) => keep_first(&mut self.synonyms, synonyms),
            Extracted::Translation(Some(word)) => keep_first(&mut self.translation, word),
            Extracted::Translation(None) => false,
        }
    }

    /// Whether the section was found in the document.
    pub fn contains(&self, section: Section) -> bool {
        match section {
            Section::WordType => self.word_type.is_some(),
            Section::Conjugated => self.conjugated,
            Section::Alternative => self.alternative.is_some(),
            Section::BasicForm => self.basic_form.is_some(),
            Section::Overview => self.overview.is_some(),
            Section::Audio => self.audio.is_some(),
            Section::Meanings => self.meanings.is_some(),
            Section::Examples => self.examples.is_some(),
            Section::Synonyms => self.synonyms.is_some(),
            Section::Translation => self.translation.is_some(),
        }
    }

    pub fn word_type(&self) -> Option<&str> {
        self.word_type.as_deref()
    }

    pub fn is_conjugated(&self) -> bool {
        self.conjugated
    }

    pub fn is_a_declension(&self) -> bool {
        self.word_type() == Some(DECLINED_FORM)
    }

    pub fn is_partizip_ii(&self) -> bool {
        self.word_type() == Some(PARTIZIP_II)
    }

    /// True for any form that points back to a basic form.
    pub fn is_inflected_form(&self) -> bool {
        self.is_conjugated() || self.is_a_declension() || self.is_partizip_ii()
    }

    /// Basic form of an inflected word.
    ///
    /// Uses the `Grundformverweis` redirect when present and falls back to the
    /// alternative word. Always `None` for words that are not inflected forms.
    pub fn basic_form(&self) -> Option<&str> {
        if !self.is_inflected_form() {
            return None;
        }
        self.basic_form.as_deref().or(self.alternative.as_deref())
    }

    pub fn alternative_word(&self) -> Option<&str> {
        self.alternative.as_deref()
    }

    pub fn overview(&self) -> &Overview {
        self.overview.as_ref().unwrap_or(&EMPTY_OVERVIEW)
    }

    /// Single inflection table attribute, e.g. `"Nominativ Plural"`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.overview().get(name).map(String::as_str)
    }

    pub fn audio(&self) -> Option<&str> {
        self.audio.as_deref()
    }

    pub fn meanings(&self) -> &Numbered<Meaning> {
        self.meanings.as_ref().unwrap_or(&EMPTY_MEANINGS)
    }

    pub fn examples(&self) -> &Numbered<String> {
        self.examples.as_ref().unwrap_or(&EMPTY_TEXTS)
    }

    pub fn synonyms(&self) -> &Numbered<String> {
        self.synonyms.as_ref().unwrap_or(&EMPTY_TEXTS)
    }

    pub fn translation(&self) -> Option<&str> {
        self.translation.as_deref()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests for Record
// ─────────────────────────────────────────────────────────────────────────────
