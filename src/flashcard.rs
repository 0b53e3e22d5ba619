//! Flashcard rows and the tab-separated import file.

use crate::record::Record;
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Every row has this many columns.
pub const COLUMNS: usize = 9;

/// Word types that get the meaning/synonym/example layout.
pub const DESCRIPTIVE_TYPES: [&str; 5] = [
    "Adverb",
    "Pronominaladverb",
    "Konjunktion",
    "Indefinitpronomen",
    "Subjunktion",
];

pub type Row = Vec<Option<String>>;

/// Row layout chosen from the word type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Noun,
    Verb,
    Adjective,
    Descriptive,
}

impl CardKind {
    pub fn for_word_type(word_type: &str) -> Option<Self> {
        match word_type {
            "Substantiv" => Some(CardKind::Noun),
            "Verb" => Some(CardKind::Verb),
            "Adjektiv" => Some(CardKind::Adjective),
            t if DESCRIPTIVE_TYPES.contains(&t) => Some(CardKind::Descriptive),
            _ => None,
        }
    }

    /// Word to hand to the translation fallback. Nouns use their nominative
    /// singular so that case forms are translated as the headword.
    pub fn lookup_word<'a>(self, word: &'a str, record: &'a Record) -> &'a str {
        match self {
            CardKind::Noun => record.attribute("Nominativ Singular").unwrap_or(word),
            _ => word,
        }
    }
}

/// Definite article for a `Genus` value.
pub fn article(genus: Option<&str>) -> &'static str {
    match genus {
        Some("m") => "der",
        Some("f") => "die",
        _ => "das",
    }
}

/// A finished card: the file row plus labelled values for the terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct Flashcard {
    pub row: Row,
    pub summary: Vec<(&'static str, Option<String>)>,
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

fn padded(mut row: Row) -> Row {
    row.resize(COLUMNS, None);
    row
}

/// Build the card for `word` from its record and resolved translation.
pub fn build_card(kind: CardKind, word: &str, record: &Record, translation: Option<&str>) -> Flashcard {
    let attr = |name: &str| owned(record.attribute(name));
    let example = |n: u32| record.examples().get(&n).cloned();
    let translation = owned(translation);

    match kind {
        CardKind::Noun => {
            let singular = attr("Nominativ Singular").unwrap_or_else(|| word.to_string());
            let with_article = format!("{} {}", article(record.attribute("Genus")), singular);
            let row = padded(vec![
                Some(singular),
                Some(with_article.clone()),
                translation.clone(),
                attr("Nominativ Plural"),
                attr("Genitiv Singular"),
                attr("Dativ Singular"),
                attr("Akkusativ Singular"),
            ]);
            let summary = vec![
                ("Basic form", Some(with_article)),
                ("Translation", translation),
                ("Plural", attr("Nominativ Plural")),
                ("Genitiv", attr("Genitiv Singular")),
                ("Dativ", attr("Dativ Singular")),
                ("Akkusativ", attr("Akkusativ Singular")),
            ];
            Flashcard { row, summary }
        }
        CardKind::Verb => {
            let row = padded(vec![
                Some(word.to_string()),
                translation.clone(),
                attr("Präsens_ich"),
                attr("Präsens_du"),
                attr("Präteritum_ich"),
                attr("Partizip II"),
                attr("Imperativ Singular"),
                attr("Hilfsverb"),
            ]);
            let summary = vec![
                ("Translation", translation),
                ("Präsens (ich)", attr("Präsens_ich")),
                ("Präsens (du)", attr("Präsens_du")),
                ("Präteritum (ich)", attr("Präteritum_ich")),
                ("Partizip II", attr("Partizip II")),
                ("Imperativ", attr("Imperativ Singular")),
                ("Hilfsverb", attr("Hilfsverb")),
            ];
            Flashcard { row, summary }
        }
        CardKind::Adjective => {
            let row = padded(vec![
                Some(word.to_string()),
                translation.clone(),
                attr("Komparativ"),
                attr("Superlativ"),
                example(1),
                example(2),
                example(3),
            ]);
            let summary = vec![
                ("Translation", translation),
                ("Komparativ", attr("Komparativ")),
                ("Superlativ", attr("Superlativ")),
                ("Beispiele", example(1)),
            ];
            Flashcard { row, summary }
        }
        CardKind::Descriptive => {
            let meaning = record.meanings().get(&1).map(|meaning| meaning.to_string());
            let synonym = record.synonyms().get(&1).cloned();
            let row = padded(vec![
                Some(word.to_string()),
                translation.clone(),
                meaning.clone(),
                synonym.clone(),
                example(1),
                example(2),
                example(3),
            ]);
            let summary = vec![
                ("Translation", translation),
                ("Bedeutungen", meaning),
                ("Synonyme", synonym),
                ("Beispiele", example(1)),
            ];
            Flashcard { row, summary }
        }
    }
}

/// Row for a word without a dictionary entry.
pub fn unknown_word_row(word: &str, translation: Option<&str>) -> Row {
    padded(vec![Some(word.to_string()), owned(translation)])
}

// ─────────────────────────────────────────────────────────────────────────────
// Tab-separated file
// ─────────────────────────────────────────────────────────────────────────────

/// Quote a field that contains a tab, a quote or a line break.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains(|c| matches!(c, '\t' | '"' | '\r' | '\n')) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// One line of the import file, terminated by `\r\n`.
pub fn format_row(row: &[Option<String>]) -> String {
    let fields: Vec<Cow<'_, str>> = row
        .iter()
        .map(|field| escape_field(field.as_deref().unwrap_or("")))
        .collect();
    let mut line = fields.join("\t");
    line.push_str("\r\n");
    line
}

/// Append `row` to the file at `path`, creating the file if needed.
pub fn append_row(path: &Path, row: &[Option<String>]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open flashcard file {}", path.display()))?;
    file.write_all(format_row(row).as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests for flashcard rows
// ─────────────────────────────────────────────────────────────────────────────
