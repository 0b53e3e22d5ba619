//! Per-section recognizers for German Wiktionary markup.
//!
//! Every classifier looks at one cleaned line. If the line is not its
//! section's trigger it answers [`Classified::NotInterested`] and the next
//! classifier gets the same line. Block sections pull the rest of their block
//! from the shared [`LineCursor`] and stop in front of the next `{{` line.

use crate::lines::{is_block_boundary, LineCursor};
use crate::record::{Meaning, Numbered, Overview, Record, Section};
use lazy_static::lazy_static;
use regex::Regex;

/// Phrase marking conjugated verb forms.
pub const CONJUGATION_MARKER: &str = "Konjugierte Form";

/// Nested templates inside the translation table that do not end it.
pub const TABLE_CONTINUATION: &str = "Ü-";

lazy_static! {
    // Single-line sections
    static ref WORD_TYPE_HEADER: Regex = Regex::new(r"^===\s*\{\{Wortart\|([\w\s]+)\|Deutsch\}\}").unwrap();
    static ref ALTERNATIVE_WORD: Regex = Regex::new(r"^\{\{Siehe\sauch\|([\w\-]+)").unwrap();
    static ref BASIC_FORM_REDIRECT: Regex = Regex::new(r"^\{\{Grundformverweis\s(?:Konj|Dekl)\|([^|}]+)").unwrap();
    static ref AUDIO: Regex = Regex::new(r"^:\{\{Hörbeispiele\}\}\s*\{\{Audio\|([\w\-.]+)").unwrap();

    // Block headers
    static ref OVERVIEW_HEADER: Regex = Regex::new(r"^\{\{Deutsch\s[\w\s]+?\sÜbersicht$").unwrap();
    static ref MEANINGS_HEADER: Regex = Regex::new(r"^\{\{Bedeutungen\}\}$").unwrap();
    static ref EXAMPLES_HEADER: Regex = Regex::new(r"^\{\{Beispiele\}\}$").unwrap();
    static ref SYNONYMS_HEADER: Regex = Regex::new(r"^\{\{Synonyme\}\}$").unwrap();
    // Legacy `{{Ü-Tabelle|Ü-links=` and current `{{Ü-Tabelle|1|G=...|Ü-Liste=`
    static ref TRANSLATIONS_HEADER: Regex = Regex::new(r"^\{\{Ü-Tabelle\|(?:.*\|)?Ü-(?:links|Liste)=$").unwrap();

    // Block detail lines
    static ref OVERVIEW_ATTRIBUTE: Regex = Regex::new(r"^\|([\w\s*,]+?)\s*=\s*(.+)$").unwrap();
    static ref MEANING_LINE: Regex = Regex::new(r"^:\[\d+[a-z]?\]\s*(.+)$").unwrap();
    static ref MEANING_NOTES: Regex = Regex::new(r"^\{\{K\|([^{}]+?)\}\}\s*(.+)$").unwrap();
    static ref NUMBERED_LINE: Regex = Regex::new(r"^:\[[\d\s,a-z–\-]+\]\s*(.+)$").unwrap();
    static ref ENGLISH_TRANSLATION: Regex = Regex::new(r"^\*\{\{en\}\}.*?\|([\w\s']+)\}\}").unwrap();
}

/// Value produced by a classifier that recognized its section.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    /// The conjugation marker; the word type when the marker sat in the header.
    Conjugated { word_type: Option<String> },
    BasicForm(String),
    Alternative(String),
    WordType(String),
    Overview(Overview),
    Audio(String),
    Meanings(Numbered<Meaning>),
    Examples(Numbered<String>),
    Synonyms(Numbered<String>),
    /// A translation table, with its English entry if it had one.
    Translation(Option<String>),
}

impl Extracted {
    pub fn section(&self) -> Section {
        match self {
            Extracted::Conjugated { .. } => Section::Conjugated,
            Extracted::BasicForm(_) => Section::BasicForm,
            Extracted::Alternative(_) => Section::Alternative,
            Extracted::WordType(_) => Section::WordType,
            Extracted::Overview(_) => Section::Overview,
            Extracted::Audio(_) => Section::Audio,
            Extracted::Meanings(_) => Section::Meanings,
            Extracted::Examples(_) => Section::Examples,
            Extracted::Synonyms(_) => Section::Synonyms,
            Extracted::Translation(_) => Section::Translation,
        }
    }
}

/// Outcome of offering a line to one classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// The line (and, for blocks, the lines after it) belonged to this section.
    Matched(Extracted),
    /// Try the next classifier on the same line.
    NotInterested,
}

/// A section recognizer. Gets the current line, the shared cursor for block
/// look-ahead and the record built so far.
pub type Classifier = fn(&str, &mut LineCursor<'_>, &Record) -> Classified;

/// Classifiers in the order each line is offered to them.
pub const CLASSIFIERS: [(Section, Classifier); 10] = [
    (Section::Conjugated, conjugation_flag),
    (Section::BasicForm, basic_form),
    (Section::Alternative, alternative_word),
    (Section::WordType, word_type),
    (Section::Overview, overview),
    (Section::Audio, audio),
    (Section::Meanings, meanings),
    (Section::Examples, examples),
    (Section::Synonyms, synonyms),
    (Section::Translation, translation),
];

// ─────────────────────────────────────────────────────────────────────────────
// Line-level extractors
// ─────────────────────────────────────────────────────────────────────────────

/// Word type from a `=== {{Wortart|TYPE|Deutsch}}` header.
pub fn word_type_header(line: &str) -> Option<&str> {
    WORD_TYPE_HEADER
        .captures(line)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
}

/// `|Attribute=Value` line of an inflection table.
pub fn overview_line(line: &str) -> Option<(String, String)> {
    let cap = OVERVIEW_ATTRIBUTE.captures(line)?;
    let name = cap[1].trim();
    let value = cap[2].trim();
    if name.is_empty() || value.is_empty() {
        return None;
    }
    Some((name.to_string(), value.to_string()))
}

/// Labels of a `{{K|...}}` template. Positional parameters are labels, a
/// free-text `ft=` parameter is kept as one, other named parameters are dropped.
fn usage_labels(params: &str) -> String {
    params
        .split('|')
        .filter_map(|param| match param.split_once('=') {
            Some((name, value)) if name.trim() == "ft" => Some(value.trim()),
            Some(_) => None,
            None => Some(param.trim()),
        })
        .filter(|label| !label.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `:[N] text` meaning, with `{{K|note|note}}` usage notes split off.
pub fn meaning_line(line: &str) -> Option<Meaning> {
    let cap = MEANING_LINE.captures(line)?;
    let body = cap[1].trim();

    match MEANING_NOTES.captures(body) {
        Some(notes) => {
            let labels = usage_labels(&notes[1]);
            let labels = Some(labels.as_str()).filter(|labels| !labels.is_empty());
            Some(Meaning::new(labels, notes[2].trim()))
        }
        None => Some(Meaning::new(None, body)),
    }
}

/// `:[N,...] text` line of an examples or synonyms block.
pub fn numbered_line(line: &str) -> Option<String> {
    NUMBERED_LINE
        .captures(line)
        .map(|cap| cap[1].trim().to_string())
        .filter(|text| !text.is_empty())
}

/// English word from a `*{{en}}: [1] {{Ü|en|word}}` translation line.
pub fn translation_line(line: &str) -> Option<String> {
    ENGLISH_TRANSLATION
        .captures(line)
        .map(|cap| cap[1].trim().to_string())
        .filter(|word| !word.is_empty())
}

fn continues_translation_table(line: &str) -> bool {
    !is_block_boundary(line) || line.contains(TABLE_CONTINUATION)
}

/// Collect the detail lines of a numbered block.
///
/// Numbers count matching lines only, so N matches always give keys 1..=N.
fn numbered_block<T>(lines: &mut LineCursor<'_>, detail: fn(&str) -> Option<T>) -> Numbered<T> {
    let mut entries = Numbered::new();
    while let Some(line) = lines.next_in_block() {
        if let Some(value) = detail(&line) {
            let number = entries.len() as u32 + 1;
            entries.insert(number, value);
        }
    }
    entries
}

// ─────────────────────────────────────────────────────────────────────────────
// Classifiers
// ─────────────────────────────────────────────────────────────────────────────

fn conjugation_flag(line: &str, _lines: &mut LineCursor<'_>, _record: &Record) -> Classified {
    if !line.contains(CONJUGATION_MARKER) {
        return Classified::NotInterested;
    }
    Classified::Matched(Extracted::Conjugated {
        word_type: word_type_header(line).map(str::to_string),
    })
}

fn basic_form(line: &str, _lines: &mut LineCursor<'_>, record: &Record) -> Classified {
    if !record.is_inflected_form() {
        return Classified::NotInterested;
    }
    match BASIC_FORM_REDIRECT.captures(line) {
        Some(cap) => Classified::Matched(Extracted::BasicForm(cap[1].trim().to_string())),
        None => Classified::NotInterested,
    }
}

fn alternative_word(line: &str, _lines: &mut LineCursor<'_>, _record: &Record) -> Classified {
    match ALTERNATIVE_WORD.captures(line) {
        Some(cap) => Classified::Matched(Extracted::Alternative(cap[1].to_string())),
        None => Classified::NotInterested,
    }
}

fn word_type(line: &str, _lines: &mut LineCursor<'_>, _record: &Record) -> Classified {
    match word_type_header(line) {
        Some(word_type) => Classified::Matched(Extracted::WordType(word_type.to_string())),
        None => Classified::NotInterested,
    }
}

fn overview(line: &str, lines: &mut LineCursor<'_>, _record: &Record) -> Classified {
    if !OVERVIEW_HEADER.is_match(line) {
        return Classified::NotInterested;
    }
    let mut table = Overview::new();
    while let Some(block_line) = lines.next_in_block() {
        if let Some((name, value)) = overview_line(&block_line) {
            table.insert(name, value);
        }
    }
    Classified::Matched(Extracted::Overview(table))
}

fn audio(line: &str, _lines: &mut LineCursor<'_>, _record: &Record) -> Classified {
    match AUDIO.captures(line) {
        Some(cap) => Classified::Matched(Extracted::Audio(cap[1].to_string())),
        None => Classified::NotInterested,
    }
}

fn meanings(line: &str, lines: &mut LineCursor<'_>, _record: &Record) -> Classified {
    if !MEANINGS_HEADER.is_match(line) {
        return Classified::NotInterested;
    }
    Classified::Matched(Extracted::Meanings(numbered_block(lines, meaning_line)))
}

fn examples(line: &str, lines: &mut LineCursor<'_>, _record: &Record) -> Classified {
    if !EXAMPLES_HEADER.is_match(line) {
        return Classified::NotInterested;
    }
    Classified::Matched(Extracted::Examples(numbered_block(lines, numbered_line)))
}

fn synonyms(line: &str, lines: &mut LineCursor<'_>, _record: &Record) -> Classified {
    if !SYNONYMS_HEADER.is_match(line) {
        return Classified::NotInterested;
    }
    Classified::Matched(Extracted::Synonyms(numbered_block(lines, numbered_line)))
}

fn translation(line: &str, lines: &mut LineCursor<'_>, _record: &Record) -> Classified {
    if !TRANSLATIONS_HEADER.is_match(line) {
        return Classified::NotInterested;
    }
    let mut english = None;
    while let Some(table_line) = lines.next_while(continues_translation_table) {
        if english.is_none() {
            english = translation_line(&table_line);
        }
    }
    Classified::Matched(Extracted::Translation(english))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests for section classifiers
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod classifier_tests {
    use super::*;
    use crate::record::{CONJUGATED_FORM, DECLINED_FORM};
    use pretty_assertions::assert_eq;

    /// Offer the first line of `markup` to `classifier`; return its answer and
    /// the lines left in the cursor afterwards.
    fn offer(classifier: Classifier, markup: &str, record: &Record) -> (Classified, Vec<String>) {
        let mut lines = LineCursor::new(markup);
        let first = lines.next().unwrap();
        let answer = classifier(&first, &mut lines, record);
        (answer, lines.collect())
    }

    fn inflected(word_type: &str) -> Record {
        let mut record = Record::default();
        record.accumulate(Extracted::WordType(word_type.to_string()));
        record
    }

    // ─────────────────────────────────────────────────────────────
    // Line-level extractors
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn word_type_header_is_captured_verbatim() {
        assert_eq!(word_type_header("=== {{Wortart|Substantiv|Deutsch}}"), Some("Substantiv"));
        assert_eq!(
            word_type_header("=== {{Wortart|Konjugierte Form|Deutsch}} ==="),
            Some("Konjugierte Form")
        );
        assert_eq!(word_type_header("=== {{Wortart|Substantiv|Englisch}}"), None);
        assert_eq!(word_type_header("{{Wortart|Substantiv|Deutsch}}"), None);
    }

    #[test]
    fn overview_line_splits_attribute() {
        assert_eq!(
            overview_line("|Nominativ Plural=Häuser"),
            Some(("Nominativ Plural".to_string(), "Häuser".to_string()))
        );
        assert_eq!(
            overview_line("|Präsens_ich=gehe"),
            Some(("Präsens_ich".to_string(), "gehe".to_string()))
        );
        assert_eq!(
            overview_line("|Dativ Singular*=Hause"),
            Some(("Dativ Singular*".to_string(), "Hause".to_string()))
        );
        assert_eq!(overview_line("|Genitiv Plural="), None);
        assert_eq!(overview_line("}}"), None);
    }

    #[test]
    fn meaning_line_without_notes() {
        assert_eq!(
            meaning_line(":[1] first sense"),
            Some(Meaning::new(None, "first sense"))
        );
    }

    #[test]
    fn meaning_line_with_notes() {
        assert_eq!(
            meaning_line(":[2] {{K|fig.}} second sense"),
            Some(Meaning::new(Some("fig."), "second sense"))
        );
        assert_eq!(
            meaning_line(":[11] {{K|ugs.|va.|fachsprachlich|Zoologie}} Umhüllung"),
            Some(Meaning::new(Some("ugs., va., fachsprachlich, Zoologie"), "Umhüllung"))
        );
    }

    #[test]
    fn meaning_line_with_named_note_parameters() {
        assert_eq!(
            meaning_line(":[1] {{K|ugs.|ft=in Bezug auf Personen}} Text"),
            Some(Meaning::new(Some("ugs., in Bezug auf Personen"), "Text"))
        );
        assert_eq!(
            meaning_line(":[3] {{K|übertragen|spr=ch}} Schutz"),
            Some(Meaning::new(Some("übertragen"), "Schutz"))
        );
        assert_eq!(
            meaning_line(":[2] {{K|spr=at}} Wohnung"),
            Some(Meaning::new(None, "Wohnung"))
        );
    }

    #[test]
    fn meaning_line_rejects_other_lines() {
        assert_eq!(meaning_line("::Unterpunkt"), None);
        assert_eq!(meaning_line(":[1]"), None);
    }

    #[test]
    fn numbered_line_accepts_reference_lists() {
        assert_eq!(numbered_line(":[1] Das Haus ist alt."), Some("Das Haus ist alt.".to_string()));
        assert_eq!(numbered_line(":[1, 2] Haus und Hof"), Some("Haus und Hof".to_string()));
        assert_eq!(numbered_line(":[1a] Satz"), Some("Satz".to_string()));
        assert_eq!(numbered_line(":[1–3] Gebäude"), Some("Gebäude".to_string()));
        assert_eq!(numbered_line("::Zeile ohne Nummer"), None);
    }

    #[test]
    fn translation_line_finds_english_word() {
        assert_eq!(translation_line("*{{en}}: [1,2] {{Ü|en|house}};"), Some("house".to_string()));
        assert_eq!(
            translation_line("*{{en}}: [1, 2, 4, 6, 9, 12, 13, 15] {{Ü|en|house}}; [3] {{Ü|en|home}}"),
            Some("house".to_string())
        );
        assert_eq!(translation_line("*{{fr}}: [1] {{Ü|fr|maison}} {{f}}"), None);
    }

    // ─────────────────────────────────────────────────────────────
    // Single-line classifiers
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn conjugation_flag_records_type_from_header() {
        let (answer, _) = offer(conjugation_flag, "=== {{Wortart|Konjugierte Form|Deutsch}} ===", &Record::default());
        assert_eq!(
            answer,
            Classified::Matched(Extracted::Conjugated {
                word_type: Some(CONJUGATED_FORM.to_string())
            })
        );
    }

    #[test]
    fn conjugation_flag_ignores_other_lines() {
        let (answer, _) = offer(conjugation_flag, "=== {{Wortart|Verb|Deutsch}} ===", &Record::default());
        assert_eq!(answer, Classified::NotInterested);
    }

    #[test]
    fn basic_form_waits_for_inflected_form() {
        let line = "{{Grundformverweis Konj|gehen}}";
        let (answer, _) = offer(basic_form, line, &Record::default());
        assert_eq!(answer, Classified::NotInterested);

        let (answer, _) = offer(basic_form, line, &inflected(CONJUGATED_FORM));
        assert_eq!(answer, Classified::NotInterested, "type alone is not the conjugation flag");

        let mut conjugated = Record::default();
        conjugated.accumulate(Extracted::Conjugated { word_type: None });
        let (answer, _) = offer(basic_form, line, &conjugated);
        assert_eq!(answer, Classified::Matched(Extracted::BasicForm("gehen".to_string())));
    }

    #[test]
    fn basic_form_accepts_declension_redirect() {
        let (answer, _) = offer(basic_form, "{{Grundformverweis Dekl|Haus}}", &inflected(DECLINED_FORM));
        assert_eq!(answer, Classified::Matched(Extracted::BasicForm("Haus".to_string())));
    }

    #[test]
    fn alternative_word_after_cleaning() {
        let (answer, _) = offer(alternative_word, "{{Siehe auch|'''[[haus]]'''}}", &Record::default());
        assert_eq!(answer, Classified::Matched(Extracted::Alternative("haus".to_string())));
    }

    #[test]
    fn audio_file_name() {
        let (answer, _) = offer(
            audio,
            ":{{Hörbeispiele}} {{Audio|De-Haus.ogg}}, {{Pl.}} {{Audio|De-Häuser.ogg}}",
            &Record::default(),
        );
        assert_eq!(answer, Classified::Matched(Extracted::Audio("De-Haus.ogg".to_string())));
    }

    // ─────────────────────────────────────────────────────────────
    // Block classifiers
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn overview_block_stops_at_next_template() {
        let markup = "{{Deutsch Substantiv Übersicht\n|Genus=n\n|Nominativ Singular=Haus\n}}\n{{Worttrennung}}\n:Haus";
        let (answer, rest) = offer(overview, markup, &Record::default());

        let mut table = Overview::new();
        table.insert("Genus".to_string(), "n".to_string());
        table.insert("Nominativ Singular".to_string(), "Haus".to_string());
        assert_eq!(answer, Classified::Matched(Extracted::Overview(table)));
        assert_eq!(rest, vec!["{{Worttrennung}}", ":Haus"]);
    }

    #[test]
    fn meanings_block() {
        let markup = "{{Bedeutungen}}\n:[1] first sense\n:[2] {{K|fig.}} second sense\n{{Beispiele}}";
        let (answer, rest) = offer(meanings, markup, &Record::default());

        let mut expected = Numbered::new();
        expected.insert(1, Meaning::new(None, "first sense"));
        expected.insert(2, Meaning::new(Some("fig."), "second sense"));
        assert_eq!(answer, Classified::Matched(Extracted::Meanings(expected)));
        assert_eq!(rest, vec!["{{Beispiele}}"]);
    }

    #[test]
    fn numbering_counts_matches_only() {
        let markup = "{{Beispiele}}\n:[1] eins\n::Fortsetzung\n:[1] zwei\nlose Zeile\n:[2] drei\n{{Wortbildungen}}";
        let (answer, _) = offer(examples, markup, &Record::default());

        let mut expected = Numbered::new();
        expected.insert(1, "eins".to_string());
        expected.insert(2, "zwei".to_string());
        expected.insert(3, "drei".to_string());
        assert_eq!(answer, Classified::Matched(Extracted::Examples(expected)));
    }

    #[test]
    fn empty_block_matches_with_no_entries() {
        let (answer, rest) = offer(synonyms, "{{Synonyme}}\n{{Gegenwörter}}", &Record::default());
        assert_eq!(answer, Classified::Matched(Extracted::Synonyms(Numbered::new())));
        assert_eq!(rest, vec!["{{Gegenwörter}}"]);
    }

    #[test]
    fn block_header_must_be_whole_line() {
        let (answer, _) = offer(meanings, "{{Bedeutungen}} und mehr", &Record::default());
        assert_eq!(answer, Classified::NotInterested);
    }

    #[test]
    fn translation_table_spans_continuation_templates() {
        let markup = "{{Ü-Tabelle|Ü-links=\n\
                      *{{fr}}: [1] {{Ü|fr|maison}} {{f}}\n\
                      {{Ü-Abschnitt|Haus}}\n\
                      *{{en}}: [1, 2] {{Ü|en|house}}\n\
                      |Ü-rechts=\n\
                      *{{es}}: [1] {{Ü|es|casa}}\n\
                      }}\n\
                      {{Referenzen}}";
        let (answer, rest) = offer(translation, markup, &Record::default());
        assert_eq!(answer, Classified::Matched(Extracted::Translation(Some("house".to_string()))));
        assert_eq!(rest, vec!["{{Referenzen}}"]);
    }

    #[test]
    fn current_translation_header_is_recognized() {
        let markup = "{{Ü-Tabelle|1|G=Haus|Ü-Liste=\n*{{en}}: [1] {{Ü|en|house}}\n}}";
        let (answer, _) = offer(translation, markup, &Record::default());
        assert_eq!(answer, Classified::Matched(Extracted::Translation(Some("house".to_string()))));
    }

    #[test]
    fn translation_table_without_english() {
        let markup = "{{Ü-Tabelle|Ü-links=\n*{{fr}}: [1] {{Ü|fr|maison}}\n}}";
        let (answer, _) = offer(translation, markup, &Record::default());
        assert_eq!(answer, Classified::Matched(Extracted::Translation(None)));
    }

    #[test]
    fn classifier_order_starts_with_conjugation_flag() {
        let sections: Vec<Section> = CLASSIFIERS.iter().map(|(section, _)| *section).collect();
        assert_eq!(sections.first(), Some(&Section::Conjugated));
        assert_eq!(sections.last(), Some(&Section::Translation));
        assert_eq!(sections.len(), 10);
    }
}
