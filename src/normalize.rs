//! Wikitext formatting removal for single markup lines.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Applied in declaration order; the link patterns assume emphasis is gone.
    static ref BOLD: Regex = Regex::new(r"'''(.+?)'''").unwrap();
    static ref ITALIC: Regex = Regex::new(r"''(.+?)''").unwrap();
    static ref SIMPLE_LINK: Regex = Regex::new(r"\[\[([^\[\]|]+)\]\]").unwrap();
    static ref PIPED_LINK: Regex = Regex::new(r"\[\[[^|\[\]]+\|([^\]]+)\]\]").unwrap();
    static ref FOOTNOTE: Regex = Regex::new(r"<sup>\[\d+\]</sup>").unwrap();
    // Self-closing references go first so the paired pattern never starts
    // inside one.
    static ref SELF_CLOSING_REFERENCE: Regex = Regex::new(r"<ref[^>]*/>").unwrap();
    static ref REFERENCE: Regex = Regex::new(r"<ref(?:\s[^>]*)?>.*?</ref>").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s\s+").unwrap();
}

/// Strip wiki formatting from one line, keeping the visible text.
///
/// Bold and italic quotes are removed, `[[Word]]` and `[[Target|Label]]`
/// links collapse to their visible text, and footnote markers and
/// `<ref>` references are dropped. Whitespace runs collapse to a single
/// space and the result is trimmed. Patterns that do not occur are no-ops.
pub fn clean_line(line: &str) -> String {
    let line = line.trim();
    let line = BOLD.replace_all(line, "${1}");
    let line = ITALIC.replace_all(&line, "${1}");
    let line = SIMPLE_LINK.replace_all(&line, "${1}");
    let line = PIPED_LINK.replace_all(&line, "${1}");
    let line = FOOTNOTE.replace_all(&line, "");
    let line = SELF_CLOSING_REFERENCE.replace_all(&line, "");
    let line = REFERENCE.replace_all(&line, "");
    let line = WHITESPACE_RUN.replace_all(&line, " ");

    line.trim().to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests for clean_line
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod clean_line_tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────
    // Emphasis and links
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn bold_is_unwrapped() {
        assert_eq!(clean_line("'''Haus'''"), "Haus");
    }

    #[test]
    fn italic_is_unwrapped() {
        assert_eq!(clean_line("ein ''großes'' Haus"), "ein großes Haus");
    }

    #[test]
    fn simple_link_keeps_word() {
        assert_eq!(
            clean_line(":[1] zu einem bestimmten Zweck erbautes [[Gebäude]]"),
            ":[1] zu einem bestimmten Zweck erbautes Gebäude"
        );
    }

    #[test]
    fn multi_word_link_keeps_text() {
        assert_eq!(clean_line("die [[Deutsche Bahn]] fährt"), "die Deutsche Bahn fährt");
    }

    #[test]
    fn piped_link_keeps_label() {
        assert_eq!(clean_line("in den [[Haus|Häusern]] wohnen"), "in den Häusern wohnen");
    }

    #[test]
    fn bold_link_inside_template() {
        assert_eq!(clean_line("{{Siehe auch|'''[[haus]]'''}}"), "{{Siehe auch|haus}}");
    }

    #[test]
    fn nested_bold_italic_link() {
        let cleaned = clean_line("'''''[[Haus|Häuser]]''''' und ''[[Hof]]''");
        assert_eq!(cleaned, "Häuser und Hof");
        assert!(!cleaned.contains("''"));
        assert!(!cleaned.contains("[["));
        assert!(!cleaned.contains("]]"));
    }

    #[test]
    fn second_pass_changes_nothing() {
        let once = clean_line("  '''''[[Haus]]''''' steht <ref name=\"a\">Quelle</ref>  im  [[Dorf|Ort]] ");
        assert_eq!(once, "Haus steht im Ort");
        assert_eq!(clean_line(&once), once);
    }

    // ─────────────────────────────────────────────────────────────
    // Footnotes and references
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn footnote_marker_removed() {
        assert_eq!(clean_line("Haus<sup>[1]</sup> am See"), "Haus am See");
    }

    #[test]
    fn paired_reference_removed() {
        assert_eq!(
            clean_line(":[1] „Das Haus.“<ref>{{Literatur|Autor=Mann|Titel=Zauberberg}}</ref>"),
            ":[1] „Das Haus.“"
        );
    }

    #[test]
    fn reference_with_attributes_removed() {
        assert_eq!(
            clean_line("Text<ref name=\"duden\">Duden online</ref> weiter"),
            "Text weiter"
        );
    }

    #[test]
    fn reference_with_space_before_bracket_removed() {
        assert_eq!(clean_line("Text<ref >Quelle</ref> weiter"), "Text weiter");
    }

    #[test]
    fn self_closing_reference_removed() {
        assert_eq!(clean_line("Text<ref name=\"duden\"/> weiter"), "Text weiter");
    }

    #[test]
    fn self_closing_then_paired_reference() {
        assert_eq!(
            clean_line("eins<ref name=\"a\"/> zwei<ref>b</ref> drei"),
            "eins zwei drei"
        );
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(clean_line("\t:[1]   ein \t Haus  "), ":[1] ein Haus");
    }

    #[test]
    fn plain_line_unchanged() {
        assert_eq!(clean_line("{{Bedeutungen}}"), "{{Bedeutungen}}");
    }

    #[test]
    fn reference_only_line_becomes_empty() {
        assert_eq!(clean_line("<ref>nur eine Quelle</ref>"), "");
    }
}
