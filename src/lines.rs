//! Lazy line sequence over one markup document.
//!
//! [`MarkupLines`] yields cleaned, non-empty lines in document order and is
//! single-pass: once exhausted, a new sequence has to be built from the
//! original text. [`LineCursor`] wraps it with one line of look-ahead so that
//! block classifiers can pull the lines of their block from the same sequence
//! the outer scan is iterating, and leave the line that ends the block for the
//! next outer step.

use crate::normalize::clean_line;
use std::iter::Peekable;
use std::str::Split;

/// Lines starting with this marker end the current block.
pub const BLOCK_MARKER: &str = "{{";

/// Return true when `line` starts a new template block.
pub fn is_block_boundary(line: &str) -> bool {
    line.starts_with(BLOCK_MARKER)
}

/// Cleaned, trimmed, non-empty lines of a markup document.
pub struct MarkupLines<'a> {
    raw: Split<'a, char>,
}

impl<'a> MarkupLines<'a> {
    pub fn new(markup: &'a str) -> Self {
        MarkupLines {
            raw: markup.split('\n'),
        }
    }
}

impl Iterator for MarkupLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        for raw in self.raw.by_ref() {
            if raw.trim().is_empty() {
                continue;
            }
            let line = clean_line(raw);
            if !line.is_empty() {
                return Some(line);
            }
        }
        None
    }
}

/// Shared iteration state for one extraction pass.
pub struct LineCursor<'a> {
    lines: Peekable<MarkupLines<'a>>,
}

impl<'a> LineCursor<'a> {
    pub fn new(markup: &'a str) -> Self {
        LineCursor {
            lines: MarkupLines::new(markup).peekable(),
        }
    }

    /// Look at the next line without consuming it.
    pub fn peek(&mut self) -> Option<&str> {
        self.lines.peek().map(String::as_str)
    }

    /// Consume the next line if it still belongs to the current block.
    pub fn next_in_block(&mut self) -> Option<String> {
        self.lines.next_if(|line| !is_block_boundary(line))
    }

    /// Consume the next line while `belongs` accepts it.
    pub fn next_while(&mut self, belongs: impl FnOnce(&str) -> bool) -> Option<String> {
        self.lines.next_if(|line| belongs(line))
    }
}

impl Iterator for LineCursor<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.lines.next()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests for MarkupLines and LineCursor
// ─────────────────────────────────────────────────────────────────────────────
