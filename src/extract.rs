//! Single forward pass over a markup document.

use crate::classify::{Classified, Extracted, CLASSIFIERS};
use crate::error::ExtractError;
use crate::lines::LineCursor;
use crate::record::{Record, Section};
use once_cell::unsync::OnceCell;
use tracing::{debug, trace};

/// Build a [`Record`] from one markup document.
///
/// Each cleaned line is offered to the classifiers in table order. The first
/// one that matches owns the line (and, for block sections, the lines of its
/// block); the scan then moves on to the next unconsumed line. Markup without
/// a German word type header is not a dictionary entry and yields
/// [`ExtractError::NotFound`].
pub fn extract(markup: &str) -> Result<Record, ExtractError> {
    let mut lines = LineCursor::new(markup);
    let mut record = Record::default();

    while let Some(line) = lines.next() {
        for (section, classify) in CLASSIFIERS.iter() {
            match classify(&line, &mut lines, &record) {
                Classified::Matched(value) => {
                    let skipped = unrecorded_reason(&value);
                    if record.accumulate(value) {
                        debug!(section = %section, "extracted");
                    } else {
                        trace!(section = %section, "{}", skipped);
                    }
                    break;
                }
                Classified::NotInterested => {}
            }
        }
    }

    if !record.contains(Section::WordType) {
        return Err(ExtractError::NotFound);
    }
    Ok(record)
}

/// Log message for a matched value that left the record unchanged.
fn unrecorded_reason(value: &Extracted) -> &'static str {
    match value {
        Extracted::Translation(None) => "translation table without English",
        _ => "repeated section ignored",
    }
}

/// One markup document and its lazily extracted record.
pub struct Document {
    markup: String,
    record: OnceCell<Result<Record, ExtractError>>,
}

impl Document {
    pub fn new(markup: impl Into<String>) -> Self {
        Document {
            markup: markup.into(),
            record: OnceCell::new(),
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Extract on first call; later calls return the stored outcome.
    pub fn record(&self) -> Result<&Record, ExtractError> {
        self.record
            .get_or_init(|| extract(&self.markup))
            .as_ref()
            .map_err(Clone::clone)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests for extract and Document
// ─────────────────────────────────────────────────────────────────────────────
