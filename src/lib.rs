//! German Wiktionary entry extraction and flashcard export.
//!
//! The engine ([`extract`], [`Document`], [`Record`]) turns the raw wikitext
//! of one entry into structured data and performs no I/O. The remaining
//! modules are the collaborators used by the `ankide` binary: markup sources,
//! the translation fallback, the flashcard file and the dump scanner.

pub mod classify;
pub mod config;
pub mod dump;
pub mod error;
pub mod extract;
pub mod flashcard;
pub mod lines;
pub mod normalize;
pub mod record;
pub mod source;
pub mod translate;

pub use error::ExtractError;
pub use extract::{extract, Document};
pub use record::{Meaning, Numbered, Overview, Record, Section};
