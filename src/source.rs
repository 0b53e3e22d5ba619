//! Where the markup of a word comes from.

use crate::config::WiktionaryConfig;
use anyhow::{bail, Context, Result};
use bzip2::read::BzDecoder;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Read buffer for dumps and markup files.
pub const READ_BUFFER: usize = 256 * 1024;

/// Supplies the raw wikitext of a page.
pub trait MarkupSource {
    /// `Ok(None)` when the page does not exist.
    fn fetch(&self, word: &str) -> Result<Option<String>>;
}

/// Open `path` for buffered reading, decompressing `.bz2` files.
pub fn open_reader(path: &Path) -> io::Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;
    let reader: Box<dyn BufRead + Send> = if path.to_string_lossy().ends_with(".bz2") {
        Box::new(BufReader::with_capacity(READ_BUFFER, BzDecoder::new(file)))
    } else {
        Box::new(BufReader::with_capacity(READ_BUFFER, file))
    };
    Ok(reader)
}

/// Read a whole markup file, decompressing `.bz2` files.
pub fn read_markup(path: &Path) -> Result<String> {
    let mut markup = String::new();
    open_reader(path)
        .and_then(|mut reader| reader.read_to_string(&mut markup))
        .with_context(|| format!("Failed to read markup from {}", path.display()))?;
    Ok(markup)
}

// ─────────────────────────────────────────────────────────────────────────────
// Wiktionary over HTTP
// ─────────────────────────────────────────────────────────────────────────────

/// Fetches `action=raw` page text from a MediaWiki `index.php`.
pub struct WiktionaryClient {
    client: Client,
    base_url: String,
}

impl WiktionaryClient {
    pub fn new(config: &WiktionaryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("ankide/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(WiktionaryClient {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn page_url(&self, word: &str) -> Result<Url> {
        Url::parse_with_params(&self.base_url, &[("title", word), ("action", "raw")])
            .with_context(|| format!("Invalid wiki URL {}", self.base_url))
    }
}

impl MarkupSource for WiktionaryClient {
    fn fetch(&self, word: &str) -> Result<Option<String>> {
        let url = self.page_url(word)?;
        info!(%url, "fetching markup");

        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Request for '{}' failed", word))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(word, "page does not exist");
            return Ok(None);
        }

        let markup = response
            .error_for_status()
            .with_context(|| format!("Wiki returned an error for '{}'", word))?
            .text()
            .with_context(|| format!("Failed to read page body for '{}'", word))?;
        Ok(Some(markup))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Local markup directory
// ─────────────────────────────────────────────────────────────────────────────

/// Pages stored as `<word>.wiki` or `<word>.wiki.bz2` in one directory.
pub struct MarkupDir {
    dir: PathBuf,
}

impl MarkupDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        MarkupDir { dir: dir.into() }
    }

    fn page_path(&self, word: &str) -> Option<PathBuf> {
        ["wiki", "wiki.bz2"]
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", word, ext)))
            .find(|path| path.is_file())
    }
}

/// True when `word` names a single file inside a directory.
fn is_plain_file_name(word: &str) -> bool {
    let mut components = Path::new(word).components();
    matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
        && !word.contains(['/', '\\'])
}

impl MarkupSource for MarkupDir {
    fn fetch(&self, word: &str) -> Result<Option<String>> {
        if !is_plain_file_name(word) {
            bail!("Invalid word '{}': path separators are not allowed", word);
        }
        match self.page_path(word) {
            Some(path) => {
                info!(path = %path.display(), "reading markup");
                read_markup(&path).map(Some)
            }
            None => {
                debug!(word, dir = %self.dir.display(), "no markup file");
                Ok(None)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests for markup sources
// ─────────────────────────────────────────────────────────────────────────────
