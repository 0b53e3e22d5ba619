//! Bulk extraction over a MediaWiki XML dump of the German Wiktionary.
//!
//! Pages are cut out of the stream in 1MB chunks, grouped into batches and
//! extracted on worker threads. Every page is an independent extraction
//! pass, so the workers share nothing; results are written in dump order.

use crate::extract::extract;
use crate::record::Record;
use indicatif::ProgressBar;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

lazy_static! {
    static ref TITLE_PATTERN: Regex = Regex::new(r"<title>([^<]+)</title>").unwrap();
    static ref NS_PATTERN: Regex = Regex::new(r"<ns>(\d+)</ns>").unwrap();
    static ref TEXT_PATTERN: Regex = Regex::new(r"(?s)<text[^>]*>(.+?)</text>").unwrap();
    static ref REDIRECT_PATTERN: Regex = Regex::new(r#"<redirect\s+title="[^"]+""#).unwrap();
}

const PAGE_START: &[u8] = b"<page>";
const PAGE_END: &[u8] = b"</page>";

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Call `callback` with the XML of every `<page>` element until it returns
/// false or the input ends.
///
/// The stream is buffered as bytes and each page is decoded only once it is
/// complete, so characters split across two reads stay intact.
pub fn scan_pages(mut reader: impl BufRead, mut callback: impl FnMut(String) -> bool) -> io::Result<()> {
    let mut buffer: Vec<u8> = Vec::new();
    let mut chunk = vec![0u8; 1024 * 1024]; // 1MB chunks

    loop {
        let bytes_read = reader.read(&mut chunk)?;
        if bytes_read == 0 {
            break;
        }

        buffer.extend_from_slice(&chunk[..bytes_read]);

        let mut consumed = 0;
        let keep_from = loop {
            let start = match find_bytes(&buffer[consumed..], PAGE_START) {
                Some(offset) => consumed + offset,
                // Keep a short tail in case a start tag straddles two chunks.
                None => break consumed.max(buffer.len().saturating_sub(PAGE_START.len() - 1)),
            };
            let end = match find_bytes(&buffer[start..], PAGE_END) {
                Some(offset) => start + offset + PAGE_END.len(),
                None => break start,
            };

            let page_xml = String::from_utf8_lossy(&buffer[start..end]).into_owned();
            consumed = end;
            if !callback(page_xml) {
                return Ok(());
            }
        };
        buffer.drain(..keep_from);
    }

    Ok(())
}

/// Undo the XML escaping of page titles and wikitext.
pub fn unescape_xml(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

/// One line of the JSONL output.
#[derive(Debug, Serialize)]
pub struct DumpEntry {
    pub word: String,
    #[serde(flatten)]
    pub record: Record,
}

/// What happened to one `<page>`.
#[derive(Debug)]
pub enum PageOutcome {
    Entry(DumpEntry),
    /// Talk, template, category or other non-article page.
    OtherNamespace,
    Redirect,
    /// Article without a German word type header.
    NoEntry,
    /// Missing title or text element.
    Malformed,
}

/// Extract one page of the dump.
pub fn process_page(page_xml: &str) -> PageOutcome {
    let title = match TITLE_PATTERN.captures(page_xml) {
        Some(cap) => unescape_xml(&cap[1]),
        None => return PageOutcome::Malformed,
    };

    if let Some(cap) = NS_PATTERN.captures(page_xml) {
        if &cap[1] != "0" {
            return PageOutcome::OtherNamespace;
        }
    }

    if REDIRECT_PATTERN.is_match(page_xml) {
        return PageOutcome::Redirect;
    }

    let text = match TEXT_PATTERN.captures(page_xml) {
        Some(cap) => unescape_xml(&cap[1]),
        None => return PageOutcome::Malformed,
    };

    match extract(&text) {
        Ok(record) => PageOutcome::Entry(DumpEntry { word: title, record }),
        Err(_) => {
            debug!(title = %title, "no German entry");
            PageOutcome::NoEntry
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScanStats {
    pub pages_scanned: usize,
    pub entries_written: usize,
    pub inflected: usize,
    pub other_namespace: usize,
    pub redirects: usize,
    pub no_entry: usize,
    pub malformed: usize,
    pub elapsed: Duration,
}

impl ScanStats {
    fn count(&mut self, outcome: &PageOutcome) {
        self.pages_scanned += 1;
        match outcome {
            PageOutcome::Entry(entry) => {
                if entry.record.is_inflected_form() {
                    self.inflected += 1;
                }
            }
            PageOutcome::OtherNamespace => self.other_namespace += 1,
            PageOutcome::Redirect => self.redirects += 1,
            PageOutcome::NoEntry => self.no_entry += 1,
            PageOutcome::Malformed => self.malformed += 1,
        }
    }
}

pub fn print_stats(stats: &ScanStats) {
    println!();
    println!("============================================================");
    println!("Pages scanned: {}", stats.pages_scanned);
    println!("Entries written: {}", stats.entries_written);
    println!("  inflected forms: {}", stats.inflected);
    println!("------------------------------------------------------------");
    println!("Other namespaces: {}", stats.other_namespace);
    println!("Redirects: {}", stats.redirects);
    println!("No German entry: {}", stats.no_entry);
    println!("Malformed pages: {}", stats.malformed);
    println!("Time: {}m {}s", stats.elapsed.as_secs() / 60, stats.elapsed.as_secs() % 60);
    println!("Rate: {:.0} pages/sec", stats.pages_scanned as f64 / stats.elapsed.as_secs_f64().max(1e-9));
    println!("============================================================");
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub num_threads: usize,
    pub batch_size: usize,
    /// Stop after this many entries have been written.
    pub limit: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let cpus = thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(4);
        ScanConfig {
            num_threads: cpus,
            batch_size: 1000,
            limit: None,
        }
    }
}

/// Split `batch` across worker threads, keeping page order.
fn process_batch(batch: Vec<String>, num_threads: usize) -> Vec<PageOutcome> {
    if batch.is_empty() {
        return vec![];
    }

    let total = batch.len();
    let num_threads = num_threads.min(total).max(1);
    if num_threads == 1 {
        return batch.iter().map(|xml| process_page(xml)).collect();
    }
    let chunk_size = (total + num_threads - 1) / num_threads;

    let mut pages = batch.into_iter();
    let handles: Vec<JoinHandle<Vec<PageOutcome>>> = (0..num_threads)
        .map(|_| {
            let chunk: Vec<String> = pages.by_ref().take(chunk_size).collect();
            thread::spawn(move || chunk.iter().map(|xml| process_page(xml)).collect())
        })
        .collect();

    let mut results = Vec::with_capacity(total);
    for handle in handles {
        match handle.join() {
            Ok(chunk_results) => results.extend(chunk_results),
            Err(_) => warn!("extraction worker panicked, its pages are skipped"),
        }
    }
    results
}

/// Write results in order; returns false once the limit is reached.
fn write_results<W: Write>(
    results: Vec<PageOutcome>,
    writer: &mut W,
    stats: &mut ScanStats,
    limit: Option<usize>,
) -> io::Result<bool> {
    for outcome in results {
        stats.count(&outcome);
        if let PageOutcome::Entry(entry) = outcome {
            serde_json::to_writer(&mut *writer, &entry).map_err(io::Error::from)?;
            writer.write_all(b"\n")?;
            stats.entries_written += 1;

            if limit.map_or(false, |l| stats.entries_written >= l) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Extract every page of a dump and write one JSON line per German entry.
pub fn scan_dump<W: Write>(
    reader: impl BufRead,
    writer: &mut W,
    config: &ScanConfig,
    progress: &ProgressBar,
) -> io::Result<ScanStats> {
    let start_time = Instant::now();
    let mut stats = ScanStats::default();
    let batch_size = config.batch_size.max(1);
    let mut batch: Vec<String> = Vec::with_capacity(batch_size);
    let mut keep_going = true;
    let mut write_error = None;

    scan_pages(reader, |page_xml| {
        batch.push(page_xml);
        if batch.len() < batch_size {
            return true;
        }

        let results = process_batch(std::mem::take(&mut batch), config.num_threads);
        match write_results(results, writer, &mut stats, config.limit) {
            Ok(more) => keep_going = more,
            Err(e) => {
                write_error = Some(e);
                keep_going = false;
            }
        }
        progress.set_message(format!(
            "{} pages, {} entries",
            stats.pages_scanned, stats.entries_written
        ));
        keep_going
    })?;

    if let Some(e) = write_error {
        return Err(e);
    }

    if keep_going && !batch.is_empty() {
        let results = process_batch(batch, config.num_threads);
        write_results(results, writer, &mut stats, config.limit)?;
    }

    writer.flush()?;
    stats.elapsed = start_time.elapsed();
    Ok(stats)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests for the dump scanner
// ─────────────────────────────────────────────────────────────────────────────
