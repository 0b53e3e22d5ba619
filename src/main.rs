use ankide::config::{expand_home, Config};
use ankide::dump::{self, DumpEntry, ScanConfig};
use ankide::flashcard::{self, CardKind};
use ankide::source::{self, MarkupDir, MarkupSource, WiktionaryClient};
use ankide::translate::{self, Translator};
use ankide::{extract, ExtractError, Record};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use unicode_normalization::UnicodeNormalization;

#[derive(Parser)]
#[command(name = "ankide", version)]
#[command(about = "German Wiktionary lookups for flashcard decks")]
struct Args {
    /// Configuration file (default: <config dir>/ankide/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode - no spinner, errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up a word and append its flashcard row
    Add {
        word: String,

        /// Flashcard file [default: $HOME/Dropbox/words.csv]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read <word>.wiki / <word>.wiki.bz2 from this directory instead of the web
        #[arg(long)]
        markup_dir: Option<PathBuf>,

        /// Append without asking
        #[arg(short, long)]
        yes: bool,

        /// Microsoft Translator subscription key
        #[arg(long, env = "ANKIDE_TRANSLATOR_KEY", hide_env_values = true)]
        translator_key: Option<String>,
    },

    /// Print the extracted entry as JSON
    Show {
        word: String,

        #[arg(long)]
        markup_dir: Option<PathBuf>,
    },

    /// Extract every German entry of an XML dump (.xml or .xml.bz2) to JSONL
    Scan {
        dump: PathBuf,

        output: PathBuf,

        /// Stop after this many entries
        #[arg(long)]
        limit: Option<usize>,

        /// Worker threads (0 = auto-detect)
        #[arg(short, long, default_value_t = 0)]
        threads: usize,

        /// Pages per batch
        #[arg(long, default_value_t = 1000)]
        batch_size: usize,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn spinner(quiet: bool, message: String) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn markup_source(markup_dir: Option<PathBuf>, config: &Config) -> Result<Box<dyn MarkupSource>> {
    Ok(match markup_dir {
        Some(dir) => Box::new(MarkupDir::new(dir)),
        None => Box::new(WiktionaryClient::new(&config.wiktionary)?),
    })
}

/// Fetch and extract `word`. A missing page counts as NotFound.
fn lookup(source: &dyn MarkupSource, word: &str, quiet: bool) -> Result<Result<Record, ExtractError>> {
    let pb = spinner(quiet, format!("Looking up {}", word));
    let markup = source.fetch(word);
    pb.finish_and_clear();

    Ok(match markup? {
        Some(markup) => extract(&markup),
        None => Err(ExtractError::NotFound),
    })
}

fn fallback_translation(translator: &dyn Translator, word: &str) -> Option<String> {
    match translator.translate(word) {
        Ok(translation) => translation,
        Err(e) => {
            warn!("translation lookup for '{}' failed: {:#}", word, e);
            None
        }
    }
}

/// Notice for words that are only an inflected form of another word.
fn inflection_notice(record: &Record) -> Option<&'static str> {
    if record.is_conjugated() {
        Some("is in conjugated form")
    } else if record.is_a_declension() {
        Some("is a declension")
    } else if record.is_partizip_ii() {
        Some("is in partizip II form")
    } else {
        None
    }
}

/// `Some(true)` for yes (or just Enter), `Some(false)` for no, `None` to ask again.
fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "" | "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

fn confirm(assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        print!("Add word to file? [Y/n] ");
        io::stdout().flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer).context("Failed to read answer")? == 0 {
            return Ok(false);
        }
        if let Some(yes) = parse_answer(&answer) {
            return Ok(yes);
        }
    }
}

/// How a command ended; `NoData` exits with status 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done,
    NoData,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::NoData => ExitCode::FAILURE,
        }
    }
}

struct AddOptions {
    word: String,
    output: PathBuf,
    assume_yes: bool,
    quiet: bool,
}

fn run_add(options: AddOptions, source: &dyn MarkupSource, translator: &dyn Translator) -> Result<Outcome> {
    let AddOptions {
        word,
        output,
        assume_yes,
        quiet,
    } = options;
    println!("Looking for word: {}", word);

    let record = match lookup(source, &word, quiet)? {
        Ok(record) => record,
        Err(ExtractError::NotFound) => {
            let translation = fallback_translation(translator, &word);
            eprintln!(
                "Could not find word {}! It could mean >>{}<<.",
                word,
                translation.as_deref().unwrap_or("")
            );
            println!();
            if confirm(assume_yes)? {
                flashcard::append_row(&output, &flashcard::unknown_word_row(&word, translation.as_deref()))?;
                info!(path = %output.display(), "row appended");
            }
            return Ok(Outcome::NoData);
        }
    };

    let (word, record) = match inflection_notice(&record) {
        Some(notice) => {
            let basic = match record.basic_form() {
                Some(basic) => basic.to_string(),
                None => {
                    eprintln!("Word {} {}, but no basic form is given!", word, notice);
                    return Ok(Outcome::NoData);
                }
            };
            println!("Word {} {}, trying {} instead...", word, notice, basic);
            match lookup(source, &basic, quiet)? {
                Ok(record) => (basic, record),
                Err(ExtractError::NotFound) => {
                    eprintln!("Could not find word {}! Please try again!", basic);
                    return Ok(Outcome::NoData);
                }
            }
        }
        None => (word, record),
    };

    let word_type = record.word_type().unwrap_or_default();
    println!("Word type: {}", word_type);

    let kind = match CardKind::for_word_type(word_type) {
        Some(kind) => kind,
        None => {
            println!("No additional information is available!");
            return Ok(Outcome::NoData);
        }
    };

    let translation = match record.translation() {
        Some(translation) => Some(translation.to_string()),
        None => fallback_translation(translator, kind.lookup_word(&word, &record)),
    };

    let card = flashcard::build_card(kind, &word, &record, translation.as_deref());
    for (label, value) in &card.summary {
        println!("{}: {}", label, value.as_deref().unwrap_or("-"));
    }
    println!();

    if confirm(assume_yes)? {
        flashcard::append_row(&output, &card.row)?;
        info!(path = %output.display(), "row appended");
    }
    Ok(Outcome::Done)
}

fn run_show(word: String, source: &dyn MarkupSource, quiet: bool) -> Result<Outcome> {
    match lookup(source, &word, quiet)? {
        Ok(record) => {
            let entry = DumpEntry { word, record };
            let json = serde_json::to_string_pretty(&entry).context("Failed to serialize entry")?;
            println!("{}", json);
            Ok(Outcome::Done)
        }
        Err(ExtractError::NotFound) => {
            eprintln!("Could not find word {}!", word);
            Ok(Outcome::NoData)
        }
    }
}

fn run_scan(dump_path: &Path, output: &Path, config: ScanConfig, quiet: bool) -> Result<Outcome> {
    if !quiet {
        println!("Parsing: {}", dump_path.display());
        println!("Output: {}", output.display());
        println!("Threads: {}", config.num_threads);
        if let Some(limit) = config.limit {
            println!("Limit: {} entries", limit);
        }
        println!();
    }

    let reader = source::open_reader(dump_path)
        .with_context(|| format!("Failed to open dump {}", dump_path.display()))?;
    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = BufWriter::with_capacity(source::READ_BUFFER, file);

    let pb = spinner(quiet, "Scanning pages".to_string());
    let stats = dump::scan_dump(reader, &mut writer, &config, &pb)
        .with_context(|| format!("Failed to scan {}", dump_path.display()))?;
    pb.finish_and_clear();

    if !quiet {
        dump::print_stats(&stats);
    }
    Ok(Outcome::Done)
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let config = Config::load_or_default(args.config.as_deref())?;

    let outcome = match args.command {
        Command::Add {
            word,
            output,
            markup_dir,
            yes,
            translator_key,
        } => {
            let source = markup_source(markup_dir, &config)?;
            let timeout = Duration::from_secs(config.wiktionary.timeout_secs);
            let translator = translate::from_config(&config.translator, translator_key.as_deref(), timeout)?;
            let options = AddOptions {
                word: word.trim().nfc().collect(),
                output: output.map(|path| expand_home(&path)).unwrap_or_else(|| config.output_path()),
                assume_yes: yes,
                quiet: args.quiet,
            };
            run_add(options, source.as_ref(), translator.as_ref())
        }
        Command::Show { word, markup_dir } => {
            let source = markup_source(markup_dir, &config)?;
            run_show(word.trim().nfc().collect(), source.as_ref(), args.quiet)
        }
        Command::Scan {
            dump,
            output,
            limit,
            threads,
            batch_size,
        } => {
            let mut scan_config = ScanConfig::default();
            if threads > 0 {
                scan_config.num_threads = threads;
            }
            scan_config.batch_size = batch_size;
            scan_config.limit = limit;
            run_scan(&dump, &output, scan_config, args.quiet)
        }
    }?;
    Ok(outcome.into())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests for the add flow and argument parsing
// ─────────────────────────────────────────────────────────────────────────────
