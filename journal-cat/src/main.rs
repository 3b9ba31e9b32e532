use anyhow::{Context, Result, bail};
use chrono::DateTime;
use clap::Parser;
use sd_journal::{Cursor, Journal, JournalError, JournalField, Microseconds, NativeOps, OpenFlags};
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod output;

use output::{Entry, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "journal-cat")]
#[command(about = "Print entries of the systemd journal", long_about = None)]
struct Args {
    /// Matches, as FIELD=VALUE. A lone `+` separates alternatives.
    #[arg(value_name = "MATCH")]
    matches: Vec<String>,

    /// Show system service and kernel entries only
    #[arg(long)]
    system: bool,

    /// Show entries of the current user only
    #[arg(long)]
    user: bool,

    /// Show entries from volatile journal files only
    #[arg(long)]
    runtime: bool,

    /// Show entries generated on this machine only
    #[arg(long)]
    local: bool,

    /// Journal namespace to read
    #[arg(long, conflicts_with_all = ["directory", "file"])]
    namespace: Option<String>,

    /// Directory to read journal files from
    #[arg(short = 'D', long, conflicts_with = "file")]
    directory: Option<PathBuf>,

    /// Journal file to read (repeatable)
    #[arg(long, conflicts_with_all = ["system", "user", "runtime", "local"])]
    file: Vec<PathBuf>,

    /// Show entries at or after this time (RFC 3339)
    #[arg(short = 'S', long, value_parser = parse_time)]
    since: Option<Microseconds>,

    /// Show entries before this time (RFC 3339)
    #[arg(short = 'U', long, value_parser = parse_time)]
    until: Option<Microseconds>,

    /// Start at the entry this cursor identifies
    #[arg(long, conflicts_with = "since")]
    cursor: Option<String>,

    /// Maximum number of entries to print
    #[arg(short = 'n', long, default_value_t = 100)]
    lines: usize,

    /// Fields to print (comma-separated)
    #[arg(long, value_delimiter = ',')]
    output_fields: Vec<String>,

    /// Output format for entries
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Include the cursor of every printed entry
    #[arg(long)]
    show_cursor: bool,

    /// List all field names present in the journal
    #[arg(long)]
    fields: bool,

    /// Print the disk space used by the journal
    #[arg(long)]
    disk_usage: bool,

    /// Tracing log level
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn open_flags(&self) -> OpenFlags {
        let mut flags = OpenFlags::empty();
        flags.set(OpenFlags::SYSTEM, self.system);
        flags.set(OpenFlags::CURRENT_USER, self.user);
        flags.set(OpenFlags::RUNTIME_ONLY, self.runtime);
        flags.set(OpenFlags::LOCAL_ONLY, self.local);
        flags
    }

    fn open(&self) -> Result<Journal> {
        let flags = self.open_flags();

        let journal = if !self.file.is_empty() {
            Journal::open_files(&self.file, flags)
        } else if let Some(directory) = &self.directory {
            Journal::open_directory(directory, flags)
        } else if let Some(namespace) = &self.namespace {
            Journal::open_namespace(namespace, flags)
        } else if flags.is_empty() {
            Journal::open_default()
        } else {
            Journal::open(flags)
        };
        journal.context("failed to open the journal")
    }
}

fn parse_time(s: &str) -> Result<Microseconds> {
    let instant = DateTime::parse_from_rfc3339(s).with_context(|| format!("invalid time: {s}"))?;
    if instant.timestamp_micros() < 0 {
        bail!("time before the Unix epoch: {s}");
    }
    Ok(Microseconds::from_datetime(&instant))
}

/// A positional match argument.
#[derive(Debug, PartialEq, Eq)]
enum Term<'a> {
    Match { field: &'a str, value: &'a str },
    Or,
}

fn parse_term(arg: &str) -> Result<Term<'_>> {
    if arg == "+" {
        return Ok(Term::Or);
    }
    match arg.split_once('=') {
        Some((field, value)) => Ok(Term::Match { field, value }),
        None => bail!("invalid match {arg:?}: expected FIELD=VALUE or +"),
    }
}

fn apply_matches<O: NativeOps>(journal: &mut Journal<O>, args: &[String]) -> Result<()> {
    for arg in args {
        let applied = match parse_term(arg)? {
            Term::Or => journal.add_disjunction(),
            Term::Match { field, value } => match JournalField::lookup(field) {
                Some(known) => journal.add_field_match(known, value),
                None => journal.add_match_str(field, value),
            },
        };
        applied.with_context(|| format!("cannot apply match {arg:?}"))?;
    }

    debug!(filters = journal.filters().len(), "applied matches");
    Ok(())
}

fn list_fields<O: NativeOps>(journal: &mut Journal<O>) -> Result<()> {
    for name in journal.available_field_names()? {
        println!("{name}");
    }
    Ok(())
}

fn print_entries<O: NativeOps>(journal: &mut Journal<O>, args: &Args) -> Result<()> {
    journal.move_to_earliest()?;

    if let Some(cursor) = &args.cursor {
        let cursor: Cursor = cursor.parse()?;
        if !journal.seek_cursor(&cursor)? {
            warn!("cursor no longer in the journal, starting at the closest entry");
        }
    }

    let until = args.until;
    let result = journal.for_each_in_range(args.since, until, args.lines, |journal| {
        // The scan also visits the first entry past the window.
        if let Some(until) = until {
            if journal.timestamp_usec()? >= until {
                return Ok(());
            }
        }
        Entry::read(journal, &args.output_fields, args.show_cursor)?.print(args.output)
    });

    match result {
        Ok(printed) => {
            debug!(printed, "done");
            Ok(())
        }
        Err(e) => match e.downcast_ref::<JournalError>() {
            Some(JournalError::TimeNotFound | JournalError::NoEntries) => Ok(()),
            _ => Err(e),
        },
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let mut journal = args.open()?;
    apply_matches(&mut journal, &args.matches)?;

    if args.fields {
        return list_fields(&mut journal);
    }
    if args.disk_usage {
        println!("{}", journal.usage()?);
        return Ok(());
    }
    print_entries(&mut journal, &args)
}
