//! Look up one record of the primary file through its index.
//!
//! Run with: `cargo run --bin find_record -- index.tsv data.tsv 00000000000042`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, debug, error};

use sorted_index::options::{DEFAULT_KEY_COLUMN, DEFAULT_KEY_LEN};
use sorted_index::{Error, IndexReader, Record, Result, validate_key};

/// Exit code when the key is not in the index.
const EXIT_KEY_NOT_FOUND: u8 = 6;

#[derive(Parser)]
#[command(name = "find_record")]
#[command(about = "Binary-search an index file and print the matching record")]
struct Cli {
    /// Index file produced by build_index
    index: PathBuf,
    /// Primary file the index was built from
    primary: PathBuf,
    /// Key to look up
    key: String,
    /// Required key length
    #[arg(long, default_value_t = DEFAULT_KEY_LEN)]
    key_len: usize,
    /// Zero-based column holding the key, used to double-check the hit
    #[arg(long, default_value_t = DEFAULT_KEY_COLUMN)]
    key_column: usize,
    /// Log every binary-search step
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitCode::from(1) } else { ExitCode::SUCCESS };
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::TRACE } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(Some((record, header))) => {
            println!("{}", record.render(&header));
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("key {} not found", cli.key);
            ExitCode::from(EXIT_KEY_NOT_FOUND)
        }
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

/// The matching record plus the column names to label it with.
fn run(cli: &Cli) -> Result<Option<(Record, Vec<String>)>> {
    validate_key(&cli.key, cli.key_len)?;

    let index = IndexReader::open(&cli.index)?;
    if !cli.primary.exists() {
        return Err(Error::NotFound(cli.primary.clone()));
    }

    let Some(offset) = index.find(&cli.key)? else {
        return Ok(None);
    };
    debug!(key = %cli.key, offset, "index hit");

    let record = Record::open_at(&cli.primary, offset)?.ok_or_else(|| {
        Error::Corruption(format!("offset {offset} is past the end of the primary file"))
    })?;
    if record.field(cli.key_column) != Some(cli.key.as_str()) {
        return Err(Error::Corruption(format!(
            "index points {} at a record keyed {:?}; rebuild the index",
            cli.key,
            record.field(cli.key_column)
        )));
    }
    let header = Record::read_header(&cli.primary)?;
    Ok(Some((record, header)))
}
