//! Build a sorted key index over a tab-separated primary file.
//!
//! Run with: `cargo run --bin build_index -- data.tsv --output index.tsv`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, error, info};

use sorted_index::options::{DEFAULT_BATCH_SIZE, DEFAULT_KEY_COLUMN};
use sorted_index::{IndexBuilder, Options, verify_index};

/// Exit code when `--verify` finds problems.
const EXIT_VERIFY_FAILED: u8 = 6;

#[derive(Parser)]
#[command(name = "build_index")]
#[command(about = "Build a sorted (key, offset) index with an external merge sort")]
struct Cli {
    /// Tab-separated primary file; the first line is a header
    primary: PathBuf,
    /// Where to write the index
    #[arg(short, long, default_value = "index.tsv")]
    output: PathBuf,
    /// Entries sorted in memory per segment
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
    /// Zero-based column holding the key
    #[arg(long, default_value_t = DEFAULT_KEY_COLUMN)]
    key_column: usize,
    /// Parent directory for temporary segments (default: next to the output)
    #[arg(long)]
    work_dir: Option<PathBuf>,
    /// Check the finished index against the primary file
    #[arg(long)]
    verify: bool,
    /// Log merge activity
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
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let mut options = Options::default()
        .batch_size(cli.batch_size)
        .key_column(cli.key_column);
    if let Some(dir) = cli.work_dir {
        options = options.work_dir(dir);
    }

    let builder = IndexBuilder::new(options);
    let stats = match builder.build(&cli.primary, &cli.output) {
        Ok(stats) => stats,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(e.exit_code());
        }
    };
    info!(
        "indexed {} records into {} in {} ms",
        stats.records,
        cli.output.display(),
        stats.elapsed.as_millis()
    );

    if cli.verify {
        match verify_index(&cli.output, &cli.primary, builder.options()) {
            Ok(report) if report.is_ok() => info!(entries = report.entries, "index verified"),
            Ok(report) => {
                for problem in &report.problems {
                    error!("{problem}");
                }
                error!(problems = report.problem_count, "index verification failed");
                return ExitCode::from(EXIT_VERIFY_FAILED);
            }
            Err(e) => {
                error!("{e}");
                return ExitCode::from(e.exit_code());
            }
        }
    }

    ExitCode::SUCCESS
}
