//! Set-associative cache simulator CLI.
//!
//! This binary performs one run:
//! 1. **Configure:** Geometry from `-S/-K/-B/-p`, optionally layered over a JSON `--config`.
//! 2. **Replay:** Stream the trace given by `-t` through the cache, printing per-record
//!    outcomes with `-v`.
//! 3. **Report:** Print `hits:<H> misses:<M> evictions:<E>` (or JSON with `--json`).

use std::error::Error;
use std::ffi::OsString;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use csim_core::common::SimError;
use csim_core::config::{CacheConfig, Config, Geometry, ReplacementPolicy};
use csim_core::sim::{Replayer, TraceReader};
use csim_core::{Cache, CacheStats};

#[derive(Parser, Debug)]
#[command(
    name = "csim",
    author,
    version,
    about = "Trace-driven set-associative cache simulator",
    after_help = "Examples:\n  csim    -S 16  -K 1 -B 16 -p LRU -t traces/yi2.trace\n  csim -v -S 256 -K 2 -B 16 -p LRU -t traces/yi2.trace"
)]
struct Cli {
    /// Number of sets (must be a power of 2).
    #[arg(short = 'S', value_name = "num")]
    sets: Option<usize>,

    /// Number of lines per set (must be > 0).
    #[arg(short = 'K', value_name = "num")]
    ways: Option<usize>,

    /// Number of bytes per line (must be a power of 2).
    #[arg(short = 'B', value_name = "num")]
    line_bytes: Option<usize>,

    /// Eviction policy (one of 'FIFO', 'LRU').
    #[arg(short = 'p', value_name = "policy", value_parser = ReplacementPolicy::from_str)]
    policy: Option<ReplacementPolicy>,

    /// Trace file.
    #[arg(short = 't', value_name = "file")]
    trace: PathBuf,

    /// Print the outcome of every trace record.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// JSON file supplying any of sets/ways/line_bytes/policy; flags override it.
    #[arg(long, value_name = "file")]
    config: Option<PathBuf>,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

/// Why argument parsing did not produce a [`Cli`].
#[derive(Debug)]
enum ArgsError {
    /// `--help` or `--version`; clap prints it and exits successfully.
    Informational(clap::Error),
    /// Any other parse failure, reduced to a one-line message.
    Invalid(String),
}

fn main() {
    let cli = match parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(ArgsError::Informational(e)) => e.exit(),
        Err(ArgsError::Invalid(message)) => fail(&message),
    };
    init_tracing();

    if let Err(e) = run(&cli) {
        fail(&e);
    }
}

/// Parses arguments without letting clap exit with its own status code.
fn parse_args<I, T>(args: I) -> Result<Cli, ArgsError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => ArgsError::Informational(e),
        _ => ArgsError::Invalid(summarize(&e)),
    })
}

/// First paragraph of a clap error on one line, without clap's `error:` prefix.
fn summarize(e: &clap::Error) -> String {
    let rendered = e.to_string();
    let summary = rendered
        .lines()
        .map(str::trim)
        .take_while(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    summary.strip_prefix("error: ").unwrap_or(&summary).to_owned()
}

fn fail(message: &dyn Display) -> ! {
    eprintln!("ERROR: {message}");
    process::exit(1);
}

/// Logs go to stderr so stdout carries only simulator output. `RUST_LOG` overrides
/// the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Layers flags over the optional config file, validates the geometry and opens the
/// trace.
fn prepare(cli: &Cli) -> Result<(Config, Geometry, TraceReader<BufReader<File>>), SimError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.cache = config.cache.merged_with(CacheConfig {
        sets: cli.sets,
        ways: cli.ways,
        line_bytes: cli.line_bytes,
        policy: cli.policy,
    });
    config.general.verbose |= cli.verbose;
    config.general.json |= cli.json;

    let geometry = config.cache.validate()?;
    let reader = TraceReader::open(&cli.trace)?;
    Ok((config, geometry, reader))
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let (config, geometry, reader) = prepare(cli)?;
    debug!(%geometry, trace = %cli.trace.display(), "starting simulation");

    let mut replayer = Replayer::new(Cache::new(geometry));
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stats = if config.general.verbose {
        let mut write_err = None;
        let stats = replayer
            .run_with(reader, |record, outcome| {
                if write_err.is_none() {
                    write_err = writeln!(out, "{record} {outcome}").err();
                }
            })
            .map_err(SimError::from)?;
        if let Some(e) = write_err {
            return Err(e.into());
        }
        stats
    } else {
        replayer.run(reader).map_err(SimError::from)?
    };

    print_summary(&mut out, &stats, config.general.json)?;
    out.flush()?;
    Ok(())
}

fn print_summary(out: &mut impl Write, stats: &CacheStats, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        writeln!(out, "{}", serde_json::to_string(stats)?)?;
    } else {
        writeln!(out, "{stats}")?;
    }
    Ok(())
}
