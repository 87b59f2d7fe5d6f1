/// ibson command-line tool: decode, inspect, validate, and summarise
/// `.bson` files holding one or more concatenated documents.
///
/// # Command overview
///
/// ```text
/// ibson <COMMAND> [OPTIONS]
///
/// Commands:
///   decode     Print every document as extended JSON
///   inspect    Trace every element with its type, offset and raw bytes
///   validate   Check every document for structural correctness
///   stats      Print size, depth and element-type statistics
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log decoder activity to stderr (debug level)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                  |
/// |------|------------------------------------------|
/// | 0    | Success                                  |
/// | 1    | Error (I/O failure, malformed file, etc.)|
///
/// All error details and logs are written to stderr so stdout can be
/// piped cleanly. `RUST_LOG` overrides the log filter.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd_decode;
mod cmd_inspect;
mod cmd_stats;
mod cmd_validate;
mod input;
mod json;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The ibson command-line tool.
///
/// Decode and examine `.bson` files without recursion, however deeply
/// their documents nest.
#[derive(Parser)]
#[command(name = "ibson", version, about = "Iterative BSON decoder CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log decoder activity to stderr (debug level unless `RUST_LOG` is set).
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print every document of a BSON file as extended JSON.
    Decode(DecodeArgs),
    /// Trace every element of a BSON file.
    Inspect(InspectArgs),
    /// Check a BSON file for structural correctness.
    Validate(ValidateArgs),
    /// Print size, depth and element-type statistics.
    Stats(StatsArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `ibson decode`.
///
/// Decodes each document and writes one JSON rendering per line (or a
/// pretty-printed block per document with `--pretty`).
///
/// ```text
/// ┌───────────────┬──────────────────────────────────────────────────────┐
/// │ Flag          │ Effect                                               │
/// ├───────────────┼──────────────────────────────────────────────────────┤
/// │ --pretty      │ Indented JSON, one block per document                │
/// │ --lossy       │ Replace invalid UTF-8 instead of failing             │
/// │ --max-depth N │ Fail on documents nested deeper than N (1000)        │
/// │ --workers N   │ Decode documents on N threads (default 1)            │
/// │ -o / --output │ Write to a file instead of stdout                    │
/// └───────────────┴──────────────────────────────────────────────────────┘
/// ```
///
/// A file path of `-` streams documents from stdin one at a time.
#[derive(clap::Args)]
pub struct DecodeArgs {
    /// Path to the `.bson` file, or `-` for stdin.
    pub file: PathBuf,

    /// Pretty-print each document.
    #[arg(long)]
    pub pretty: bool,

    /// Replace invalid UTF-8 with U+FFFD instead of failing.
    #[arg(long, env = "IBSON_LOSSY")]
    pub lossy: bool,

    /// Maximum container nesting depth; the root is depth 0.
    ///
    /// JSON rendering recurses per level, so decode output is always
    /// depth-bounded.
    #[arg(long, env = "IBSON_MAX_DEPTH", default_value_t = 1000)]
    pub max_depth: usize,

    /// Number of decode threads. Ignored when reading stdin.
    #[arg(long, env = "IBSON_WORKERS", default_value_t = 1)]
    pub workers: usize,

    /// Write output to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `ibson inspect`.
///
/// Walks every container without building a tree and prints one line per
/// element.
///
/// ```text
/// ┌──────────────┬───────────────────────────────────────────────────────┐
/// │ Flag         │ Effect                                                │
/// ├──────────────┼───────────────────────────────────────────────────────┤
/// │ --order      │ lifo (default, depth-first) | fifo (breadth-first)    │
/// │ --document N │ Inspect only the document at index N                  │
/// └──────────────┴───────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the `.bson` file to inspect.
    pub file: PathBuf,

    /// Container visit order: `lifo` or `fifo`.
    #[arg(long, default_value = "lifo")]
    pub order: String,

    /// Inspect only the document at this zero-based index.
    #[arg(long)]
    pub document: Option<usize>,
}

/// Arguments for `ibson validate`.
///
/// Fully decodes every document and reports either success checkmarks
/// or the first structural problem with its absolute offset.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Path to the `.bson` file to validate.
    pub file: PathBuf,

    /// Accept invalid UTF-8 in keys and strings.
    #[arg(long, env = "IBSON_LOSSY")]
    pub lossy: bool,
}

/// Arguments for `ibson stats`.
#[derive(clap::Args)]
pub struct StatsArgs {
    /// Path to the `.bson` file to analyse.
    pub file: PathBuf,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Decode(args) => cmd_decode::run(&args),
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Validate(args) => cmd_validate::run(&args),
        Commands::Stats(args) => cmd_stats::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
