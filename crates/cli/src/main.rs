//! Swing Analyze CLI - swing detection over pose sequences
//!
//! Command-line interface for the swing analysis engine.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use rayon::ThreadPoolBuilder;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::analyze::AnalyzeCommand;
use commands::bulk::BulkCommand;
use commands::config::ConfigCommand;
use commands::series::SeriesCommand;

#[derive(Parser)]
#[command(
    name = "swing-analyze",
    version,
    about = "Swing detection and biomechanics from pose keypoints",
    long_about = "Detect racket swings in per-frame body keypoints and measure them.\n\n\
                  Input is a pose sequence JSON file: frame rate, skeleton model\n\
                  (coco17 or blazepose33) and the poses detected in every frame.",
    after_help = "EXAMPLES:\n  \
                  # Analyze one rally, pretty-printed\n  \
                  swing-analyze analyze rally.json --pretty\n  \
                  swing-analyze analyze rally.json --preset sensitive --handedness left -o out.json\n\n  \
                  # BULK MODE - Many files in parallel\n  \
                  swing-analyze bulk --output-dir results/ *.json\n  \
                  swing-analyze bulk --format jsonl session_*.json\n\n  \
                  # Chart series\n  \
                  swing-analyze series rally.json --select velocity_kmh:wrist:right --frames 120..300\n  \
                  swing-analyze series rally.json --select angle:knee --raw\n\n  \
                  # Print the default configuration as YAML\n  \
                  swing-analyze config > swing.yaml\n\n\
                  For more details on a specific command:\n  \
                  swing-analyze <COMMAND> --help"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one pose file and print the full result
    Analyze(AnalyzeCommand),

    /// Bulk mode - Multiple files, parallel processing
    Bulk(BulkCommand),

    /// Extract one metric as chart points
    Series(SeriesCommand),

    /// Print a configuration preset
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    // Bulk mode thread count; lets tests limit parallelism
    if let Ok(threads_str) = std::env::var("SWING_ANALYZE_THREADS") {
        if let Ok(num_threads) = threads_str.parse::<usize>() {
            ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .ok(); // Ignore error if already initialized
        }
    }

    let cli = Cli::parse();

    // Keep stdout clean for config dumps
    let log_level = match &cli.command {
        Commands::Config(_) => Level::WARN,
        _ => {
            if cli.verbose {
                Level::DEBUG
            } else {
                Level::INFO
            }
        }
    };

    // Logs go to stderr; stdout carries JSON results
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Analyze(cmd) => cmd.execute(),
        Commands::Bulk(cmd) => cmd.execute(),
        Commands::Series(cmd) => cmd.execute(),
        Commands::Config(cmd) => cmd.execute(),
    }
}
