//! CLI frontend for the Sheetwright effect engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use sw_engine::EngineConfig;

#[derive(Parser)]
#[command(
    name = "sw",
    about = "Sheetwright: evaluate character sheets from rules content",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Refuse to evaluate, as if SHEETWRIGHT_ENGINE=off
    #[arg(long, global = true)]
    disable_engine: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Inputs shared by every command that evaluates a character.
#[derive(Args)]
struct CharacterArgs {
    /// Character facts (JSON)
    character: PathBuf,

    /// Effect corpus: a JSON file or a directory of JSON files
    #[arg(short, long, default_value = "corpus")]
    corpus: Vec<PathBuf>,

    /// Temporary effects (JSON), applied after every permanent effect
    #[arg(short, long)]
    temporary: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a character and print the derived sheet
    Evaluate {
        #[command(flatten)]
        input: CharacterArgs,

        /// Print the derived state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show why each effect was applied or skipped
    Provenance {
        #[command(flatten)]
        input: CharacterArgs,

        /// Only show skipped effects
        #[arg(short, long)]
        skipped: bool,
    },

    /// Show the order effects will be applied in
    Schedule {
        /// Effect corpus: a JSON file or a directory of JSON files
        #[arg(short, long, default_value = "corpus")]
        corpus: Vec<PathBuf>,
    },

    /// Validate every formula in a corpus
    Check {
        /// Effect corpus: a JSON file or a directory of JSON files
        #[arg(short, long, default_value = "corpus")]
        corpus: Vec<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let flag = std::env::var("SHEETWRIGHT_ENGINE").ok();
    let enabled = !cli.disable_engine && EngineConfig::flag_enabled(flag.as_deref());
    let config = EngineConfig::default().with_enabled(enabled);

    let result = match cli.command {
        Commands::Evaluate { input, json } => commands::evaluate::run(
            &config,
            &input.character,
            &input.corpus,
            input.temporary.as_deref(),
            json,
        ),
        Commands::Provenance { input, skipped } => commands::provenance::run(
            &config,
            &input.character,
            &input.corpus,
            input.temporary.as_deref(),
            skipped,
        ),
        Commands::Schedule { corpus } => commands::schedule::run(&corpus),
        Commands::Check { corpus } => commands::check::run(&corpus),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
