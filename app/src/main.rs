#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use command::{
    BatchInput, BatchStrategy, CommandStrategy, ExtractInput, ExtractStrategy, InfoStrategy,
    InitStrategy, RulesStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "periop")]
#[command(about = "Structured perioperative insights from clinical notes", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a record from chart text, files, or stdin
    Extract {
        /// Chart text. Read from stdin when neither TEXT nor --file is given
        #[arg(conflicts_with = "file")]
        text: Option<String>,

        /// Read chart text from a file; repeat for several files
        #[arg(short, long)]
        file: Vec<PathBuf>,

        /// Label stored as metadata.source
        #[arg(short, long)]
        source: Option<String>,

        /// Normalise whitespace and drop a trailing references section first
        #[arg(long)]
        clean: bool,

        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },
    /// Extract every matching file in a directory
    Batch {
        /// Directory to scan
        #[arg(short, long)]
        dir: PathBuf,

        /// Glob pattern relative to the directory
        #[arg(short, long, default_value = "*.txt")]
        glob: String,

        /// Normalise whitespace and drop a trailing references section first
        #[arg(long)]
        clean: bool,

        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },
    /// Print the active rule table
    Rules,
    /// Initialize configuration
    Init,
    /// Show configuration
    Info,
    /// Show version
    Version,
}

fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Records go to stdout, so logs must stay on stderr.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_timer(LocalTime::rfc_3339())
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Extract {
            text,
            file,
            source,
            clean,
            compact,
        } => {
            ExtractStrategy
                .execute(ExtractInput {
                    text,
                    files: file,
                    source,
                    clean,
                    compact,
                })
                .await
        }
        Commands::Batch {
            dir,
            glob,
            clean,
            compact,
        } => {
            BatchStrategy
                .execute(BatchInput {
                    dir,
                    pattern: glob,
                    clean,
                    compact,
                })
                .await
        }
        Commands::Rules => RulesStrategy.execute(()).await,
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
