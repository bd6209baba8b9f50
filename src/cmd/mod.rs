mod analyze;
mod clean;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sql-cleaner")]
#[command(version)]
#[command(
    about = "Convert PostgreSQL dump COPY blocks into grouped INSERT statements via a section rewriter",
    long_about = None
)]
pub struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean a PostgreSQL dump into a single INSERT-based SQL file
    Clean {
        /// Input dump (.sql or .txt)
        file: PathBuf,

        /// Output SQL file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Section rewriting endpoint URL (http rewriter)
        #[arg(long)]
        endpoint: Option<String>,

        /// Rewriter: http or local (local converts offline)
        #[arg(long)]
        rewriter: Option<String>,

        /// Rows per data section
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Representation of rows from failed sections: synthesize or raw
        #[arg(long)]
        fallback: Option<String>,

        /// Failures tolerated before the failure ratio can abort the run
        #[arg(long)]
        min_attempts: Option<usize>,

        /// Abort when failed/attempted sections exceeds this ratio
        #[arg(long)]
        max_failure_ratio: Option<f64>,

        /// Pause in milliseconds after each rewritten section
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Request timeout in seconds for the http rewriter
        #[arg(long)]
        timeout: Option<u64>,

        /// YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show progress during processing
        #[arg(short, long)]
        progress: bool,

        /// Parse and chunk only; print the section plan without rewriting
        #[arg(long)]
        dry_run: bool,
    },

    /// Show tables, row counts and the section plan for a dump
    Analyze {
        /// Input dump (.sql or .txt)
        file: PathBuf,

        /// Rows per data section (default: from config, else 5)
        #[arg(long)]
        chunk_size: Option<usize>,

        /// YAML config file; its chunk_size and max_file_size_bytes apply
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "sql_cleaner=debug"
    } else {
        "sql_cleaner=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Clean {
            file,
            output,
            endpoint,
            rewriter,
            chunk_size,
            fallback,
            min_attempts,
            max_failure_ratio,
            delay_ms,
            timeout,
            config,
            progress,
            dry_run,
        } => clean::run(clean::CleanArgs {
            file,
            output,
            endpoint,
            rewriter,
            chunk_size,
            fallback,
            min_attempts,
            max_failure_ratio,
            delay_ms,
            timeout,
            config,
            progress,
            dry_run,
        }),
        Commands::Analyze {
            file,
            chunk_size,
            config,
            json,
        } => analyze::run(file, chunk_size, config, json),
        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "sql-cleaner",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}
