//! CLI for generating PostgreSQL dump fixtures.
//!
//! Usage:
//!   gen-dump --tables 5 --rows 200 --seed 42 > fixtures/dump.sql
//!   gen-dump --split-blocks --unterminated -o broken.sql

use clap::Parser;
use dump_gen::{DumpConfig, DumpGenerator};
use std::fs;

#[derive(Parser, Debug)]
#[command(name = "gen-dump")]
#[command(about = "Generate PostgreSQL dump fixtures for sql-cleaner", long_about = None)]
struct Args {
    /// Number of tables with COPY data
    #[arg(short, long, default_value = "3")]
    tables: usize,

    /// Rows per table
    #[arg(short, long, default_value = "100")]
    rows: usize,

    /// Random seed for reproducibility
    #[arg(long, default_value = "12345")]
    seed: u64,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Skip comments, meta-commands and stray INSERT lines
    #[arg(long)]
    clean: bool,

    /// Write each table as two COPY blocks
    #[arg(long)]
    split_blocks: bool,

    /// Leave the final COPY block unterminated
    #[arg(long)]
    unterminated: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = DumpConfig {
        tables: args.tables,
        rows_per_table: args.rows,
        noise: !args.clean,
        split_blocks: args.split_blocks,
        unterminated_last: args.unterminated,
    };

    let dump = DumpGenerator::new(args.seed, config).generate();

    match &args.output {
        Some(path) => {
            fs::write(path, &dump.sql)?;
            eprintln!(
                "Generated {} tables × {} rows ({} COPY blocks) to {}",
                dump.tables.len(),
                args.rows,
                dump.copy_blocks,
                path
            );
        }
        None => print!("{}", dump.sql),
    }

    Ok(())
}
