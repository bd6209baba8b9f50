use serde::Serialize;
use sql_cleaner::chunker::create_sections;
use sql_cleaner::input::read_dump;
use sql_cleaner::parser::{parse_dump, ParsedDump};
use sql_cleaner::pipeline::PipelineConfig;
use sql_cleaner::section::ProcessingSection;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Serialize)]
struct TableSummary {
    table_name: String,
    columns: String,
    copy_blocks: usize,
    rows: usize,
    chunks: usize,
}

#[derive(Debug, Serialize)]
struct AnalyzeReport {
    file: String,
    structure_lines: usize,
    total_rows: usize,
    total_sections: usize,
    tables: Vec<TableSummary>,
}

fn summarize(parsed: &ParsedDump, chunk_size: usize) -> Vec<TableSummary> {
    let mut tables: Vec<TableSummary> = Vec::new();

    for block in &parsed.data_blocks {
        let chunks = block.data.len().div_ceil(chunk_size.max(1));
        match tables.iter_mut().find(|t| t.table_name == block.table_name) {
            Some(t) => {
                t.copy_blocks += 1;
                t.rows += block.data.len();
                t.chunks += chunks;
            }
            None => tables.push(TableSummary {
                table_name: block.table_name.clone(),
                columns: block.columns.clone(),
                copy_blocks: 1,
                rows: block.data.len(),
                chunks,
            }),
        }
    }

    tables
}

pub fn run(
    file: PathBuf,
    chunk_size: Option<usize>,
    config: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let config = match &config {
        Some(path) => PipelineConfig::load(path)
            .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path.display(), e))?,
        None => PipelineConfig::default(),
    };
    let chunk_size = chunk_size.unwrap_or(config.chunk_size);
    if chunk_size == 0 {
        anyhow::bail!("chunk_size must be at least 1");
    }

    let source = read_dump(&file, config.max_file_size_bytes)?;
    let parsed = parse_dump(&source);
    let sections = create_sections(&parsed, chunk_size);

    let report = AnalyzeReport {
        file: file.display().to_string(),
        structure_lines: parsed.structure_lines.len(),
        total_rows: parsed.total_rows(),
        total_sections: sections.len(),
        tables: summarize(&parsed, chunk_size),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let file_size_kb = source.len() as f64 / 1024.0;
    println!("Analyzing dump: {} ({:.1} KB)", report.file, file_size_kb);
    println!("✓ Analysis completed in {:.3?}\n", start_time.elapsed());

    let has_structure = sections
        .first()
        .is_some_and(|s| matches!(s, ProcessingSection::Structure(_)));
    println!(
        "Structure: {} lines ({})",
        report.structure_lines,
        if has_structure { "1 section" } else { "empty" }
    );

    if report.tables.is_empty() {
        println!("No COPY data found in dump.");
        return Ok(());
    }

    println!("Found {} tables with COPY data:\n", report.tables.len());
    println!(
        "{:<40} {:>8} {:>12} {:>12}",
        "Table Name", "Blocks", "Rows", "Sections"
    );
    println!("{}", "─".repeat(76));

    for table in &report.tables {
        println!(
            "{:<40} {:>8} {:>12} {:>12}",
            truncate_string(&table.table_name, 40),
            table.copy_blocks,
            table.rows,
            table.chunks
        );
    }

    println!("{}", "─".repeat(76));
    println!(
        "{:<40} {:>8} {:>12} {:>12}",
        "TOTAL",
        parsed.data_blocks.len(),
        report.total_rows,
        report.total_sections
    );

    Ok(())
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
