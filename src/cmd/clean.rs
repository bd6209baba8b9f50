//! Clean command CLI handler.

use sql_cleaner::chunker::create_sections;
use sql_cleaner::input::{display_file_name, read_dump};
use sql_cleaner::parser::parse_dump;
use sql_cleaner::pipeline::{FallbackMode, Pipeline, PipelineConfig, RunStats};
use sql_cleaner::progress::SectionProgress;
use sql_cleaner::rewriter::{HttpRewriter, LocalRewriter, RewriterKind, SectionRewriter};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub struct CleanArgs {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub rewriter: Option<String>,
    pub chunk_size: Option<usize>,
    pub fallback: Option<String>,
    pub min_attempts: Option<usize>,
    pub max_failure_ratio: Option<f64>,
    pub delay_ms: Option<u64>,
    pub timeout: Option<u64>,
    pub config: Option<PathBuf>,
    pub progress: bool,
    pub dry_run: bool,
}

/// File config first, then CLI flags on top
fn build_config(args: &CleanArgs) -> anyhow::Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path.display(), e))?,
        None => PipelineConfig::default(),
    };

    if let Some(r) = &args.rewriter {
        config.rewriter = r.parse::<RewriterKind>().map_err(|e| anyhow::anyhow!("{}", e))?;
    }
    if let Some(f) = &args.fallback {
        config.fallback = f.parse::<FallbackMode>().map_err(|e| anyhow::anyhow!("{}", e))?;
    }
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = Some(endpoint.clone());
    }
    if let Some(n) = args.chunk_size {
        config.chunk_size = n;
    }
    if let Some(n) = args.min_attempts {
        config.failure_policy.min_attempts = n;
    }
    if let Some(r) = args.max_failure_ratio {
        config.failure_policy.max_failure_ratio = r;
    }
    if let Some(ms) = args.delay_ms {
        config.request_delay_ms = ms;
    }
    if let Some(secs) = args.timeout {
        config.timeout_secs = secs;
    }

    Ok(config)
}

pub fn run(args: CleanArgs) -> anyhow::Result<()> {
    let config = build_config(&args)?;

    if args.dry_run {
        return print_plan(&args, &config);
    }

    config.validate()?;

    let rewriter: Box<dyn SectionRewriter> = match config.rewriter {
        RewriterKind::Local => Box::new(LocalRewriter::new()),
        RewriterKind::Http => {
            let endpoint = config.endpoint.clone().unwrap_or_default();
            Box::new(HttpRewriter::new(
                endpoint,
                Duration::from_secs(config.timeout_secs),
            )?)
        }
    };

    let progress = args.progress.then(SectionProgress::new);
    let output = {
        let mut pipeline = Pipeline::new(&*rewriter, config);
        if let Some(bar) = progress.as_ref() {
            pipeline = pipeline.with_observer(move |event| bar.handle(event));
        }
        pipeline.run_file(&args.file)
    };
    if let Some(bar) = &progress {
        bar.finish();
    }
    let output = output?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, &output.sql)?;
        }
        None => print!("{}", output.sql),
    }

    print_stats(&output.stats, args.output.as_ref());
    Ok(())
}

fn print_plan(args: &CleanArgs, config: &PipelineConfig) -> anyhow::Result<()> {
    let source = read_dump(&args.file, config.max_file_size_bytes)?;
    let parsed = parse_dump(&source);
    let sections = create_sections(&parsed, config.chunk_size);

    eprintln!("Section plan for {}:", display_file_name(&args.file));
    for (i, section) in sections.iter().enumerate() {
        eprintln!(
            "  [{}/{}] {} ({} bytes, priority {})",
            i + 1,
            sections.len(),
            section.display_name(),
            section.content().len(),
            section.priority()
        );
    }
    eprintln!();
    eprintln!("(Dry run - no sections sent to the rewriter)");
    Ok(())
}

fn print_stats(stats: &RunStats, output: Option<&PathBuf>) {
    eprintln!();
    eprintln!("Cleaning Statistics:");
    eprintln!("  Sections processed: {}", stats.processed_sections);
    eprintln!("  Successful conversions: {}", stats.successful_sections);
    eprintln!("  Failed sections (kept original): {}", stats.failed_sections);
    eprintln!("  Tables with data: {}", stats.tables_with_data);
    eprintln!("  Rows: {}", stats.total_rows);
    eprintln!(
        "  Size: {:.1} KB → {:.1} KB",
        stats.original_size as f64 / 1024.0,
        stats.cleaned_size as f64 / 1024.0
    );
    if let Some(path) = output {
        eprintln!("  → {}", path.display());
    }
}
