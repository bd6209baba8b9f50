//! Sequential cleaning run: parse → chunk → rewrite each section → assemble.
//!
//! Sections are rewritten strictly one at a time, in order. A failed section
//! falls back to its original content; no failure may lose rows. The run
//! aborts as a whole once the [`FailurePolicy`] says too many sections failed.

mod config;

pub use config::{FailurePolicy, FallbackMode, PipelineConfig};

use crate::assembler::{build_final_sql, AssembleInput, ValuesByTable, UNCONVERTED_PREFIX};
use crate::chunker::create_sections;
use crate::convert::copy_rows_to_tuples;
use crate::input::{display_file_name, read_dump, InputError};
use crate::normalizer::normalize_values_block;
use crate::parser::parse_dump;
use crate::rewriter::{FailureCode, RewriteError, SectionRewriter};
use crate::section::{DataSection, ProcessingSection};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fatal outcomes of a run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(
        "too many processing failures ({failed}/{attempted} sections); check the rewriting service and try again"
    )]
    TooManyFailures { failed: usize, attempted: usize },
}

/// Counters reported with the cleaned document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub processed_sections: usize,
    pub successful_sections: usize,
    pub failed_sections: usize,
    pub tables_with_data: usize,
    pub total_rows: usize,
    pub original_size: usize,
    pub cleaned_size: usize,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub sql: String,
    pub stats: RunStats,
}

/// What happened to a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOutcome {
    Started,
    Rewritten,
    FellBack(RewriteError),
}

/// Progress notification emitted around every section
#[derive(Debug, Clone)]
pub struct SectionEvent {
    /// 0-based position in the work list
    pub index: usize,
    pub total: usize,
    pub name: String,
    pub outcome: SectionOutcome,
}

type Observer<'a> = Box<dyn FnMut(&SectionEvent) + 'a>;

pub struct Pipeline<'a, R: SectionRewriter + ?Sized> {
    rewriter: &'a R,
    config: PipelineConfig,
    observer: Option<Observer<'a>>,
}

impl<'a, R: SectionRewriter + ?Sized> Pipeline<'a, R> {
    pub fn new(rewriter: &'a R, config: PipelineConfig) -> Self {
        Self {
            rewriter,
            config,
            observer: None,
        }
    }

    /// Register a callback for section progress
    pub fn with_observer<F: FnMut(&SectionEvent) + 'a>(mut self, f: F) -> Self {
        self.observer = Some(Box::new(f));
        self
    }

    /// Validate and read a dump file, then clean it
    pub fn run_file(&mut self, path: &Path) -> Result<RunOutput, PipelineError> {
        let source = read_dump(path, self.config.max_file_size_bytes)?;
        self.run(&display_file_name(path), &source)
    }

    /// Clean a dump held in memory
    pub fn run(&mut self, file_name: &str, source: &str) -> Result<RunOutput, PipelineError> {
        let parsed = parse_dump(source);
        let sections = create_sections(&parsed, self.config.chunk_size);
        if sections.is_empty() {
            return Err(InputError::NoSections.into());
        }

        info!(
            file = file_name,
            sections = sections.len(),
            tables = parsed.data_blocks.len(),
            rows = parsed.total_rows(),
            rewriter = self.rewriter.name(),
            "starting run"
        );

        let total = sections.len();
        let mut structure_sections: Vec<String> = Vec::new();
        let mut values_by_table = ValuesByTable::new();
        let mut successful = 0;
        let mut failed = 0;

        for (index, section) in sections.iter().enumerate() {
            let name = section.display_name();
            self.notify(index, total, &name, SectionOutcome::Started);

            let outcome = match section {
                ProcessingSection::Structure(s) => match self.rewriter.rewrite(section) {
                    Ok(text) => {
                        structure_sections.push(text);
                        Ok(())
                    }
                    Err(e) => {
                        structure_sections.push(s.content.clone());
                        Err(e)
                    }
                },
                ProcessingSection::Data(d) => {
                    match self.rewriter.rewrite(section).and_then(|t| checked_tuples(d, &t)) {
                        Ok(tuples) => {
                            values_by_table.extend_chunk(&d.table_name, tuples);
                            Ok(())
                        }
                        Err(e) => {
                            values_by_table.extend_fallback(&d.table_name, self.fallback_lines(d));
                            Err(e)
                        }
                    }
                }
            };

            match outcome {
                Ok(()) => {
                    successful += 1;
                    debug!(section = %name, "section rewritten");
                    self.notify(index, total, &name, SectionOutcome::Rewritten);
                    if self.config.request_delay_ms > 0 && index + 1 < total {
                        std::thread::sleep(Duration::from_millis(self.config.request_delay_ms));
                    }
                }
                Err(e) => {
                    failed += 1;
                    warn!(section = %name, error = %e, "section failed; keeping original content");
                    self.notify(index, total, &name, SectionOutcome::FellBack(e));

                    let attempted = index + 1;
                    if self.config.failure_policy.should_abort(failed, attempted) {
                        warn!(failed, attempted, "aborting run");
                        return Err(PipelineError::TooManyFailures { failed, attempted });
                    }
                }
            }
        }

        let sql = build_final_sql(&AssembleInput {
            file_name,
            structure_sections: &structure_sections,
            values_by_table: &values_by_table,
            data_blocks: &parsed.data_blocks,
            processed_sections: total,
            successful_sections: successful,
            failed_sections: failed,
        });

        let stats = RunStats {
            processed_sections: total,
            successful_sections: successful,
            failed_sections: failed,
            tables_with_data: values_by_table.len(),
            total_rows: parsed.total_rows(),
            original_size: source.len(),
            cleaned_size: sql.len(),
        };
        info!(
            successful = stats.successful_sections,
            failed = stats.failed_sections,
            "run complete"
        );

        Ok(RunOutput { sql, stats })
    }

    /// Original rows of a failed data section in the configured representation
    fn fallback_lines(&self, section: &DataSection) -> Vec<String> {
        match self.config.fallback {
            FallbackMode::Synthesize => copy_rows_to_tuples(section.rows()),
            FallbackMode::Raw => section
                .rows()
                .map(|row| format!("{}{}", UNCONVERTED_PREFIX, row))
                .collect(),
        }
    }

    fn notify(&mut self, index: usize, total: usize, name: &str, outcome: SectionOutcome) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&SectionEvent {
                index,
                total,
                name: name.to_string(),
                outcome,
            });
        }
    }
}

/// Normalize rewritten text, rejecting output whose row count differs from the section
fn checked_tuples(section: &DataSection, text: &str) -> Result<Vec<String>, RewriteError> {
    let tuples = normalize_values_block(text);

    if tuples.is_empty() {
        return Err(RewriteError::new(
            FailureCode::EmptyResponse,
            format!("no tuple rows found in output for {}", section.table_name),
        ));
    }
    if tuples.len() != section.record_count {
        return Err(RewriteError::new(
            FailureCode::Other,
            format!(
                "output for {} chunk {}: expected {} rows, got {}",
                section.table_name,
                section.chunk_index,
                section.record_count,
                tuples.len()
            ),
        ));
    }

    Ok(tuples)
}
