//! Terminal progress display for cleaning runs.
//!
//! Wraps an indicatif bar that advances on every [`SectionEvent`], so the
//! pipeline itself stays free of terminal concerns.

use crate::pipeline::{SectionEvent, SectionOutcome};
use indicatif::{ProgressBar, ProgressStyle};

pub struct SectionProgress {
    bar: ProgressBar,
}

impl SectionProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} sections {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░  ")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { bar }
    }

    /// Feed one pipeline event
    pub fn handle(&self, event: &SectionEvent) {
        if self.bar.length() != Some(event.total as u64) {
            self.bar.set_length(event.total as u64);
        }

        match &event.outcome {
            SectionOutcome::Started => {
                self.bar.set_message(format!("Processing {}", event.name));
            }
            SectionOutcome::Rewritten => self.bar.inc(1),
            SectionOutcome::FellBack(err) => {
                self.bar
                    .println(format!("  ⚠ {} kept original content ({})", event.name, err));
                self.bar.inc(1);
            }
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for SectionProgress {
    fn default() -> Self {
        Self::new()
    }
}
