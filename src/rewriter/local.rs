//! Offline rewriter.
//!
//! Data sections are converted deterministically with [`crate::convert`] and
//! returned as a `VALUES` list; structure sections come back unchanged.
//! Useful for running without network access and for tests.

use super::{RewriteError, RewriteResult, SectionRewriter};
use crate::convert::copy_rows_to_tuples;
use crate::section::ProcessingSection;

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRewriter;

impl LocalRewriter {
    pub fn new() -> Self {
        Self
    }
}

impl SectionRewriter for LocalRewriter {
    fn rewrite(&self, section: &ProcessingSection) -> RewriteResult<String> {
        let text = match section {
            ProcessingSection::Structure(s) => s.content.trim().to_string(),
            ProcessingSection::Data(d) => {
                let tuples = copy_rows_to_tuples(d.rows());
                let last = tuples.len().saturating_sub(1);
                let mut lines = vec!["VALUES".to_string()];
                lines.extend(tuples.into_iter().enumerate().map(|(i, t)| {
                    if i == last {
                        format!("{};", t)
                    } else {
                        format!("{},", t)
                    }
                }));
                lines.join("\n")
            }
        };

        if text.is_empty() {
            return Err(RewriteError::empty_response(section));
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize_values_block;
    use crate::section::{DataSection, DATA_PRIORITY};

    #[test]
    fn test_data_section_round_trips_through_normalizer() {
        let section = ProcessingSection::Data(DataSection {
            content: "COPY public.users (id, name) FROM stdin;\n1\tAlice\n2\tO'Brien\n\\."
                .to_string(),
            priority: DATA_PRIORITY,
            table_name: "public.users".to_string(),
            chunk_index: 1,
            total_chunks: 1,
            record_count: 2,
        });

        let out = LocalRewriter::new().rewrite(&section).unwrap();
        assert_eq!(out, "VALUES\n('1', 'Alice'),\n('2', 'O''Brien');");
        assert_eq!(
            normalize_values_block(&out),
            vec!["('1', 'Alice')", "('2', 'O''Brien')"]
        );
    }
}
