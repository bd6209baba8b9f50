//! Units of work submitted to the section rewriter.

use serde::{Deserialize, Serialize};

/// Priority given to the aggregated structure section
pub const STRUCTURE_PRIORITY: u32 = 1;
/// Priority given to every data chunk
pub const DATA_PRIORITY: u32 = 7;

/// All structure lines of a dump, newline-joined in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSection {
    pub content: String,
    pub priority: u32,
}

/// One chunk of a table's COPY rows, wrapped as a standalone COPY block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSection {
    pub content: String,
    pub priority: u32,
    pub table_name: String,
    /// 1-based
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub record_count: usize,
}

impl DataSection {
    /// The raw rows carried in `content`, without the COPY header and terminator
    pub fn rows(&self) -> impl Iterator<Item = &str> {
        let mut lines = self.content.split('\n');
        lines.next();
        lines.filter(|line| *line != crate::parser::COPY_TERMINATOR)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProcessingSection {
    Structure(StructureSection),
    Data(DataSection),
}

impl ProcessingSection {
    pub fn content(&self) -> &str {
        match self {
            ProcessingSection::Structure(s) => &s.content,
            ProcessingSection::Data(d) => &d.content,
        }
    }

    pub fn priority(&self) -> u32 {
        match self {
            ProcessingSection::Structure(s) => s.priority,
            ProcessingSection::Data(d) => d.priority,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, ProcessingSection::Data(_))
    }

    /// Short label used in logs and progress output
    pub fn display_name(&self) -> String {
        match self {
            ProcessingSection::Structure(_) => "structure".to_string(),
            ProcessingSection::Data(d) => format!(
                "{} (chunk {}/{} - {} records)",
                d.table_name, d.chunk_index, d.total_chunks, d.record_count
            ),
        }
    }
}
