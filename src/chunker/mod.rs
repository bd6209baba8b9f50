//! Splits parsed COPY data into bounded-size sections.
//!
//! Each chunk becomes a self-contained COPY block so a rewriter sees the
//! table name and column list alongside the rows it converts.

use crate::parser::{DataBlock, ParsedDump, COPY_TERMINATOR};
use crate::section::{
    DataSection, ProcessingSection, StructureSection, DATA_PRIORITY, STRUCTURE_PRIORITY,
};

/// Rows per data section unless configured otherwise
pub const DEFAULT_CHUNK_SIZE: usize = 5;

/// Render a minimal standalone COPY statement for a group of rows
pub fn copy_block_text(table_name: &str, columns: &str, rows: &[String]) -> String {
    let header = if columns.is_empty() {
        format!("COPY {} FROM stdin;", table_name)
    } else {
        format!("COPY {} ({}) FROM stdin;", table_name, columns)
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(header.as_str());
    lines.extend(rows.iter().map(String::as_str));
    lines.push(COPY_TERMINATOR);
    lines.join("\n")
}

/// Partition every block into sections of at most `chunk_size` rows.
///
/// Blocks keep their source order and chunks within a block are emitted in
/// ascending `chunk_index`. A `chunk_size` of zero is treated as one.
pub fn create_data_sections(blocks: &[DataBlock], chunk_size: usize) -> Vec<DataSection> {
    let chunk_size = chunk_size.max(1);
    let mut sections = Vec::new();

    for block in blocks {
        let total_chunks = block.data.len().div_ceil(chunk_size);

        for (i, rows) in block.data.chunks(chunk_size).enumerate() {
            sections.push(DataSection {
                content: copy_block_text(&block.table_name, &block.columns, rows),
                priority: DATA_PRIORITY,
                table_name: block.table_name.clone(),
                chunk_index: i + 1,
                total_chunks,
                record_count: rows.len(),
            });
        }
    }

    sections
}

/// Build the full ordered work list for a parsed dump: the structure section
/// (if any structure text exists) followed by all data sections.
pub fn create_sections(parsed: &ParsedDump, chunk_size: usize) -> Vec<ProcessingSection> {
    let mut sections = Vec::new();

    let structure = parsed.structure_text();
    if !structure.is_empty() {
        sections.push(ProcessingSection::Structure(StructureSection {
            content: structure,
            priority: STRUCTURE_PRIORITY,
        }));
    }

    sections.extend(
        create_data_sections(&parsed.data_blocks, chunk_size)
            .into_iter()
            .map(ProcessingSection::Data),
    );

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_block_text() {
        let rows = vec!["1\tAlice".to_string()];
        assert_eq!(
            copy_block_text("public.users", "id, name", &rows),
            "COPY public.users (id, name) FROM stdin;\n1\tAlice\n\\."
        );
    }

    #[test]
    fn test_copy_block_text_without_columns() {
        let rows = vec!["1".to_string()];
        assert_eq!(copy_block_text("t", "", &rows), "COPY t FROM stdin;\n1\n\\.");
    }

    #[test]
    fn test_zero_chunk_size_treated_as_one() {
        let mut block = DataBlock::new("t", "a");
        block.data = vec!["1".into(), "2".into()];
        let sections = create_data_sections(&[block], 0);
        assert_eq!(sections.len(), 2);
    }
}
