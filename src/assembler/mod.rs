//! Assembles the final cleaned SQL document.
//!
//! Output layout:
//! ```text
//! -- provenance header
//! -- DATABASE STRUCTURE
//! <structure sections>
//! -- DATA SECTION
//! -- Data for table: <name> (<n> chunks converted)
//! INSERT INTO <name> (<columns>) VALUES
//! (...),
//! (...);
//! ```

use crate::parser::DataBlock;
use ahash::AHashMap;

/// Prefix marking a row kept in unconverted form
pub const UNCONVERTED_PREFIX: &str = "-- [unconverted] ";

/// Per-table value lines, keyed by table name, iterated in first-seen order.
///
/// Lines are tuple literals `(...)`. Lines starting with `--` are annotations
/// (such as unconverted fallback rows) and are emitted verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValuesByTable {
    order: Vec<String>,
    groups: AHashMap<String, TableValues>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TableValues {
    lines: Vec<String>,
    converted: usize,
    fallback: usize,
}

impl ValuesByTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the lines of one successfully rewritten section
    pub fn extend_chunk<I>(&mut self, table: &str, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.group_mut(table).lines.extend(lines);
        self.group_mut(table).converted += 1;
    }

    /// Append the lines of a section that kept its original rows
    pub fn extend_fallback<I>(&mut self, table: &str, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.group_mut(table).lines.extend(lines);
        self.group_mut(table).fallback += 1;
    }

    fn group_mut(&mut self, table: &str) -> &mut TableValues {
        if !self.groups.contains_key(table) {
            self.order.push(table.to_string());
        }
        self.groups.entry(table.to_string()).or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of distinct tables with data
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Table names in first-seen order
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn get(&self, table: &str) -> Option<&[String]> {
        self.groups.get(table).map(|g| g.lines.as_slice())
    }

    /// Number of rewritten sections merged for a table
    pub fn chunk_count(&self, table: &str) -> usize {
        self.groups.get(table).map_or(0, |g| g.converted)
    }

    /// Number of sections for a table that fell back to their original rows
    pub fn fallback_count(&self, table: &str) -> usize {
        self.groups.get(table).map_or(0, |g| g.fallback)
    }

    /// Rows represented for a table, converted or not
    pub fn row_count(&self, table: &str) -> usize {
        self.get(table).map_or(0, |lines| {
            lines
                .iter()
                .filter(|l| is_tuple_line(l) || l.starts_with(UNCONVERTED_PREFIX))
                .count()
        })
    }
}

fn is_tuple_line(line: &str) -> bool {
    line.starts_with('(')
}

/// Everything needed to render the final document
#[derive(Debug, Clone, Copy)]
pub struct AssembleInput<'a> {
    pub file_name: &'a str,
    /// Structure text, rewritten or original, in order
    pub structure_sections: &'a [String],
    pub values_by_table: &'a ValuesByTable,
    /// Source blocks, used to look up column lists
    pub data_blocks: &'a [DataBlock],
    pub processed_sections: usize,
    pub successful_sections: usize,
    pub failed_sections: usize,
}

/// Render the cleaned SQL document. Pure: identical input gives identical output.
pub fn build_final_sql(input: &AssembleInput<'_>) -> String {
    let values = input.values_by_table;

    let mut parts: Vec<String> = vec![
        "-- PostgreSQL Database Restore (Cleaned and Organized)".to_string(),
        "-- All COPY statements converted to INSERT statements".to_string(),
        format!("-- Original file: {}", input.file_name),
        format!("-- Processed sections: {}", input.processed_sections),
        format!("-- Successful conversions: {}", input.successful_sections),
        format!("-- Failed sections (kept original): {}", input.failed_sections),
        format!("-- Tables with data: {}", values.len()),
        String::new(),
    ];

    if input.structure_sections.is_empty() {
        parts.push("-- No structure sections found".to_string());
    } else {
        parts.push("-- DATABASE STRUCTURE".to_string());
        parts.extend(input.structure_sections.iter().cloned());
    }
    parts.push(String::new());

    if values.is_empty() {
        parts.push(
            "-- No data sections found - this may indicate all data was already in INSERT format"
                .to_string(),
        );
        parts.push(String::new());
        return parts.join("\n");
    }

    parts.push("-- DATA SECTION".to_string());
    for table in values.tables() {
        let lines = values.get(table).unwrap_or_default();
        let fallback = values.fallback_count(table);
        if fallback == 0 {
            parts.push(format!(
                "-- Data for table: {} ({} chunks converted)",
                table,
                values.chunk_count(table)
            ));
        } else {
            parts.push(format!(
                "-- Data for table: {} ({} chunks converted, {} kept original)",
                table,
                values.chunk_count(table),
                fallback
            ));
        }

        let Some(block) = input.data_blocks.iter().find(|b| b.table_name == table) else {
            parts.push(format!(
                "-- WARNING: no COPY column list found for table {}; {} value lines skipped",
                table,
                lines.len()
            ));
            parts.push(String::new());
            continue;
        };

        push_table_values(&mut parts, table, &block.columns, lines);
        parts.push(String::new());
    }

    parts.join("\n")
}

/// Emit one INSERT for a table, terminating the last tuple with `;`
fn push_table_values(parts: &mut Vec<String>, table: &str, columns: &str, lines: &[String]) {
    let last_tuple = lines.iter().rposition(|l| is_tuple_line(l));

    if let Some(last) = last_tuple {
        if columns.is_empty() {
            parts.push(format!("INSERT INTO {} VALUES", table));
        } else {
            parts.push(format!("INSERT INTO {} ({}) VALUES", table, columns));
        }

        for (i, line) in lines.iter().enumerate().take(last + 1) {
            if !is_tuple_line(line) {
                parts.push(line.clone());
            } else if i == last {
                parts.push(format!("{};", line));
            } else {
                parts.push(format!("{},", line));
            }
        }
        parts.extend(lines[last + 1..].iter().cloned());
    } else {
        parts.extend(lines.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_by_table_keeps_first_seen_order() {
        let mut values = ValuesByTable::new();
        values.extend_chunk("b", vec!["(1)".to_string()]);
        values.extend_chunk("a", vec!["(2)".to_string()]);
        values.extend_chunk("b", vec!["(3)".to_string()]);

        assert_eq!(values.tables().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(values.get("b").unwrap(), &["(1)".to_string(), "(3)".to_string()]);
        assert_eq!(values.chunk_count("b"), 2);
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_fallback_chunks_counted_separately() {
        let mut values = ValuesByTable::new();
        values.extend_fallback("t", vec!["(1)".to_string()]);
        values.extend_chunk("t", vec!["(2)".to_string()]);

        assert_eq!(values.tables().collect::<Vec<_>>(), vec!["t"]);
        assert_eq!(values.chunk_count("t"), 1);
        assert_eq!(values.fallback_count("t"), 1);
        assert_eq!(values.get("t").unwrap(), &["(1)".to_string(), "(2)".to_string()]);
    }

    #[test]
    fn test_row_count_ignores_other_comments() {
        let mut values = ValuesByTable::new();
        values.extend_chunk(
            "t",
            vec![
                "(1)".to_string(),
                format!("{}2\tBob", UNCONVERTED_PREFIX),
                "-- note".to_string(),
            ],
        );
        assert_eq!(values.row_count("t"), 2);
    }

    #[test]
    fn test_annotations_between_tuples() {
        let mut parts = Vec::new();
        let lines = vec![
            "(1)".to_string(),
            "-- [unconverted] 2".to_string(),
            "(3)".to_string(),
            "-- [unconverted] 4".to_string(),
        ];
        push_table_values(&mut parts, "t", "a", &lines);
        assert_eq!(
            parts,
            vec![
                "INSERT INTO t (a) VALUES",
                "(1),",
                "-- [unconverted] 2",
                "(3);",
                "-- [unconverted] 4",
            ]
        );
    }

    #[test]
    fn test_only_annotations_emit_no_insert() {
        let mut parts = Vec::new();
        let lines = vec!["-- [unconverted] 1".to_string()];
        push_table_values(&mut parts, "t", "a", &lines);
        assert_eq!(parts, vec!["-- [unconverted] 1"]);
    }
}
