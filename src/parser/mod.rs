//! Line-oriented scanner for PostgreSQL dumps.
//!
//! Splits a dump into structure lines (DDL, SET statements, comments) and
//! per-table [`DataBlock`]s collected from `COPY ... FROM stdin;` blocks.
//! Rows are kept as opaque tab-delimited text; nothing is decoded here.

mod copy_header;

pub use copy_header::{looks_like_copy, parse_copy_header, CopyHeader};

use serde::Serialize;
use tracing::{debug, warn};

/// Terminator line of a COPY data block
pub const COPY_TERMINATOR: &str = "\\.";

/// Rows collected from one COPY statement, in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataBlock {
    pub table_name: String,
    /// Raw comma-joined column list from the COPY header
    pub columns: String,
    pub data: Vec<String>,
}

impl DataBlock {
    pub fn new(table_name: impl Into<String>, columns: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: columns.into(),
            data: Vec::new(),
        }
    }

    fn from_header(header: CopyHeader) -> Self {
        Self::new(header.table, header.columns)
    }
}

/// Output of [`parse_dump`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedDump {
    pub structure_lines: Vec<String>,
    pub data_blocks: Vec<DataBlock>,
}

impl ParsedDump {
    /// Structure lines joined back into text, trimmed. Empty when there is none.
    pub fn structure_text(&self) -> String {
        self.structure_lines.join("\n").trim().to_string()
    }

    pub fn total_rows(&self) -> usize {
        self.data_blocks.iter().map(|b| b.data.len()).sum()
    }
}

/// Scanner mode
#[derive(Debug)]
enum ScanState {
    Scanning,
    InCopyBlock(DataBlock),
}

/// Incremental dump scanner.
///
/// Feed lines in order with [`DumpParser::feed_line`], then call
/// [`DumpParser::finish`] to flush an unterminated block.
#[derive(Debug)]
pub struct DumpParser {
    state: ScanState,
    structure_lines: Vec<String>,
    data_blocks: Vec<DataBlock>,
    dropped_lines: usize,
}

impl Default for DumpParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DumpParser {
    pub fn new() -> Self {
        Self {
            state: ScanState::Scanning,
            structure_lines: Vec::new(),
            data_blocks: Vec::new(),
            dropped_lines: 0,
        }
    }

    /// True while rows are being collected for a COPY block
    pub fn in_copy_block(&self) -> bool {
        matches!(self.state, ScanState::InCopyBlock(_))
    }

    /// Number of psql meta-commands and INSERT lines discarded so far
    pub fn dropped_lines(&self) -> usize {
        self.dropped_lines
    }

    pub fn feed_line(&mut self, line: &str) {
        let trimmed = line.trim();

        if looks_like_copy(trimmed) {
            if let Some(header) = parse_copy_header(trimmed) {
                if let ScanState::InCopyBlock(open) = &self.state {
                    warn!(
                        table = %open.table_name,
                        "COPY block not terminated before next COPY header"
                    );
                    self.close_block();
                }
                debug!(table = %header.table, "entering COPY block");
                self.state = ScanState::InCopyBlock(DataBlock::from_header(header));
                return;
            }
        }

        match &mut self.state {
            ScanState::InCopyBlock(block) => {
                if trimmed == COPY_TERMINATOR {
                    self.close_block();
                } else if !trimmed.is_empty() && !trimmed.starts_with("--") {
                    block.data.push(line.to_string());
                }
            }
            ScanState::Scanning => {
                if trimmed.starts_with('\\') || trimmed.starts_with("INSERT INTO") {
                    self.dropped_lines += 1;
                } else {
                    self.structure_lines.push(line.to_string());
                }
            }
        }
    }

    /// Leave the active block, keeping it only if it collected rows
    fn close_block(&mut self) {
        if let ScanState::InCopyBlock(block) =
            std::mem::replace(&mut self.state, ScanState::Scanning)
        {
            if block.data.is_empty() {
                debug!(table = %block.table_name, "discarding empty COPY block");
            } else {
                self.data_blocks.push(block);
            }
        }
    }

    pub fn finish(mut self) -> ParsedDump {
        if let ScanState::InCopyBlock(block) = &self.state {
            warn!(
                table = %block.table_name,
                rows = block.data.len(),
                "input ended inside a COPY block; keeping collected rows"
            );
            self.close_block();
        }

        ParsedDump {
            structure_lines: self.structure_lines,
            data_blocks: self.data_blocks,
        }
    }
}

/// Parse a whole dump held in memory.
///
/// Lines are split on `\n`; a trailing `\r` is removed so CRLF dumps behave
/// like LF dumps.
pub fn parse_dump(source: &str) -> ParsedDump {
    let mut parser = DumpParser::new();
    for line in source.split('\n') {
        parser.feed_line(line.strip_suffix('\r').unwrap_or(line));
    }
    let dropped = parser.dropped_lines();
    let parsed = parser.finish();

    debug!(
        structure_lines = parsed.structure_lines.len(),
        tables = parsed.data_blocks.len(),
        rows = parsed.total_rows(),
        dropped,
        "parsed dump"
    );

    parsed
}
