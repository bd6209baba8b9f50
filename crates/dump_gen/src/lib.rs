//! Deterministic PostgreSQL dump generator for sql-cleaner tests.
//!
//! Produces `pg_dump`-style text with COPY blocks plus the rows each table
//! is expected to end up with, so tests can check that nothing is lost.
//!
//! # Example
//!
//! ```rust
//! use dump_gen::{DumpConfig, DumpGenerator};
//!
//! let dump = DumpGenerator::new(42, DumpConfig::default()).generate();
//! assert_eq!(dump.total_rows(), dump.tables.iter().map(|t| t.rows.len()).sum::<usize>());
//! ```

pub mod fake;

use fake::FakeValues;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Shape of the generated dump
#[derive(Debug, Clone)]
pub struct DumpConfig {
    /// Number of tables with data
    pub tables: usize,
    pub rows_per_table: usize,
    /// Add comments, psql meta-commands, INSERT lines and blank lines
    pub noise: bool,
    /// Emit each table's rows as two COPY blocks
    pub split_blocks: bool,
    /// Leave the last COPY block without its `\.` terminator
    pub unterminated_last: bool,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            tables: 3,
            rows_per_table: 12,
            noise: true,
            split_blocks: false,
            unterminated_last: false,
        }
    }
}

/// Rows a table should contain after cleaning, in source order
#[derive(Debug, Clone)]
pub struct ExpectedTable {
    pub name: String,
    pub columns: Vec<String>,
    /// Raw COPY rows
    pub rows: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GeneratedDump {
    pub sql: String,
    pub tables: Vec<ExpectedTable>,
    pub copy_blocks: usize,
}

impl GeneratedDump {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows.len()).sum()
    }

    pub fn table(&self, name: &str) -> Option<&ExpectedTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}

#[derive(Clone, Copy)]
enum Shape {
    Users,
    Orders,
    AuditLog,
}

const SHAPES: [Shape; 3] = [Shape::Users, Shape::Orders, Shape::AuditLog];

impl Shape {
    /// Table name; `copy > 0` gives the n-th extra table of this shape
    fn table_name(self, copy: usize) -> String {
        match (self, copy) {
            (Shape::Users, 0) => "public.users".to_string(),
            (Shape::Orders, 0) => "public.orders".to_string(),
            (Shape::AuditLog, 0) => "public.\"Audit Log\"".to_string(),
            (Shape::Users, n) => format!("public.users_{}", n),
            (Shape::Orders, n) => format!("public.orders_{}", n),
            (Shape::AuditLog, n) => format!("public.\"Audit Log {}\"", n),
        }
    }

    fn columns(self) -> &'static [&'static str] {
        match self {
            Shape::Users => &["id", "name", "email", "active"],
            Shape::Orders => &["id", "user_id", "amount", "note", "created_on"],
            Shape::AuditLog => &["id", "\"Actor\"", "message"],
        }
    }

    fn ddl(self, name: &str) -> String {
        let body = match self {
            Shape::Users => {
                "    id integer NOT NULL,\n    name text,\n    email text,\n    active boolean"
            }
            Shape::Orders => {
                "    id integer NOT NULL,\n    user_id integer,\n    amount numeric(10,2),\n    note text,\n    created_on date"
            }
            Shape::AuditLog => "    id bigint NOT NULL,\n    \"Actor\" text,\n    message text",
        };
        format!("CREATE TABLE {} (\n{}\n);", name, body)
    }
}

pub struct DumpGenerator {
    rng: ChaCha8Rng,
    config: DumpConfig,
}

impl DumpGenerator {
    pub fn new(seed: u64, config: DumpConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
        }
    }

    pub fn generate(&mut self) -> GeneratedDump {
        let tables: Vec<ExpectedTable> = (0..self.config.tables)
            .map(|i| {
                let shape = SHAPES[i % SHAPES.len()];
                let name = shape.table_name(i / SHAPES.len());
                let rows = (0..self.config.rows_per_table)
                    .map(|r| self.row(shape, r + 1))
                    .collect();
                ExpectedTable {
                    name,
                    columns: shape.columns().iter().map(|c| c.to_string()).collect(),
                    rows,
                }
            })
            .collect();

        let mut out: Vec<String> = vec![
            "--".to_string(),
            "-- PostgreSQL database dump".to_string(),
            "--".to_string(),
            String::new(),
            "SET statement_timeout = 0;".to_string(),
            "SET client_encoding = 'UTF8';".to_string(),
            "SELECT pg_catalog.set_config('search_path', '', false);".to_string(),
            String::new(),
        ];
        if self.config.noise {
            out.push("\\connect app".to_string());
            out.push(String::new());
        }

        for (i, table) in tables.iter().enumerate() {
            out.push(format!("-- Name: {}; Type: TABLE", table.name));
            out.push(SHAPES[i % SHAPES.len()].ddl(&table.name));
            out.push(String::new());
        }

        let mut blocks: Vec<(&ExpectedTable, &[String])> = Vec::new();
        for table in &tables {
            if table.rows.is_empty() {
                continue;
            }
            if self.config.split_blocks && table.rows.len() > 1 {
                let (a, b) = table.rows.split_at(table.rows.len() / 2);
                blocks.push((table, a));
                blocks.push((table, b));
            } else {
                blocks.push((table, table.rows.as_slice()));
            }
        }

        let block_count = blocks.len();
        for (n, (table, rows)) in blocks.iter().enumerate() {
            let last = n + 1 == block_count;
            out.push(format!("-- Data for Name: {}; Type: TABLE DATA", table.name));
            out.push(format!(
                "COPY {} ({}) FROM stdin;",
                table.name,
                table.columns.join(", ")
            ));
            for (r, row) in rows.iter().enumerate() {
                out.push(row.clone());
                if self.config.noise && r % 4 == 1 {
                    if self.rng.gen_bool(0.5) {
                        out.push(String::new());
                    } else {
                        out.push("-- stray comment inside data".to_string());
                    }
                }
            }
            if last && self.config.unterminated_last {
                break;
            }
            out.push("\\.".to_string());
            out.push(String::new());
            if self.config.noise && n % 2 == 0 {
                out.push(format!("INSERT INTO {} VALUES (0);", table.name));
            }
        }

        if !self.config.unterminated_last {
            out.push(String::new());
            out.push(
                "ALTER TABLE ONLY public.users ADD CONSTRAINT users_pkey PRIMARY KEY (id);"
                    .to_string(),
            );
            out.push(String::new());
            out.push("-- PostgreSQL database dump complete".to_string());
            out.push(String::new());
        }

        GeneratedDump {
            sql: out.join("\n"),
            tables,
            copy_blocks: block_count,
        }
    }

    fn row(&mut self, shape: Shape, id: usize) -> String {
        let mut fake = FakeValues::new(&mut self.rng);
        let fields: Vec<String> = match shape {
            Shape::Users => {
                let name = fake.full_name();
                let email = fake.email(id);
                let email = fake.nullable(email, 0.15);
                vec![id.to_string(), name, email, fake.flag().to_string()]
            }
            Shape::Orders => {
                let user = (id % 7 + 1).to_string();
                let amount = fake.amount();
                let note = fake.note();
                let note = fake.nullable(note, 0.2);
                vec![id.to_string(), user, amount, note, fake.date()]
            }
            Shape::AuditLog => {
                let actor = fake.full_name();
                vec![(id * 1000).to_string(), actor, fake.note()]
            }
        };
        fields.join("\t")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = DumpGenerator::new(7, DumpConfig::default()).generate();
        let b = DumpGenerator::new(7, DumpConfig::default()).generate();
        assert_eq!(a.sql, b.sql);
    }

    #[test]
    fn test_row_counts() {
        let config = DumpConfig {
            tables: 4,
            rows_per_table: 9,
            split_blocks: true,
            ..Default::default()
        };
        let dump = DumpGenerator::new(1, config).generate();
        assert_eq!(dump.tables.len(), 4);
        assert_eq!(dump.total_rows(), 36);
        assert_eq!(dump.copy_blocks, 8);
        assert!(dump.table("public.users_1").is_some());
    }

    #[test]
    fn test_unterminated_last() {
        let config = DumpConfig {
            unterminated_last: true,
            ..Default::default()
        };
        let dump = DumpGenerator::new(3, config).generate();
        assert!(!dump.sql.trim_end().ends_with("\\."));
    }
}
