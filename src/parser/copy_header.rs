//! Recognition of PostgreSQL `COPY ... FROM stdin;` header lines.

use once_cell::sync::Lazy;
use regex::Regex;

/// Result of parsing a COPY header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyHeader {
    /// Table reference exactly as written (e.g. `public.users`, `"public"."Users"`)
    pub table: String,
    /// Raw column list between the parentheses, trimmed; empty when omitted
    pub columns: String,
}

/// Parse a COPY header line.
///
/// Accepts `COPY [ONLY] [schema.]table [(col1, col2, ...)] FROM stdin;` with
/// arbitrary whitespace. Identifiers may be double-quoted. Returns `None` for
/// anything else, including `COPY ... TO stdout` and `COPY ... FROM 'file'`.
pub fn parse_copy_header(line: &str) -> Option<CopyHeader> {
    static RE_COPY: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r#"(?i)^\s*COPY\s+(?:ONLY\s+)?((?:"[^"]+"|[\w$]+)(?:\s*\.\s*(?:"[^"]+"|[\w$]+))?)\s*(?:\(([^)]*)\))?\s*FROM\s+stdin\s*;\s*$"#,
        )
        .unwrap()
    });

    let caps = RE_COPY.captures(line)?;
    let table = caps.get(1)?.as_str().to_string();
    let columns = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    Some(CopyHeader { table, columns })
}

/// Cheap pre-check so the regex only runs on candidate lines
pub fn looks_like_copy(trimmed: &str) -> bool {
    trimmed
        .get(..4)
        .is_some_and(|kw| kw.eq_ignore_ascii_case("COPY"))
        && trimmed[4..].starts_with(|c: char| c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_qualified() {
        let h = parse_copy_header("COPY public.users (id, name) FROM stdin;").unwrap();
        assert_eq!(h.table, "public.users");
        assert_eq!(h.columns, "id, name");
    }

    #[test]
    fn test_whitespace_tolerant() {
        let h = parse_copy_header("  COPY   public.users(id,name)   FROM   stdin ;  ").unwrap();
        assert_eq!(h.table, "public.users");
        assert_eq!(h.columns, "id,name");
    }

    #[test]
    fn test_quoted_identifiers_kept_verbatim() {
        let h = parse_copy_header(r#"COPY "public"."Order Items" ("id", "qty") FROM stdin;"#)
            .unwrap();
        assert_eq!(h.table, r#""public"."Order Items""#);
        assert_eq!(h.columns, r#""id", "qty""#);
    }

    #[test]
    fn test_without_column_list() {
        let h = parse_copy_header("COPY users FROM stdin;").unwrap();
        assert_eq!(h.table, "users");
        assert_eq!(h.columns, "");
    }

    #[test]
    fn test_rejects_non_stdin_copy() {
        assert!(parse_copy_header("COPY users TO stdout;").is_none());
        assert!(parse_copy_header("COPY users FROM '/tmp/users.csv';").is_none());
        assert!(parse_copy_header("CREATE TABLE copy_log (id int);").is_none());
    }

    #[test]
    fn test_looks_like_copy() {
        assert!(looks_like_copy("COPY public.t (a) FROM stdin;"));
        assert!(looks_like_copy("copy t from stdin;"));
        assert!(!looks_like_copy("COPYRIGHT"));
        assert!(!looks_like_copy("CO"));
    }
}
