//! Local conversion of PostgreSQL COPY text-format rows into tuple literals.
//!
//! Handles:
//! - Tab-separated value splitting
//! - NULL handling (\N → NULL)
//! - Escape sequence decoding (\t, \n, \\, octal, hex)
//! - Quote doubling, with E'' strings for values carrying control characters
//!
//! Every non-NULL value is emitted as a quoted literal; PostgreSQL casts it to
//! the column type on insert.

/// A decoded value from a COPY row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyValue {
    Null,
    Text(String),
}

/// Split a raw row on tabs and decode each field
pub fn parse_copy_row(row: &str) -> Vec<CopyValue> {
    row.split('\t').map(parse_value).collect()
}

fn parse_value(field: &str) -> CopyValue {
    if field == "\\N" {
        return CopyValue::Null;
    }
    CopyValue::Text(decode_escapes(field.as_bytes()))
}

/// Text columns cannot hold NUL, so a decoded `\000` or `\x00` is dropped
fn push_decoded(out: &mut Vec<u8>, byte: u8) {
    if byte != 0 {
        out.push(byte);
    }
}

/// Decode PostgreSQL COPY escape sequences
fn decode_escapes(value: &[u8]) -> String {
    let mut out: Vec<u8> = Vec::with_capacity(value.len());
    let mut i = 0;

    while i < value.len() {
        if value[i] != b'\\' || i + 1 >= value.len() {
            out.push(value[i]);
            i += 1;
            continue;
        }

        let next = value[i + 1];
        let simple = match next {
            b'n' => Some(b'\n'),
            b'r' => Some(b'\r'),
            b't' => Some(b'\t'),
            b'b' => Some(0x08),
            b'f' => Some(0x0C),
            b'v' => Some(0x0B),
            b'\\' => Some(b'\\'),
            _ => None,
        };
        if let Some(b) = simple {
            out.push(b);
            i += 2;
            continue;
        }

        if (b'0'..=b'7').contains(&next) {
            let mut val: u32 = 0;
            let mut consumed = 0;
            while consumed < 3 {
                match value.get(i + 1 + consumed) {
                    Some(d @ b'0'..=b'7') => {
                        val = val * 8 + u32::from(d - b'0');
                        consumed += 1;
                    }
                    _ => break,
                }
            }
            push_decoded(&mut out, (val & 0xFF) as u8);
            i += 1 + consumed;
            continue;
        }

        if next == b'x' {
            let mut val: u32 = 0;
            let mut consumed = 0;
            while consumed < 2 {
                match value.get(i + 2 + consumed).and_then(|d| (*d as char).to_digit(16)) {
                    Some(d) => {
                        val = val * 16 + d;
                        consumed += 1;
                    }
                    None => break,
                }
            }
            if consumed > 0 {
                push_decoded(&mut out, val as u8);
                i += 2 + consumed;
                continue;
            }
        }

        // Any other escaped character stands for itself
        out.push(next);
        i += 2;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn needs_escape_string(s: &str) -> bool {
    s.chars().any(|c| c.is_control() && c != '\t')
}

/// Format a value as a PostgreSQL literal that fits on a single line
pub fn format_value(value: &CopyValue) -> String {
    match value {
        CopyValue::Null => "NULL".to_string(),
        CopyValue::Text(s) if needs_escape_string(s) => {
            let mut escaped = String::with_capacity(s.len() + 8);
            for c in s.chars() {
                match c {
                    '\\' => escaped.push_str("\\\\"),
                    '\'' => escaped.push_str("''"),
                    '\n' => escaped.push_str("\\n"),
                    '\r' => escaped.push_str("\\r"),
                    '\t' => escaped.push_str("\\t"),
                    '\0' => {}
                    c if c.is_control() => {
                        escaped.push_str(&format!("\\u{:04X}", c as u32));
                    }
                    c => escaped.push(c),
                }
            }
            format!("E'{}'", escaped)
        }
        CopyValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
    }
}

/// Convert one raw COPY row into a tuple literal such as `('1', 'Alice', NULL)`
pub fn copy_row_to_tuple(row: &str) -> String {
    let values: Vec<String> = parse_copy_row(row).iter().map(format_value).collect();
    format!("({})", values.join(", "))
}

pub fn copy_rows_to_tuples<'a, I>(rows: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    rows.into_iter().map(copy_row_to_tuple).collect()
}
