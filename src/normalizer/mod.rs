//! Extracts tuple rows from free-form rewriter output.
//!
//! Rewriters wrap their answer in markdown fences, repeat the INSERT header
//! they were told to omit, or add commentary. Only lines shaped like a tuple
//! literal survive, in their original order.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^```[\w+-]*$").unwrap());
static RE_LEADING_VALUES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^VALUES\b\s*").unwrap());
static RE_TRAILING_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[,;]\s*$").unwrap());

/// True for a markdown fence line such as "```" or "```sql"
pub fn is_fence_line(trimmed: &str) -> bool {
    RE_FENCE.is_match(trimmed)
}

/// Remove markdown fence lines, keeping everything else untouched
pub fn strip_code_fences(text: &str) -> String {
    text.lines()
        .filter(|line| !is_fence_line(line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reduce a single trimmed line to a bare tuple literal, if it is one
fn extract_tuple(trimmed: &str) -> Option<&str> {
    if trimmed.contains("INSERT INTO") {
        return None;
    }

    let candidate = match RE_LEADING_VALUES.find(trimmed) {
        Some(m) => &trimmed[m.end()..],
        None => trimmed,
    };
    if !candidate.starts_with('(') {
        return None;
    }

    let tuple = match RE_TRAILING_PUNCT.find(candidate) {
        Some(m) => &candidate[..m.start()],
        None => candidate,
    };
    if !tuple.ends_with(')') {
        return None;
    }

    Some(tuple)
}

/// Normalize rewriter output for a data section into tuple literals.
///
/// Each returned string starts with `(`, ends with `)` and carries no trailing
/// comma or semicolon. An empty result means nothing usable was found; the
/// caller decides how to fall back.
pub fn normalize_values_block(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_fence_line(line))
        .filter_map(extract_tuple)
        .map(str::to_string)
        .collect()
}
