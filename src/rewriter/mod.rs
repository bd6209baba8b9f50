//! Boundary to the service that rewrites a single section.
//!
//! A rewriter receives one [`ProcessingSection`] and returns replacement text,
//! or a [`RewriteError`]. Every failure is handled the same way by the
//! pipeline; the code only feeds logs and counters.

mod http;
mod local;

pub use http::HttpRewriter;
pub use local::LocalRewriter;

use crate::section::ProcessingSection;
use thiserror::Error;

/// Failure classes reported by a rewriter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCode {
    /// The section was rejected as malformed
    InvalidInput,
    /// Network error, rate limiting or a non-success status
    ServiceUnavailable,
    /// The service answered without usable content
    EmptyResponse,
    Other,
}

impl FailureCode {
    /// Map an error code from the rewriting endpoint's JSON error body
    pub fn from_wire(code: &str) -> Self {
        match code {
            "INVALID_SECTION" | "INVALID_INPUT" => FailureCode::InvalidInput,
            "EMPTY_RESPONSE" | "EMPTY_GEMINI_RESPONSE" => FailureCode::EmptyResponse,
            "SERVICE_UNAVAILABLE" | "GEMINI_REQUEST_FAILED" | "RATE_LIMITED" => {
                FailureCode::ServiceUnavailable
            }
            _ => FailureCode::Other,
        }
    }
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCode::InvalidInput => write!(f, "invalid-input"),
            FailureCode::ServiceUnavailable => write!(f, "service-unavailable"),
            FailureCode::EmptyResponse => write!(f, "empty-response"),
            FailureCode::Other => write!(f, "other"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct RewriteError {
    pub code: FailureCode,
    pub message: String,
}

impl RewriteError {
    pub fn new(code: FailureCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn empty_response(section: &ProcessingSection) -> Self {
        Self::new(
            FailureCode::EmptyResponse,
            format!("empty response for section {}", section.display_name()),
        )
    }
}

pub type RewriteResult<T> = Result<T, RewriteError>;

/// Rewrites one section at a time.
///
/// Calls block until the result is known; the pipeline never has more than
/// one call outstanding.
pub trait SectionRewriter {
    fn rewrite(&self, section: &ProcessingSection) -> RewriteResult<String>;

    /// Name shown in logs
    fn name(&self) -> &str;
}

/// Which rewriter implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriterKind {
    /// POST each section to a rewriting endpoint
    #[default]
    Http,
    /// Convert locally without any network access
    Local,
}

impl std::str::FromStr for RewriterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(RewriterKind::Http),
            "local" | "offline" => Ok(RewriterKind::Local),
            _ => Err(format!(
                "Unknown rewriter: {}. Valid options: http, local",
                s
            )),
        }
    }
}

impl std::fmt::Display for RewriterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RewriterKind::Http => write!(f, "http"),
            RewriterKind::Local => write!(f, "local"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_code_from_wire() {
        assert_eq!(FailureCode::from_wire("INVALID_SECTION"), FailureCode::InvalidInput);
        assert_eq!(
            FailureCode::from_wire("EMPTY_GEMINI_RESPONSE"),
            FailureCode::EmptyResponse
        );
        assert_eq!(
            FailureCode::from_wire("GEMINI_REQUEST_FAILED"),
            FailureCode::ServiceUnavailable
        );
        assert_eq!(FailureCode::from_wire("MISSING_GEMINI_API_KEY"), FailureCode::Other);
    }

    #[test]
    fn test_error_display() {
        let err = RewriteError::new(FailureCode::ServiceUnavailable, "status 503");
        assert_eq!(err.to_string(), "service-unavailable: status 503");
    }

    #[test]
    fn test_rewriter_kind_parse() {
        assert_eq!("http".parse::<RewriterKind>().unwrap(), RewriterKind::Http);
        assert_eq!("LOCAL".parse::<RewriterKind>().unwrap(), RewriterKind::Local);
        assert!("gemini".parse::<RewriterKind>().is_err());
    }
}
