//! HTTP client for a section-rewriting endpoint.
//!
//! Request: `POST <endpoint>` with `{"section": <ProcessingSection>}`.
//! Response: `{"content": "..."}` on 2xx, `{"error": {"code", "message"}}`
//! otherwise.

use super::{FailureCode, RewriteError, RewriteResult, SectionRewriter};
use crate::normalizer::strip_code_fences;
use crate::section::ProcessingSection;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct RewriteRequest<'a> {
    section: &'a ProcessingSection,
}

#[derive(Debug, Deserialize)]
struct RewriteResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Blocking client for the rewriting endpoint
#[derive(Debug, Clone)]
pub struct HttpRewriter {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpRewriter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

impl SectionRewriter for HttpRewriter {
    fn rewrite(&self, section: &ProcessingSection) -> RewriteResult<String> {
        debug!(endpoint = %self.endpoint, section = %section.display_name(), "sending section");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&RewriteRequest { section })
            .send()
            .map_err(|e| RewriteError::new(FailureCode::ServiceUnavailable, e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| RewriteError::new(FailureCode::ServiceUnavailable, e.to_string()))?;

        interpret_response(status, &body, section)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Turn a status code and body into rewritten text or a classified failure
fn interpret_response(
    status: u16,
    body: &str,
    section: &ProcessingSection,
) -> RewriteResult<String> {
    let parsed: Option<RewriteResponse> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        return Err(match parsed.and_then(|r| r.error) {
            Some(err) => {
                let code = match FailureCode::from_wire(&err.code) {
                    FailureCode::Other if status == 429 || status >= 500 => {
                        FailureCode::ServiceUnavailable
                    }
                    code => code,
                };
                RewriteError::new(code, format!("status {}: {}", status, err.message))
            }
            None => RewriteError::new(
                FailureCode::ServiceUnavailable,
                format!("status {} without error body", status),
            ),
        });
    }

    let content = parsed
        .and_then(|r| r.content)
        .map(|c| strip_code_fences(&c).trim().to_string())
        .unwrap_or_default();

    if content.is_empty() {
        return Err(RewriteError::empty_response(section));
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::{StructureSection, STRUCTURE_PRIORITY};

    fn section() -> ProcessingSection {
        ProcessingSection::Structure(StructureSection {
            content: "CREATE TABLE t (a int);".to_string(),
            priority: STRUCTURE_PRIORITY,
        })
    }

    #[test]
    fn test_success_strips_fences() {
        let body = r#"{"content": "```sql\nCREATE TABLE t (a integer);\n```"}"#;
        let out = interpret_response(200, body, &section()).unwrap();
        assert_eq!(out, "CREATE TABLE t (a integer);");
    }

    #[test]
    fn test_blank_content_is_empty_response() {
        let err = interpret_response(200, r#"{"content": "  "}"#, &section()).unwrap_err();
        assert_eq!(err.code, FailureCode::EmptyResponse);

        let err = interpret_response(200, "{}", &section()).unwrap_err();
        assert_eq!(err.code, FailureCode::EmptyResponse);
    }

    #[test]
    fn test_error_body_code_mapping() {
        let body = r#"{"error": {"code": "INVALID_SECTION", "message": "Invalid processing section payload."}}"#;
        let err = interpret_response(400, body, &section()).unwrap_err();
        assert_eq!(err.code, FailureCode::InvalidInput);
        assert!(err.message.contains("status 400"));
    }

    #[test]
    fn test_unknown_code_on_server_error_is_unavailable() {
        let body = r#"{"error": {"code": "INTERNAL_SERVER_ERROR", "message": "boom"}}"#;
        let err = interpret_response(500, body, &section()).unwrap_err();
        assert_eq!(err.code, FailureCode::ServiceUnavailable);
    }

    #[test]
    fn test_non_json_failure() {
        let err = interpret_response(502, "<html>Bad Gateway</html>", &section()).unwrap_err();
        assert_eq!(err.code, FailureCode::ServiceUnavailable);
    }

    #[test]
    fn test_request_serialization() {
        let s = section();
        let json = serde_json::to_value(RewriteRequest { section: &s }).unwrap();
        assert_eq!(json["section"]["type"], "structure");
    }
}
