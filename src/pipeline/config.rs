//! Configuration for a cleaning run.
//!
//! Loaded from YAML (all keys optional) and then overridden by CLI flags.
//!
//! ```yaml
//! chunk_size: 5
//! fallback: synthesize
//! failure_policy:
//!   min_attempts: 10
//!   max_failure_ratio: 0.5
//! request_delay_ms: 3000
//! rewriter: http
//! endpoint: http://localhost:3000/api/clean-sql-section
//! ```

use crate::chunker::DEFAULT_CHUNK_SIZE;
use crate::input::MAX_FILE_SIZE_BYTES;
use crate::rewriter::RewriterKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How rows of a data section that could not be rewritten are represented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// Convert the raw COPY rows into tuple literals locally
    #[default]
    Synthesize,
    /// Keep the raw rows as `-- [unconverted]` comment lines
    Raw,
}

impl std::str::FromStr for FallbackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "synthesize" | "synth" => Ok(FallbackMode::Synthesize),
            "raw" => Ok(FallbackMode::Raw),
            _ => Err(format!(
                "Unknown fallback mode: {}. Valid options: synthesize, raw",
                s
            )),
        }
    }
}

impl std::fmt::Display for FallbackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackMode::Synthesize => write!(f, "synthesize"),
            FallbackMode::Raw => write!(f, "raw"),
        }
    }
}

/// When to give up on a run because too many sections fail
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailurePolicy {
    /// Failures tolerated before the ratio is considered
    pub min_attempts: usize,
    /// Abort once failed/attempted exceeds this ratio
    pub max_failure_ratio: f64,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self {
            min_attempts: 10,
            max_failure_ratio: 0.5,
        }
    }
}

impl FailurePolicy {
    pub fn should_abort(&self, failed: usize, attempted: usize) -> bool {
        attempted > 0
            && failed > self.min_attempts
            && (failed as f64 / attempted as f64) > self.max_failure_ratio
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Rows per data section
    pub chunk_size: usize,
    pub fallback: FallbackMode,
    pub failure_policy: FailurePolicy,
    /// Pause after each successfully rewritten section
    pub request_delay_ms: u64,
    pub max_file_size_bytes: u64,
    pub rewriter: RewriterKind,
    /// Rewriting endpoint, required for the http rewriter
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            fallback: FallbackMode::default(),
            failure_policy: FailurePolicy::default(),
            request_delay_ms: 0,
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
            rewriter: RewriterKind::default(),
            endpoint: None,
            timeout_secs: 120,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chunk_size == 0 {
            anyhow::bail!("chunk_size must be at least 1");
        }
        let ratio = self.failure_policy.max_failure_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            anyhow::bail!("max_failure_ratio must be between 0 and 1, got {}", ratio);
        }
        if self.rewriter == RewriterKind::Http && self.endpoint.is_none() {
            anyhow::bail!("an endpoint is required for the http rewriter (use --endpoint or --rewriter local)");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.chunk_size, 5);
        assert_eq!(config.fallback, FallbackMode::Synthesize);
        assert_eq!(config.failure_policy.min_attempts, 10);
        assert_eq!(config.max_file_size_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
chunk_size: 20
fallback: raw
failure_policy:
  max_failure_ratio: 0.25
rewriter: local
"#;
        let config: PipelineConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.chunk_size, 20);
        assert_eq!(config.fallback, FallbackMode::Raw);
        assert_eq!(config.failure_policy.min_attempts, 10);
        assert_eq!(config.failure_policy.max_failure_ratio, 0.25);
        assert_eq!(config.rewriter, RewriterKind::Local);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_http_without_endpoint() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let config = PipelineConfig {
            chunk_size: 0,
            rewriter: RewriterKind::Local,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_failure_policy() {
        let policy = FailurePolicy::default();
        assert!(!policy.should_abort(10, 10));
        assert!(policy.should_abort(11, 11));
        assert!(!policy.should_abort(11, 30));
        assert!(policy.should_abort(11, 21));
    }

    #[test]
    fn test_fallback_mode_parse() {
        assert_eq!("raw".parse::<FallbackMode>().unwrap(), FallbackMode::Raw);
        assert_eq!(
            "Synthesize".parse::<FallbackMode>().unwrap(),
            FallbackMode::Synthesize
        );
        assert!("drop".parse::<FallbackMode>().is_err());
    }
}
