//! Safety limits for generation calls.
//!
//! Guards what is sent to and accepted from the text generator:
//! - Input/output sizes
//! - Generation timeout
//! - Denylist patterns (to avoid sending secrets as article text)

use std::path::Path;
use std::time::Duration;

use glob::Pattern;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Safety limits for a card cutting call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyLimits {
    /// Maximum prompt size in bytes (default: 1MB)
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,

    /// Maximum generated output size in bytes (default: 1MB)
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: u64,

    /// Generation timeout in seconds (default: 300 = 5 min)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Glob patterns to reject (article files matching these won't be sent)
    #[serde(default = "default_denylist")]
    pub denylist_patterns: Vec<String>,
}

fn default_max_input_bytes() -> u64 {
    1024 * 1024
} // 1MB
fn default_max_output_bytes() -> u64 {
    1024 * 1024
} // 1MB
fn default_timeout() -> u64 {
    300
} // 5 min

fn default_denylist() -> Vec<String> {
    vec![
        "**/.env*".to_string(),
        "**/secrets*".to_string(),
        "**/*credential*".to_string(),
        "**/*.pem".to_string(),
        "**/*.key".to_string(),
    ]
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
            max_output_bytes: default_max_output_bytes(),
            timeout_seconds: default_timeout(),
            denylist_patterns: default_denylist(),
        }
    }
}

impl SafetyLimits {
    /// Generation timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Check if an input path matches any denylist pattern
    pub fn is_denylisted(&self, path: &str) -> bool {
        for pattern_str in &self.denylist_patterns {
            if let Ok(pattern) = Pattern::new(pattern_str) {
                if pattern.matches(path) {
                    return true;
                }
            }
        }
        false
    }

    /// Validate an article source path against the denylist
    pub fn validate_path(&self, path: &Path) -> Result<(), SafetyViolation> {
        let path_str = path.to_string_lossy();
        if self.is_denylisted(&path_str) {
            return Err(SafetyViolation::DenylistMatch {
                path: path_str.to_string(),
            });
        }
        Ok(())
    }

    /// Validate a prompt against the input size limit
    pub fn validate_input(&self, input: &str) -> Result<(), SafetyViolation> {
        let size = input.len() as u64;
        if size > self.max_input_bytes {
            return Err(SafetyViolation::MaxInputBytes {
                actual: size,
                limit: self.max_input_bytes,
            });
        }
        Ok(())
    }

    /// Validate generated output against the output size limit
    pub fn validate_output(&self, output: &str) -> Result<(), SafetyViolation> {
        let size = output.len() as u64;
        if size > self.max_output_bytes {
            return Err(SafetyViolation::MaxOutputBytes {
                actual: size,
                limit: self.max_output_bytes,
            });
        }
        Ok(())
    }
}

/// Safety violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SafetyViolation {
    #[error("Maximum input bytes exceeded: {actual} > {limit}")]
    MaxInputBytes { actual: u64, limit: u64 },

    #[error("Maximum output bytes exceeded: {actual} > {limit}")]
    MaxOutputBytes { actual: u64, limit: u64 },

    #[error("Path matches denylist pattern: {path}")]
    DenylistMatch { path: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = SafetyLimits::default();
        assert_eq!(limits.max_input_bytes, 1024 * 1024);
        assert_eq!(limits.timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_denylist_matching() {
        let limits = SafetyLimits::default();

        assert!(limits.is_denylisted(".env"));
        assert!(limits.is_denylisted("config/secrets.json"));
        assert!(limits.is_denylisted("certs/server.pem"));

        assert!(!limits.is_denylisted("article.txt"));
        assert!(!limits.is_denylisted("notes/brexit.md"));
    }

    #[test]
    fn test_output_validation() {
        let limits = SafetyLimits {
            max_output_bytes: 10,
            ..Default::default()
        };

        assert!(limits.validate_output("short").is_ok());
        assert_eq!(
            limits.validate_output("much too long"),
            Err(SafetyViolation::MaxOutputBytes {
                actual: 13,
                limit: 10
            })
        );
    }
}
