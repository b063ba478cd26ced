//! Fabric adapter for card generation.
//!
//! Uses subprocess mode, calling the `fabric` CLI directly. The prompt is
//! piped to stdin; with a pattern name it runs `fabric -p <pattern>`,
//! without one the prompt is sent as a plain chat message.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tokio::time::timeout;
use tracing::debug;

use super::{Adapter, AdapterOutput};

/// Binaries tried, in order, when no path is configured
const CANDIDATE_BINARIES: [&str; 2] = ["fabric-ai", "fabric"];

/// Fabric adapter using subprocess mode
pub struct FabricAdapter {
    /// Configured path to the fabric binary
    configured: Option<String>,
    /// Binary found on first use when none is configured
    resolved: OnceCell<String>,
}

impl Default for FabricAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FabricAdapter {
    /// Create a Fabric adapter that locates the binary on first use
    ///
    /// Prefers fabric-ai (Homebrew install), falls back to fabric.
    pub fn new() -> Self {
        Self {
            configured: None,
            resolved: OnceCell::new(),
        }
    }

    /// Create a Fabric adapter with a custom binary path
    pub fn with_binary_path(binary_path: impl Into<String>) -> Self {
        Self {
            configured: Some(binary_path.into()),
            resolved: OnceCell::new(),
        }
    }

    /// Configured binary path, if any
    pub fn binary_path(&self) -> Option<&str> {
        self.configured.as_deref()
    }

    /// Binary to spawn, probing the candidates without blocking the runtime
    async fn binary(&self) -> &str {
        if let Some(path) = &self.configured {
            return path;
        }

        self.resolved
            .get_or_init(|| async {
                for candidate in CANDIDATE_BINARIES {
                    let probe = Command::new(candidate)
                        .arg("--help")
                        .stdin(Stdio::null())
                        .stdout(Stdio::null())
                        .stderr(Stdio::null())
                        .kill_on_drop(true)
                        .status()
                        .await;
                    if probe.is_ok() {
                        debug!(binary = candidate, "Resolved fabric binary");
                        return candidate.to_string();
                    }
                }
                CANDIDATE_BINARIES[CANDIDATE_BINARIES.len() - 1].to_string()
            })
            .await
    }

    /// Arguments for a generation call
    fn args(pattern: &str) -> Vec<&str> {
        if pattern.is_empty() {
            Vec::new()
        } else {
            vec!["-p", pattern]
        }
    }

    /// Run fabric, piping `input` to stdin and collecting stdout
    async fn execute_subprocess(
        &self,
        pattern: &str,
        input: &str,
        call_timeout: Duration,
    ) -> Result<String> {
        let label = if pattern.is_empty() { "<prompt>" } else { pattern };
        let binary = self.binary().await;
        debug!(binary, pattern = label, "Spawning fabric");

        let mut child = Command::new(binary)
            .args(Self::args(pattern))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn fabric process for '{}'", label))?;

        // Write input to stdin
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .await
                .context("Failed to write to fabric stdin")?;
            // Drop stdin to signal EOF
        }

        let output = timeout(call_timeout, child.wait_with_output())
            .await
            .with_context(|| format!("Fabric '{}' timed out after {:?}", label, call_timeout))?
            .with_context(|| format!("Failed to wait for fabric process for '{}'", label))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            anyhow::bail!(
                "Fabric '{}' failed with exit code {}: {}",
                label,
                exit_code,
                stderr.trim()
            );
        }

        let stdout = String::from_utf8(output.stdout).context("Fabric output is not valid UTF-8")?;

        Ok(stdout)
    }
}

#[async_trait]
impl Adapter for FabricAdapter {
    fn name(&self) -> &str {
        "fabric"
    }

    async fn execute(&self, action: &str, input: &str, timeout: Duration) -> Result<AdapterOutput> {
        // Action is the pattern name for Fabric
        let content = self.execute_subprocess(action, input, timeout).await?;
        Ok(AdapterOutput::new(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_binary_path() {
        let adapter = FabricAdapter::with_binary_path("/custom/path/fabric");
        assert_eq!(adapter.binary_path(), Some("/custom/path/fabric"));
        assert_eq!(adapter.name(), "fabric");
    }

    #[test]
    fn test_new_does_not_resolve_binary() {
        let adapter = FabricAdapter::new();
        assert_eq!(adapter.binary_path(), None);
        assert!(adapter.resolved.get().is_none());
    }

    #[tokio::test]
    async fn test_configured_binary_skips_probe() {
        let adapter = FabricAdapter::with_binary_path("/custom/path/fabric");
        assert_eq!(adapter.binary().await, "/custom/path/fabric");
        assert!(adapter.resolved.get().is_none());
    }

    #[tokio::test]
    async fn test_resolved_binary_is_a_candidate() {
        let adapter = FabricAdapter::new();
        let binary = adapter.binary().await.to_string();
        assert!(CANDIDATE_BINARIES.contains(&binary.as_str()));
        assert_eq!(adapter.resolved.get(), Some(&binary));
    }

    #[test]
    fn test_args_without_pattern() {
        assert!(FabricAdapter::args("").is_empty());
        assert_eq!(FabricAdapter::args("cut_card"), vec!["-p", "cut_card"]);
    }

    #[tokio::test]
    async fn test_missing_binary_fails_to_spawn() {
        let adapter = FabricAdapter::with_binary_path("/nonexistent/eloquent-fabric");
        let result = adapter
            .execute("", "prompt", Duration::from_secs(1))
            .await;
        assert!(result.is_err());
    }
}
