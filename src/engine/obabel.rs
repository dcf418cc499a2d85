//! Open Babel adapter for structure-format conversion.
//!
//! The converter is trusted to validate file contents; the pipeline only
//! relays its diagnostics on failure.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::domain::StructureFormat;
use crate::error::PipelineError;

use super::FormatConverter;

/// Open Babel (`obabel`) invoked via its command-line interface
pub struct ObabelConverter {
    binary: PathBuf,
    time_limit: Option<Duration>,
}

impl ObabelConverter {
    /// Create an adapter for the given executable (path or bare command name)
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            time_limit: None,
        }
    }

    /// Bound each conversion by a wall-clock limit; the child is killed on
    /// expiry
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    fn build_args(
        input: &Path,
        from: StructureFormat,
        to: StructureFormat,
        output: &Path,
    ) -> Vec<OsString> {
        vec![
            format!("-i{}", from.extension()).into(),
            input.into(),
            format!("-o{}", to.extension()).into(),
            "-O".into(),
            output.into(),
        ]
    }
}

#[async_trait]
impl FormatConverter for ObabelConverter {
    fn name(&self) -> &str {
        "obabel"
    }

    async fn convert(
        &self,
        input: &Path,
        from: StructureFormat,
        to: StructureFormat,
        output: &Path,
    ) -> Result<(), PipelineError> {
        let args = Self::build_args(input, from, to, output);
        debug!(
            converter = %self.binary.display(),
            %from, %to,
            input = %input.display(),
            "Converting structure format"
        );

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PipelineError::Conversion {
                detail: format!("failed to run '{}': {}", self.binary.display(), e),
            })?;

        let out = match self.time_limit {
            Some(limit) => timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| PipelineError::Timeout {
                    limit_seconds: limit.as_secs(),
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|e| PipelineError::Conversion {
            detail: format!("failed to wait for converter: {e}"),
        })?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(PipelineError::Conversion {
                detail: format!(
                    "converter exited with code {}: {}",
                    out.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            });
        }

        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        let output = Command::new(&self.binary)
            .arg("-V")
            .output()
            .await
            .with_context(|| format!("Failed to run converter '{}'", self.binary.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Converter health check failed: {}", stderr.trim());
        }

        Ok(())
    }
}
