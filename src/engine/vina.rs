//! AutoDock Vina adapter.
//!
//! Builds the engine command line deterministically from a `JobConfig` and
//! runs it as a child process, capturing both output streams in full.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::domain::{ExecutionResult, JobConfig, StructureFormat};
use crate::error::PipelineError;

use super::DockingEngine;

/// AutoDock Vina invoked via its command-line interface
pub struct VinaEngine {
    binary: PathBuf,
}

impl VinaEngine {
    /// Create an adapter for the given executable (path or bare command name)
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Wire the adapter from a job's configured engine path
    pub fn from_config(config: &JobConfig) -> Self {
        Self::new(config.engine_path.clone())
    }

    /// Build the full argument list.
    ///
    /// Every configured parameter is always emitted as an explicit
    /// flag/value pair; nothing is left to engine defaults.
    pub fn build_args(
        config: &JobConfig,
        receptor: &Path,
        ligand: &Path,
        output: &Path,
        log: Option<&Path>,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--receptor".into(),
            receptor.into(),
            "--ligand".into(),
            ligand.into(),
            "--center_x".into(),
            config.grid.center_x.to_string().into(),
            "--center_y".into(),
            config.grid.center_y.to_string().into(),
            "--center_z".into(),
            config.grid.center_z.to_string().into(),
            "--size_x".into(),
            config.grid.size_x.to_string().into(),
            "--size_y".into(),
            config.grid.size_y.to_string().into(),
            "--size_z".into(),
            config.grid.size_z.to_string().into(),
            "--exhaustiveness".into(),
            config.exhaustiveness.to_string().into(),
            "--num_modes".into(),
            config.num_modes.to_string().into(),
            "--out".into(),
            output.into(),
        ];

        if let Some(log) = log {
            args.push("--log".into());
            args.push(log.into());
        }

        args
    }

    fn render_command(&self, args: &[OsString]) -> String {
        std::iter::once(self.binary.as_os_str().to_string_lossy())
            .chain(args.iter().map(|a| a.to_string_lossy()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl DockingEngine for VinaEngine {
    fn name(&self) -> &str {
        "vina"
    }

    fn required_format(&self) -> StructureFormat {
        StructureFormat::Pdbqt
    }

    async fn invoke(
        &self,
        config: &JobConfig,
        receptor: &Path,
        ligand: &Path,
        output: &Path,
        log: Option<&Path>,
    ) -> Result<ExecutionResult, PipelineError> {
        let args = Self::build_args(config, receptor, ligand, output, log);
        info!(command = %self.render_command(&args), "Invoking docking engine");

        let started = Instant::now();

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PipelineError::io("spawning docking engine", e))?;

        // Wait for the child, bounded by the configured timeout if any.
        // On expiry the dropped child is killed (kill_on_drop).
        let out = match config.timeout_seconds {
            Some(limit) => timeout(Duration::from_secs(limit), child.wait_with_output())
                .await
                .map_err(|_| PipelineError::Timeout {
                    limit_seconds: limit,
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|e| PipelineError::io("waiting for docking engine", e))?;

        let duration_ms = started.elapsed().as_millis() as u64;
        let exit_code = out.status.code().unwrap_or(-1);
        debug!(exit_code, duration_ms, "Docking engine exited");

        Ok(ExecutionResult {
            success: out.status.success(),
            exit_code,
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            duration_ms,
        })
    }

    async fn health_check(&self) -> Result<()> {
        let output = Command::new(&self.binary)
            .arg("--help")
            .output()
            .await
            .with_context(|| {
                format!("Failed to run docking engine '{}'", self.binary.display())
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Docking engine health check failed: {}", stderr.trim());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StructureRef;

    fn sample_config() -> JobConfig {
        let mut config = JobConfig::new(
            StructureRef::from_filename("r.pdbqt"),
            StructureRef::from_filename("l.pdbqt"),
        );
        config.grid.center_x = 1.5;
        config.grid.center_y = -2.0;
        config.grid.center_z = 0.0;
        config.exhaustiveness = 16;
        config.num_modes = 5;
        config
    }

    #[test]
    fn test_every_parameter_emitted() {
        let config = sample_config();
        let args = VinaEngine::build_args(
            &config,
            Path::new("/tmp/r.pdbqt"),
            Path::new("/tmp/l.pdbqt"),
            Path::new("/tmp/out.pdbqt"),
            None,
        );

        let rendered: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        for flag in [
            "--receptor",
            "--ligand",
            "--center_x",
            "--center_y",
            "--center_z",
            "--size_x",
            "--size_y",
            "--size_z",
            "--exhaustiveness",
            "--num_modes",
            "--out",
        ] {
            assert!(rendered.contains(&flag.to_string()), "missing {flag}");
        }

        // Flag/value pairing is positional and deterministic
        let pos = rendered.iter().position(|a| a == "--exhaustiveness").unwrap();
        assert_eq!(rendered[pos + 1], "16");
        let pos = rendered.iter().position(|a| a == "--center_y").unwrap();
        assert_eq!(rendered[pos + 1], "-2");
        assert!(!rendered.contains(&"--log".to_string()));
    }

    #[test]
    fn test_log_flag_emitted_when_requested() {
        let config = sample_config();
        let args = VinaEngine::build_args(
            &config,
            Path::new("r"),
            Path::new("l"),
            Path::new("o"),
            Some(Path::new("/tmp/run.log")),
        );
        let rendered: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        let pos = rendered.iter().position(|a| a == "--log").unwrap();
        assert_eq!(rendered[pos + 1], "/tmp/run.log");
    }

    #[test]
    fn test_identical_configs_build_identical_args() {
        let config = sample_config();
        let a = VinaEngine::build_args(&config, Path::new("r"), Path::new("l"), Path::new("o"), None);
        let b = VinaEngine::build_args(&config, Path::new("r"), Path::new("l"), Path::new("o"), None);
        assert_eq!(a, b);
    }
}
