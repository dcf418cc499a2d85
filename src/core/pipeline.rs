//! Docking job orchestration.
//!
//! One job flows through `Created → Staged → Normalized → Invoked → Parsed
//! → Released`. Failures between staging and invocation short-circuit
//! straight to `Released`; cleanup runs on every path, exactly once.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{JobConfig, JobState, PipelineResult, StructureFormat};
use crate::engine::{DockingEngine, FormatConverter, ObabelConverter, VinaEngine};
use crate::error::PipelineError;

use super::artifacts::{ArtifactSet, ArtifactStore, InputArtifact, InputRole};
use super::parser::parse_poses;

/// Composes staging, normalization, invocation, parsing and cleanup into
/// one docking job.
///
/// The engine and converter are injected, so tests can run the whole
/// pipeline against fakes. Jobs share nothing but the artifact namespace;
/// any number may run concurrently on one pipeline value.
pub struct DockingPipeline<E, C> {
    engine: E,
    converter: C,
    store: ArtifactStore,
}

impl DockingPipeline<VinaEngine, ObabelConverter> {
    /// Wire the default engine and converter from a job's configured
    /// executable paths, with artifacts under the system temp directory
    pub fn from_config(config: &JobConfig) -> Self {
        let converter = ObabelConverter::new(config.converter_path.clone());
        let converter = match config.timeout_seconds {
            Some(secs) => converter.with_time_limit(Duration::from_secs(secs)),
            None => converter,
        };

        Self::new(
            VinaEngine::from_config(config),
            converter,
            ArtifactStore::in_temp(),
        )
    }
}

impl<E: DockingEngine, C: FormatConverter> DockingPipeline<E, C> {
    /// Create a pipeline with explicit collaborators
    pub fn new(engine: E, converter: C, store: ArtifactStore) -> Self {
        Self {
            engine,
            converter,
            store,
        }
    }

    /// Run one docking job from raw input buffers to a `PipelineResult`.
    ///
    /// The config is validated before anything touches the filesystem.
    /// Whatever happens afterwards, every staged artifact is released
    /// before this returns; deletion failures are logged and surfaced as
    /// warnings on the result, never as job failure.
    #[instrument(skip_all, fields(engine = %self.engine.name()))]
    pub async fn run(
        &self,
        config: &JobConfig,
        receptor: &[u8],
        ligand: &[u8],
    ) -> Result<PipelineResult, PipelineError> {
        config.validate()?;

        let job_id = Uuid::new_v4();
        info!(%job_id, "Starting docking job");

        let mut set = ArtifactSet::new();
        let outcome = self.execute(config, job_id, &mut set, receptor, ligand).await;

        let cleanup_failures = set.release();
        for failure in &cleanup_failures {
            warn!(%job_id, %failure, "Artifact cleanup failed");
        }

        match outcome {
            Ok(mut result) => {
                result.state = JobState::Released;
                result.cleanup_failures = cleanup_failures;
                info!(%job_id, poses = result.poses.len(), "Docking job completed");
                Ok(result)
            }
            Err(e) => {
                error!(%job_id, error = %e, "Docking job failed");
                Err(e)
            }
        }
    }

    /// The happy path from `Created` to `Parsed`; the caller owns release
    async fn execute(
        &self,
        config: &JobConfig,
        job_id: Uuid,
        set: &mut ArtifactSet,
        receptor: &[u8],
        ligand: &[u8],
    ) -> Result<PipelineResult, PipelineError> {
        let mut state = JobState::Created;
        debug!(%job_id, ?state, "Job created");

        let receptor = self
            .store
            .stage(set, receptor, InputRole::Receptor, config.receptor.format)
            .await?;
        let ligand = self
            .store
            .stage(set, ligand, InputRole::Ligand, config.ligand.format)
            .await?;
        state = JobState::Staged;
        debug!(%job_id, ?state, "Inputs staged");

        let target = self.engine.required_format();
        let receptor_path = self.normalize(set, &receptor, target).await?;
        let ligand_path = self.normalize(set, &ligand, target).await?;
        state = JobState::Normalized;
        debug!(%job_id, ?state, "Inputs in engine format");

        let output_path = self.store.allocate_output_path(set, target.extension());
        let log_path = config
            .write_log
            .then(|| self.store.allocate_log_path(set));

        let exec = self
            .engine
            .invoke(
                config,
                &receptor_path,
                &ligand_path,
                &output_path,
                log_path.as_deref(),
            )
            .await?;

        if !exec.success {
            // The output artifact may be absent or truncated; never read it
            return Err(PipelineError::Engine {
                code: exec.exit_code,
                stderr: exec.stderr,
            });
        }
        state = JobState::Invoked;
        debug!(%job_id, ?state, duration_ms = exec.duration_ms, "Engine succeeded");

        // Captured before release so the caller keeps it after cleanup
        let docked_output = tokio::fs::read_to_string(&output_path)
            .await
            .map_err(|e| PipelineError::io("reading docked output", e))?;

        let poses = parse_poses(&exec.stdout);
        if poses.is_empty() {
            warn!(%job_id, "Engine reported no score lines");
        }
        state = JobState::Parsed;
        debug!(%job_id, ?state, poses = poses.len(), "Score table parsed");

        Ok(PipelineResult {
            job_id,
            poses,
            stdout: exec.stdout,
            stderr: exec.stderr,
            output_path,
            docked_output: Some(docked_output),
            state,
            cleanup_failures: Vec::new(),
            duration_ms: exec.duration_ms,
            completed_at: chrono::Utc::now(),
        })
    }

    /// Convert one input to the engine's format; a no-op when the declared
    /// format already matches
    async fn normalize(
        &self,
        set: &mut ArtifactSet,
        input: &InputArtifact,
        target: StructureFormat,
    ) -> Result<PathBuf, PipelineError> {
        if input.format == target {
            return Ok(input.path.clone());
        }

        let converted = self.store.allocate_converted_path(set, input.role, target);
        self.converter
            .convert(&input.path, input.format, target, &converted)
            .await?;

        info!(
            role = input.role.as_str(),
            from = %input.format,
            to = %target,
            "Normalized input format"
        );
        Ok(converted)
    }
}
