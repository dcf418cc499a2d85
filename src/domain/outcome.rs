//! Invocation and pipeline outcomes.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::pose::ParsedPose;

/// Captured outcome of one engine invocation. Produced once, read-only
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// True iff the child exited with code 0
    pub success: bool,

    /// Exit code; -1 when the child was killed by a signal
    pub exit_code: i32,

    /// Full captured standard output
    pub stdout: String,

    /// Full captured standard error
    pub stderr: String,

    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

/// Lifecycle states of a docking job.
///
/// Failure at any point between `Staged` and `Invoked` short-circuits
/// straight to `Released`; every job reaches `Released` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Config and raw buffers supplied, nothing written yet
    Created,

    /// Both inputs written to ephemeral paths
    Staged,

    /// Inputs converted to the engine's format where needed
    Normalized,

    /// Engine ran to completion (exit 0)
    Invoked,

    /// Score table extracted from engine stdout
    Parsed,

    /// Ephemeral artifacts reclaimed (terminal)
    Released,
}

/// A non-fatal artifact deletion failure, surfaced as a warning alongside
/// the job result.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("failed to remove {path}: {message}")]
pub struct CleanupFailure {
    /// Path that could not be removed
    pub path: PathBuf,

    /// Underlying error text
    pub message: String,
}

/// What a completed docking job hands back to the caller.
///
/// Everything here is a plain value copied out before cleanup; the output
/// artifact itself is not guaranteed to exist once the job is `Released`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Unique id of the job that produced this result
    pub job_id: Uuid,

    /// Scored poses in engine order (possibly empty)
    pub poses: Vec<ParsedPose>,

    /// Raw engine stdout
    pub stdout: String,

    /// Raw engine stderr
    pub stderr: String,

    /// Where the engine wrote the docked structure (stale after release)
    pub output_path: PathBuf,

    /// Full text of the docked output file, captured before cleanup
    pub docked_output: Option<String>,

    /// Terminal job state (always `Released`)
    pub state: JobState,

    /// Deletion failures recorded during release; never fatal
    pub cleanup_failures: Vec<CleanupFailure>,

    /// Engine wall-clock duration in milliseconds
    pub duration_ms: u64,

    /// When the job finished
    pub completed_at: DateTime<Utc>,
}

impl PipelineResult {
    /// True when no score line was found in the engine output
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Best (lowest) reported affinity, if any pose was parsed
    pub fn best_affinity(&self) -> Option<f64> {
        self.poses
            .iter()
            .map(|p| p.affinity)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }
}
