//! Data structures shared across the pipeline.
//!
//! Everything here is a plain, job-local value: configs are immutable after
//! validation, results are read-only after creation, and nothing is shared
//! between concurrently running jobs.

pub mod job;
pub mod outcome;
pub mod pose;

pub use job::{ConfigError, GridBox, JobConfig, StructureFormat, StructureRef, MAX_EXHAUSTIVENESS};
pub use outcome::{CleanupFailure, ExecutionResult, JobState, PipelineResult};
pub use pose::ParsedPose;
