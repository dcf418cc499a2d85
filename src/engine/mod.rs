//! Adapters for the external docking engine and structure-format converter.
//!
//! Both externals are modeled as injected capabilities behind traits, so
//! tests can substitute a fake executable (or a pure mock) without touching
//! a real binary.

pub mod obabel;
pub mod vina;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{ExecutionResult, JobConfig, StructureFormat};
use crate::error::PipelineError;

pub use obabel::ObabelConverter;
pub use vina::VinaEngine;

/// The docking engine as an opaque command-line dependency.
#[async_trait]
pub trait DockingEngine: Send + Sync {
    /// Human-readable engine name
    fn name(&self) -> &str;

    /// Structure format the engine consumes and produces
    fn required_format(&self) -> StructureFormat;

    /// Run exactly one docking invocation and capture its outcome.
    ///
    /// A nonzero exit is not an `Err` here; it comes back as an
    /// `ExecutionResult` with `success == false` so the caller decides how
    /// to classify it. `Err` means the process could not be run at all, or
    /// exceeded the configured time bound.
    async fn invoke(
        &self,
        config: &JobConfig,
        receptor: &Path,
        ligand: &Path,
        output: &Path,
        log: Option<&Path>,
    ) -> Result<ExecutionResult, PipelineError>;

    /// Check that the engine executable is runnable
    async fn health_check(&self) -> Result<()>;
}

/// External structure-format converter.
#[async_trait]
pub trait FormatConverter: Send + Sync {
    /// Human-readable converter name
    fn name(&self) -> &str;

    /// Convert `input` from one format to another, writing to `output`.
    /// Nonzero exit or spawn failure is a conversion error carrying the
    /// converter's diagnostic text.
    async fn convert(
        &self,
        input: &Path,
        from: StructureFormat,
        to: StructureFormat,
        output: &Path,
    ) -> Result<(), PipelineError>;

    /// Check that the converter executable is runnable
    async fn health_check(&self) -> Result<()>;
}
