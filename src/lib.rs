//! dockflow - pipeline orchestrator for AutoDock Vina docking runs
//!
//! Stages uploaded molecular structures to ephemeral paths, normalizes
//! their file format through Open Babel when needed, invokes the docking
//! engine as a child process with a fully explicit argument list, parses
//! its textual score table into structured poses, and reclaims every
//! ephemeral artifact when the job ends — on failure paths too.
//!
//! # Architecture
//!
//! - All job parameters live in one immutable, validated `JobConfig`
//! - The engine and converter are injected behind traits, so the whole
//!   pipeline runs against fakes in tests
//! - Jobs are independent: nothing is shared between concurrent runs
//!   except the UUID-named artifact namespace
//!
//! # Modules
//!
//! - `engine`: external process adapters (Vina, Open Babel)
//! - `core`: orchestration (ArtifactStore, parser, DockingPipeline)
//! - `domain`: data structures (JobConfig, ParsedPose, PipelineResult)
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Dock a ligand against a receptor
//! dockflow run receptor.pdbqt ligand.pdbqt --center-x 12.5 --size-x 18
//!
//! # Same, with parameters from a YAML job file
//! dockflow run receptor.pdbqt ligand.pdb --job job.yaml --out docked.pdbqt
//!
//! # Check the external executables
//! dockflow probe
//! ```

pub mod cli;
pub mod core;
pub mod domain;
pub mod engine;
pub mod error;

// Re-export main types at crate root for convenience
pub use core::{ArtifactSet, ArtifactStore, DockingPipeline, InputArtifact, InputRole};
pub use domain::{
    ConfigError, ExecutionResult, GridBox, JobConfig, JobState, ParsedPose, PipelineResult,
    StructureFormat, StructureRef,
};
pub use engine::{DockingEngine, FormatConverter, ObabelConverter, VinaEngine};
pub use error::PipelineError;
