//! Orchestration logic: artifact lifecycle, score parsing, and the job
//! state machine.

pub mod artifacts;
pub mod parser;
pub mod pipeline;

pub use artifacts::{ArtifactSet, ArtifactStore, InputArtifact, InputRole};
pub use parser::parse_poses;
pub use pipeline::DockingPipeline;
