//! Ephemeral artifact staging and reclamation.
//!
//! Every file a job touches (staged inputs, converted copies, engine output,
//! optional log) is tracked in an `ArtifactSet` and deleted exactly once
//! when the job reaches its terminal state, success or failure. Path names
//! carry a UUID so concurrently running jobs can never collide.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{CleanupFailure, StructureFormat};
use crate::error::PipelineError;

/// Logical role of a staged input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputRole {
    Receptor,
    Ligand,
}

impl InputRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Receptor => "receptor",
            Self::Ligand => "ligand",
        }
    }
}

/// A staged input structure, owned exclusively by the job that created it
#[derive(Debug, Clone)]
pub struct InputArtifact {
    /// Receptor or ligand
    pub role: InputRole,

    /// Declared format of the staged bytes
    pub format: StructureFormat,

    /// Ephemeral path the bytes were written to
    pub path: PathBuf,
}

/// The set of ephemeral paths belonging to one job.
///
/// `release` deletes every tracked path, tolerates already-missing files,
/// keeps going past individual failures, and is safe to call more than once.
#[derive(Debug, Default)]
pub struct ArtifactSet {
    paths: Vec<PathBuf>,
    released: bool,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path to be reclaimed on release
    pub fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Paths currently tracked
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Whether release has already run
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Delete every tracked path, collecting failures instead of aborting.
    /// Missing files are not failures; a second call is a no-op.
    pub fn release(&mut self) -> Vec<CleanupFailure> {
        if self.released {
            return Vec::new();
        }
        self.released = true;

        let mut failures = Vec::new();
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Removed artifact"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => failures.push(CleanupFailure {
                    path,
                    message: e.to_string(),
                }),
            }
        }
        failures
    }
}

/// Allocates collision-free ephemeral paths and writes staged inputs.
///
/// The store only hands out names under its root; ownership of the files
/// themselves lives with the job's `ArtifactSet`.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at the given directory (created on first use)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store under the system temp directory
    pub fn in_temp() -> Self {
        Self::new(std::env::temp_dir().join("dockflow"))
    }

    /// Root directory of this store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn unique_path(&self, stem: &str, extension: &str) -> PathBuf {
        self.root
            .join(format!("{stem}-{}.{extension}", Uuid::new_v4()))
    }

    /// Write a byte buffer to a freshly allocated path and track it.
    /// Two calls never return the same path, even across concurrent jobs.
    pub async fn stage(
        &self,
        set: &mut ArtifactSet,
        buffer: &[u8],
        role: InputRole,
        format: StructureFormat,
    ) -> Result<InputArtifact, PipelineError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| PipelineError::io("creating artifact directory", e))?;

        let path = self.unique_path(role.as_str(), format.extension());
        tokio::fs::write(&path, buffer)
            .await
            .map_err(|e| PipelineError::io(format!("staging {} input", role.as_str()), e))?;

        debug!(role = role.as_str(), path = %path.display(), bytes = buffer.len(), "Staged input");
        set.track(path.clone());

        Ok(InputArtifact { role, format, path })
    }

    /// Reserve (but do not create) a tracked path for engine output
    pub fn allocate_output_path(&self, set: &mut ArtifactSet, extension: &str) -> PathBuf {
        let path = self.unique_path("out", extension);
        set.track(path.clone());
        path
    }

    /// Reserve (but do not create) a tracked path for an engine log
    pub fn allocate_log_path(&self, set: &mut ArtifactSet) -> PathBuf {
        let path = self.unique_path("engine", "log");
        set.track(path.clone());
        path
    }

    /// Reserve (but do not create) a tracked path for a converted input
    pub fn allocate_converted_path(
        &self,
        set: &mut ArtifactSet,
        role: InputRole,
        format: StructureFormat,
    ) -> PathBuf {
        let path = self.unique_path(
            &format!("{}-converted", role.as_str()),
            format.extension(),
        );
        set.track(path.clone());
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_same_buffer_stages_to_distinct_paths() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let buffer = b"ATOM      1  N   ALA A   1";

        let mut set_a = ArtifactSet::new();
        let mut set_b = ArtifactSet::new();

        let a = store
            .stage(&mut set_a, buffer, InputRole::Receptor, StructureFormat::Pdbqt)
            .await
            .unwrap();
        let b = store
            .stage(&mut set_b, buffer, InputRole::Receptor, StructureFormat::Pdbqt)
            .await
            .unwrap();

        assert_ne!(a.path, b.path);
        assert_eq!(std::fs::read(&a.path).unwrap(), buffer);
        assert_eq!(std::fs::read(&b.path).unwrap(), buffer);

        set_a.release();
        set_b.release();
    }

    #[tokio::test]
    async fn test_release_removes_every_tracked_path() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let mut set = ArtifactSet::new();

        store
            .stage(&mut set, b"rec", InputRole::Receptor, StructureFormat::Pdbqt)
            .await
            .unwrap();
        store
            .stage(&mut set, b"lig", InputRole::Ligand, StructureFormat::Pdbqt)
            .await
            .unwrap();
        let out = store.allocate_output_path(&mut set, "pdbqt");
        std::fs::write(&out, b"docked").unwrap();

        let tracked: Vec<_> = set.paths().to_vec();
        assert_eq!(tracked.len(), 3);

        let failures = set.release();
        assert!(failures.is_empty());
        for path in &tracked {
            assert!(!path.exists(), "{} should be gone", path.display());
        }
    }

    #[tokio::test]
    async fn test_release_is_idempotent_and_tolerates_missing_files() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let mut set = ArtifactSet::new();

        let staged = store
            .stage(&mut set, b"rec", InputRole::Receptor, StructureFormat::Pdbqt)
            .await
            .unwrap();
        // Output path reserved but never created by an engine
        store.allocate_output_path(&mut set, "pdbqt");
        // Someone else already deleted the staged file
        std::fs::remove_file(&staged.path).unwrap();

        assert!(set.release().is_empty());
        assert!(set.is_released());
        assert!(set.release().is_empty());
    }

    #[test]
    fn test_unique_output_allocations() {
        let store = ArtifactStore::in_temp();
        let mut set = ArtifactSet::new();
        let a = store.allocate_output_path(&mut set, "pdbqt");
        let b = store.allocate_output_path(&mut set, "pdbqt");
        assert_ne!(a, b);
        assert_eq!(set.paths().len(), 2);
    }
}
