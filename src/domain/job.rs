//! Docking job configuration.
//!
//! A `JobConfig` is the immutable, validated description of one docking
//! request: the two input structures, the search box, and the engine
//! parameters. Invalid values are rejected up front, before any file is
//! written or process spawned.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for the exhaustiveness search parameter.
pub const MAX_EXHAUSTIVENESS: u32 = 32;

/// Molecular structure file formats the pipeline knows how to hand around.
///
/// The variant name doubles as the Open Babel format flag and the file
/// extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureFormat {
    /// AutoDock PDBQT (what the engine consumes and produces)
    Pdbqt,

    /// Protein Data Bank
    Pdb,

    /// Tripos MOL2
    Mol2,

    /// MDL SDF
    Sdf,
}

impl StructureFormat {
    /// File extension / Open Babel format name
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdbqt => "pdbqt",
            Self::Pdb => "pdb",
            Self::Mol2 => "mol2",
            Self::Sdf => "sdf",
        }
    }

    /// Guess the format from a filename extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path
            .extension()?
            .to_string_lossy()
            .to_ascii_lowercase()
            .as_str()
        {
            "pdbqt" => Some(Self::Pdbqt),
            "pdb" => Some(Self::Pdb),
            "mol2" => Some(Self::Mol2),
            "sdf" => Some(Self::Sdf),
            _ => None,
        }
    }
}

impl std::fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// An input structure as declared by the uploader: original filename plus
/// the format it claims to be in. The pipeline trusts the declaration; the
/// converter reports any mismatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureRef {
    /// Original filename (informational, not used for staging)
    pub filename: String,

    /// Declared format of the uploaded bytes
    pub format: StructureFormat,
}

impl StructureRef {
    /// Create a reference, inferring the format from the filename extension
    /// and falling back to PDBQT when the extension is unknown.
    pub fn from_filename(filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let format = StructureFormat::from_extension(Path::new(&filename))
            .unwrap_or(StructureFormat::Pdbqt);
        Self { filename, format }
    }
}

/// The cuboid search region: a center point and per-axis sizes in Angstroms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridBox {
    pub center_x: f64,
    pub center_y: f64,
    pub center_z: f64,
    pub size_x: f64,
    pub size_y: f64,
    pub size_z: f64,
}

impl GridBox {
    /// Check that every size is strictly positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, size) in [
            ("size_x", self.size_x),
            ("size_y", self.size_y),
            ("size_z", self.size_z),
        ] {
            if !(size > 0.0) {
                return Err(ConfigError::NonPositiveSize { axis, value: size });
            }
        }
        Ok(())
    }
}

impl Default for GridBox {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            center_z: 0.0,
            size_x: 20.0,
            size_y: 20.0,
            size_z: 20.0,
        }
    }
}

/// Immutable description of one docking request.
///
/// Constructed once per job, validated before any side effect, and passed by
/// reference through the pipeline. No component reads ambient configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Receptor (protein) input
    pub receptor: StructureRef,

    /// Ligand input
    pub ligand: StructureRef,

    /// Search box
    #[serde(default)]
    pub grid: GridBox,

    /// Search effort, 1..=32 (engine default is 8)
    #[serde(default = "default_exhaustiveness")]
    pub exhaustiveness: u32,

    /// Number of binding modes to report, >= 1
    #[serde(default = "default_num_modes")]
    pub num_modes: u32,

    /// Path or bare command name of the engine executable
    #[serde(default = "default_engine_path")]
    pub engine_path: PathBuf,

    /// Path or bare command name of the structure-format converter
    #[serde(default = "default_converter_path")]
    pub converter_path: PathBuf,

    /// Maximum wall-clock duration of one engine invocation. `None` means
    /// unbounded, matching the engine's own behavior.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Ask the engine to also write a log file (tracked and cleaned up with
    /// the other artifacts)
    #[serde(default)]
    pub write_log: bool,
}

fn default_exhaustiveness() -> u32 {
    8
}
fn default_num_modes() -> u32 {
    9
}
fn default_engine_path() -> PathBuf {
    PathBuf::from("vina")
}
fn default_converter_path() -> PathBuf {
    PathBuf::from("obabel")
}

impl JobConfig {
    /// Create a config for two inputs with default parameters
    pub fn new(receptor: StructureRef, ligand: StructureRef) -> Self {
        Self {
            receptor,
            ligand,
            grid: GridBox::default(),
            exhaustiveness: default_exhaustiveness(),
            num_modes: default_num_modes(),
            engine_path: default_engine_path(),
            converter_path: default_converter_path(),
            timeout_seconds: None,
            write_log: false,
        }
    }

    /// Load and validate a job definition from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a job definition from YAML content
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| ConfigError::Malformed {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every field; called before the pipeline does anything
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;

        if self.exhaustiveness < 1 || self.exhaustiveness > MAX_EXHAUSTIVENESS {
            return Err(ConfigError::ExhaustivenessOutOfRange {
                value: self.exhaustiveness,
                max: MAX_EXHAUSTIVENESS,
            });
        }

        if self.num_modes < 1 {
            return Err(ConfigError::InvalidNumModes {
                value: self.num_modes,
            });
        }

        if self.engine_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyEnginePath);
        }

        Ok(())
    }
}

/// Job configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("grid {axis} must be > 0, got {value}")]
    NonPositiveSize { axis: &'static str, value: f64 },

    #[error("exhaustiveness must be within 1..={max}, got {value}")]
    ExhaustivenessOutOfRange { value: u32, max: u32 },

    #[error("num_modes must be >= 1, got {value}")]
    InvalidNumModes { value: u32 },

    #[error("engine path cannot be empty")]
    EmptyEnginePath,

    #[error("failed to read job file {path}: {message}")]
    Unreadable { path: PathBuf, message: String },

    #[error("failed to parse job YAML: {message}")]
    Malformed { message: String },
}
