//! Pipeline error taxonomy.

use thiserror::Error;

use crate::domain::ConfigError;

/// Errors that abort a docking job.
///
/// `Config`, `Io` and `Conversion` occur before the engine runs, so no
/// compute-expensive work is wasted on unusable inputs. `Engine` and
/// `Timeout` occur after invocation; the output artifact is never read in
/// either case. Cleanup failures are deliberately absent here: they are
/// non-fatal and travel as warnings on the result instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid job configuration, rejected before any side effect
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Filesystem failure while staging or reading artifacts
    #[error("i/o failure while {action}: {source}")]
    Io {
        action: String,
        #[source]
        source: std::io::Error,
    },

    /// The format converter exited nonzero or could not be run
    #[error("format conversion failed: {detail}")]
    Conversion { detail: String },

    /// The docking engine exited nonzero
    #[error("docking engine exited with code {code}: {stderr}")]
    Engine { code: i32, stderr: String },

    /// The engine or converter exceeded the configured invocation bound and
    /// was killed
    #[error("invocation timed out after {limit_seconds}s")]
    Timeout { limit_seconds: u64 },
}

impl PipelineError {
    /// Wrap an i/o error with a short description of what was being done
    pub fn io(action: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            action: action.into(),
            source,
        }
    }
}
