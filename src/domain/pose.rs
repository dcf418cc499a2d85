//! Scored binding poses as reported by the engine.

use serde::{Deserialize, Serialize};

/// One candidate binding mode from the engine's score table.
///
/// The sequence of poses preserves the engine's own ordering (typically best
/// affinity first) and is never re-sorted or deduplicated; mode indices are
/// 1-based and not guaranteed contiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedPose {
    /// Mode index as reported by the engine
    pub mode: u32,

    /// Predicted binding affinity in kcal/mol (lower is better)
    pub affinity: f64,

    /// RMSD lower bound relative to the best pose, if reported
    pub rmsd_lb: Option<f64>,

    /// RMSD upper bound relative to the best pose, if reported
    pub rmsd_ub: Option<f64>,
}

impl ParsedPose {
    /// Create a pose without RMSD bounds
    pub fn new(mode: u32, affinity: f64) -> Self {
        Self {
            mode,
            affinity,
            rmsd_lb: None,
            rmsd_ub: None,
        }
    }

    /// Attach RMSD bounds
    pub fn with_rmsd(mut self, lb: f64, ub: f64) -> Self {
        self.rmsd_lb = Some(lb);
        self.rmsd_ub = Some(ub);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_serialization() {
        let pose = ParsedPose::new(1, -7.2).with_rmsd(0.0, 0.0);

        let json = serde_json::to_string(&pose).unwrap();
        let parsed: ParsedPose = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, pose);
        assert_eq!(parsed.rmsd_ub, Some(0.0));
    }
}
