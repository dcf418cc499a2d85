//! Score-table extraction from engine stdout.
//!
//! The engine reports binding modes as plain text lines of the shape
//! `mode <int> <float> [<float> <float>]`. Scores come only from this
//! textual report, never from the output structure file.

use tracing::trace;

use crate::domain::ParsedPose;

/// Extract scored poses from engine stdout, in emission order.
///
/// A line is a score line when its first whitespace-delimited token equals
/// "mode" case-insensitively and an integer mode index plus a float affinity
/// follow. Up to two further numeric tokens are captured as RMSD bounds.
/// Anything else is ignored, and zero matches is a valid, empty result —
/// the caller decides whether that deserves a warning.
pub fn parse_poses(stdout: &str) -> Vec<ParsedPose> {
    let mut poses = Vec::new();

    for line in stdout.lines() {
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some(first) if first.eq_ignore_ascii_case("mode") => {}
            _ => continue,
        }

        let Some(mode) = tokens.next().and_then(|t| t.parse::<u32>().ok()) else {
            continue;
        };
        let Some(affinity) = tokens.next().and_then(|t| t.parse::<f64>().ok()) else {
            continue;
        };

        let rmsd_lb = tokens.next().and_then(|t| t.parse::<f64>().ok());
        let rmsd_ub = match rmsd_lb {
            Some(_) => tokens.next().and_then(|t| t.parse::<f64>().ok()),
            None => None,
        };

        trace!(mode, affinity, "Parsed score line");
        poses.push(ParsedPose {
            mode,
            affinity,
            rmsd_lb,
            rmsd_ub,
        });
    }

    poses
}
