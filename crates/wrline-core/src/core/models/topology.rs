use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Connectivity of the double helix along its base-pair index.
///
/// Every stage of the analysis resolves neighbouring indices through this type,
/// so that circular (closed minicircle) and linear (open duplex) DNA share one
/// implementation of each algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    /// Indices wrap modulo the sequence length.
    #[default]
    Circular,
    /// Indices terminate at both ends of the sequence.
    Linear,
}

impl Topology {
    /// Resolves `index + offset` in a sequence of length `len`.
    ///
    /// Circular topology always succeeds (for a non-empty sequence); linear
    /// topology returns `None` when the neighbour falls outside `[0, len)`.
    #[inline]
    pub fn neighbor(self, index: usize, offset: isize, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let target = index as isize + offset;
        match self {
            Topology::Circular => Some(target.rem_euclid(len as isize) as usize),
            Topology::Linear => {
                if target >= 0 && (target as usize) < len {
                    Some(target as usize)
                } else {
                    None
                }
            }
        }
    }

    /// Like [`neighbor`](Self::neighbor), but a linear neighbour past either end
    /// is clamped to the nearest valid index instead of being dropped.
    #[inline]
    pub fn clamped_neighbor(self, index: usize, offset: isize, len: usize) -> Option<usize> {
        match self {
            Topology::Circular => self.neighbor(index, offset, len),
            Topology::Linear if len > 0 => {
                let target = (index as isize + offset).clamp(0, len as isize - 1);
                Some(target as usize)
            }
            Topology::Linear => None,
        }
    }

    /// Number of base-pair steps formed by `num_bp` base pairs.
    ///
    /// A closed helix has as many steps as base pairs; an open one loses the
    /// step that would join its last base pair back to the first.
    pub fn step_count(self, num_bp: usize) -> usize {
        match self {
            Topology::Circular => num_bp,
            Topology::Linear => num_bp.saturating_sub(1),
        }
    }

    pub fn is_circular(self) -> bool {
        matches!(self, Topology::Circular)
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::Circular => write!(f, "circular"),
            Topology::Linear => write!(f, "linear"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTopologyError(pub String);

impl fmt::Display for ParseTopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown topology '{}' (expected 'circular' or 'linear')",
            self.0
        )
    }
}

impl std::error::Error for ParseTopologyError {}

impl FromStr for Topology {
    type Err = ParseTopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circular" | "closed" => Ok(Topology::Circular),
            "linear" | "open" => Ok(Topology::Linear),
            _ => Err(ParseTopologyError(s.to_string())),
        }
    }
}
