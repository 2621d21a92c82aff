//! Path queries over a snapshot.
//!
//! [`search`] holds the adjacency-level algorithms. The functions here wrap
//! them for a [`GraphSnapshot`]: they resolve ids, use the directed
//! adjacency, and attach the snapshot edge behind every hop.

pub mod outcome;
pub mod search;
pub mod summarize;
pub mod type_pairs;

use aopnet_core::{Edge, GraphSnapshot, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

pub use outcome::{
    EndpointPatterns, OutcomePaths, PathMode, initiating_to_outcome_paths,
    initiating_to_outcome_paths_with,
};
pub use search::{PathSearch, k_shortest_paths, shortest_path};
pub use summarize::summarize_paths;
pub use type_pairs::{TypeGroup, TypePairPath, TypePairPaths, all_type_paths};

/// Work limits for path enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchBounds {
    /// Initiating and outcome seeds considered per side.
    pub max_seeds: usize,
    /// Pending candidates held by one k-shortest search.
    pub max_frontier: usize,
}

impl Default for SearchBounds {
    fn default() -> Self {
        Self {
            max_seeds: 5,
            max_frontier: 100_000,
        }
    }
}

impl SearchBounds {
    /// # Errors
    ///
    /// [`ValidationError::InvalidParameter`] when either limit is 0.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_seeds == 0 {
            return Err(ValidationError::InvalidParameter {
                name: "max_seeds",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_frontier == 0 {
            return Err(ValidationError::InvalidParameter {
                name: "max_frontier",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// A path with its hop count and the snapshot edges it follows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    pub path: Vec<String>,
    /// Number of hops (`path.len() - 1`).
    pub length: usize,
    /// First matching snapshot edge for each consecutive pair.
    pub edges: Vec<Edge>,
}

impl PathRecord {
    /// Attach edges from `snapshot` to a node path.
    #[must_use]
    pub fn from_path(snapshot: &GraphSnapshot, path: Vec<String>) -> Self {
        let edges = path
            .windows(2)
            .filter_map(|pair| snapshot.edges_between(&pair[0], &pair[1]))
            .cloned()
            .collect();
        Self {
            length: path.len().saturating_sub(1),
            path,
            edges,
        }
    }
}

/// Output of [`find_k_paths`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathSet {
    pub paths: Vec<PathRecord>,
    pub frontier_truncated: bool,
}

/// Shortest directed path between two snapshot nodes.
///
/// Unknown ids give `None`, the same as an unreachable target.
#[must_use]
#[instrument(skip(snapshot))]
pub fn find_path(snapshot: &GraphSnapshot, start: &str, end: &str) -> Option<PathRecord> {
    if !snapshot.contains(start) || !snapshot.contains(end) {
        return None;
    }
    let adjacency = snapshot.adjacency(true);
    shortest_path(&adjacency, start, end).map(|path| PathRecord::from_path(snapshot, path))
}

/// Up to `k` shortest simple directed paths between two snapshot nodes.
///
/// Unknown ids give an empty set.
///
/// # Errors
///
/// [`ValidationError::ZeroK`] for `k == 0`, or invalid `bounds`.
#[instrument(skip(snapshot, bounds))]
pub fn find_k_paths(
    snapshot: &GraphSnapshot,
    start: &str,
    end: &str,
    k: usize,
    bounds: &SearchBounds,
) -> Result<PathSet, ValidationError> {
    if k == 0 {
        return Err(ValidationError::ZeroK);
    }
    bounds.validate()?;
    if !snapshot.contains(start) || !snapshot.contains(end) {
        return Ok(PathSet::default());
    }

    let adjacency = snapshot.adjacency(true);
    let search = k_shortest_paths(&adjacency, start, end, k, bounds)?;
    if search.frontier_truncated {
        warn!(max_frontier = bounds.max_frontier, "path frontier truncated");
    }
    Ok(PathSet {
        paths: search
            .paths
            .into_iter()
            .map(|path| PathRecord::from_path(snapshot, path))
            .collect(),
        frontier_truncated: search.frontier_truncated,
    })
}
