//! Sampled paths between every ordered pair of node types.

use aopnet_core::{GraphSnapshot, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{PathRecord, SearchBounds, k_shortest_paths};

/// Defaults for [`all_type_paths`].
pub const DEFAULT_PER_TYPE_SEEDS: usize = 3;
pub const DEFAULT_TYPE_PAIR_K: usize = 2;
pub const DEFAULT_MAX_TYPE_PATHS: usize = 10;

/// Node ids sharing one type group, in snapshot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeGroup {
    pub node_type: String,
    pub node_ids: Vec<String>,
}

/// One path tagged with the types of its endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypePairPath {
    pub source_type: String,
    pub target_type: String,
    #[serde(flatten)]
    pub record: PathRecord,
}

/// Output of [`all_type_paths`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypePairPaths {
    pub paths: Vec<TypePairPath>,
    pub count: usize,
    /// Every type group, in first-appearance order.
    pub node_types: Vec<TypeGroup>,
    /// Enumeration stopped because `max_paths` was reached.
    pub max_paths_reached: bool,
    pub frontier_truncated: bool,
}

/// Enumerate paths between nodes of different types.
///
/// Original nodes are grouped by [`aopnet_core::NodeType::group_key`]. For
/// every ordered pair of distinct groups, the first `per_type_seeds` ids on
/// each side are paired and each pair contributes up to `k` shortest simple
/// directed paths, in group order, until `max_paths` paths are collected.
///
/// # Errors
///
/// [`ValidationError::ZeroK`], a zero `per_type_seeds` or `max_paths`, or
/// invalid `bounds`.
#[instrument(skip(snapshot, bounds), fields(nodes = snapshot.node_count()))]
pub fn all_type_paths(
    snapshot: &GraphSnapshot,
    per_type_seeds: usize,
    k: usize,
    max_paths: usize,
    bounds: &SearchBounds,
) -> Result<TypePairPaths, ValidationError> {
    if k == 0 {
        return Err(ValidationError::ZeroK);
    }
    for (name, value) in [("per_type_seeds", per_type_seeds), ("max_paths", max_paths)] {
        if value == 0 {
            return Err(ValidationError::InvalidParameter {
                name,
                reason: "must be at least 1".to_string(),
            });
        }
    }
    bounds.validate()?;

    let groups = type_groups(snapshot);
    let adjacency = snapshot.adjacency(true);
    let mut out = TypePairPaths::default();

    'pairs: for source in &groups {
        for target in &groups {
            if source.node_type == target.node_type {
                continue;
            }
            for start in source.node_ids.iter().take(per_type_seeds) {
                for end in target.node_ids.iter().take(per_type_seeds) {
                    let search = k_shortest_paths(&adjacency, start, end, k, bounds)?;
                    out.frontier_truncated |= search.frontier_truncated;
                    for path in search.paths {
                        if out.paths.len() == max_paths {
                            out.max_paths_reached = true;
                            break 'pairs;
                        }
                        out.paths.push(TypePairPath {
                            source_type: source.node_type.clone(),
                            target_type: target.node_type.clone(),
                            record: PathRecord::from_path(snapshot, path),
                        });
                    }
                }
            }
        }
    }

    out.count = out.paths.len();
    debug!(
        count = out.count,
        types = groups.len(),
        reached = out.max_paths_reached,
        "type pair paths collected"
    );
    out.node_types = groups;
    Ok(out)
}

fn type_groups(snapshot: &GraphSnapshot) -> Vec<TypeGroup> {
    let mut groups: Vec<TypeGroup> = Vec::new();
    for node in snapshot.nodes().iter().filter(|n| !n.node_type.is_synthetic()) {
        let key = node.node_type.group_key();
        match groups.iter_mut().find(|g| g.node_type == key) {
            Some(group) => group.node_ids.push(node.id.clone()),
            None => groups.push(TypeGroup {
                node_type: key.to_string(),
                node_ids: vec![node.id.clone()],
            }),
        }
    }
    groups
}
