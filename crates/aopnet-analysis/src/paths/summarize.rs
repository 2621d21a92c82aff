//! Hypergraph view of the nodes a set of paths passes through.

use std::collections::HashSet;

use aopnet_core::{GraphSnapshot, ValidationError};
use tracing::{debug, instrument};

use super::PathRecord;
use crate::hypergraph::{EnrichedGraph, HypergraphOptions, build_hypergraph};

/// Build a hypergraph over the sub-snapshot induced by every node on
/// `paths`.
///
/// Ids not present in `snapshot` are ignored. An empty `paths` slice gives
/// an empty graph.
///
/// # Errors
///
/// Propagates [`build_hypergraph`] parameter validation.
#[instrument(skip_all, fields(paths = paths.len()))]
pub fn summarize_paths(
    snapshot: &GraphSnapshot,
    paths: &[PathRecord],
    options: &HypergraphOptions,
) -> Result<EnrichedGraph, ValidationError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let ids: Vec<&str> = paths
        .iter()
        .flat_map(|record| record.path.iter().map(String::as_str))
        .filter(|id| seen.insert(*id))
        .collect();

    let sub = snapshot.induced(&ids);
    debug!(nodes = sub.node_count(), edges = sub.edge_count(), "path sub-snapshot");
    build_hypergraph(&sub, options)
}
