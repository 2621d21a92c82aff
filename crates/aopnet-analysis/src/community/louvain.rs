//! Louvain modularity optimisation.
//!
//! # Algorithm
//!
//! 1. **Local moving**: visit nodes in index order; move each node to the
//!    neighboring community with the largest strictly positive modularity
//!    gain over staying put. Repeat passes until one makes no move.
//! 2. **Aggregation**: collapse each community into one node, turning
//!    internal weight into a self-loop, and repeat from step 1.
//! 3. Stop when a level's local moving changes nothing.
//!
//! Node order, neighbor order and tie-breaking are fixed, so the same
//! graph always yields the same partition.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use super::modularity::modularity;
use super::{ClusterOutput, StrategyError};
use crate::graph::{WeightedGraph, renumber};

/// Gains must beat staying put by more than this to trigger a move.
const MIN_GAIN: f64 = 1e-12;

/// Upper bound on local-moving passes per level.
const MAX_PASSES: usize = 128;

/// Run Louvain at the given resolution.
///
/// # Errors
///
/// [`StrategyError::EmptyGraph`] for a graph without nodes and
/// [`StrategyError::NoEdgeWeight`] when the total edge weight is zero.
#[instrument(skip(graph), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn louvain(graph: &WeightedGraph, resolution: f64) -> Result<ClusterOutput, StrategyError> {
    let n = graph.node_count();
    if n == 0 {
        return Err(StrategyError::EmptyGraph);
    }
    let m = graph.total_weight();
    if m <= 0.0 {
        return Err(StrategyError::NoEdgeWeight);
    }

    let mut level = Level::from_graph(graph);
    let mut membership: Vec<usize> = (0..n).collect();
    let mut depth = 0_usize;

    loop {
        let (communities, moved) = level.local_moving(resolution);
        if !moved {
            break;
        }
        let dense = renumber(&communities);
        for slot in &mut membership {
            *slot = dense[*slot];
        }
        level = level.aggregate(&dense);
        depth += 1;
        debug!(depth, communities = level.len(), "louvain level aggregated");
    }

    let labels = renumber(&membership);
    let modularity = modularity(graph, &labels, 1.0);
    Ok(ClusterOutput { labels, modularity })
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// One aggregation level: nodes are communities of the level below.
struct Level {
    adj: Vec<Vec<(usize, f64)>>,
    self_loops: Vec<f64>,
    degrees: Vec<f64>,
    two_m: f64,
}

impl Level {
    fn from_graph(graph: &WeightedGraph) -> Self {
        let adj = graph.neighbor_lists();
        let degrees = graph.weighted_degrees();
        let two_m = degrees.iter().sum();
        Self {
            self_loops: vec![0.0; adj.len()],
            adj,
            degrees,
            two_m,
        }
    }

    fn len(&self) -> usize {
        self.adj.len()
    }

    /// Returns the community of each node and whether any node moved.
    fn local_moving(&self, resolution: f64) -> (Vec<usize>, bool) {
        let n = self.len();
        let mut community: Vec<usize> = (0..n).collect();
        let mut totals = self.degrees.clone();
        let mut link_weight = vec![0.0_f64; n];
        let mut touched = vec![false; n];
        let mut candidates: Vec<usize> = Vec::new();
        let mut moved_any = false;

        for _ in 0..MAX_PASSES {
            let mut moved = false;
            for node in 0..n {
                let current = community[node];
                let k_i = self.degrees[node];

                for &(neighbor, weight) in &self.adj[node] {
                    let c = community[neighbor];
                    if !touched[c] {
                        touched[c] = true;
                        candidates.push(c);
                    }
                    link_weight[c] += weight;
                }

                totals[current] -= k_i;
                let gain =
                    |c: usize| link_weight[c] - resolution * totals[c] * k_i / self.two_m;

                let mut best = current;
                let mut best_gain = gain(current);
                for &c in &candidates {
                    let g = gain(c);
                    if g > best_gain + MIN_GAIN {
                        best = c;
                        best_gain = g;
                    }
                }

                totals[best] += k_i;
                community[node] = best;
                if best != current {
                    moved = true;
                }

                for c in candidates.drain(..) {
                    touched[c] = false;
                    link_weight[c] = 0.0;
                }
            }
            if !moved {
                break;
            }
            moved_any = true;
        }

        (community, moved_any)
    }

    /// Collapse nodes into the dense communities given by `dense`.
    fn aggregate(&self, dense: &[usize]) -> Self {
        let count = dense.iter().max().map_or(0, |&max| max + 1);
        let mut links: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); count];
        let mut self_loops = vec![0.0_f64; count];

        for (node, neighbors) in self.adj.iter().enumerate() {
            let c_node = dense[node];
            self_loops[c_node] += self.self_loops[node];
            for &(neighbor, weight) in neighbors {
                let c_neighbor = dense[neighbor];
                if c_node == c_neighbor {
                    // Each undirected edge is listed from both ends.
                    self_loops[c_node] += weight / 2.0;
                } else {
                    *links[c_node].entry(c_neighbor).or_insert(0.0) += weight;
                }
            }
        }

        let adj: Vec<Vec<(usize, f64)>> = links
            .into_iter()
            .map(|map| map.into_iter().collect())
            .collect();
        let degrees = adj
            .iter()
            .zip(&self_loops)
            .map(|(neighbors, loop_weight)| {
                neighbors.iter().map(|(_, w)| w).sum::<f64>() + 2.0 * loop_weight
            })
            .collect();

        Self {
            adj,
            self_loops,
            degrees,
            two_m: self.two_m,
        }
    }
}
