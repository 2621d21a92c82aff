//! Weighted undirected view of a snapshot for network analysis.
//!
//! # Edge weights
//!
//! Each snapshot edge contributes [`Edge::analysis_weight`]
//! (`confidence × adjacency`, non-numeric factors counting as 1.0).
//! Parallel edges between the same pair, in either direction, sum their
//! weights into a single undirected edge. Self-loops, dangling edges, and
//! edges whose weight is not positive are left out.
//!
//! Node indices follow snapshot order, so index `i` is `snapshot.nodes()[i]`.
//!
//! [`Edge::analysis_weight`]: aopnet_core::Edge::analysis_weight

use std::collections::HashMap;

use aopnet_core::GraphSnapshot;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use tracing::instrument;

// ---------------------------------------------------------------------------
// WeightedGraph
// ---------------------------------------------------------------------------

/// Undirected weighted graph keyed by node id.
#[derive(Debug, Clone)]
pub struct WeightedGraph {
    /// Nodes carry their id; edges carry their summed weight.
    pub graph: UnGraph<String, f64>,
    /// Mapping from node id to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
}

impl WeightedGraph {
    /// Build the weighted view of `snapshot`.
    #[must_use]
    #[instrument(skip(snapshot), fields(nodes = snapshot.node_count()))]
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Self {
        let mut graph = UnGraph::<String, f64>::with_capacity(
            snapshot.node_count(),
            snapshot.edge_count(),
        );
        let mut node_map = HashMap::with_capacity(snapshot.node_count());
        for node in snapshot.nodes() {
            let idx = graph.add_node(node.id.clone());
            node_map.insert(node.id.clone(), idx);
        }

        for edge in snapshot.edges() {
            let (Some(&a), Some(&b)) = (node_map.get(&edge.source), node_map.get(&edge.target))
            else {
                continue;
            };
            if a == b {
                continue;
            }
            let weight = edge.analysis_weight();
            if weight <= 0.0 {
                continue;
            }
            if let Some(existing) = graph.find_edge(a, b) {
                graph[existing] += weight;
            } else {
                graph.add_edge(a, b, weight);
            }
        }

        Self { graph, node_map }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node id at a dense index.
    #[must_use]
    pub fn node_id(&self, index: usize) -> Option<&str> {
        self.graph
            .node_weight(NodeIndex::new(index))
            .map(String::as_str)
    }

    /// Sum of all edge weights (`m` in the modularity formula).
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.graph.edge_weights().sum()
    }

    /// Dense neighbor lists `(neighbor, weight)`, in edge insertion order.
    #[must_use]
    pub fn neighbor_lists(&self) -> Vec<Vec<(usize, f64)>> {
        let mut lists = vec![Vec::new(); self.graph.node_count()];
        for edge in self.graph.edge_references() {
            let (a, b) = (edge.source().index(), edge.target().index());
            lists[a].push((b, *edge.weight()));
            lists[b].push((a, *edge.weight()));
        }
        lists
    }

    /// Dense edge list `(a, b, weight)` with `a` and `b` as node indices.
    #[must_use]
    pub fn edge_list(&self) -> Vec<(usize, usize, f64)> {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), *e.weight()))
            .collect()
    }

    /// Weighted degree of every node.
    #[must_use]
    pub fn weighted_degrees(&self) -> Vec<f64> {
        let mut degrees = vec![0.0; self.graph.node_count()];
        for edge in self.graph.edge_references() {
            degrees[edge.source().index()] += *edge.weight();
            degrees[edge.target().index()] += *edge.weight();
        }
        degrees
    }

    /// Connected-component label per node, numbered by first appearance.
    #[must_use]
    pub fn component_labels(&self) -> Vec<usize> {
        let n = self.graph.node_count();
        let mut uf = UnionFind::<usize>::new(n);
        for edge in self.graph.edge_references() {
            uf.union(edge.source().index(), edge.target().index());
        }
        renumber(&uf.into_labeling())
    }
}

/// Relabel arbitrary partition labels to `0..` in order of first appearance.
#[must_use]
pub fn renumber(labels: &[usize]) -> Vec<usize> {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    labels
        .iter()
        .map(|&label| {
            let next = mapping.len();
            *mapping.entry(label).or_insert(next)
        })
        .collect()
}
