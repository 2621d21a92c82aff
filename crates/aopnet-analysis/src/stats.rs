//! Summary statistics of a snapshot.
//!
//! # Statistics Provided
//!
//! All structural figures use the simple undirected view: each distinct
//! unordered pair of connected nodes counts once, self-loops and edges with
//! an unknown endpoint are ignored, and weights play no part.
//!
//! - **density**: `2E / (n(n - 1))`, 0.0 below two nodes.
//! - **connected_components**: isolated nodes count as components.
//! - **average_clustering**: mean local clustering coefficient, nodes of
//!   degree below 2 contributing 0.0.
//! - **transitivity**: closed triads over all connected triads.
//! - **degree statistics**: mean, max, min, and population standard
//!   deviation.
//! - **centrality**: mean normalized betweenness and closeness, only for
//!   graphs under [`CENTRALITY_NODE_LIMIT`] nodes.
//! - **type_distribution**: node count per type group, ordered by key.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use aopnet_core::GraphSnapshot;
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Centrality averages are skipped at or above this many nodes.
pub const CENTRALITY_NODE_LIMIT: usize = 1000;

// ---------------------------------------------------------------------------
// NetworkProperties
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkProperties {
    pub nodes: usize,
    /// Distinct undirected pairs.
    pub edges: usize,
    pub density: f64,
    pub connected_components: usize,
    pub average_clustering: f64,
    pub transitivity: f64,
    pub average_degree: f64,
    pub max_degree: usize,
    pub min_degree: usize,
    pub degree_std: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_betweenness_centrality: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_closeness_centrality: Option<f64>,
    pub type_distribution: BTreeMap<String, usize>,
}

/// Compute [`NetworkProperties`] for `snapshot`.
#[must_use]
#[instrument(skip(snapshot), fields(nodes = snapshot.node_count(), edges = snapshot.edge_count()))]
pub fn network_properties(snapshot: &GraphSnapshot) -> NetworkProperties {
    let n = snapshot.node_count();
    let neighbors = simple_neighbors(snapshot);
    let edges = neighbors.iter().map(BTreeSet::len).sum::<usize>() / 2;

    let mut graph = UnGraph::<(), ()>::with_capacity(n, edges);
    let indices: Vec<NodeIndex> = (0..n).map(|_| graph.add_node(())).collect();
    for (a, adjacent) in neighbors.iter().enumerate() {
        for &b in adjacent.range(a + 1..) {
            graph.add_edge(indices[a], indices[b], ());
        }
    }

    let degrees: Vec<usize> = neighbors.iter().map(BTreeSet::len).collect();
    let (average_degree, degree_std) = mean_and_std(&degrees);
    let (average_clustering, transitivity) = clustering(&neighbors);

    let (avg_betweenness_centrality, avg_closeness_centrality) = if n < CENTRALITY_NODE_LIMIT {
        (
            Some(mean(&betweenness(&neighbors))),
            Some(mean(&closeness(&neighbors))),
        )
    } else {
        debug!(nodes = n, "centrality skipped");
        (None, None)
    };

    let mut type_distribution = BTreeMap::new();
    for node in snapshot.nodes() {
        *type_distribution
            .entry(node.node_type.group_key().to_string())
            .or_insert(0) += 1;
    }

    NetworkProperties {
        nodes: n,
        edges,
        density: density(n, edges),
        connected_components: if n == 0 { 0 } else { connected_components(&graph) },
        average_clustering,
        transitivity,
        average_degree,
        max_degree: degrees.iter().copied().max().unwrap_or(0),
        min_degree: degrees.iter().copied().min().unwrap_or(0),
        degree_std,
        avg_betweenness_centrality,
        avg_closeness_centrality,
        type_distribution,
    }
}

fn simple_neighbors(snapshot: &GraphSnapshot) -> Vec<BTreeSet<usize>> {
    let mut neighbors = vec![BTreeSet::new(); snapshot.node_count()];
    for edge in snapshot.edges() {
        let (Some(a), Some(b)) = (snapshot.position(&edge.source), snapshot.position(&edge.target))
        else {
            continue;
        };
        if a != b {
            neighbors[a].insert(b);
            neighbors[b].insert(a);
        }
    }
    neighbors
}

// ---------------------------------------------------------------------------
// Internal helpers (cast precision suppressed at function scope)
// ---------------------------------------------------------------------------

#[allow(clippy::cast_precision_loss)]
fn density(nodes: usize, edges: usize) -> f64 {
    if nodes < 2 {
        return 0.0_f64;
    }
    (2 * edges) as f64 / (nodes * (nodes - 1)) as f64
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0_f64;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[allow(clippy::cast_precision_loss)]
fn mean_and_std(degrees: &[usize]) -> (f64, f64) {
    if degrees.is_empty() {
        return (0.0, 0.0);
    }
    let values: Vec<f64> = degrees.iter().map(|&d| d as f64).collect();
    let avg = mean(&values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    (avg, variance.sqrt())
}

/// Average local clustering and transitivity.
#[allow(clippy::cast_precision_loss)]
fn clustering(neighbors: &[BTreeSet<usize>]) -> (f64, f64) {
    let mut local = Vec::with_capacity(neighbors.len());
    let mut closed = 0_usize;
    let mut triads = 0_usize;

    for adjacent in neighbors {
        let k = adjacent.len();
        if k < 2 {
            local.push(0.0);
            continue;
        }
        let links = adjacent
            .iter()
            .map(|&u| neighbors[u].intersection(adjacent).count())
            .sum::<usize>()
            / 2;
        let pairs = k * (k - 1) / 2;
        closed += links;
        triads += pairs;
        local.push(links as f64 / pairs as f64);
    }

    let transitivity = if closed == 0 {
        0.0
    } else {
        closed as f64 / triads as f64
    };
    (mean(&local), transitivity)
}

/// Normalized node betweenness (Brandes, unweighted).
#[allow(clippy::cast_precision_loss)]
fn betweenness(neighbors: &[BTreeSet<usize>]) -> Vec<f64> {
    let n = neighbors.len();
    let mut centrality = vec![0.0_f64; n];

    for source in 0..n {
        let mut stack = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut dist: Vec<Option<usize>> = vec![None; n];
        sigma[source] = 1.0;
        dist[source] = Some(0);

        let mut queue = VecDeque::from([source]);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let dv = dist[v].unwrap_or(0);
            for &w in &neighbors[v] {
                if dist[w].is_none() {
                    dist[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if dist[w] == Some(dv + 1) {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0_f64; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != source {
                centrality[w] += delta[w];
            }
        }
    }

    // Each pair was counted from both ends.
    let scale = if n > 2 {
        1.0 / ((n - 1) * (n - 2)) as f64
    } else {
        0.0
    };
    centrality.iter().map(|c| c * scale).collect()
}

/// Closeness scaled by the reachable fraction of the graph.
#[allow(clippy::cast_precision_loss)]
fn closeness(neighbors: &[BTreeSet<usize>]) -> Vec<f64> {
    let n = neighbors.len();
    (0..n)
        .map(|source| {
            let mut seen = HashSet::from([source]);
            let mut queue = VecDeque::from([(source, 0_usize)]);
            let mut total = 0_usize;
            while let Some((v, d)) = queue.pop_front() {
                total += d;
                for &w in &neighbors[v] {
                    if seen.insert(w) {
                        queue.push_back((w, d + 1));
                    }
                }
            }
            let reachable = seen.len() - 1;
            if total == 0 || n < 2 {
                return 0.0;
            }
            let r = reachable as f64;
            (r / total as f64) * (r / (n - 1) as f64)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use aopnet_core::{Edge, Node, NodeType};

    fn snapshot(ids: &[(&str, &str)], pairs: &[(&str, &str)]) -> GraphSnapshot {
        GraphSnapshot::new(
            ids.iter()
                .map(|(id, t)| Node::new(*id, *id, NodeType::parse(t)))
                .collect(),
            pairs.iter().map(|(a, b)| Edge::new(*a, *b)).collect(),
        )
        .expect("valid")
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_snapshot_is_all_zero() {
        let props = network_properties(&GraphSnapshot::default());
        assert_eq!(props.nodes, 0);
        assert_eq!(props.connected_components, 0);
        assert!(close(props.density, 0.0));
        assert!(props.type_distribution.is_empty());
    }

    #[test]
    fn triangle_with_tail() {
        let snap = snapshot(
            &[("A", "KE"), ("B", "KE"), ("C", "AO"), ("D", "MIE")],
            &[("A", "B"), ("B", "C"), ("C", "A"), ("C", "D")],
        );
        let props = network_properties(&snap);
        assert_eq!(props.edges, 4);
        assert!(close(props.density, 8.0 / 12.0));
        assert_eq!(props.connected_components, 1);
        // A and B: 1.0, C: 1/3, D: 0.
        assert!(close(props.average_clustering, (1.0 + 1.0 + 1.0 / 3.0) / 4.0));
        // 3 closed of 1 + 1 + 3 triads.
        assert!(close(props.transitivity, 3.0 / 5.0));
        assert_eq!(props.max_degree, 3);
        assert_eq!(props.min_degree, 1);
        assert!(close(props.average_degree, 2.0));
        assert!(close(props.degree_std, (0.5_f64).sqrt()));
        assert_eq!(props.type_distribution.len(), 3);
    }

    #[test]
    fn parallel_edges_and_self_loops_collapse() {
        let snap = snapshot(
            &[("A", "KE"), ("B", "KE"), ("C", "KE")],
            &[("A", "B"), ("B", "A"), ("A", "A"), ("A", "Z")],
        );
        let props = network_properties(&snap);
        assert_eq!(props.edges, 1);
        assert_eq!(props.connected_components, 2);
        assert_eq!(props.type_distribution.get("IntermediateEvent"), Some(&3));
    }

    #[test]
    fn path_centrality() {
        let snap = snapshot(&[("A", "KE"), ("B", "KE"), ("C", "KE")], &[("A", "B"), ("B", "C")]);
        let props = network_properties(&snap);
        // Only B lies between a pair: normalized betweenness 1.0.
        assert!(close(props.avg_betweenness_centrality.unwrap_or_default(), 1.0 / 3.0));
        // A and C: 2/3, B: 1.
        assert!(close(
            props.avg_closeness_centrality.unwrap_or_default(),
            (2.0 / 3.0 + 1.0 + 2.0 / 3.0) / 3.0
        ));
    }
}
