//! Divisive clustering by edge betweenness (Girvan–Newman).
//!
//! Serves the `walktrap` strategy name. Repeatedly removes the edge with
//! the highest betweenness; every time the component count grows the
//! resulting partition is scored. Splitting stops before a partition with
//! more than `n / 10` communities would be scored, and the best-scoring
//! partition seen wins.
//!
//! Edge betweenness uses Brandes' accumulation on the unweighted graph,
//! the same scheme as node betweenness but crediting the edge `(v, w)` on
//! each dependency step.

use std::collections::VecDeque;

use tracing::{debug, instrument};

use super::modularity::modularity;
use super::{ClusterOutput, StrategyError};
use crate::graph::WeightedGraph;

/// Run Girvan–Newman splitting.
///
/// # Errors
///
/// [`StrategyError::EmptyGraph`] for a graph without nodes;
/// [`StrategyError::NoPartition`] when no split stays within the
/// `n / 10` community limit (always the case below 20 nodes).
#[instrument(skip(graph), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn girvan_newman(graph: &WeightedGraph) -> Result<ClusterOutput, StrategyError> {
    let n = graph.node_count();
    if n == 0 {
        return Err(StrategyError::EmptyGraph);
    }
    let limit = n / 10;
    let edges = graph.edge_list();
    let mut active = vec![true; edges.len()];
    let mut remaining = edges.len();
    let (_, mut count) = components(n, &edges, &active);
    let mut best: Option<ClusterOutput> = None;

    while remaining > 0 {
        let before = count;
        let mut labels = Vec::new();
        while remaining > 0 && count <= before {
            let scores = edge_betweenness(n, &edges, &active);
            let Some(target) = argmax_active(&scores, &active) else {
                break;
            };
            active[target] = false;
            remaining -= 1;
            (labels, count) = components(n, &edges, &active);
        }
        if count <= before || count > limit {
            break;
        }

        let q = modularity(graph, &labels, 1.0);
        debug!(communities = count, modularity = q, "girvan-newman partition scored");
        if best.as_ref().is_none_or(|b| q > b.modularity) {
            best = Some(ClusterOutput {
                labels,
                modularity: q,
            });
        }
    }

    best.ok_or(StrategyError::NoPartition { limit })
}

fn argmax_active(scores: &[f64], active: &[bool]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if !active[i] {
            continue;
        }
        if best.is_none_or(|(_, b)| score > b) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

/// Component label per node (first-appearance numbering) and the count.
fn components(n: usize, edges: &[(usize, usize, f64)], active: &[bool]) -> (Vec<usize>, usize) {
    let adj = active_adjacency(n, edges, active);
    let mut labels = vec![usize::MAX; n];
    let mut count = 0;
    let mut queue = VecDeque::new();
    for start in 0..n {
        if labels[start] != usize::MAX {
            continue;
        }
        labels[start] = count;
        queue.push_back(start);
        while let Some(v) = queue.pop_front() {
            for &(w, _) in &adj[v] {
                if labels[w] == usize::MAX {
                    labels[w] = count;
                    queue.push_back(w);
                }
            }
        }
        count += 1;
    }
    (labels, count)
}

fn active_adjacency(
    n: usize,
    edges: &[(usize, usize, f64)],
    active: &[bool],
) -> Vec<Vec<(usize, usize)>> {
    let mut adj = vec![Vec::new(); n];
    for (id, &(a, b, _)) in edges.iter().enumerate() {
        if active[id] {
            adj[a].push((b, id));
            adj[b].push((a, id));
        }
    }
    adj
}

/// Unweighted edge betweenness over the active edges.
#[allow(clippy::cast_precision_loss)]
fn edge_betweenness(n: usize, edges: &[(usize, usize, f64)], active: &[bool]) -> Vec<f64> {
    let adj = active_adjacency(n, edges, active);
    let mut scores = vec![0.0_f64; edges.len()];

    for s in 0..n {
        let mut stack: Vec<usize> = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut dist: Vec<i64> = vec![-1; n];
        sigma[s] = 1.0;
        dist[s] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(s);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &(w, edge_id) in &adj[v] {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    predecessors[w].push((v, edge_id));
                }
            }
        }

        let mut delta = vec![0.0_f64; n];
        while let Some(w) = stack.pop() {
            for &(v, edge_id) in &predecessors[w] {
                let credit = (sigma[v] / sigma[w]) * (1.0 + delta[w]);
                scores[edge_id] += credit;
                delta[v] += credit;
            }
        }
    }

    // Each pair was counted from both ends.
    for score in &mut scores {
        *score /= 2.0;
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use aopnet_core::{Edge, GraphSnapshot, Node, NodeType};

    fn graph(n: usize, pairs: &[(usize, usize)]) -> WeightedGraph {
        let nodes = (0..n)
            .map(|i| Node::new(format!("n{i}"), "", NodeType::IntermediateEvent))
            .collect();
        let edges = pairs
            .iter()
            .map(|(a, b)| Edge::new(format!("n{a}"), format!("n{b}")))
            .collect();
        WeightedGraph::from_snapshot(&GraphSnapshot::new(nodes, edges).expect("valid"))
    }

    /// Two 10-node rings joined by one bridge between node 0 and node 10.
    fn two_rings() -> WeightedGraph {
        let mut pairs = Vec::new();
        for offset in [0, 10] {
            for i in 0..10 {
                pairs.push((offset + i, offset + (i + 1) % 10));
            }
        }
        pairs.push((0, 10));
        graph(20, &pairs)
    }

    #[test]
    fn bridge_has_highest_betweenness() {
        let g = two_rings();
        let edges = g.edge_list();
        let active = vec![true; edges.len()];
        let scores = edge_betweenness(20, &edges, &active);
        let top = argmax_active(&scores, &active).expect("edges present");
        assert_eq!(edges[top], (0, 10, 1.0));
        // 10 × 10 pairs cross the bridge.
        assert!((scores[top] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn splits_rings_apart() {
        let out = girvan_newman(&two_rings()).expect("partition within limit");
        assert_eq!(&out.labels[..10], &[0; 10]);
        assert_eq!(&out.labels[10..], &[1; 10]);
        assert!(out.modularity > 0.4);
    }

    #[test]
    fn small_graphs_have_no_admissible_partition() {
        let g = graph(6, &[(0, 1), (1, 2), (3, 4), (4, 5), (2, 3)]);
        assert_eq!(girvan_newman(&g), Err(StrategyError::NoPartition { limit: 0 }));
    }
}
