//! Spectral clustering on the normalized Laplacian.
//!
//! Embeds every node with the eigenvectors of the `k` smallest eigenvalues
//! of `L = I - D^{-1/2} A D^{-1/2}`, normalizes each row, and clusters the
//! rows with k-means. When no cluster count is given, `k` is chosen at the
//! largest gap between consecutive eigenvalues and clamped to
//! `[2, max(2, n / 5)]`.

use nalgebra::{DMatrix, SymmetricEigen};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, instrument};

use super::modularity::modularity;
use super::{ClusterOutput, StrategyError};
use crate::graph::{WeightedGraph, renumber};

const KMEANS_MAX_ITERATIONS: usize = 100;
const TIE_TOLERANCE: f64 = 1e-12;

/// Run spectral clustering.
///
/// # Errors
///
/// [`StrategyError::EmptyGraph`], [`StrategyError::InvalidClusterCount`]
/// for `k < 2`, [`StrategyError::TooFewNodes`] when `n < k`, and
/// [`StrategyError::NonFiniteSpectrum`] if the decomposition breaks down.
#[instrument(skip(graph), fields(nodes = graph.node_count()))]
pub fn spectral(
    graph: &WeightedGraph,
    clusters: Option<usize>,
    seed: u64,
) -> Result<ClusterOutput, StrategyError> {
    let n = graph.node_count();
    if n == 0 {
        return Err(StrategyError::EmptyGraph);
    }

    let laplacian = normalized_laplacian(graph);
    let eigen = SymmetricEigen::new(laplacian);
    if eigen.eigenvalues.iter().any(|v| !v.is_finite())
        || eigen.eigenvectors.iter().any(|v| !v.is_finite())
    {
        return Err(StrategyError::NonFiniteSpectrum);
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
    let sorted: Vec<f64> = order.iter().map(|&i| eigen.eigenvalues[i]).collect();

    let k = clusters.unwrap_or_else(|| eigengap_k(&sorted, n));
    if k < 2 {
        return Err(StrategyError::InvalidClusterCount(k));
    }
    if n < k {
        return Err(StrategyError::TooFewNodes { nodes: n, k });
    }
    debug!(k, "spectral cluster count chosen");

    let rows: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let mut row: Vec<f64> = order[..k]
                .iter()
                .map(|&col| eigen.eigenvectors[(i, col)])
                .collect();
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                for v in &mut row {
                    *v /= norm;
                }
            }
            row
        })
        .collect();

    let labels = renumber(&kmeans(&rows, k, seed));
    let modularity = modularity(graph, &labels, 1.0);
    Ok(ClusterOutput { labels, modularity })
}

fn normalized_laplacian(graph: &WeightedGraph) -> DMatrix<f64> {
    let n = graph.node_count();
    let degrees = graph.weighted_degrees();
    let inv_sqrt: Vec<f64> = degrees
        .iter()
        .map(|&d| if d > 0.0 { 1.0 / d.sqrt() } else { 0.0 })
        .collect();

    let mut laplacian = DMatrix::<f64>::identity(n, n);
    for (a, b, w) in graph.edge_list() {
        let value = w * inv_sqrt[a] * inv_sqrt[b];
        laplacian[(a, b)] -= value;
        laplacian[(b, a)] -= value;
    }
    laplacian
}

/// Number of eigenvalues below the widest gap, clamped to `[2, max(2, n / 5)]`.
fn eigengap_k(sorted: &[f64], n: usize) -> usize {
    let upper = (n / 5).max(2);
    let mut best_k = 2;
    let mut best_gap = f64::NEG_INFINITY;
    for i in 1..sorted.len() {
        let gap = sorted[i] - sorted[i - 1];
        if gap > best_gap {
            best_gap = gap;
            best_k = i;
        }
    }
    best_k.clamp(2, upper)
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Lloyd's k-means with farthest-point seeding.
///
/// The first center and ties between equally distant candidates are drawn
/// from a generator seeded with `seed`.
#[allow(clippy::cast_precision_loss)]
fn kmeans(rows: &[Vec<f64>], k: usize, seed: u64) -> Vec<usize> {
    let n = rows.len();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut centers: Vec<Vec<f64>> = vec![rows[rng.gen_range(0..n)].clone()];
    while centers.len() < k {
        let distances: Vec<f64> = rows
            .iter()
            .map(|row| {
                centers
                    .iter()
                    .map(|c| squared_distance(row, c))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        let far = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let candidates: Vec<usize> = (0..n)
            .filter(|&i| (far - distances[i]).abs() <= TIE_TOLERANCE)
            .collect();
        let pick = candidates[rng.gen_range(0..candidates.len())];
        centers.push(rows[pick].clone());
    }

    let mut assignment = vec![usize::MAX; n];
    for _ in 0..KMEANS_MAX_ITERATIONS {
        let mut changed = false;
        for (i, row) in rows.iter().enumerate() {
            let mut nearest = 0;
            let mut nearest_distance = f64::INFINITY;
            for (c, center) in centers.iter().enumerate() {
                let d = squared_distance(row, center);
                if d < nearest_distance {
                    nearest = c;
                    nearest_distance = d;
                }
            }
            if assignment[i] != nearest {
                assignment[i] = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let dims = rows[0].len();
        let mut sums = vec![vec![0.0_f64; dims]; k];
        let mut counts = vec![0_usize; k];
        for (row, &c) in rows.iter().zip(&assignment) {
            counts[c] += 1;
            for (acc, v) in sums[c].iter_mut().zip(row) {
                *acc += v;
            }
        }
        for (c, sum) in sums.into_iter().enumerate() {
            if counts[c] > 0 {
                centers[c] = sum.into_iter().map(|v| v / counts[c] as f64).collect();
            }
        }
    }

    assignment
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

    fn two_cliques() -> WeightedGraph {
        let mut pairs = Vec::new();
        for offset in [0, 5] {
            for a in 0..5 {
                for b in (a + 1)..5 {
                    pairs.push((offset + a, offset + b));
                }
            }
        }
        pairs.push((4, 5));
        graph(10, &pairs)
    }

    #[test]
    fn recovers_two_cliques() {
        let out = spectral(&two_cliques(), Some(2), 42).expect("spectral runs");
        assert!(out.labels[..5].iter().all(|&l| l == out.labels[0]));
        assert!(out.labels[5..].iter().all(|&l| l == out.labels[5]));
        assert_ne!(out.labels[0], out.labels[5]);
    }

    #[test]
    fn eigengap_picks_block_count() {
        let out = spectral(&two_cliques(), None, 42).expect("spectral runs");
        assert_eq!(out.labels.iter().max(), Some(&1));
    }

    #[test]
    fn rejects_bad_cluster_counts() {
        let g = graph(3, &[(0, 1), (1, 2)]);
        assert_eq!(spectral(&g, Some(1), 42), Err(StrategyError::InvalidClusterCount(1)));
        assert_eq!(
            spectral(&g, Some(4), 42),
            Err(StrategyError::TooFewNodes { nodes: 3, k: 4 })
        );
    }

    #[test]
    fn eigengap_is_clamped() {
        assert_eq!(eigengap_k(&[0.0, 0.1, 0.2, 1.5], 4), 2);
        let mut eigenvalues = vec![0.0; 3];
        eigenvalues.extend([1.0; 12]);
        assert_eq!(eigengap_k(&eigenvalues, 15), 3);
        assert_eq!(eigengap_k(&[0.0, 1.0], 2), 2);
    }
}
