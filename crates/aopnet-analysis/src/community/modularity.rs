//! Newman modularity of a partition over the weighted view.

use crate::graph::WeightedGraph;

/// Modularity `Q = Σ_c [ L_c / m - γ (d_c / 2m)² ]`.
///
/// `labels[i]` is the community of node `i`; labels must be dense
/// (`0..count`). Returns 0.0 for a graph with no edge weight.
#[must_use]
pub fn modularity(graph: &WeightedGraph, labels: &[usize], resolution: f64) -> f64 {
    let m = graph.total_weight();
    if m <= 0.0 || labels.is_empty() {
        return 0.0;
    }
    let count = labels.iter().max().map_or(0, |&max| max + 1);
    let mut internal = vec![0.0_f64; count];
    let mut total = vec![0.0_f64; count];

    for (a, b, w) in graph.edge_list() {
        if labels[a] == labels[b] {
            internal[labels[a]] += w;
        }
    }
    for (i, degree) in graph.weighted_degrees().into_iter().enumerate() {
        total[labels[i]] += degree;
    }

    let two_m = 2.0 * m;
    internal
        .iter()
        .zip(&total)
        .map(|(l_c, d_c)| l_c / m - resolution * (d_c / two_m).powi(2))
        .sum()
}
