//! Adjacency construction and type filtering.

use std::collections::{HashMap, HashSet};

use crate::model::{Edge, Node};

/// Neighbor lists keyed by node id.
pub type Adjacency = HashMap<String, Vec<String>>;

/// Build neighbor lists from node and edge tables.
///
/// Every node gets an entry, possibly empty. Edges whose endpoints are not
/// both present are skipped. Neighbor order follows edge input order and a
/// neighbor is listed at most once. In undirected mode each edge is
/// inserted in both directions.
#[must_use]
pub fn build_adjacency(nodes: &[Node], edges: &[Edge], directed: bool) -> Adjacency {
    let mut adjacency: Adjacency = nodes.iter().map(|n| (n.id.clone(), Vec::new())).collect();
    let mut seen: HashSet<(&str, &str)> = HashSet::with_capacity(edges.len() * 2);

    for edge in edges {
        let (source, target) = (edge.source.as_str(), edge.target.as_str());
        if !adjacency.contains_key(source) || !adjacency.contains_key(target) {
            continue;
        }
        push_neighbor(&mut adjacency, &mut seen, source, target);
        if !directed {
            push_neighbor(&mut adjacency, &mut seen, target, source);
        }
    }

    adjacency
}

fn push_neighbor<'a>(
    adjacency: &mut Adjacency,
    seen: &mut HashSet<(&'a str, &'a str)>,
    from: &'a str,
    to: &'a str,
) {
    if seen.insert((from, to))
        && let Some(neighbors) = adjacency.get_mut(from)
    {
        neighbors.push(to.to_string());
    }
}

/// Nodes whose type string or id contains any of `patterns`.
///
/// Matching is case-insensitive substring; input order is preserved.
#[must_use]
pub fn filter_by_type<'a, S: AsRef<str>>(nodes: &'a [Node], patterns: &[S]) -> Vec<&'a Node> {
    let patterns: Vec<String> = patterns
        .iter()
        .map(|p| p.as_ref().to_lowercase())
        .collect();

    nodes
        .iter()
        .filter(|node| {
            let node_type = node.node_type.as_str().to_lowercase();
            let id = node.id.to_lowercase();
            patterns
                .iter()
                .any(|p| node_type.contains(p.as_str()) || id.contains(p.as_str()))
        })
        .collect()
}
