//! `(source, target, type)` edge deduplication.

use std::collections::HashSet;

use aopnet_core::Edge;

/// Keep the first edge for every `(source, target, type)` key.
///
/// Returns the surviving edges in input order and how many were dropped.
pub fn dedup_edges<I>(edges: I) -> (Vec<Edge>, usize)
where
    I: IntoIterator<Item = Edge>,
{
    let mut seen: HashSet<(String, String, String)> = HashSet::new();
    let mut kept = Vec::new();
    let mut removed = 0;
    for edge in edges {
        let key = (
            edge.source.clone(),
            edge.target.clone(),
            edge.edge_type.clone(),
        );
        if seen.insert(key) {
            kept.push(edge);
        } else {
            removed += 1;
        }
    }
    (kept, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_triple_keeps_first() {
        let edges = vec![
            Edge::new("A", "B").with_confidence(0.9),
            Edge::new("A", "B").with_confidence(0.1),
            Edge::typed("A", "B", "hypernode-connection"),
            Edge::new("B", "A"),
        ];
        let (kept, removed) = dedup_edges(edges);
        assert_eq!(removed, 1);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].confidence, Some(0.9));
    }

    #[test]
    fn empty_input_is_fine() {
        let (kept, removed) = dedup_edges(Vec::new());
        assert!(kept.is_empty());
        assert_eq!(removed, 0);
    }
}
