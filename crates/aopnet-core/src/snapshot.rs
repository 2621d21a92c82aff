//! Immutable graph snapshots and their process-wide publication point.
//!
//! A [`GraphSnapshot`] owns the canonical node and edge tables. Every
//! analysis takes `&GraphSnapshot` and allocates its own result; nothing
//! mutates a snapshot after construction.
//!
//! [`SnapshotHandle`] holds the currently published snapshot. Readers take
//! their own `Arc` and keep seeing the tables they started with even if a
//! rebuild publishes a replacement mid-query.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, instrument};

use crate::adjacency::{Adjacency, build_adjacency};
use crate::error::ValidationError;
use crate::model::{Edge, Node};

// ---------------------------------------------------------------------------
// GraphSnapshot
// ---------------------------------------------------------------------------

/// Validated node and edge tables with an id index.
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<String, usize>,
    pair_index: HashMap<(String, String), usize>,
    content_hash: String,
}

impl GraphSnapshot {
    /// Validate and index the tables.
    ///
    /// Edges are kept exactly as supplied, including edges whose endpoints
    /// are not in `nodes`; consumers skip those.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyNodeId`] or
    /// [`ValidationError::DuplicateNodeId`] when node ids are not unique
    /// non-empty strings.
    #[instrument(skip(nodes, edges), fields(nodes = nodes.len(), edges = edges.len()))]
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, ValidationError> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            if node.id.trim().is_empty() {
                return Err(ValidationError::EmptyNodeId { position });
            }
            if index.insert(node.id.clone(), position).is_some() {
                return Err(ValidationError::DuplicateNodeId(node.id.clone()));
            }
        }

        let snapshot = Self::from_indexed(nodes, edges, index);
        debug!(hash = %snapshot.content_hash, "graph snapshot built");
        Ok(snapshot)
    }

    fn from_indexed(nodes: Vec<Node>, edges: Vec<Edge>, index: HashMap<String, usize>) -> Self {
        let mut pair_index = HashMap::with_capacity(edges.len());
        for (position, edge) in edges.iter().enumerate() {
            pair_index
                .entry((edge.source.clone(), edge.target.clone()))
                .or_insert(position);
        }
        let content_hash = compute_content_hash(&nodes, &edges);
        Self {
            nodes,
            edges,
            index,
            pair_index,
            content_hash,
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Position of a node in snapshot order.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Neighbor lists over this snapshot's tables.
    #[must_use]
    pub fn adjacency(&self, directed: bool) -> Adjacency {
        build_adjacency(&self.nodes, &self.edges, directed)
    }

    /// First edge, in input order, going from `source` to `target`.
    #[must_use]
    pub fn edges_between(&self, source: &str, target: &str) -> Option<&Edge> {
        self.pair_index
            .get(&(source.to_string(), target.to_string()))
            .map(|&i| &self.edges[i])
    }

    /// Sub-snapshot holding only `ids` and the edges between them.
    ///
    /// Unknown ids are ignored; node order follows this snapshot.
    #[must_use]
    pub fn induced<S: AsRef<str>>(&self, ids: &[S]) -> Self {
        let keep: HashSet<&str> = ids.iter().map(AsRef::as_ref).collect();
        let nodes: Vec<Node> = self
            .nodes
            .iter()
            .filter(|n| keep.contains(n.id.as_str()))
            .cloned()
            .collect();
        let edges: Vec<Edge> = self
            .edges
            .iter()
            .filter(|e| keep.contains(e.source.as_str()) && keep.contains(e.target.as_str()))
            .cloned()
            .collect();
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        Self::from_indexed(nodes, edges, index)
    }

    /// BLAKE3 hash of the node and edge tables, `blake3:`-prefixed.
    ///
    /// Changes whenever a node, an edge, or their order changes.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Give back the owned tables.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Node>, Vec<Edge>) {
        (self.nodes, self.edges)
    }
}

fn compute_content_hash(nodes: &[Node], edges: &[Edge]) -> String {
    let mut hasher = blake3::Hasher::new();
    for node in nodes {
        hasher.update(b"N\x00");
        hasher.update(node.id.as_bytes());
        hasher.update(b"\x00");
        hasher.update(node.label.as_bytes());
        hasher.update(b"\x00");
        hasher.update(node.node_type.as_str().as_bytes());
        for pathway in &node.pathway_ids {
            hasher.update(b"\x00");
            hasher.update(pathway.as_bytes());
        }
        for (key, value) in &node.attributes {
            hasher.update(b"\x01");
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
        }
        hasher.update(b"\n");
    }
    for edge in edges {
        hasher.update(b"E\x00");
        hasher.update(edge.source.as_bytes());
        hasher.update(b"\x00");
        hasher.update(edge.target.as_bytes());
        hasher.update(b"\x00");
        hasher.update(edge.edge_type.as_bytes());
        hasher.update(b"\x00");
        hasher.update(edge.pathway_id.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"\x00");
        hasher.update(edge.adjacency.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"\x00");
        hasher.update(&edge.confidence.unwrap_or(f64::NAN).to_bits().to_le_bytes());
        hasher.update(b"\n");
    }
    format!("blake3:{}", hasher.finalize().to_hex())
}

// ---------------------------------------------------------------------------
// SnapshotHandle
// ---------------------------------------------------------------------------

/// Publication point for the current snapshot.
///
/// Swapping is a single pointer replacement under a write lock; readers
/// clone the `Arc` under a read lock and then work lock-free.
#[derive(Debug, Default)]
pub struct SnapshotHandle {
    current: RwLock<Arc<GraphSnapshot>>,
}

impl SnapshotHandle {
    #[must_use]
    pub fn new(snapshot: GraphSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot published most recently.
    #[must_use]
    pub fn current(&self) -> Arc<GraphSnapshot> {
        Arc::clone(&*self.current.read())
    }

    /// Replace the published snapshot, returning the previous one.
    pub fn publish(&self, snapshot: GraphSnapshot) -> Arc<GraphSnapshot> {
        let next = Arc::new(snapshot);
        debug!(hash = %next.content_hash(), "publishing graph snapshot");
        std::mem::replace(&mut *self.current.write(), next)
    }
}
