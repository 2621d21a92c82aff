//! Type-based chunking into `type-hypernode`s.

use std::collections::HashMap;

use aopnet_core::{Edge, Grouping, HypernodeInfo, Node, NodeType, edge_type};
use tracing::debug;

/// Weight of a member → type hypernode connection.
pub const TYPE_CONNECTION_WEIGHT: f64 = 0.5;

/// Output of [`chunk_by_type`].
#[derive(Debug, Clone, Default)]
pub struct TypeChunks {
    pub hypernodes: Vec<Node>,
    pub connections: Vec<Edge>,
    /// Largest chunk size actually used across all types.
    pub effective_chunk_size: usize,
    /// Whether the per-type chunk bound forced a larger chunk size.
    pub chunk_size_raised: bool,
}

/// Chunk size for a group of `total` nodes.
///
/// Normally `max_per_hypernode`; raised to `ceil(total / max_chunks)` when
/// the group would otherwise need more than `max_chunks` hypernodes.
#[must_use]
pub fn effective_chunk_size(total: usize, max_per_hypernode: usize, max_chunks: usize) -> usize {
    let max_per_hypernode = max_per_hypernode.max(1);
    let max_chunks = max_chunks.max(1);
    if total.div_ceil(max_per_hypernode) > max_chunks {
        total.div_ceil(max_chunks)
    } else {
        max_per_hypernode
    }
}

/// Group non-stressor original nodes by type and split each group into
/// consecutive chunks.
///
/// Types are visited in order of first appearance and members keep input
/// order. Stressors and synthetic nodes are never grouped.
#[must_use]
pub fn chunk_by_type(nodes: &[Node], max_per_hypernode: usize, max_chunks: usize) -> TypeChunks {
    let mut groups: Vec<(NodeType, Vec<&str>)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for node in nodes {
        if node.node_type == NodeType::Stressor || node.node_type.is_synthetic() {
            continue;
        }
        let key = node.node_type.group_key();
        let slot = *positions.entry(key).or_insert_with(|| {
            groups.push((node.node_type.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(node.id.as_str());
    }

    let mut out = TypeChunks {
        effective_chunk_size: max_per_hypernode.max(1),
        ..TypeChunks::default()
    };
    let mut largest_used = 0;

    for (original_type, members) in groups {
        let total = members.len();
        let size = effective_chunk_size(total, max_per_hypernode, max_chunks);
        if size > max_per_hypernode.max(1) {
            out.chunk_size_raised = true;
        }
        largest_used = largest_used.max(size);

        let type_key = original_type.group_key().to_string();
        let split = total > size;
        for (i, chunk) in members.chunks(size).enumerate() {
            let index = i + 1;
            let (id, label, chunk_no) = if split {
                (
                    format!("type-hypernode-{type_key}-{index}"),
                    format!("{type_key} Group {index} ({})", chunk.len()),
                    Some(index),
                )
            } else {
                (
                    format!("type-hypernode-{type_key}"),
                    format!("{type_key} Group ({})", chunk.len()),
                    None,
                )
            };

            for member in chunk {
                out.connections.push(
                    Edge::typed(*member, id.clone(), edge_type::HYPERNODE_CONNECTION)
                        .with_weight(TYPE_CONNECTION_WEIGHT),
                );
            }
            let info = HypernodeInfo::new(
                chunk.iter().map(|m| (*m).to_string()).collect(),
                Grouping::ByType {
                    original_type: original_type.clone(),
                    chunk: chunk_no,
                },
            );
            out.hypernodes
                .push(Node::new(id, label, NodeType::TypeHypernode).with_hypernode(info));
        }
        debug!(node_type = %type_key, total, chunk_size = size, "type grouped");
    }

    if largest_used > 0 {
        out.effective_chunk_size = largest_used;
    }
    out
}
