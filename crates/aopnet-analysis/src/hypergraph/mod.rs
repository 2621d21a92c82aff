//! Hypergraph summarization.
//!
//! # Overview
//!
//! Compresses a pathway graph by attaching synthetic hypernodes that stand
//! for groups of original nodes. The original nodes and edges stay; the
//! builder only adds.
//!
//! ## Pipeline
//!
//! ```text
//! snapshot edges
//!        ↓  dedup::dedup_edges            (source, target, type), keep first
//! unique input edges
//!        ↓  chunk::chunk_by_type          type-hypernode-{type}[-{i}]
//!        ↓  stressor::group_stressors     stressor-hypernode-aop-{key}
//!        ↓  stressor::cross_link          stressor hypernode → first outcome hypernode
//!        ↓  overlay::community_overlay    community-hypernode-{id} (opt-in)
//!        ↓  dedup::dedup_edges            across synthesized connections
//! HypergraphResult
//!        ↓  merge
//! EnrichedGraph
//! ```
//!
//! ## Idempotence
//!
//! Synthetic nodes in the input are never grouped, and stressor and
//! cross-link connections are only added for `(source, target)` pairs not
//! already connected. Re-running [`build_hypergraph`] on its own merged
//! output (without the community overlay) yields the same hypernodes and
//! no new edges.

pub mod chunk;
pub mod dedup;
pub mod overlay;
pub mod stressor;

use std::collections::{BTreeMap, HashSet};

use aopnet_core::{Edge, GraphSnapshot, Node, NodeType, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::community::{CommunityParams, CommunityResult, detect_communities};

pub use chunk::{TypeChunks, chunk_by_type, effective_chunk_size};
pub use dedup::dedup_edges;
pub use overlay::community_overlay;
pub use stressor::{ConnectedPairs, CrossLinks, StressorGroups, cross_link, group_stressors};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Builder options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HypergraphOptions {
    /// Largest chunk per type hypernode. Values below 1 are treated as 1.
    pub max_per_hypernode: i64,
    /// Detect communities and add `community-hypernode`s.
    pub use_community_overlay: bool,
    pub community_strategy: String,
    pub community_params: CommunityParams,
    /// Skip stressor grouping and cross-links entirely.
    pub exclude_stressor_hypernodes: bool,
    /// Cap on hypernodes per type; raises the chunk size when exceeded.
    pub max_chunks_per_type: usize,
    /// Pathway display names keyed by raw or normalized pathway id.
    pub pathway_names: BTreeMap<String, String>,
}

impl Default for HypergraphOptions {
    fn default() -> Self {
        Self {
            max_per_hypernode: 4,
            use_community_overlay: false,
            community_strategy: "louvain".to_string(),
            community_params: CommunityParams::default(),
            exclude_stressor_hypernodes: false,
            max_chunks_per_type: 256,
            pathway_names: BTreeMap::new(),
        }
    }
}

impl HypergraphOptions {
    /// `max_per_hypernode` clamped to at least 1.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        usize::try_from(self.max_per_hypernode.max(1)).unwrap_or(usize::MAX)
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Counters describing one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypergraphStats {
    pub original_nodes: usize,
    pub original_edges: usize,
    pub input_duplicates_removed: usize,
    pub hypernodes: usize,
    pub connections: usize,
    pub duplicate_connections_removed: usize,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub stressor_nodes: usize,
    pub stressor_hypernodes: usize,
    pub ungrouped_stressors: usize,
    pub cross_links_created: usize,
    pub cross_links_skipped: usize,
    pub community_hypernodes: usize,
    pub effective_chunk_size: usize,
    pub chunk_size_raised: bool,
}

/// Synthesized elements, before merging with the originals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypergraphResult {
    pub hypernodes: Vec<Node>,
    pub connections: Vec<Edge>,
    /// Deduplicated original edges.
    pub edges: Vec<Edge>,
    pub stats: HypergraphStats,
}

/// Originals plus hypernodes, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub stats: HypergraphStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communities: Option<CommunityResult>,
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Run the builder pipeline and return the synthesized elements.
///
/// `communities` is only used when `options.use_community_overlay` is set.
///
/// # Errors
///
/// [`ValidationError::InvalidParameter`] when `max_chunks_per_type` is 0.
#[instrument(
    skip(snapshot, options, communities),
    fields(nodes = snapshot.node_count(), edges = snapshot.edge_count())
)]
pub fn build_hypergraph_elements(
    snapshot: &GraphSnapshot,
    options: &HypergraphOptions,
    communities: Option<&CommunityResult>,
) -> Result<HypergraphResult, ValidationError> {
    if options.max_chunks_per_type == 0 {
        return Err(ValidationError::InvalidParameter {
            name: "max_chunks_per_type",
            reason: "must be at least 1".to_string(),
        });
    }

    let mut stats = HypergraphStats {
        original_nodes: snapshot.node_count(),
        original_edges: snapshot.edge_count(),
        ..HypergraphStats::default()
    };

    // Step 1: input-edge dedup.
    let (edges, input_duplicates) = dedup_edges(snapshot.edges().iter().cloned());
    stats.input_duplicates_removed = input_duplicates;
    let mut connected: ConnectedPairs = edges
        .iter()
        .map(|e| (e.source.clone(), e.target.clone()))
        .collect();
    debug!(removed = input_duplicates, "input edges deduplicated");

    // Step 2: type chunking.
    let chunks = chunk_by_type(
        snapshot.nodes(),
        options.chunk_size(),
        options.max_chunks_per_type,
    );
    stats.effective_chunk_size = chunks.effective_chunk_size;
    stats.chunk_size_raised = chunks.chunk_size_raised;
    connected.extend(
        chunks
            .connections
            .iter()
            .map(|e| (e.source.clone(), e.target.clone())),
    );

    let mut hypernodes = chunks.hypernodes;
    let mut connections = chunks.connections;

    // Steps 3 and 4: stressor grouping and cross-link.
    if options.exclude_stressor_hypernodes {
        stats.stressor_nodes = snapshot
            .nodes()
            .iter()
            .filter(|n| n.node_type == NodeType::Stressor)
            .count();
        debug!(stressors = stats.stressor_nodes, "stressor hypernodes excluded");
    } else {
        let names = stressor::normalize_catalog(&options.pathway_names);
        let groups = group_stressors(snapshot.nodes(), &names, &mut connected);
        stats.stressor_nodes = groups.stressor_nodes;
        stats.stressor_hypernodes = groups.hypernodes.len();
        stats.ungrouped_stressors = groups.ungrouped;

        let links = cross_link(&groups.hypernodes, &hypernodes, &mut connected);
        stats.cross_links_created = links.created;
        stats.cross_links_skipped = links.skipped;

        hypernodes.extend(groups.hypernodes);
        connections.extend(groups.connections);
        connections.extend(links.connections);
    }

    // Step 5: community overlay.
    if options.use_community_overlay
        && let Some(communities) = communities
    {
        let (community_nodes, community_edges) = community_overlay(communities);
        stats.community_hypernodes = community_nodes.len();
        hypernodes.extend(community_nodes);
        connections.extend(community_edges);
    }

    // Step 6: final dedup.
    let (connections, duplicate_connections) = dedup_edges(connections);
    stats.duplicate_connections_removed = duplicate_connections;

    stats.hypernodes = hypernodes.len();
    stats.connections = connections.len();
    stats.total_nodes = stats.original_nodes + stats.hypernodes;
    stats.total_edges = edges.len() + stats.connections;

    Ok(HypergraphResult {
        hypernodes,
        connections,
        edges,
        stats,
    })
}

/// Combine originals with the synthesized elements.
///
/// Hypernodes whose id is already present are not added twice; edges are
/// deduplicated by `(source, target, type)`.
#[must_use]
pub fn merge(snapshot: &GraphSnapshot, result: HypergraphResult) -> EnrichedGraph {
    let HypergraphResult {
        hypernodes,
        connections,
        edges,
        mut stats,
    } = result;

    let mut nodes: Vec<Node> = snapshot.nodes().to_vec();
    let mut present: HashSet<String> = nodes.iter().map(|n| n.id.clone()).collect();
    for hypernode in hypernodes {
        if present.insert(hypernode.id.clone()) {
            nodes.push(hypernode);
        }
    }
    let (edges, _) = dedup_edges(edges.into_iter().chain(connections));

    stats.total_nodes = nodes.len();
    stats.total_edges = edges.len();
    EnrichedGraph {
        nodes,
        edges,
        stats,
        communities: None,
    }
}

/// Build the enriched graph for `snapshot`.
///
/// Runs community detection first when the overlay is requested.
///
/// # Errors
///
/// Propagates [`build_hypergraph_elements`] parameter validation.
#[instrument(skip(snapshot, options), fields(nodes = snapshot.node_count()))]
pub fn build_hypergraph(
    snapshot: &GraphSnapshot,
    options: &HypergraphOptions,
) -> Result<EnrichedGraph, ValidationError> {
    let communities = options.use_community_overlay.then(|| {
        detect_communities(
            snapshot,
            &options.community_strategy,
            &options.community_params,
        )
    });
    let result = build_hypergraph_elements(snapshot, options, communities.as_ref())?;
    let mut enriched = merge(snapshot, result);
    enriched.communities = communities;

    info!(
        hypernodes = enriched.stats.hypernodes,
        connections = enriched.stats.connections,
        total_nodes = enriched.stats.total_nodes,
        total_edges = enriched.stats.total_edges,
        "hypergraph built"
    );
    Ok(enriched)
}
