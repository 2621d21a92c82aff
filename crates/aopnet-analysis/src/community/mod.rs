//! Community detection with an ordered fallback chain.
//!
//! # Overview
//!
//! [`detect_communities`] never fails. It resolves the requested strategy
//! name, runs it, and on any [`StrategyError`] falls back first to the
//! primary strategy (Louvain) and finally to connected components, which
//! always succeeds. Each fallback step is logged at `warn` and recorded in
//! [`CommunityResult::fallback_reason`].
//!
//! ```text
//! requested ──Err──▶ louvain ──Err──▶ connected components
//!     │Ok               │Ok                  │
//!     ▼                 ▼                    ▼
//!               CommunityResult
//! ```
//!
//! | name       | runs                                   |
//! |------------|----------------------------------------|
//! | `louvain`  | [`louvain::louvain`]                   |
//! | `leiden`   | alias of `louvain`                     |
//! | `walktrap` | [`girvan_newman::girvan_newman`]       |
//! | `spectral` | [`spectral::spectral`]                 |
//!
//! Communities are numbered `0..` in order of first appearance in the
//! snapshot and list their members in snapshot order. Each node is also
//! given a display colour from [`COMMUNITY_PALETTE`], indexed by its
//! community id modulo the palette length.

pub mod girvan_newman;
pub mod louvain;
pub mod modularity;
pub mod spectral;

use std::collections::BTreeMap;
use std::fmt;

use aopnet_core::GraphSnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::graph::{WeightedGraph, renumber};

/// Method name reported when the components fallback produced the result.
pub const COMPONENTS_METHOD: &str = "connected_components";

/// Display colours cycled over community ids.
pub const COMMUNITY_PALETTE: [&str; 15] = [
    "#ff6b6b", "#4ecdc4", "#45b7d1", "#96ceb4", "#ffeaa7", "#dda0dd", "#98d8c8", "#f7dc6f",
    "#bb8fce", "#85c1e9", "#f8c471", "#82e0aa", "#aed6f1", "#f1948a", "#85c1e9",
];

/// Palette colour for a community id.
#[must_use]
pub const fn community_color(community_id: usize) -> &'static str {
    COMMUNITY_PALETTE[community_id % COMMUNITY_PALETTE.len()]
}

// ---------------------------------------------------------------------------
// Strategy selection
// ---------------------------------------------------------------------------

/// A clustering strategy a caller can ask for by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommunityStrategy {
    Louvain,
    Leiden,
    Walktrap,
    Spectral,
}

impl CommunityStrategy {
    /// Strategy tried when the requested one fails.
    pub const PRIMARY: Self = Self::Louvain;

    /// Resolve a strategy name, case-insensitively.
    ///
    /// # Errors
    ///
    /// [`StrategyError::UnknownStrategy`] for any other name.
    pub fn parse(name: &str) -> Result<Self, StrategyError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "louvain" => Ok(Self::Louvain),
            "leiden" => Ok(Self::Leiden),
            "walktrap" => Ok(Self::Walktrap),
            "spectral" => Ok(Self::Spectral),
            _ => Err(StrategyError::UnknownStrategy(name.to_string())),
        }
    }

    /// Name of the algorithm that actually runs for this strategy.
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::Louvain | Self::Leiden => "louvain",
            Self::Walktrap => "walktrap",
            Self::Spectral => "spectral",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Louvain => "louvain",
            Self::Leiden => "leiden",
            Self::Walktrap => "walktrap",
            Self::Spectral => "spectral",
        }
    }

    fn run(
        self,
        graph: &WeightedGraph,
        params: &CommunityParams,
    ) -> Result<ClusterOutput, StrategyError> {
        match self {
            Self::Louvain | Self::Leiden => louvain::louvain(graph, params.resolution),
            Self::Walktrap => girvan_newman::girvan_newman(graph),
            Self::Spectral => spectral::spectral(graph, params.clusters, params.seed),
        }
    }
}

impl fmt::Display for CommunityStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy parameters. Each strategy reads only the fields it uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityParams {
    /// Louvain resolution `γ`; larger values favour smaller communities.
    pub resolution: f64,
    /// Walk length for `walktrap`. Accepted and echoed; the edge-betweenness
    /// splitter does not use it.
    pub steps: usize,
    /// Fixed spectral cluster count; `None` picks one by eigengap.
    pub clusters: Option<usize>,
    /// Seed for spectral k-means tie-breaking.
    pub seed: u64,
}

impl Default for CommunityParams {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            steps: 4,
            clusters: None,
            seed: 42,
        }
    }
}

/// Why a strategy could not produce a partition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("unknown community strategy `{0}`")]
    UnknownStrategy(String),

    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("graph has no edge weight")]
    NoEdgeWeight,

    #[error("no partition with at most {limit} communities")]
    NoPartition { limit: usize },

    #[error("cannot form {k} clusters from {nodes} nodes")]
    TooFewNodes { nodes: usize, k: usize },

    #[error("cluster count must be at least 2, got {0}")]
    InvalidClusterCount(usize),

    #[error("eigen-decomposition produced non-finite values")]
    NonFiniteSpectrum,
}

/// Raw strategy output: one label per node index, plus modularity.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOutput {
    pub labels: Vec<usize>,
    pub modularity: f64,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// One detected community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: usize,
    pub members: Vec<String>,
    pub size: usize,
}

/// Detector output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityResult {
    /// Algorithm that produced the partition.
    pub method: String,
    /// Strategy name the caller asked for, verbatim.
    pub requested: String,
    pub communities: Vec<Community>,
    pub modularity: f64,
    pub node_to_community: BTreeMap<String, usize>,
    /// [`community_color`] of each node's community, keyed like
    /// `node_to_community`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_colors: BTreeMap<String, String>,
    /// Failures that led to `method` differing from the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl CommunityResult {
    /// An empty partition.
    #[must_use]
    pub fn empty(requested: &str) -> Self {
        Self {
            method: COMPONENTS_METHOD.to_string(),
            requested: requested.to_string(),
            communities: Vec::new(),
            modularity: 0.0,
            node_to_community: BTreeMap::new(),
            node_colors: BTreeMap::new(),
            fallback_reason: None,
        }
    }

    #[must_use]
    pub fn community_count(&self) -> usize {
        self.communities.len()
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Partition `snapshot` into communities.
///
/// Never fails; see the module docs for the fallback order.
#[must_use]
#[instrument(skip(snapshot, params), fields(nodes = snapshot.node_count()))]
pub fn detect_communities(
    snapshot: &GraphSnapshot,
    strategy: &str,
    params: &CommunityParams,
) -> CommunityResult {
    let graph = WeightedGraph::from_snapshot(snapshot);
    let mut reasons: Vec<String> = Vec::new();

    let mut attempts: Vec<CommunityStrategy> = Vec::with_capacity(2);
    match CommunityStrategy::parse(strategy) {
        Ok(parsed) => attempts.push(parsed),
        Err(err) => {
            warn!(%err, "falling back to primary community strategy");
            reasons.push(err.to_string());
        }
    }
    if attempts
        .first()
        .is_none_or(|s| s.method() != CommunityStrategy::PRIMARY.method())
    {
        attempts.push(CommunityStrategy::PRIMARY);
    }

    for attempt in attempts {
        match attempt.run(&graph, params) {
            Ok(output) => {
                let result = assemble(snapshot, strategy, attempt.method(), output, &reasons);
                info!(
                    method = %result.method,
                    communities = result.community_count(),
                    modularity = result.modularity,
                    "communities detected"
                );
                return result;
            }
            Err(err) => {
                warn!(strategy = attempt.as_str(), %err, "community strategy failed");
                reasons.push(format!("{attempt}: {err}"));
            }
        }
    }

    let labels = graph.component_labels();
    let count = labels.iter().max().map_or(0, |&max| max + 1);
    let modularity = if count >= 2 {
        modularity::modularity(&graph, &labels, 1.0)
    } else {
        0.0
    };
    let result = assemble(
        snapshot,
        strategy,
        COMPONENTS_METHOD,
        ClusterOutput { labels, modularity },
        &reasons,
    );
    info!(components = result.community_count(), "fell back to connected components");
    result
}

fn assemble(
    snapshot: &GraphSnapshot,
    requested: &str,
    method: &str,
    output: ClusterOutput,
    reasons: &[String],
) -> CommunityResult {
    let labels = renumber(&output.labels);
    let count = labels.iter().max().map_or(0, |&max| max + 1);
    let mut communities: Vec<Community> = (0..count)
        .map(|id| Community {
            id,
            members: Vec::new(),
            size: 0,
        })
        .collect();
    let mut node_to_community = BTreeMap::new();

    for (node, &label) in snapshot.nodes().iter().zip(&labels) {
        communities[label].members.push(node.id.clone());
        node_to_community.insert(node.id.clone(), label);
    }
    for community in &mut communities {
        community.size = community.members.len();
    }
    let node_colors = node_to_community
        .iter()
        .map(|(id, &label)| (id.clone(), community_color(label).to_string()))
        .collect();

    CommunityResult {
        method: method.to_string(),
        requested: requested.to_string(),
        communities,
        modularity: output.modularity,
        node_to_community,
        node_colors,
        fallback_reason: (!reasons.is_empty()).then(|| reasons.join("; ")),
    }
}
