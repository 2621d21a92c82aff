//! Pathway-scoped stressor grouping and the stressor → outcome cross-link.

use std::collections::{BTreeMap, HashMap, HashSet};

use aopnet_core::{
    Edge, Grouping, HypernodeInfo, Node, NodeType, PATHWAY_NAME_ATTR, edge_type,
    normalize_pathway_id, pathway_key,
};
use tracing::{debug, info};

/// Weight of stressor connections and cross-links.
pub const STRESSOR_CONNECTION_WEIGHT: f64 = 1.0;

/// Attribute carrying the normalized pathway key on cross-links.
pub const PATHWAY_KEY_ATTR: &str = "pathway_key";

/// `(source, target)` pairs already connected.
pub type ConnectedPairs = HashSet<(String, String)>;

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Output of [`group_stressors`].
#[derive(Debug, Clone, Default)]
pub struct StressorGroups {
    pub hypernodes: Vec<Node>,
    pub connections: Vec<Edge>,
    /// Stressor nodes seen in the input.
    pub stressor_nodes: usize,
    /// Stressors with no pathway id that normalizes to a key.
    pub ungrouped: usize,
}

/// Re-key a caller-supplied pathway name catalog by normalized id.
///
/// The first entry wins when several raw ids normalize to one key; blank
/// names and keys are dropped.
#[must_use]
pub fn normalize_catalog(catalog: &BTreeMap<String, String>) -> HashMap<String, String> {
    let mut names = HashMap::with_capacity(catalog.len());
    for (raw, name) in catalog {
        let key = normalize_pathway_id(raw);
        if key.is_empty() || name.trim().is_empty() {
            continue;
        }
        names.entry(key).or_insert_with(|| name.trim().to_string());
    }
    names
}

/// Group stressors by their first usable pathway key.
///
/// One `stressor-hypernode-aop-{key}` per key, in order of first
/// appearance. Each stressor is connected to its hypernode unless the pair
/// is already in `connected`; new pairs are added to `connected`.
#[must_use]
pub fn group_stressors(
    nodes: &[Node],
    pathway_names: &HashMap<String, String>,
    connected: &mut ConnectedPairs,
) -> StressorGroups {
    let mut groups: Vec<(String, Vec<&Node>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut out = StressorGroups::default();

    for node in nodes.iter().filter(|n| n.node_type == NodeType::Stressor) {
        out.stressor_nodes += 1;
        let Some(key) = pathway_key(node) else {
            out.ungrouped += 1;
            continue;
        };
        let slot = *positions.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(node);
    }

    for (key, members) in groups {
        let name = pathway_names
            .get(&key)
            .cloned()
            .or_else(|| members.first().and_then(|m| m.pathway_name()).map(str::to_string));
        let id = format!("stressor-hypernode-aop-{key}");
        let label = name.as_deref().map_or_else(
            || format!("Stressors (AOP {key})"),
            |name| format!("Stressors (AOP {key}: {name})"),
        );

        for member in &members {
            if connected.insert((member.id.clone(), id.clone())) {
                out.connections.push(
                    Edge::typed(
                        member.id.clone(),
                        id.clone(),
                        edge_type::STRESSOR_TO_PATHWAY_HYPERNODE,
                    )
                    .with_weight(STRESSOR_CONNECTION_WEIGHT)
                    .with_label(format!("AOP{key}"))
                    .with_pathway(key.clone()),
                );
            }
        }

        let info = HypernodeInfo::new(
            members.iter().map(|m| m.id.clone()).collect(),
            Grouping::ByPathway {
                pathway_key: key.clone(),
                pathway_name: name.clone(),
            },
        );
        let mut hypernode = Node::new(id, label, NodeType::StressorHypernode)
            .with_pathway(key.clone())
            .with_hypernode(info);
        if let Some(name) = name {
            hypernode = hypernode.with_attribute(PATHWAY_NAME_ATTR, name);
        }
        debug!(pathway = %key, members = members.len(), "stressor hypernode built");
        out.hypernodes.push(hypernode);
    }

    out
}

// ---------------------------------------------------------------------------
// Cross-link
// ---------------------------------------------------------------------------

/// Output of [`cross_link`].
#[derive(Debug, Clone, Default)]
pub struct CrossLinks {
    pub connections: Vec<Edge>,
    pub created: usize,
    /// Stressor hypernodes left unlinked because no outcome hypernode exists.
    pub skipped: usize,
}

/// Link every stressor hypernode to the first outcome type hypernode.
#[must_use]
pub fn cross_link(
    stressor_hypernodes: &[Node],
    type_hypernodes: &[Node],
    connected: &mut ConnectedPairs,
) -> CrossLinks {
    let mut out = CrossLinks::default();
    if stressor_hypernodes.is_empty() {
        return out;
    }

    let target = type_hypernodes.iter().find(|h| {
        matches!(
            h.hypernode.as_ref().map(|i| &i.grouping),
            Some(Grouping::ByType {
                original_type: NodeType::Outcome,
                ..
            })
        )
    });
    let Some(target) = target else {
        out.skipped = stressor_hypernodes.len();
        info!(
            stressor_hypernodes = out.skipped,
            "no outcome hypernode; stressor cross-links skipped"
        );
        return out;
    };

    for hypernode in stressor_hypernodes {
        let Some(Grouping::ByPathway {
            pathway_key,
            pathway_name,
        }) = hypernode.hypernode.as_ref().map(|i| &i.grouping)
        else {
            continue;
        };
        if !connected.insert((hypernode.id.clone(), target.id.clone())) {
            continue;
        }
        let mut edge = Edge::typed(
            hypernode.id.clone(),
            target.id.clone(),
            edge_type::STRESSOR_ADVERSE_HYPEREDGE,
        )
        .with_weight(STRESSOR_CONNECTION_WEIGHT)
        .with_label(format!("AOP {pathway_key}"))
        .with_pathway(pathway_key.clone())
        .with_attribute(PATHWAY_KEY_ATTR, pathway_key.clone());
        if let Some(name) = pathway_name {
            edge = edge.with_attribute(PATHWAY_NAME_ATTR, name.clone());
        }
        out.connections.push(edge);
        out.created += 1;
    }

    out
}
