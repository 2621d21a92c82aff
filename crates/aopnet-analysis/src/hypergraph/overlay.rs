//! Community hypernodes layered over a detected partition.

use aopnet_core::{Edge, Grouping, HypernodeInfo, Node, NodeType, edge_type};

use crate::community::CommunityResult;

/// Weight of a member → community hypernode connection.
pub const COMMUNITY_CONNECTION_WEIGHT: f64 = 0.5;

/// Smallest community that gets its own hypernode.
pub const MIN_COMMUNITY_SIZE: usize = 2;

/// One `community-hypernode-{id}` per community with at least
/// [`MIN_COMMUNITY_SIZE`] members, plus member connections.
#[must_use]
pub fn community_overlay(communities: &CommunityResult) -> (Vec<Node>, Vec<Edge>) {
    let mut hypernodes = Vec::new();
    let mut connections = Vec::new();

    for community in communities
        .communities
        .iter()
        .filter(|c| c.members.len() >= MIN_COMMUNITY_SIZE)
    {
        let id = format!("community-hypernode-{}", community.id);
        for member in &community.members {
            connections.push(
                Edge::typed(member.clone(), id.clone(), edge_type::COMMUNITY_CONNECTION)
                    .with_weight(COMMUNITY_CONNECTION_WEIGHT),
            );
        }
        let label = format!("Community {} ({})", community.id, community.members.len());
        let info = HypernodeInfo::new(
            community.members.clone(),
            Grouping::ByCommunity {
                community_id: community.id,
            },
        );
        hypernodes.push(Node::new(id, label, NodeType::CommunityHypernode).with_hypernode(info));
    }

    (hypernodes, connections)
}
