//! Nodes: pathway events, stressors, and synthetic hypernodes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Attribute key under which a node may carry its pathway's display name.
pub const PATHWAY_NAME_ATTR: &str = "pathway_name";

// ---------------------------------------------------------------------------
// NodeType
// ---------------------------------------------------------------------------

/// Node type vocabulary.
///
/// The three synthetic variants are produced only by the hypergraph builder.
/// Parsing accepts the aliases found in AOP source tables
/// (`MolecularInitiatingEvent`, `KeyEvent`, `AdverseOutcome`, ...) and
/// normalizes them onto the canonical event categories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NodeType {
    InitiatingEvent,
    IntermediateEvent,
    Outcome,
    Stressor,
    TypeHypernode,
    StressorHypernode,
    CommunityHypernode,
    /// Empty or missing type.
    #[default]
    Unknown,
    /// Any other type string, kept verbatim.
    Other(String),
}

impl NodeType {
    /// Parse a raw type string. Never fails: unrecognized strings become
    /// [`NodeType::Other`], blank strings become [`NodeType::Unknown`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Unknown;
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "initiatingevent"
            | "initiating_event"
            | "molecularinitiatingevent"
            | "molecular_initiating_event"
            | "mie" => Self::InitiatingEvent,
            "intermediateevent" | "intermediate_event" | "keyevent" | "key_event" | "ke" => {
                Self::IntermediateEvent
            }
            "outcome" | "adverseoutcome" | "adverse_outcome" | "ao" => Self::Outcome,
            "stressor" => Self::Stressor,
            "type-hypernode" => Self::TypeHypernode,
            "stressor-hypernode" => Self::StressorHypernode,
            "community-hypernode" => Self::CommunityHypernode,
            "unknown" => Self::Unknown,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// Canonical string form. Unknown types render as the literal `"Unknown"`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::InitiatingEvent => "InitiatingEvent",
            Self::IntermediateEvent => "IntermediateEvent",
            Self::Outcome => "Outcome",
            Self::Stressor => "Stressor",
            Self::TypeHypernode => "type-hypernode",
            Self::StressorHypernode => "stressor-hypernode",
            Self::CommunityHypernode => "community-hypernode",
            Self::Unknown => "Unknown",
            Self::Other(raw) => raw,
        }
    }

    /// Stable bucket key for type-based grouping.
    #[must_use]
    pub fn group_key(&self) -> &str {
        self.as_str()
    }

    /// Return `true` for types only the hypergraph builder may create.
    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        matches!(
            self,
            Self::TypeHypernode | Self::StressorHypernode | Self::CommunityHypernode
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for NodeType {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl Serialize for NodeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or(Self::Unknown, |s| Self::parse(&s)))
    }
}

// ---------------------------------------------------------------------------
// Hypernode metadata
// ---------------------------------------------------------------------------

/// How a hypernode's members were selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Grouping {
    /// Consecutive chunk of the nodes sharing one type.
    ByType {
        original_type: NodeType,
        /// 1-based chunk index; `None` when the type fit in a single chunk.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chunk: Option<usize>,
    },
    /// Stressors sharing one normalized pathway key.
    ByPathway {
        pathway_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pathway_name: Option<String>,
    },
    /// Members of one detected community.
    ByCommunity { community_id: usize },
}

/// Summary data carried only by synthetic nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypernodeInfo {
    /// Original node ids, in grouping order.
    pub members: Vec<String>,
    pub member_count: usize,
    pub grouping: Grouping,
}

impl HypernodeInfo {
    #[must_use]
    pub fn new(members: Vec<String>, grouping: Grouping) -> Self {
        Self {
            member_count: members.len(),
            members,
            grouping,
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A node in the pathway graph.
///
/// Deserializes from reader rows: pathway membership may arrive as
/// `pathway_ids`, `aop_id` or `aop` (in that precedence order, all kept),
/// and a row-level `aop_name` becomes the `pathway_name` attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NodeRecord")]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Pathways this node belongs to, in first-seen order without repeats.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pathway_ids: Vec<String>,
    /// Open-ended ontology metadata (ontology term, direction of change, ...).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypernode: Option<HypernodeInfo>,
}

/// Wire shape accepted for [`Node`].
#[derive(Deserialize)]
struct NodeRecord {
    id: String,
    #[serde(default)]
    label: String,
    #[serde(rename = "type", default)]
    node_type: NodeType,
    #[serde(default, deserialize_with = "deserialize_pathway_ids")]
    pathway_ids: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_pathway_ids")]
    aop_id: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_pathway_ids")]
    aop: Vec<String>,
    #[serde(default)]
    aop_name: Option<String>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    hypernode: Option<HypernodeInfo>,
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        let mut node = Self {
            id: record.id,
            label: record.label,
            node_type: record.node_type,
            pathway_ids: Vec::new(),
            attributes: record.attributes,
            hypernode: record.hypernode,
        };
        for pathway in record
            .pathway_ids
            .into_iter()
            .chain(record.aop_id)
            .chain(record.aop)
        {
            node = node.with_pathway(pathway);
        }
        if let Some(name) = record.aop_name.map(|n| n.trim().to_string())
            && !name.is_empty()
        {
            node.attributes
                .entry(PATHWAY_NAME_ATTR.to_string())
                .or_insert(name);
        }
        node
    }
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            node_type,
            pathway_ids: Vec::new(),
            attributes: BTreeMap::new(),
            hypernode: None,
        }
    }

    /// Add a pathway membership, ignoring repeats.
    #[must_use]
    pub fn with_pathway(mut self, pathway_id: impl Into<String>) -> Self {
        let pathway_id = pathway_id.into();
        if !self.pathway_ids.contains(&pathway_id) {
            self.pathway_ids.push(pathway_id);
        }
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_hypernode(mut self, info: HypernodeInfo) -> Self {
        self.hypernode = Some(info);
        self
    }

    /// Display name of this node's pathway, if the reader supplied one.
    #[must_use]
    pub fn pathway_name(&self) -> Option<&str> {
        self.attributes
            .get(PATHWAY_NAME_ATTR)
            .map(String::as_str)
            .filter(|name| !name.trim().is_empty())
    }
}

/// Accepts a single string or a list of strings; drops blanks and repeats.
fn deserialize_pathway_ids<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    let raw = Option::<OneOrMany>::deserialize(deserializer)?;
    let candidates = match raw {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    };

    let mut ids: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let trimmed = candidate.trim();
        if !trimmed.is_empty() && !ids.iter().any(|id| id == trimmed) {
            ids.push(trimmed.to_string());
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_source_aliases() {
        assert_eq!(NodeType::parse("MolecularInitiatingEvent"), NodeType::InitiatingEvent);
        assert_eq!(NodeType::parse("MIE"), NodeType::InitiatingEvent);
        assert_eq!(NodeType::parse("KeyEvent"), NodeType::IntermediateEvent);
        assert_eq!(NodeType::parse("key_event"), NodeType::IntermediateEvent);
        assert_eq!(NodeType::parse("AdverseOutcome"), NodeType::Outcome);
        assert_eq!(NodeType::parse("stressor"), NodeType::Stressor);
        assert_eq!(NodeType::parse("type-hypernode"), NodeType::TypeHypernode);
    }

    #[test]
    fn blank_type_is_unknown_bucket() {
        assert_eq!(NodeType::parse(""), NodeType::Unknown);
        assert_eq!(NodeType::parse("   "), NodeType::Unknown);
        assert_eq!(NodeType::Unknown.as_str(), "Unknown");
    }

    #[test]
    fn unrecognized_type_kept_verbatim() {
        let t = NodeType::parse("Chemical");
        assert_eq!(t, NodeType::Other("Chemical".into()));
        assert_eq!(t.as_str(), "Chemical");
        assert!(!t.is_synthetic());
    }

    #[test]
    fn node_deserializes_from_reader_shape() {
        let node: Node = serde_json::from_str(
            r#"{"id":"KE:55","label":"Cell death","type":"KeyEvent","aop":"Aop:315"}"#,
        )
        .expect("node json");
        assert_eq!(node.node_type, NodeType::IntermediateEvent);
        assert_eq!(node.pathway_ids, vec!["Aop:315".to_string()]);
        assert!(node.hypernode.is_none());
    }

    #[test]
    fn aop_id_and_aop_both_load_with_aop_id_first() {
        let node: Node = serde_json::from_str(
            r#"{"id":"S","label":"x","type":"Stressor","aop":"Aop:1","aop_id":"Aop:1"}"#,
        )
        .expect("node json");
        assert_eq!(node.pathway_ids, vec!["Aop:1".to_string()]);

        let node: Node = serde_json::from_str(
            r#"{"id":"S","type":"Stressor","aop":"Aop:2","aop_id":"Aop:9"}"#,
        )
        .expect("node json");
        assert_eq!(node.pathway_ids, vec!["Aop:9".to_string(), "Aop:2".to_string()]);
    }

    #[test]
    fn row_level_aop_name_becomes_pathway_name() {
        let node: Node = serde_json::from_str(
            r#"{"id":"S","type":"Stressor","aop_id":"Aop:7","aop_name":"Fibrosis"}"#,
        )
        .expect("node json");
        assert_eq!(node.pathway_name(), Some("Fibrosis"));
        assert_eq!(
            node.attributes.get(PATHWAY_NAME_ATTR).map(String::as_str),
            Some("Fibrosis")
        );
    }

    #[test]
    fn explicit_pathway_name_attribute_beats_aop_name() {
        let node: Node = serde_json::from_str(
            r#"{"id":"S","aop_name":"Row","attributes":{"pathway_name":"Explicit"}}"#,
        )
        .expect("node json");
        assert_eq!(node.pathway_name(), Some("Explicit"));
    }

    #[test]
    fn serialized_node_reloads_unchanged() {
        let node = Node::new("S1", "Solvent", NodeType::Stressor)
            .with_pathway("Aop:3")
            .with_attribute(PATHWAY_NAME_ATTR, "Liver injury");
        let json = serde_json::to_string(&node).expect("serialize");
        let back: Node = serde_json::from_str(&json).expect("reload");
        assert_eq!(back, node);
    }

    #[test]
    fn pathway_ids_deduplicate_and_keep_order() {
        let node: Node = serde_json::from_str(
            r#"{"id":"S1","type":"Stressor","pathway_ids":["Aop:2"," ","Aop:1","Aop:2"]}"#,
        )
        .expect("node json");
        assert_eq!(node.pathway_ids, vec!["Aop:2".to_string(), "Aop:1".to_string()]);
    }

    #[test]
    fn missing_type_deserializes_as_unknown() {
        let node: Node = serde_json::from_str(r#"{"id":"x","type":null}"#).expect("node json");
        assert_eq!(node.node_type, NodeType::Unknown);
        assert_eq!(node.label, "");
    }

    #[test]
    fn type_serializes_as_canonical_string() {
        let node = Node::new("MIE:1", "Binding", NodeType::parse("MIE"));
        let json = serde_json::to_value(&node).expect("serialize");
        assert_eq!(json["type"], "InitiatingEvent");
    }

    #[test]
    fn pathway_name_ignores_blank_attribute() {
        let named = Node::new("S1", "s", NodeType::Stressor)
            .with_attribute(PATHWAY_NAME_ATTR, "Liver fibrosis");
        let blank = Node::new("S2", "s", NodeType::Stressor).with_attribute(PATHWAY_NAME_ATTR, " ");
        assert_eq!(named.pathway_name(), Some("Liver fibrosis"));
        assert_eq!(blank.pathway_name(), None);
    }
}
