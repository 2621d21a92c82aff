//! Edges: causal relationships between events, plus synthesized hyperedges.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Edge type tags used across the workspace.
pub mod edge_type {
    /// Default tag for relationships read from pathway tables.
    pub const CAUSAL: &str = "causal";
    /// Member → type hypernode.
    pub const HYPERNODE_CONNECTION: &str = "hypernode-connection";
    /// Stressor → its pathway's stressor hypernode.
    pub const STRESSOR_TO_PATHWAY_HYPERNODE: &str = "stressor-to-pathway-hypernode";
    /// Stressor hypernode → outcome type hypernode.
    pub const STRESSOR_ADVERSE_HYPEREDGE: &str = "stressor-adverse-hyperedge";
    /// Member → community hypernode.
    pub const COMMUNITY_CONNECTION: &str = "community-connection";
}

fn default_edge_type() -> String {
    edge_type::CAUSAL.to_string()
}

/// A directed edge between two node ids.
///
/// Endpoints are not checked against any node table here; consumers skip
/// edges whose endpoints are missing from the snapshot they operate on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(default, alias = "aop", skip_serializing_if = "Option::is_none")]
    pub pathway_id: Option<String>,
    #[serde(default, alias = "relationship", skip_serializing_if = "Option::is_none")]
    pub relationship_id: Option<String>,
    /// Qualitative adjacency tag (`adjacent`, `non-adjacent`, or a number).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjacency: Option<String>,
    /// Numeric confidence; non-numeric input deserializes as absent.
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub confidence: Option<f64>,
    #[serde(rename = "type", default = "default_edge_type")]
    pub edge_type: String,
    /// Display weight for synthesized edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// Deduplication key: `(source, target, type)`.
pub type EdgeKey<'a> = (&'a str, &'a str, &'a str);

impl Edge {
    /// Create a causal edge with no pathway metadata.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::typed(source, target, edge_type::CAUSAL)
    }

    pub fn typed(
        source: impl Into<String>,
        target: impl Into<String>,
        edge_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            pathway_id: None,
            relationship_id: None,
            adjacency: None,
            confidence: None,
            edge_type: edge_type.into(),
            weight: None,
            label: None,
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_pathway(mut self, pathway_id: impl Into<String>) -> Self {
        self.pathway_id = Some(pathway_id.into());
        self
    }

    #[must_use]
    pub const fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    #[must_use]
    pub fn with_adjacency(mut self, adjacency: impl Into<String>) -> Self {
        self.adjacency = Some(adjacency.into());
        self
    }

    #[must_use]
    pub const fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// The `(source, target, type)` deduplication key.
    #[must_use]
    pub fn key(&self) -> EdgeKey<'_> {
        (&self.source, &self.target, &self.edge_type)
    }

    /// Weight used for network analysis: `confidence × adjacency`.
    ///
    /// Each factor contributes only when it is a finite number; absent or
    /// non-numeric factors count as 1.0.
    #[must_use]
    pub fn analysis_weight(&self) -> f64 {
        let confidence = self.confidence.filter(|c| c.is_finite()).unwrap_or(1.0);
        let adjacency = self
            .adjacency
            .as_deref()
            .and_then(|a| a.trim().parse::<f64>().ok())
            .filter(|a| a.is_finite())
            .unwrap_or(1.0);
        confidence * adjacency
    }
}

/// Accept a JSON number or a numeric string; anything else is `None`.
fn deserialize_lenient_f64<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_causal_type() {
        let edge: Edge = serde_json::from_str(r#"{"source":"A","target":"B"}"#).expect("edge json");
        assert_eq!(edge.edge_type, edge_type::CAUSAL);
        assert_eq!(edge.key(), ("A", "B", "causal"));
    }

    #[test]
    fn confidence_accepts_numeric_strings() {
        let raw = r#"{"source":"A","target":"B","confidence":"0.5"}"#;
        let edge: Edge = serde_json::from_str(raw).expect("edge json");
        assert_eq!(edge.confidence, Some(0.5));
    }

    #[test]
    fn non_numeric_confidence_is_absent() {
        let raw = r#"{"source":"A","target":"B","confidence":"High"}"#;
        let edge: Edge = serde_json::from_str(raw).expect("edge json");
        assert_eq!(edge.confidence, None);
        assert!((edge.analysis_weight() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn analysis_weight_multiplies_numeric_factors() {
        let edge = Edge::new("A", "B").with_confidence(0.5).with_adjacency("2");
        assert!((edge.analysis_weight() - 1.0).abs() < 1e-12);

        let qualitative = Edge::new("A", "B").with_confidence(0.25).with_adjacency("adjacent");
        assert!((qualitative.analysis_weight() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn reader_aliases_are_accepted() {
        let edge: Edge = serde_json::from_str(
            r#"{"source":"A","target":"B","aop":"Aop:3","relationship":"KER:9"}"#,
        )
        .expect("edge json");
        assert_eq!(edge.pathway_id.as_deref(), Some("Aop:3"));
        assert_eq!(edge.relationship_id.as_deref(), Some("KER:9"));
    }
}
