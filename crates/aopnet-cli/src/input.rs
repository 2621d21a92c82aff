//! Graph input document.
//!
//! ```json
//! { "nodes": [...], "edges": [...], "pathway_names": { "Aop:1": "..." } }
//! ```

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use aopnet_core::{Edge, GraphSnapshot, Node};
use serde::Deserialize;
use tracing::{debug, instrument};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InputDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub pathway_names: BTreeMap<String, String>,
}

/// A validated snapshot plus the document's pathway name catalog.
pub struct LoadedGraph {
    pub snapshot: GraphSnapshot,
    pub pathway_names: BTreeMap<String, String>,
}

/// Read and validate the input document at `path` (`-` reads stdin).
///
/// # Errors
///
/// Returns an error if the input cannot be read, is not valid JSON, or has
/// empty or duplicate node ids.
#[instrument]
pub fn load_graph(path: &Path) -> Result<LoadedGraph> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read graph from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    parse_graph(&raw).with_context(|| format!("Invalid graph document {}", path.display()))
}

fn parse_graph(raw: &str) -> Result<LoadedGraph> {
    let doc: InputDocument = serde_json::from_str(raw)?;
    let snapshot = GraphSnapshot::new(doc.nodes, doc.edges)?;
    debug!(
        nodes = snapshot.node_count(),
        edges = snapshot.edge_count(),
        hash = snapshot.content_hash(),
        "graph loaded"
    );
    Ok(LoadedGraph {
        snapshot,
        pathway_names: doc.pathway_names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aopnet_core::{NodeType, ValidationError};

    #[test]
    fn parses_reader_shaped_document() {
        let loaded = parse_graph(
            r#"{
                "nodes": [
                    {"id": "KE:1", "label": "Injury", "type": "KeyEvent", "aop": "Aop:1"},
                    {"id": "AO:1", "label": "Fibrosis", "type": "AdverseOutcome"}
                ],
                "edges": [{"source": "KE:1", "target": "AO:1", "confidence": "high"}],
                "pathway_names": {"Aop:1": "Liver fibrosis"}
            }"#,
        )
        .expect("valid document");
        assert_eq!(loaded.snapshot.node_count(), 2);
        assert_eq!(
            loaded.snapshot.node("AO:1").map(|n| &n.node_type),
            Some(&NodeType::Outcome)
        );
        assert_eq!(loaded.snapshot.edges()[0].confidence, None);
        assert_eq!(loaded.pathway_names.len(), 1);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let loaded = parse_graph("{}").expect("valid document");
        assert!(loaded.snapshot.is_empty());
    }

    #[test]
    fn duplicate_ids_surface_validation_error() {
        let err = parse_graph(r#"{"nodes": [{"id": "A"}, {"id": "A"}]}"#)
            .err()
            .expect("duplicate ids rejected");
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::DuplicateNodeId("A".into()))
        );
    }
}
