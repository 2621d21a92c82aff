//! Typed node and edge records.

mod edge;
mod node;

pub use edge::{Edge, EdgeKey, edge_type};
pub use node::{Grouping, HypernodeInfo, Node, NodeType, PATHWAY_NAME_ATTR};
