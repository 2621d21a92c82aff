#![forbid(unsafe_code)]
//! aopnet-core library.
//!
//! Graph model for adverse outcome pathway networks: typed nodes and edges,
//! pathway identifier normalization, adjacency construction, and immutable
//! snapshots published through a [`SnapshotHandle`].
//!
//! # Conventions
//!
//! - **Errors**: Input and parameter problems are [`ValidationError`]s. No
//!   other failure is propagated by the library crates.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod adjacency;
pub mod error;
pub mod model;
pub mod normalize;
pub mod snapshot;

pub use adjacency::{Adjacency, build_adjacency, filter_by_type};
pub use error::{ErrorCode, ValidationError};
pub use model::{
    Edge, EdgeKey, Grouping, HypernodeInfo, Node, NodeType, PATHWAY_NAME_ATTR, edge_type,
};
pub use normalize::{normalize_pathway_id, pathway_key};
pub use snapshot::{GraphSnapshot, SnapshotHandle};
