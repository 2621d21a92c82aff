#![forbid(unsafe_code)]
//! aopnet-analysis library.
//!
//! Network analysis over an [`aopnet_core::GraphSnapshot`]: community
//! detection with a fallback chain, hypergraph summarization, path search,
//! and summary statistics. Every entry point is a synchronous function of an
//! immutable snapshot that returns a freshly allocated result.
//!
//! # Conventions
//!
//! - **Errors**: Parameter problems are [`aopnet_core::ValidationError`]s.
//!   Clustering failures are [`community::StrategyError`]s and are recovered
//!   inside [`detect_communities`], never returned.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod community;
pub mod graph;
pub mod hypergraph;
pub mod paths;
pub mod stats;

pub use community::{
    Community, CommunityParams, CommunityResult, CommunityStrategy, StrategyError,
    detect_communities,
};
pub use graph::WeightedGraph;
pub use hypergraph::{
    EnrichedGraph, HypergraphOptions, HypergraphResult, HypergraphStats, build_hypergraph,
    build_hypergraph_elements, merge,
};
pub use paths::{
    EndpointPatterns, OutcomePaths, PathMode, PathRecord, PathSet, SearchBounds, TypePairPaths,
    all_type_paths, find_k_paths, find_path, initiating_to_outcome_paths,
    initiating_to_outcome_paths_with, summarize_paths,
};
pub use stats::{NetworkProperties, network_properties};
