pub mod communities;
pub mod completions;
pub mod hypergraph;
pub mod paths;
pub mod stats;
