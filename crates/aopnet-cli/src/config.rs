//! `config.toml` loading.
//!
//! Resolution order: `--config <path>`, then `<config dir>/aopnet/config.toml`
//! when it exists, then built-in defaults. Every field is optional in the
//! file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use aopnet_analysis::community::CommunityParams;
use aopnet_analysis::hypergraph::HypergraphOptions;
use aopnet_analysis::paths::{EndpointPatterns, SearchBounds};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub hypergraph: HypergraphConfig,
    pub paths: PathsConfig,
    pub community: CommunityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HypergraphConfig {
    pub max_per_hypernode: i64,
    pub max_chunks_per_type: usize,
    pub use_community_overlay: bool,
    pub exclude_stressor_hypernodes: bool,
}

impl Default for HypergraphConfig {
    fn default() -> Self {
        let options = HypergraphOptions::default();
        Self {
            max_per_hypernode: options.max_per_hypernode,
            max_chunks_per_type: options.max_chunks_per_type,
            use_community_overlay: options.use_community_overlay,
            exclude_stressor_hypernodes: options.exclude_stressor_hypernodes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub k: usize,
    pub max_seeds: usize,
    pub max_frontier: usize,
    pub initiating_patterns: Vec<String>,
    pub outcome_patterns: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let bounds = SearchBounds::default();
        let patterns = EndpointPatterns::default();
        Self {
            k: 3,
            max_seeds: bounds.max_seeds,
            max_frontier: bounds.max_frontier,
            initiating_patterns: patterns.initiating,
            outcome_patterns: patterns.outcome,
        }
    }
}

impl PathsConfig {
    pub const fn bounds(&self) -> SearchBounds {
        SearchBounds {
            max_seeds: self.max_seeds,
            max_frontier: self.max_frontier,
        }
    }

    pub fn patterns(&self) -> EndpointPatterns {
        EndpointPatterns {
            initiating: self.initiating_patterns.clone(),
            outcome: self.outcome_patterns.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityConfig {
    pub strategy: String,
    #[serde(flatten)]
    pub params: CommunityParams,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            strategy: HypergraphOptions::default().community_strategy,
            params: CommunityParams::default(),
        }
    }
}

impl AppConfig {
    /// Builder options from config, before any flag overrides.
    pub fn hypergraph_options(&self) -> HypergraphOptions {
        HypergraphOptions {
            max_per_hypernode: self.hypergraph.max_per_hypernode,
            use_community_overlay: self.hypergraph.use_community_overlay,
            community_strategy: self.community.strategy.clone(),
            community_params: self.community.params.clone(),
            exclude_stressor_hypernodes: self.hypergraph.exclude_stressor_hypernodes,
            max_chunks_per_type: self.hypergraph.max_chunks_per_type,
            pathway_names: std::collections::BTreeMap::new(),
        }
    }
}

/// Default user config location, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("aopnet").join("config.toml"))
}

/// Load configuration from `explicit`, else the user config file, else
/// defaults.
///
/// # Errors
///
/// Returns an error if an explicit path cannot be read, or if any config
/// file that is read fails to parse.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    match user_config_path() {
        Some(path) if path.exists() => read_config(&path),
        _ => {
            debug!("no config file; using defaults");
            Ok(AppConfig::default())
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = toml::from_str::<AppConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: AppConfig = toml::from_str("").expect("parse");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.hypergraph.max_per_hypernode, 4);
        assert_eq!(config.hypergraph.max_chunks_per_type, 256);
        assert_eq!(config.paths.k, 3);
        assert_eq!(config.paths.max_seeds, 5);
        assert_eq!(config.paths.max_frontier, 100_000);
        assert_eq!(config.community.strategy, "louvain");
        assert_eq!(config.paths.initiating_patterns, vec!["initiating", "mie"]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[hypergraph]
max_per_hypernode = 8

[community]
strategy = "spectral"
resolution = 0.5
clusters = 3

[paths]
outcome_patterns = ["adverse"]
"#,
        )
        .expect("parse");
        assert_eq!(config.hypergraph.max_per_hypernode, 8);
        assert_eq!(config.hypergraph.max_chunks_per_type, 256);
        assert_eq!(config.community.strategy, "spectral");
        assert!((config.community.params.resolution - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.community.params.clusters, Some(3));
        assert_eq!(config.community.params.steps, 4);
        assert_eq!(config.paths.patterns().outcome, vec!["adverse"]);

        let options = config.hypergraph_options();
        assert_eq!(options.community_strategy, "spectral");
        assert_eq!(options.max_per_hypernode, 8);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[hypergraph\nmax_per_hypernode = ").expect("write");
        let err = load_config(Some(&path)).expect_err("parse failure");
        assert!(format!("{err:#}").contains("Failed to parse"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/aopnet.toml"))).is_err());
    }
}
