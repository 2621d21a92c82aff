//! Bounded enumeration of initiating-event → outcome paths.

use std::fmt;
use std::str::FromStr;

use aopnet_core::{GraphSnapshot, Node, ValidationError, filter_by_type};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::{PathRecord, SearchBounds, k_shortest_paths};

/// Which end of the length ordering to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMode {
    #[default]
    Shortest,
    Longest,
}

impl PathMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shortest => "shortest",
            Self::Longest => "longest",
        }
    }
}

impl fmt::Display for PathMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shortest" => Ok(Self::Shortest),
            "longest" => Ok(Self::Longest),
            other => Err(ValidationError::InvalidParameter {
                name: "mode",
                reason: format!("expected `shortest` or `longest`, got `{other}`"),
            }),
        }
    }
}

/// Substring patterns selecting the two endpoint sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointPatterns {
    pub initiating: Vec<String>,
    pub outcome: Vec<String>,
}

impl Default for EndpointPatterns {
    fn default() -> Self {
        Self {
            initiating: vec!["initiating".to_string(), "mie".to_string()],
            outcome: vec!["outcome".to_string()],
        }
    }
}

/// Output of [`initiating_to_outcome_paths`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomePaths {
    pub paths: Vec<PathRecord>,
    /// Initiating seeds actually searched from.
    pub initiating_ids: Vec<String>,
    /// Outcome seeds actually searched to.
    pub outcome_ids: Vec<String>,
    /// Paths found across all pairs before truncating to `k`.
    pub total_found: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub seeds_truncated: bool,
    pub frontier_truncated: bool,
}

/// [`initiating_to_outcome_paths_with`] using the default endpoint patterns.
///
/// # Errors
///
/// [`ValidationError::ZeroK`] or invalid `bounds`.
pub fn initiating_to_outcome_paths(
    snapshot: &GraphSnapshot,
    k: usize,
    mode: PathMode,
    bounds: &SearchBounds,
) -> Result<OutcomePaths, ValidationError> {
    initiating_to_outcome_paths_with(snapshot, k, mode, bounds, &EndpointPatterns::default())
}

/// Enumerate paths from initiating events to outcomes.
///
/// Endpoints are original (non-synthetic) nodes whose type or id matches a
/// pattern. The first `bounds.max_seeds` of each side are paired, `start ==
/// end` pairs are skipped, and each pair contributes up to `k` paths. All
/// paths are stably sorted by length (ascending for
/// [`PathMode::Shortest`], descending for [`PathMode::Longest`]) and the
/// top `k` are kept.
///
/// # Errors
///
/// [`ValidationError::ZeroK`] or invalid `bounds`.
#[instrument(skip(snapshot, bounds, patterns), fields(nodes = snapshot.node_count()))]
pub fn initiating_to_outcome_paths_with(
    snapshot: &GraphSnapshot,
    k: usize,
    mode: PathMode,
    bounds: &SearchBounds,
    patterns: &EndpointPatterns,
) -> Result<OutcomePaths, ValidationError> {
    if k == 0 {
        return Err(ValidationError::ZeroK);
    }
    bounds.validate()?;

    let initiating = endpoints(snapshot.nodes(), &patterns.initiating);
    let outcomes = endpoints(snapshot.nodes(), &patterns.outcome);

    if initiating.is_empty() || outcomes.is_empty() {
        let message = match (initiating.is_empty(), outcomes.is_empty()) {
            (true, true) => "No initiating events or outcomes found",
            (true, false) => "No initiating events found",
            _ => "No outcomes found",
        };
        info!(message, "outcome path search skipped");
        return Ok(OutcomePaths {
            message: Some(message.to_string()),
            ..OutcomePaths::default()
        });
    }

    let seeds_truncated =
        initiating.len() > bounds.max_seeds || outcomes.len() > bounds.max_seeds;
    let initiating: Vec<String> = initiating.into_iter().take(bounds.max_seeds).collect();
    let outcomes: Vec<String> = outcomes.into_iter().take(bounds.max_seeds).collect();

    let adjacency = snapshot.adjacency(true);
    let mut found: Vec<Vec<String>> = Vec::new();
    let mut frontier_truncated = false;
    for start in &initiating {
        for end in &outcomes {
            if start == end {
                continue;
            }
            let search = k_shortest_paths(&adjacency, start, end, k, bounds)?;
            frontier_truncated |= search.frontier_truncated;
            found.extend(search.paths);
        }
    }

    let total_found = found.len();
    match mode {
        PathMode::Shortest => found.sort_by_key(Vec::len),
        PathMode::Longest => found.sort_by_key(|p| std::cmp::Reverse(p.len())),
    }
    found.truncate(k);
    debug!(total_found, kept = found.len(), %mode, "outcome paths ranked");

    let message = (total_found == 0).then(|| {
        format!(
            "No paths found between {} initiating events and {} outcomes",
            initiating.len(),
            outcomes.len()
        )
    });

    Ok(OutcomePaths {
        paths: found
            .into_iter()
            .map(|path| PathRecord::from_path(snapshot, path))
            .collect(),
        initiating_ids: initiating,
        outcome_ids: outcomes,
        total_found,
        message,
        seeds_truncated,
        frontier_truncated,
    })
}

fn endpoints(nodes: &[Node], patterns: &[String]) -> Vec<String> {
    filter_by_type(nodes, patterns)
        .into_iter()
        .filter(|n| !n.node_type.is_synthetic())
        .map(|n| n.id.clone())
        .collect()
}
