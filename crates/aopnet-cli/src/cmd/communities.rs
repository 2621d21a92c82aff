//! `aopnet communities`: partition the graph.

use std::io::{self, Write};

use anyhow::Result;
use aopnet_analysis::community::{
    CommunityParams, CommunityResult, community_color, detect_communities,
};
use clap::Args;

use crate::config::AppConfig;
use crate::input::LoadedGraph;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `aopnet communities`.
#[derive(Args, Debug, Default)]
pub struct CommunitiesArgs {
    /// Strategy name (louvain, leiden, walktrap, spectral).
    #[arg(long)]
    pub strategy: Option<String>,

    /// Louvain resolution.
    #[arg(long)]
    pub resolution: Option<f64>,

    /// Walk length recorded for walktrap.
    #[arg(long)]
    pub steps: Option<usize>,

    /// Fixed spectral cluster count.
    #[arg(long)]
    pub clusters: Option<usize>,

    /// Spectral k-means seed.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl CommunitiesArgs {
    fn resolve(&self, config: &AppConfig) -> (String, CommunityParams) {
        let strategy = self
            .strategy
            .clone()
            .unwrap_or_else(|| config.community.strategy.clone());
        let defaults = &config.community.params;
        let params = CommunityParams {
            resolution: self.resolution.unwrap_or(defaults.resolution),
            steps: self.steps.unwrap_or(defaults.steps),
            clusters: self.clusters.or(defaults.clusters),
            seed: self.seed.unwrap_or(defaults.seed),
        };
        (strategy, params)
    }
}

/// Execute `aopnet communities`.
pub fn run_communities(
    args: &CommunitiesArgs,
    graph: &LoadedGraph,
    config: &AppConfig,
    output: OutputMode,
) -> Result<()> {
    let (strategy, params) = args.resolve(config);
    let result = detect_communities(&graph.snapshot, &strategy, &params);
    render_mode(output, &result, render_text, render_pretty)
}

fn render_text(result: &CommunityResult, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "method={} communities={} modularity={:.4}",
        result.method,
        result.community_count(),
        result.modularity
    )?;
    for community in &result.communities {
        writeln!(w, "{}\t{}\t{}", community.id, community.size, community.members.join(","))?;
    }
    Ok(())
}

fn render_pretty(result: &CommunityResult, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Communities")?;
    pretty_kv(w, "Method", &result.method)?;
    if result.is_fallback() {
        pretty_kv(w, "Requested", &result.requested)?;
    }
    if let Some(reason) = &result.fallback_reason {
        pretty_kv(w, "Fallback", reason)?;
    }
    pretty_kv(w, "Communities", result.community_count().to_string())?;
    pretty_kv(w, "Modularity", format!("{:.4}", result.modularity))?;
    writeln!(w)?;
    for community in &result.communities {
        writeln!(
            w,
            "  #{:<4} {:>4} members  {}  {}",
            community.id,
            community.size,
            community_color(community.id),
            community.members.join(", ")
        )?;
    }
    Ok(())
}
