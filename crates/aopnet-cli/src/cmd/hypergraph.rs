//! `aopnet hypergraph`: summarize the graph into hypernodes.

use std::io::{self, Write};

use anyhow::{Context, Result};
use aopnet_analysis::hypergraph::{
    EnrichedGraph, HypergraphOptions, HypergraphStats, build_hypergraph,
};
use clap::Args;

use crate::config::AppConfig;
use crate::input::LoadedGraph;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `aopnet hypergraph`.
#[derive(Args, Debug, Default)]
pub struct HypergraphArgs {
    /// Largest number of members per type hypernode.
    #[arg(long)]
    pub max_per_hypernode: Option<i64>,

    /// Cap on type hypernodes per node type.
    #[arg(long)]
    pub max_chunks_per_type: Option<usize>,

    /// Detect communities and add community hypernodes.
    #[arg(long)]
    pub community_overlay: bool,

    /// Community strategy for the overlay (louvain, leiden, walktrap, spectral).
    #[arg(long)]
    pub strategy: Option<String>,

    /// Leave stressors ungrouped.
    #[arg(long)]
    pub exclude_stressors: bool,

    /// Print only the build counters.
    #[arg(long)]
    pub stats_only: bool,
}

impl HypergraphArgs {
    /// Config-derived options with flag overrides applied.
    pub fn options(&self, config: &AppConfig, graph: &LoadedGraph) -> HypergraphOptions {
        let mut options = config.hypergraph_options();
        if let Some(max) = self.max_per_hypernode {
            options.max_per_hypernode = max;
        }
        if let Some(max) = self.max_chunks_per_type {
            options.max_chunks_per_type = max;
        }
        if let Some(strategy) = &self.strategy {
            options.community_strategy.clone_from(strategy);
        }
        options.use_community_overlay |= self.community_overlay;
        options.exclude_stressor_hypernodes |= self.exclude_stressors;
        options.pathway_names.clone_from(&graph.pathway_names);
        options
    }
}

/// Execute `aopnet hypergraph`.
pub fn run_hypergraph(
    args: &HypergraphArgs,
    graph: &LoadedGraph,
    config: &AppConfig,
    output: OutputMode,
) -> Result<()> {
    let options = args.options(config, graph);
    let enriched = build_hypergraph(&graph.snapshot, &options).context("hypergraph build failed")?;

    if args.stats_only {
        return render_mode(output, &enriched.stats, render_stats_text, |stats, w| {
            pretty_section(w, "Hypergraph")?;
            render_stats_pretty(stats, w)
        });
    }
    render_mode(output, &enriched, render_text, render_pretty)
}

fn render_text(enriched: &EnrichedGraph, w: &mut dyn Write) -> io::Result<()> {
    for node in enriched.nodes.iter().filter(|n| n.hypernode.is_some()) {
        let members = node.hypernode.as_ref().map_or(0, |h| h.member_count);
        writeln!(w, "{}\t{}\t{}", node.id, members, node.label)?;
    }
    render_stats_text(&enriched.stats, w)
}

fn render_stats_text(stats: &HypergraphStats, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "nodes={} edges={} hypernodes={} connections={} stressor_hypernodes={} cross_links={} community_hypernodes={}",
        stats.total_nodes,
        stats.total_edges,
        stats.hypernodes,
        stats.connections,
        stats.stressor_hypernodes,
        stats.cross_links_created,
        stats.community_hypernodes,
    )
}

fn render_pretty(enriched: &EnrichedGraph, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Hypernodes")?;
    for node in enriched.nodes.iter().filter(|n| n.hypernode.is_some()) {
        writeln!(w, "  {:<40} {}", node.id, node.label)?;
    }
    writeln!(w)?;
    pretty_section(w, "Summary")?;
    render_stats_pretty(&enriched.stats, w)?;
    if let Some(communities) = &enriched.communities {
        pretty_kv(w, "Community method", &communities.method)?;
    }
    Ok(())
}

fn render_stats_pretty(stats: &HypergraphStats, w: &mut dyn Write) -> io::Result<()> {
    pretty_kv(
        w,
        "Original",
        format!("{} nodes, {} edges", stats.original_nodes, stats.original_edges),
    )?;
    pretty_kv(w, "Duplicate edges removed", stats.input_duplicates_removed.to_string())?;
    pretty_kv(
        w,
        "Hypernodes",
        format!("{} ({} connections)", stats.hypernodes, stats.connections),
    )?;
    pretty_kv(
        w,
        "Chunk size",
        if stats.chunk_size_raised {
            format!("{} (raised)", stats.effective_chunk_size)
        } else {
            stats.effective_chunk_size.to_string()
        },
    )?;
    pretty_kv(
        w,
        "Stressors",
        format!(
            "{} in {} hypernodes, {} ungrouped",
            stats.stressor_nodes, stats.stressor_hypernodes, stats.ungrouped_stressors
        ),
    )?;
    pretty_kv(
        w,
        "Cross-links",
        format!("{} created, {} skipped", stats.cross_links_created, stats.cross_links_skipped),
    )?;
    pretty_kv(w, "Community hypernodes", stats.community_hypernodes.to_string())?;
    pretty_kv(
        w,
        "Total",
        format!("{} nodes, {} edges", stats.total_nodes, stats.total_edges),
    )
}
