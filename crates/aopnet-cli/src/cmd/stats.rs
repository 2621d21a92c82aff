//! `aopnet stats`: network summary statistics.

use std::io::{self, Write};

use anyhow::Result;
use aopnet_analysis::stats::{NetworkProperties, network_properties};
use clap::Args;
use serde::Serialize;

use crate::input::LoadedGraph;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `aopnet stats`.
#[derive(Args, Debug, Default)]
pub struct StatsArgs {}

/// Report payload for `aopnet stats`.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub content_hash: String,
    #[serde(flatten)]
    pub properties: NetworkProperties,
}

/// Execute `aopnet stats`.
pub fn run_stats(_args: &StatsArgs, graph: &LoadedGraph, output: OutputMode) -> Result<()> {
    let report = StatsReport {
        content_hash: graph.snapshot.content_hash().to_string(),
        properties: network_properties(&graph.snapshot),
    };
    render_mode(output, &report, render_stats_text, render_stats_pretty)
}

fn render_stats_text(report: &StatsReport, w: &mut dyn Write) -> io::Result<()> {
    let p = &report.properties;
    writeln!(w, "nodes\t{}", p.nodes)?;
    writeln!(w, "edges\t{}", p.edges)?;
    writeln!(w, "density\t{:.6}", p.density)?;
    writeln!(w, "connected_components\t{}", p.connected_components)?;
    writeln!(w, "average_clustering\t{:.6}", p.average_clustering)?;
    writeln!(w, "transitivity\t{:.6}", p.transitivity)?;
    writeln!(w, "average_degree\t{:.6}", p.average_degree)?;
    for (node_type, count) in &p.type_distribution {
        writeln!(w, "type:{node_type}\t{count}")?;
    }
    Ok(())
}

fn render_stats_pretty(report: &StatsReport, w: &mut dyn Write) -> io::Result<()> {
    let p = &report.properties;
    pretty_section(w, "Network")?;
    pretty_kv(w, "Snapshot", &report.content_hash)?;
    pretty_kv(w, "Nodes", p.nodes.to_string())?;
    pretty_kv(w, "Edges", p.edges.to_string())?;
    pretty_kv(w, "Density", format!("{:.4}", p.density))?;
    pretty_kv(w, "Components", p.connected_components.to_string())?;
    pretty_kv(w, "Avg clustering", format!("{:.4}", p.average_clustering))?;
    pretty_kv(w, "Transitivity", format!("{:.4}", p.transitivity))?;
    pretty_kv(
        w,
        "Degree",
        format!(
            "avg {:.2}, min {}, max {}, std {:.2}",
            p.average_degree, p.min_degree, p.max_degree, p.degree_std
        ),
    )?;
    if let (Some(betweenness), Some(closeness)) =
        (p.avg_betweenness_centrality, p.avg_closeness_centrality)
    {
        pretty_kv(w, "Avg betweenness", format!("{betweenness:.4}"))?;
        pretty_kv(w, "Avg closeness", format!("{closeness:.4}"))?;
    }
    writeln!(w)?;
    pretty_section(w, "Node types")?;
    for (node_type, count) in &p.type_distribution {
        pretty_kv(w, node_type, count.to_string())?;
    }
    Ok(())
}
