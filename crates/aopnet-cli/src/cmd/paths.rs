//! `aopnet path`, `aopnet paths` (with `paths all-types`) and `aopnet outcome-paths`.

use std::io::{self, Write};

use anyhow::{Context, Result};
use aopnet_analysis::hypergraph::{EnrichedGraph, HypergraphOptions};
use aopnet_analysis::paths::type_pairs::{
    DEFAULT_MAX_TYPE_PATHS, DEFAULT_PER_TYPE_SEEDS, DEFAULT_TYPE_PAIR_K,
};
use aopnet_analysis::paths::{
    OutcomePaths, PathMode, PathRecord, PathSet, all_type_paths, find_k_paths,
    find_path, initiating_to_outcome_paths_with, summarize_paths,
};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::input::LoadedGraph;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

// ---------------------------------------------------------------------------
// path
// ---------------------------------------------------------------------------

/// Arguments for `aopnet path`.
#[derive(Args, Debug)]
pub struct PathArgs {
    /// Start node id.
    pub start: String,
    /// End node id.
    pub end: String,
}

#[derive(Debug, Serialize)]
struct PathReport<'a> {
    start: &'a str,
    end: &'a str,
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathRecord>,
}

/// Execute `aopnet path`.
pub fn run_path(args: &PathArgs, graph: &LoadedGraph, output: OutputMode) -> Result<()> {
    let path = find_path(&graph.snapshot, &args.start, &args.end);
    let report = PathReport {
        start: &args.start,
        end: &args.end,
        found: path.is_some(),
        path,
    };
    render_mode(
        output,
        &report,
        |r, w| match &r.path {
            Some(record) => write_path_line(record, w),
            None => writeln!(w, "unreachable"),
        },
        |r, w| {
            pretty_section(w, &format!("Path {} → {}", r.start, r.end))?;
            match &r.path {
                Some(record) => {
                    pretty_kv(w, "Length", record.length.to_string())?;
                    pretty_kv(w, "Nodes", record.path.join(" → "))
                }
                None => writeln!(w, "No path found."),
            }
        },
    )
}

// ---------------------------------------------------------------------------
// paths
// ---------------------------------------------------------------------------

/// Arguments for `aopnet paths`.
#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
pub struct PathsArgs {
    #[command(subcommand)]
    pub command: Option<PathsCommand>,

    /// Start node id.
    #[arg(required = true)]
    pub start: Option<String>,
    /// End node id.
    #[arg(required = true)]
    pub end: Option<String>,

    /// Number of paths to return.
    #[arg(short, long)]
    pub k: Option<usize>,

    /// Cap on pending candidates during the search.
    #[arg(long)]
    pub max_frontier: Option<usize>,

    /// Also summarize the nodes on the returned paths as a hypergraph.
    #[arg(long)]
    pub hypergraph: bool,
}

#[derive(Debug, Serialize)]
struct PathsReport {
    #[serde(flatten)]
    set: PathSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    hypergraph: Option<EnrichedGraph>,
}

#[derive(Subcommand, Debug)]
pub enum PathsCommand {
    /// Sample paths between every ordered pair of node types.
    #[command(
        name = "all-types",
        after_help = "EXAMPLES:\n    aopnet paths all-types --input graph.json --max-paths 20"
    )]
    AllTypes(AllTypesArgs),
}

/// Execute `aopnet paths`.
pub fn run_paths(
    args: &PathsArgs,
    graph: &LoadedGraph,
    config: &AppConfig,
    output: OutputMode,
) -> Result<()> {
    if let Some(PathsCommand::AllTypes(all)) = &args.command {
        return run_all_types(all, graph, config, output);
    }
    let (Some(start), Some(end)) = (args.start.as_deref(), args.end.as_deref()) else {
        anyhow::bail!("`aopnet paths` needs a start and an end node id");
    };

    let mut bounds = config.paths.bounds();
    if let Some(max) = args.max_frontier {
        bounds.max_frontier = max;
    }
    let k = args.k.unwrap_or(config.paths.k);
    let set = find_k_paths(&graph.snapshot, start, end, k, &bounds)
        .context("path search rejected")?;
    let hypergraph = args
        .hypergraph
        .then(|| summarize(graph, config, &set.paths))
        .transpose()?;

    let report = PathsReport { set, hypergraph };
    render_mode(
        output,
        &report,
        |r, w| {
            for record in &r.set.paths {
                write_path_line(record, w)?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, &format!("Paths {start} → {end}"))?;
            write_records_pretty(&r.set.paths, w)?;
            if r.set.frontier_truncated {
                writeln!(w, "(search frontier truncated)")?;
            }
            write_summary_pretty(r.hypergraph.as_ref(), w)
        },
    )
}

// ---------------------------------------------------------------------------
// paths all-types
// ---------------------------------------------------------------------------

/// Arguments for `aopnet paths all-types`.
#[derive(Args, Debug)]
pub struct AllTypesArgs {
    /// Leading node ids of each type used as path endpoints.
    #[arg(long, default_value_t = DEFAULT_PER_TYPE_SEEDS)]
    pub per_type: usize,

    /// Paths kept per endpoint pair.
    #[arg(short, long, default_value_t = DEFAULT_TYPE_PAIR_K)]
    pub k: usize,

    /// Stop after this many paths overall.
    #[arg(long, default_value_t = DEFAULT_MAX_TYPE_PATHS)]
    pub max_paths: usize,

    /// Cap on pending candidates per search.
    #[arg(long)]
    pub max_frontier: Option<usize>,
}

fn run_all_types(
    args: &AllTypesArgs,
    graph: &LoadedGraph,
    config: &AppConfig,
    output: OutputMode,
) -> Result<()> {
    let mut bounds = config.paths.bounds();
    if let Some(max) = args.max_frontier {
        bounds.max_frontier = max;
    }
    let report = all_type_paths(&graph.snapshot, args.per_type, args.k, args.max_paths, &bounds)
        .context("type pair path search rejected")?;

    render_mode(
        output,
        &report,
        |r, w| {
            for tagged in &r.paths {
                write!(w, "{}\t{}\t", tagged.source_type, tagged.target_type)?;
                write_path_line(&tagged.record, w)?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, "Paths between node types")?;
            for group in &r.node_types {
                pretty_kv(w, &group.node_type, format!("{} nodes", group.node_ids.len()))?;
            }
            writeln!(w)?;
            if r.paths.is_empty() {
                writeln!(w, "No paths found.")?;
            }
            for (i, tagged) in r.paths.iter().enumerate() {
                writeln!(
                    w,
                    "  {:>3}. {} → {} [{}] {}",
                    i + 1,
                    tagged.source_type,
                    tagged.target_type,
                    tagged.record.length,
                    tagged.record.path.join(" → ")
                )?;
            }
            if r.max_paths_reached {
                writeln!(w, "(stopped at {} paths)", r.count)?;
            }
            if r.frontier_truncated {
                writeln!(w, "(search frontier truncated)")?;
            }
            Ok(())
        },
    )
}

// ---------------------------------------------------------------------------
// outcome-paths
// ---------------------------------------------------------------------------

/// Arguments for `aopnet outcome-paths`.
#[derive(Args, Debug)]
pub struct OutcomePathsArgs {
    /// Number of paths to return.
    #[arg(short, long)]
    pub k: Option<usize>,

    /// Keep the shortest or the longest paths.
    #[arg(long, default_value_t = PathMode::Shortest)]
    pub mode: PathMode,

    /// Initiating and outcome seeds considered per side.
    #[arg(long)]
    pub max_seeds: Option<usize>,

    /// Cap on pending candidates per search.
    #[arg(long)]
    pub max_frontier: Option<usize>,

    /// Also summarize the nodes on the returned paths as a hypergraph.
    #[arg(long)]
    pub hypergraph: bool,
}

#[derive(Debug, Serialize)]
struct OutcomeReport {
    mode: PathMode,
    #[serde(flatten)]
    result: OutcomePaths,
    #[serde(skip_serializing_if = "Option::is_none")]
    hypergraph: Option<EnrichedGraph>,
}

/// Execute `aopnet outcome-paths`.
pub fn run_outcome_paths(
    args: &OutcomePathsArgs,
    graph: &LoadedGraph,
    config: &AppConfig,
    output: OutputMode,
) -> Result<()> {
    let mut bounds = config.paths.bounds();
    if let Some(max) = args.max_seeds {
        bounds.max_seeds = max;
    }
    if let Some(max) = args.max_frontier {
        bounds.max_frontier = max;
    }
    let k = args.k.unwrap_or(config.paths.k);
    let result = initiating_to_outcome_paths_with(
        &graph.snapshot,
        k,
        args.mode,
        &bounds,
        &config.paths.patterns(),
    )
    .context("outcome path search rejected")?;
    let hypergraph = args
        .hypergraph
        .then(|| summarize(graph, config, &result.paths))
        .transpose()?;

    let report = OutcomeReport {
        mode: args.mode,
        result,
        hypergraph,
    };
    render_mode(
        output,
        &report,
        |r, w| {
            if let Some(message) = &r.result.message {
                writeln!(w, "# {message}")?;
            }
            for record in &r.result.paths {
                write_path_line(record, w)?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, &format!("Initiating event → outcome paths ({})", r.mode))?;
            pretty_kv(
                w,
                "Seeds",
                format!(
                    "{} initiating, {} outcome{}",
                    r.result.initiating_ids.len(),
                    r.result.outcome_ids.len(),
                    if r.result.seeds_truncated { " (truncated)" } else { "" }
                ),
            )?;
            pretty_kv(w, "Found", r.result.total_found.to_string())?;
            if let Some(message) = &r.result.message {
                writeln!(w, "{message}")?;
            }
            write_records_pretty(&r.result.paths, w)?;
            if r.result.frontier_truncated {
                writeln!(w, "(search frontier truncated)")?;
            }
            write_summary_pretty(r.hypergraph.as_ref(), w)
        },
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn summarize(
    graph: &LoadedGraph,
    config: &AppConfig,
    paths: &[PathRecord],
) -> Result<EnrichedGraph> {
    let options = HypergraphOptions {
        pathway_names: graph.pathway_names.clone(),
        ..config.hypergraph_options()
    };
    summarize_paths(&graph.snapshot, paths, &options).context("path hypergraph failed")
}

fn write_path_line(record: &PathRecord, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}\t{}", record.length, record.path.join(" "))
}

fn write_records_pretty(records: &[PathRecord], w: &mut dyn Write) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(w, "No paths found.");
    }
    for (i, record) in records.iter().enumerate() {
        writeln!(w, "  {:>3}. [{}] {}", i + 1, record.length, record.path.join(" → "))?;
    }
    Ok(())
}

fn write_summary_pretty(summary: Option<&EnrichedGraph>, w: &mut dyn Write) -> io::Result<()> {
    let Some(summary) = summary else {
        return Ok(());
    };
    writeln!(w)?;
    pretty_section(w, "Path hypergraph")?;
    pretty_kv(
        w,
        "Nodes",
        format!(
            "{} ({} hypernodes)",
            summary.stats.total_nodes, summary.stats.hypernodes
        ),
    )?;
    pretty_kv(w, "Edges", summary.stats.total_edges.to_string())
}
