#![forbid(unsafe_code)]

mod cmd;
mod config;
mod input;
mod output;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "aopnet: hypergraph summarization and path search for pathway networks",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Graph document (JSON with `nodes`, `edges`, `pathway_names`); `-` reads stdin.
    #[arg(short, long, global = true, default_value = "-", value_name = "FILE")]
    input: PathBuf,

    /// Config file; defaults to `<config dir>/aopnet/config.toml`.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output (alias for `--format json`).
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Summaries",
        about = "Build the hypergraph summary",
        long_about = "Group nodes into type, stressor, and optional community hypernodes.",
        after_help = "EXAMPLES:\n    # Summarize with default chunk size\n    aopnet hypergraph --input graph.json\n\n    # Larger chunks plus a community overlay\n    aopnet hypergraph --input graph.json --max-per-hypernode 8 --community-overlay\n\n    # Emit machine-readable output\n    aopnet hypergraph --input graph.json --json"
    )]
    Hypergraph(cmd::hypergraph::HypergraphArgs),

    #[command(
        next_help_heading = "Summaries",
        about = "Detect communities",
        long_about = "Partition the graph with a named strategy, falling back to louvain and then connected components.",
        after_help = "EXAMPLES:\n    # Louvain communities\n    aopnet communities --input graph.json\n\n    # Spectral with a fixed cluster count\n    aopnet communities --input graph.json --strategy spectral --clusters 4"
    )]
    Communities(cmd::communities::CommunitiesArgs),

    #[command(
        next_help_heading = "Summaries",
        about = "Report network statistics",
        after_help = "EXAMPLES:\n    aopnet stats --input graph.json --format text"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Paths",
        about = "Shortest path between two nodes",
        after_help = "EXAMPLES:\n    aopnet path --input graph.json KE:55 AO:1458"
    )]
    Path(cmd::paths::PathArgs),

    #[command(
        next_help_heading = "Paths",
        about = "K shortest simple paths between two nodes",
        after_help = "EXAMPLES:\n    # Five shortest paths\n    aopnet paths --input graph.json KE:55 AO:1458 -k 5\n\n    # Include a hypergraph of the path nodes\n    aopnet paths --input graph.json KE:55 AO:1458 --hypergraph --json\n\n    # Sample paths between every pair of node types\n    aopnet paths all-types --input graph.json"
    )]
    Paths(cmd::paths::PathsArgs),

    #[command(
        name = "outcome-paths",
        next_help_heading = "Paths",
        about = "Paths from initiating events to outcomes",
        long_about = "Enumerate paths from initiating events to adverse outcomes, bounded by seed and frontier limits.",
        after_help = "EXAMPLES:\n    # Three shortest paths\n    aopnet outcome-paths --input graph.json\n\n    # Ten longest paths\n    aopnet outcome-paths --input graph.json -k 10 --mode longest"
    )]
    OutcomePaths(cmd::paths::OutcomePathsArgs),

    #[command(
        next_help_heading = "Shell",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Shell taken from $SHELL\n    aopnet completions\n\n    # Install for zsh\n    aopnet completions zsh --output ~/.zfunc/_aopnet"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("AOPNET_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "aopnet=debug,info"
        } else {
            "aopnet=info,warn"
        })
    });

    let format = env::var("AOPNET_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, output: OutputMode) -> anyhow::Result<()> {
    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args, &mut command);
    }

    let config = config::load_config(cli.config.as_deref())?;
    let graph = input::load_graph(&cli.input)?;
    info!(
        nodes = graph.snapshot.node_count(),
        edges = graph.snapshot.edge_count(),
        "graph ready"
    );

    match &cli.command {
        Commands::Hypergraph(args) => {
            cmd::hypergraph::run_hypergraph(args, &graph, &config, output)
        }
        Commands::Communities(args) => {
            cmd::communities::run_communities(args, &graph, &config, output)
        }
        Commands::Stats(args) => cmd::stats::run_stats(args, &graph, output),
        Commands::Path(args) => cmd::paths::run_path(args, &graph, output),
        Commands::Paths(args) => cmd::paths::run_paths(args, &graph, &config, output),
        Commands::OutcomePaths(args) => {
            cmd::paths::run_outcome_paths(args, &graph, &config, output)
        }
        Commands::Completions(_) => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(?cli, "parsed arguments");

    let output = cli.output_mode();
    match run(&cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if render_error(output, &CliError::from(&err)).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
