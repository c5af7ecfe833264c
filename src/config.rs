use std::time::Duration;

use anyhow::anyhow;
use clap::Parser;

use crate::lns::LnsConfig;

#[derive(Parser, Debug)]
#[command(
    name = "mapf-lns",
    about = "Anytime Multi-Agent Path Finding via Space-Time A* and Prioritized Planning + LNS.",
    author = "Moriarty Yu",
    version = "1.0"
)]
pub struct Cli {
    #[arg(long, help = "Path to the obstacle map file")]
    pub map: String,

    #[arg(long, help = "Path to the scenario file")]
    pub agents: String,

    #[arg(
        long = "agentNum",
        help = "Number of agents to load (0 = all)",
        default_value_t = 0
    )]
    pub agent_num: usize,

    #[arg(
        long = "neighborSize",
        help = "LNS destroy neighborhood size",
        default_value_t = 8
    )]
    pub neighbor_size: usize,

    #[arg(
        long = "maxIterations",
        help = "Maximum LNS iterations",
        default_value_t = usize::MAX
    )]
    pub max_iterations: usize,

    #[arg(
        long = "cutoffTime",
        help = "Wall-clock time budget in seconds",
        default_value_t = 60.0
    )]
    pub cutoff_time: f64,

    #[arg(long = "outputPaths", help = "Path to write the final paths to")]
    pub output_paths: Option<String>,

    #[arg(long = "stats", help = "Path to write the per-iteration stats CSV to")]
    pub stats: Option<String>,

    #[arg(
        long = "screen",
        help = "Verbosity: 0 silent, 1 summary",
        default_value_t = 0
    )]
    pub screen: u8,

    #[arg(long, help = "RNG seed for deterministic LNS runs", default_value_t = 0)]
    pub seed: u64,

    #[arg(
        long = "log-level",
        help = "tracing-subscriber EnvFilter directive",
        default_value = "info"
    )]
    pub log_level: String,

    #[arg(long = "maxExpansions", help = "Per-search A* expansion cutoff", default_value_t = 100_000)]
    pub max_expansions: usize,

    #[arg(long = "maxT", help = "Per-search A* time-step cutoff", default_value_t = 5000)]
    pub max_t: usize,
}

/// Validated run configuration derived from `Cli`.
#[derive(Debug, Clone)]
pub struct Config {
    pub map_path: String,
    pub agents_path: String,
    pub agent_num: usize,
    pub output_paths: Option<String>,
    pub stats_path: Option<String>,
    pub screen: u8,
    pub log_level: String,
    pub lns: LnsConfig,
}

impl Config {
    pub fn new(cli: &Cli) -> anyhow::Result<Self> {
        if cli.cutoff_time <= 0.0 {
            return Err(anyhow!(
                "--cutoffTime must be positive, got {}",
                cli.cutoff_time
            ));
        }
        if cli.neighbor_size == 0 {
            return Err(anyhow!("--neighborSize must be at least 1"));
        }

        Ok(Config {
            map_path: cli.map.clone(),
            agents_path: cli.agents.clone(),
            agent_num: cli.agent_num,
            output_paths: cli.output_paths.clone(),
            stats_path: cli.stats.clone(),
            screen: cli.screen,
            log_level: cli.log_level.clone(),
            lns: LnsConfig {
                neighbor_size: cli.neighbor_size,
                max_iterations: cli.max_iterations,
                time_limit: Duration::from_secs_f64(cli.cutoff_time),
                seed: cli.seed,
                bounds: crate::astar::SearchBounds {
                    max_t: cli.max_t,
                    max_expansions: cli.max_expansions,
                },
            },
        })
    }
}
