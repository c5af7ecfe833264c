use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mapf_lns::collision::check_collisions;
use mapf_lns::config::{Cli, Config};
use mapf_lns::error::MapfError;
use mapf_lns::grid::Grid;
use mapf_lns::instance::Instance;
use mapf_lns::lns::Lns;
use mapf_lns::stat::write_stats;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::new(&cli).context("invalid configuration")?;
    init_logging(&config.log_level);

    let grid = Grid::from_map_file(&config.map_path).context("failed to load map")?;
    let instance = Instance::load(grid, &config.agents_path, config.agent_num)
        .context("failed to load scenario")?;

    if config.screen >= 1 {
        info!(agents = instance.agents.len(), "instance loaded");
    }

    let mut lns = match Lns::new(&instance.grid, &instance.agents, config.lns.clone()) {
        Ok(lns) => lns,
        Err(MapfError::NoInitialSolution) => {
            // spec §7: InitialSolutionFailure — reported, exit non-zero,
            // no output files written.
            anyhow::bail!("no initial solution found within the time budget");
        }
        Err(e) => return Err(e.into()),
    };

    let initial_cost = lns.solution().cost();
    if config.screen >= 1 {
        info!(cost = initial_cost, "initial solution");
    }

    lns.run();

    let conflicts = check_collisions(lns.solution());
    if !conflicts.is_empty() {
        warn!(count = conflicts.len(), "solution has residual conflicts");
    }

    if config.screen >= 1 {
        info!(
            final_cost = lns.solution().cost(),
            iterations = lns.stats().len(),
            "LNS session complete"
        );
    }

    if let Some(path) = &config.output_paths {
        write_paths(path, &instance, lns.solution())
            .with_context(|| format!("failed to write paths to {path}"))?;
    }
    if let Some(path) = &config.stats_path {
        write_stats(path, lns.stats()).with_context(|| format!("failed to write stats to {path}"))?;
    }

    Ok(())
}

fn write_paths(
    path: &str,
    instance: &mapf_lns::instance::Instance,
    solution: &mapf_lns::instance::Solution,
) -> std::io::Result<()> {
    use std::io::Write;
    let mut file = std::fs::File::create(path)?;
    for agent in &instance.agents {
        if let Some(p) = solution.get(agent.id) {
            writeln!(file, "Agent {}: {}", agent.id, p)?;
        }
    }
    Ok(())
}

fn init_logging(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
