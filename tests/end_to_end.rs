//! End-to-end scenarios driving the full pipeline: map/scenario parsing
//! through `Instance::load`, initial planning via `plan_prioritized`, the
//! anytime `Lns` loop, and verification via `check_collisions`. Colocated
//! unit tests exercise each module in isolation; these cover the
//! multi-component scenarios from the spec's testable-properties list.

use std::io::Write;
use std::time::{Duration, Instant};

use mapf_lns::astar::SearchBounds;
use mapf_lns::collision::check_collisions;
use mapf_lns::grid::Grid;
use mapf_lns::instance::Instance;
use mapf_lns::lns::{Lns, LnsConfig};

fn write_tmp(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    write!(f, "{contents}").unwrap();
    f
}

/// A 10x10 open map with a 3x3 blocked block carved out of the middle,
/// and a scenario of 10 agents forming a cyclic rotation around that
/// block (spec §8 scenario 5).
fn ring_map_and_scenario() -> (tempfile::NamedTempFile, tempfile::NamedTempFile) {
    let mut rows = vec![".".repeat(10); 10];
    for r in 4..7 {
        let mut row: Vec<char> = rows[r].chars().collect();
        for c in 4..7 {
            row[c] = '@';
        }
        rows[r] = row.into_iter().collect();
    }
    let map_body = rows.join("\n");
    let map = write_tmp(
        &format!("type octile\nheight 10\nwidth 10\nmap\n{map_body}\n"),
        ".map",
    );

    let ring: Vec<(usize, usize)> = vec![
        (3, 3),
        (3, 4),
        (3, 5),
        (3, 6),
        (4, 7),
        (5, 7),
        (6, 7),
        (6, 6),
        (6, 5),
        (6, 4),
    ];
    let mut scen = String::from("version 1\n");
    for (i, &(sr, sc)) in ring.iter().enumerate() {
        let (gr, gc) = ring[(i + 1) % ring.len()];
        // Scenario file is column-first: id map W H start_col start_row goal_col goal_row optimal_cost
        scen.push_str(&format!("{i}\tring.map\t10\t10\t{sc}\t{sr}\t{gc}\t{gr}\t1\n"));
    }
    let scenario = write_tmp(&scen, ".scen");
    (map, scenario)
}

#[test]
fn ring_of_ten_agents_has_valid_initial_solution_and_lns_does_not_regress() {
    let (map_file, scen_file) = ring_map_and_scenario();
    let grid = Grid::from_map_file(map_file.path()).unwrap();
    let instance = Instance::load(grid, scen_file.path(), 0).unwrap();
    assert_eq!(instance.agents.len(), 10);

    let config = LnsConfig {
        neighbor_size: 4,
        max_iterations: 50,
        time_limit: Duration::from_secs(5),
        seed: 42,
        bounds: SearchBounds::default(),
    };
    let mut lns = Lns::new(&instance.grid, &instance.agents, config).unwrap();

    assert!(check_collisions(lns.solution()).is_empty());
    let initial_cost = lns.solution().cost();

    lns.run();

    assert!(lns.solution().cost() <= initial_cost);
    assert!(check_collisions(lns.solution()).is_empty());
    // failed_iterations is allowed to be nonzero; only cost monotonicity
    // and validity are guaranteed.
    assert!(lns.stats().len() <= 50);
}

#[test]
fn deadline_is_honored_within_one_and_a_half_seconds_wall_clock() {
    let (map_file, scen_file) = ring_map_and_scenario();
    let grid = Grid::from_map_file(map_file.path()).unwrap();
    let instance = Instance::load(grid, scen_file.path(), 0).unwrap();

    let config = LnsConfig {
        neighbor_size: 8,
        max_iterations: 1_000_000,
        time_limit: Duration::from_secs(1),
        seed: 3,
        bounds: SearchBounds::default(),
    };
    let mut lns = Lns::new(&instance.grid, &instance.agents, config).unwrap();

    let start = Instant::now();
    lns.run();
    let elapsed = start.elapsed();

    assert!(
        elapsed < Duration::from_millis(1500),
        "planner overran deadline: {elapsed:?}"
    );
    assert!(check_collisions(lns.solution()).is_empty());
}

#[test]
fn agent_on_blocked_goal_is_skipped_and_remaining_agents_still_plan() {
    let map = write_tmp(
        "type octile\nheight 3\nwidth 3\nmap\n...\n.@.\n...\n",
        ".map",
    );
    let scen = write_tmp(
        "version 1\n\
         0\tm\t3\t3\t0\t0\t1\t1\t2\n\
         1\tm\t3\t3\t2\t0\t0\t2\t2\n",
        ".scen",
    );

    let grid = Grid::from_map_file(map.path()).unwrap();
    let instance = Instance::load(grid, scen.path(), 0).unwrap();

    // Agent 0's goal (1,1) is the blocked cell; it is dropped. Agent 1
    // survives and is re-stamped to id 0.
    assert_eq!(instance.agents.len(), 1);
    assert_eq!(instance.agents[0].start, (0, 2));
    assert_eq!(instance.agents[0].goal, (2, 0));

    let lns = Lns::new(&instance.grid, &instance.agents, LnsConfig::default()).unwrap();
    assert!(check_collisions(lns.solution()).is_empty());
}

#[test]
fn three_by_three_straight_line_matches_spec_scenario_one() {
    let map = write_tmp("type octile\nheight 3\nwidth 3\nmap\n...\n...\n...\n", ".map");
    let scen = write_tmp("version 1\n0\tm\t3\t3\t0\t0\t2\t0\t2\n", ".scen");

    let grid = Grid::from_map_file(map.path()).unwrap();
    let instance = Instance::load(grid, scen.path(), 0).unwrap();
    let lns = Lns::new(&instance.grid, &instance.agents, LnsConfig::default()).unwrap();

    let path = lns.solution().get(0).unwrap();
    assert_eq!(path.len(), 3);
    assert_eq!(path.0, vec![(0, 0), (0, 1), (0, 2)]);
}
