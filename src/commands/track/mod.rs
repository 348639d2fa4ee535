use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

pub mod config;
pub mod logging;
pub mod error;
pub mod models;
pub mod neighbor_policy;
pub mod cost_grid;
pub mod owned_network;
pub mod path_finder;
pub mod network_connector;

pub use cost_grid::{CostGrid, HarborPenaltyMode, Terrain};
pub use error::{ConnectError, GridError, SearchError};
pub use models::{Bounds, Coord, TerminalGroup};
pub use network_connector::{connect, connect_with, ConnectOptions, ConnectPlan};
pub use owned_network::OwnedNetwork;
pub use path_finder::{
    find_path, find_path_limited, network_path_cost, path_cost, AnyOf, AtPoint, FoundPath, Goal, OnNetwork, PathSummary,
    SearchLimits,
};

#[derive(Args, Debug, Clone)]
pub struct CommonOpts {
    /// ASCII board file (default: repo_root/database/board_ascii.txt or TRACK_BOARD)
    #[arg(long, global = true)]
    pub board: Option<PathBuf>,
    /// Harbor pairing file (default: repo_root/database/harbors.txt or TRACK_HARBORS)
    #[arg(long, global = true)]
    pub harbors: Option<PathBuf>,
    /// Number of randomized trial orderings for connect
    #[arg(long, global = true)]
    pub tries: Option<usize>,
    /// Seed for trial ordering and tie-breaking
    #[arg(long, global = true)]
    pub seed: Option<u64>,
    /// Number of worker threads (rayon)
    #[arg(long, global = true)]
    pub threads: Option<usize>,
    /// Discourage ferry crossings when ordering the search frontier
    #[arg(long = "high-harbor-penalty", global = true)]
    pub high_harbor_penalty: bool,
    /// Give up a single search after expanding this many points
    #[arg(long = "max-expansions", global = true)]
    pub max_expansions: Option<usize>,
    /// Log level (trace|debug|info|warn|error)
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TrackCommand {
    /// Cheapest route from any source point to any target point
    #[command(name = "path")]
    Path {
        /// Source point `x,y` (repeatable)
        #[arg(long = "from", required = true, value_parser = parse_coord_arg)]
        from: Vec<Coord>,
        /// Target point `x,y` (repeatable)
        #[arg(long = "to", required = true, value_parser = parse_coord_arg)]
        to: Vec<Coord>,
        /// Owned track (JSON paths); travel along it is free
        #[arg(long)]
        track: Option<PathBuf>,
    },
    /// Connect every terminal group into one network
    #[command(name = "connect")]
    Connect {
        /// Terminal groups JSON file
        #[arg(long)]
        groups: PathBuf,
        /// Existing track (JSON paths) to build from
        #[arg(long)]
        track: Option<PathBuf>,
        /// Write the chosen paths here as a track file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the edges of a track file
    #[command(name = "edges")]
    Edges {
        #[arg(long)]
        track: PathBuf,
    },
}

#[derive(Serialize, Debug)]
struct PathReport {
    cost: u32,
    length: usize,
    from: Option<Coord>,
    to: Option<Coord>,
    path: Vec<Coord>,
}

#[derive(Serialize, Debug)]
struct ConnectReport {
    total_cost: u32,
    trials_attempted: usize,
    trials_completed: usize,
    paths: Vec<Vec<Coord>>,
}

pub fn cmd_track(common: CommonOpts, sub: TrackCommand) -> Result<()> {
    // Env overrides CLI when set
    let cli_cfg = config::Config {
        board: common.board,
        harbors: common.harbors,
        tries: common.tries,
        seed: common.seed,
        threads: common.threads,
        high_harbor_penalty: common.high_harbor_penalty,
        max_expansions: common.max_expansions,
        log_level: common.log_level,
    };
    let cfg = cli_cfg.overlay(config::Config::from_env_defaults());

    logging::init(cfg.log_level.as_deref());
    if let Some(n) = cfg.threads {
        let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
    }

    let (def_board, def_harbors) = crate::util::default_paths();
    let board_path = cfg.board.clone().unwrap_or(def_board);
    let harbor_path = resolve_harbor_path(cfg.harbors.clone(), def_harbors);
    let mut grid = crate::board_file::load_board(&board_path, harbor_path.as_deref())?;
    grid.set_harbor_penalty_mode(cfg.harbor_penalty_mode());
    info!("track: board {} loaded, bounds {:?}", board_path.display(), grid.bounds());

    let mut rng = cfg.rng();
    match sub {
        TrackCommand::Path { from, to, track } => {
            let owned = match track {
                Some(p) => Some(crate::board_file::load_track(&p, grid.bounds())?),
                None => None,
            };
            let found = find_path_limited(&from, &grid, owned.as_ref(), &AnyOf(&to), true, cfg.limits(), &mut rng)?;
            let Some(found) = found else {
                bail!("no route from {:?} to {:?}", from, to);
            };
            let summary = PathSummary::of(&found);
            let report = PathReport {
                cost: summary.cost,
                length: summary.length,
                from: summary.from,
                to: summary.to,
                path: found.path,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        TrackCommand::Connect { groups, track, out } => {
            let groups = crate::board_file::load_groups(&groups)?;
            let existing = match track {
                Some(p) => Some(crate::board_file::load_track(&p, grid.bounds())?),
                None => None,
            };
            let plan = connect_with(&grid, existing.as_ref(), &groups, cfg.connect_options(), &mut rng)?;
            if let Some(out) = out {
                crate::board_file::save_track(&out, &plan.paths)?;
                info!("track: wrote {} paths to {}", plan.paths.len(), out.display());
            }
            let report = ConnectReport {
                total_cost: plan.total_cost,
                trials_attempted: plan.trials_attempted,
                trials_completed: plan.trials_completed,
                paths: plan.paths,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        TrackCommand::Edges { track } => {
            let net = crate::board_file::load_track(&track, grid.bounds())?;
            for (a, b) in net.iter_edges() {
                println!("{} -> {}", a, b);
            }
            Ok(())
        }
    }
}

/// An explicit harbor file is always read; the default one only when present.
fn resolve_harbor_path(explicit: Option<PathBuf>, default: PathBuf) -> Option<PathBuf> {
    match explicit {
        Some(p) => Some(p),
        None => default.exists().then_some(default),
    }
}

fn parse_coord_arg(s: &str) -> std::result::Result<Coord, String> {
    crate::board_file::parse_coord(s).map_err(|e| e.to_string())
}
