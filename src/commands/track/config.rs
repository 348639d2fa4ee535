use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::{env, path::PathBuf};

use super::cost_grid::HarborPenaltyMode;
use super::network_connector::ConnectOptions;
use super::path_finder::SearchLimits;

pub const DEFAULT_TRIES: usize = 10;

#[derive(Clone, Debug, Default)]
pub struct Config {
    pub board: Option<PathBuf>,
    pub harbors: Option<PathBuf>,
    pub tries: Option<usize>,
    pub seed: Option<u64>,
    pub threads: Option<usize>,
    pub high_harbor_penalty: bool,
    pub max_expansions: Option<usize>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn from_env_defaults() -> Self {
        let board = env::var("TRACK_BOARD").ok().map(PathBuf::from);
        let harbors = env::var("TRACK_HARBORS").ok().map(PathBuf::from);
        let tries = env::var("TRACK_TRIES").ok().and_then(|s| s.parse::<usize>().ok());
        let seed = env::var("TRACK_SEED").ok().and_then(|s| s.parse::<u64>().ok());
        let threads = env::var("TRACK_THREADS").ok().and_then(|s| s.parse::<usize>().ok());
        let high_harbor_penalty = env::var("TRACK_HIGH_HARBOR_PENALTY").ok().map(|v| parse_flag(&v)).unwrap_or(false);
        let max_expansions = env::var("TRACK_MAX_EXPANSIONS").ok().and_then(|s| s.parse::<usize>().ok());
        let log_level = env::var("TRACK_LOG_LEVEL").ok();
        Self { board, harbors, tries, seed, threads, high_harbor_penalty, max_expansions, log_level }
    }

    /// Environment values win over whatever is already set.
    pub fn overlay(mut self, env_cfg: Config) -> Self {
        if env_cfg.board.is_some() { self.board = env_cfg.board; }
        if env_cfg.harbors.is_some() { self.harbors = env_cfg.harbors; }
        if env_cfg.tries.is_some() { self.tries = env_cfg.tries; }
        if env_cfg.seed.is_some() { self.seed = env_cfg.seed; }
        if env_cfg.threads.is_some() { self.threads = env_cfg.threads; }
        if env_cfg.high_harbor_penalty { self.high_harbor_penalty = true; }
        if env_cfg.max_expansions.is_some() { self.max_expansions = env_cfg.max_expansions; }
        if env_cfg.log_level.is_some() { self.log_level = env_cfg.log_level; }
        self
    }

    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    pub fn harbor_penalty_mode(&self) -> HarborPenaltyMode {
        if self.high_harbor_penalty { HarborPenaltyMode::High } else { HarborPenaltyMode::Normal }
    }

    pub fn limits(&self) -> SearchLimits {
        SearchLimits { max_expansions: self.max_expansions }
    }

    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions { tries: self.tries.unwrap_or(DEFAULT_TRIES), limits: self.limits() }
    }
}

fn parse_flag(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}
