use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::cost_grid::CostGrid;
use super::error::{ConnectError, GridError, SearchError};
use super::models::{Coord, TerminalGroup};
use super::owned_network::OwnedNetwork;
use super::path_finder::{find_path_limited, Goal, SearchLimits};

#[derive(Copy, Clone, Debug)]
pub struct ConnectOptions {
    pub tries: usize,
    pub limits: SearchLimits,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self { tries: 10, limits: SearchLimits::default() }
    }
}

#[derive(Clone, Debug)]
pub struct ConnectPlan {
    /// Paths in the order the cheapest trial built them, each source-to-goal.
    pub paths: Vec<Vec<Coord>>,
    pub total_cost: u32,
    /// The merged network the cheapest trial ended with.
    pub network: OwnedNetwork,
    pub trials_attempted: usize,
    pub trials_completed: usize,
}

struct Trial {
    paths: Vec<Vec<Coord>>,
    total_cost: u32,
    network: OwnedNetwork,
}

/// Goal for a trial step: any point of any group not yet merged into home.
struct RemainingGroups<'a>(&'a [OwnedNetwork]);

impl Goal for RemainingGroups<'_> {
    fn reached(&self, c: Coord) -> bool {
        self.0.iter().any(|g| g.covers(c))
    }

    fn prepaid(&self, c: Coord) -> bool {
        self.0.iter().any(|g| g.has_track_at(c))
    }
}

pub fn connect<R: Rng + ?Sized>(
    grid: &CostGrid,
    existing: Option<&OwnedNetwork>,
    groups: &[TerminalGroup],
    tries: usize,
    rng: &mut R,
) -> Result<ConnectPlan, ConnectError> {
    connect_with(grid, existing, groups, ConnectOptions { tries, ..ConnectOptions::default() }, rng)
}

/// Joins every terminal group, plus `existing` when it holds track, into one network.
///
/// Runs `min(tries, group count)` trials, each growing the network outward
/// from a different randomly chosen home group, and keeps the cheapest. A
/// trial that hits an unreachable group or the search expansion cap is
/// dropped; if every trial is dropped the result is [`ConnectError::Unreachable`].
pub fn connect_with<R: Rng + ?Sized>(
    grid: &CostGrid,
    existing: Option<&OwnedNetwork>,
    groups: &[TerminalGroup],
    opts: ConnectOptions,
    rng: &mut R,
) -> Result<ConnectPlan, ConnectError> {
    let mut networks = build_group_networks(grid, groups)?;
    if let Some(net) = existing {
        if net.bounds() != grid.bounds() {
            return Err(GridError::DimensionMismatch { left: grid.bounds(), right: net.bounds() }.into());
        }
        if !net.is_empty() {
            networks.push(net.clone());
        }
    }

    if networks.len() <= 1 {
        let network = networks.pop().unwrap_or_else(|| OwnedNetwork::new(grid.bounds()));
        return Ok(ConnectPlan { paths: Vec::new(), total_cost: 0, network, trials_attempted: 0, trials_completed: 0 });
    }

    let mut homes: Vec<usize> = (0..networks.len()).collect();
    homes.shuffle(rng);
    homes.truncate(opts.tries.clamp(1, networks.len()));
    let seeds: Vec<u64> = homes.iter().map(|_| rng.gen()).collect();
    debug!("connect: {} groups, trial homes {:?}", networks.len(), homes);

    let outcomes: Vec<Result<Option<Trial>, SearchError>> = homes
        .par_iter()
        .zip(seeds.par_iter())
        .map(|(&home, &seed)| {
            let mut trial_rng = ChaCha8Rng::seed_from_u64(seed);
            run_trial(grid, &networks, home, opts.limits, &mut trial_rng)
        })
        .collect();

    let trials_attempted = outcomes.len();
    let mut trials_completed = 0usize;
    let mut best: Option<Trial> = None;
    for (home, outcome) in homes.iter().zip(outcomes) {
        match outcome {
            Ok(Some(trial)) => {
                trials_completed += 1;
                debug!("connect: trial from group {} cost {}", home, trial.total_cost);
                if best.as_ref().map_or(true, |b| trial.total_cost < b.total_cost) {
                    best = Some(trial);
                }
            }
            Ok(None) => warn!("connect: trial from group {} abandoned, a group was unreachable", home),
            Err(SearchError::ExpansionLimit { limit }) => {
                warn!("connect: trial from group {} abandoned, search hit the {} expansion cap", home, limit)
            }
            Err(e) => return Err(e.into()),
        }
    }

    let best = best.ok_or(ConnectError::Unreachable { trials: trials_attempted })?;
    info!(
        "connect: best of {}/{} trials costs {} over {} paths",
        trials_completed,
        trials_attempted,
        best.total_cost,
        best.paths.len()
    );
    Ok(ConnectPlan {
        paths: best.paths,
        total_cost: best.total_cost,
        network: best.network,
        trials_attempted,
        trials_completed,
    })
}

fn build_group_networks(grid: &CostGrid, groups: &[TerminalGroup]) -> Result<Vec<OwnedNetwork>, GridError> {
    let mut networks = Vec::with_capacity(groups.len() + 1);
    for group in groups {
        if group.members.is_empty() {
            warn!("connect: skipping empty terminal group {}", group.label());
            continue;
        }
        let mut net = OwnedNetwork::new(grid.bounds());
        for &m in &group.members {
            if !grid.is_valid(m) {
                return Err(GridError::InvalidCoordinate(m));
            }
            net.add_representative(m)?;
        }
        networks.push(net);
    }
    Ok(networks)
}

/// Grows `networks[home]` until it has absorbed every other network. `None` when one cannot be reached.
fn run_trial<R: Rng + ?Sized>(
    grid: &CostGrid,
    networks: &[OwnedNetwork],
    home: usize,
    limits: SearchLimits,
    rng: &mut R,
) -> Result<Option<Trial>, SearchError> {
    let mut remaining = networks.to_vec();
    let mut home = remaining.remove(home);
    let mut paths = Vec::new();
    let mut total_cost = 0u32;

    while !remaining.is_empty() {
        let sources = home.anchors();
        let goal = RemainingGroups(&remaining);
        let Some(found) = find_path_limited(&sources, grid, Some(&home), &goal, true, limits, rng)? else {
            return Ok(None);
        };
        let (Some(&start), Some(&end)) = (found.path.first(), found.path.last()) else {
            return Ok(None);
        };

        home.add_track(&found.path)?;
        let (joined, rest): (Vec<OwnedNetwork>, Vec<OwnedNetwork>) = remaining.into_iter().partition(|g| g.covers(end));
        for g in &joined {
            home.union(g)?;
        }
        remaining = rest;
        home.remove_unconnected(start)?;

        total_cost += found.cost;
        paths.push(found.path);
    }

    Ok(Some(Trial { paths, total_cost, network: home }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::track::cost_grid::{Terrain, BLANK};
    use crate::commands::track::models::Bounds;
    use crate::commands::track::path_finder::path_cost;

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    fn plain(w: i32, h: i32) -> CostGrid {
        CostGrid::filled(Bounds::new(0, w - 1, 0, h - 1), Terrain::Plain)
    }

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    fn single(x: i32, y: i32) -> TerminalGroup {
        TerminalGroup::new([c(x, y)])
    }

    #[test]
    fn nothing_to_connect() {
        let g = plain(5, 5);
        let plan = connect(&g, None, &[single(1, 1)], 5, &mut rng(0)).unwrap();
        assert!(plan.paths.is_empty());
        assert_eq!(plan.total_cost, 0);
        assert!(plan.network.contains(c(1, 1)));

        let plan = connect(&g, None, &[], 5, &mut rng(0)).unwrap();
        assert!(plan.paths.is_empty());
        assert!(plan.network.is_empty());
    }

    #[test]
    fn corner_to_corner_on_plain_board() {
        let g = plain(5, 5);
        let plan = connect(&g, None, &[single(0, 0), single(4, 4)], 4, &mut rng(17)).unwrap();
        assert_eq!(plan.trials_attempted, 2);
        assert_eq!(plan.trials_completed, 2);
        assert_eq!(plan.paths.len(), 1);
        assert_eq!(plan.total_cost, 8);
        let path = &plan.paths[0];
        let ends = (path[0], path[path.len() - 1]);
        assert!(ends == (c(0, 0), c(4, 4)) || ends == (c(4, 4), c(0, 0)));
        assert_eq!(path_cost(&g, path), Ok(8));
    }

    #[test]
    fn three_terminals_in_a_row() {
        let g = plain(7, 1);
        let groups = [single(0, 0), single(3, 0), single(6, 0)];
        for seed in 0..5 {
            let plan = connect(&g, None, &groups, 3, &mut rng(seed)).unwrap();
            assert_eq!(plan.total_cost, 6);
            assert_eq!(plan.paths.len(), 2);
            for x in 0..7 {
                assert!(plan.network.contains(c(x, 0)));
            }
            assert_eq!(plan.network.iter_edges().count(), 6);
        }
    }

    #[test]
    fn any_member_of_a_group_satisfies_it() {
        let g = plain(7, 1);
        let groups = [single(0, 0), TerminalGroup::named("load", [c(2, 0), c(6, 0)])];
        let plan = connect(&g, None, &groups, 2, &mut rng(3)).unwrap();
        assert_eq!(plan.total_cost, 2);
        assert!(!plan.network.contains(c(6, 0)));
    }

    #[test]
    fn joins_existing_track_at_built_cost() {
        let g = plain(7, 1);
        let mut existing = OwnedNetwork::new(g.bounds());
        existing.add_track(&[c(0, 0), c(1, 0), c(2, 0), c(3, 0)]).unwrap();
        let plan = connect(&g, Some(&existing), &[single(6, 0)], 5, &mut rng(8)).unwrap();
        assert_eq!(plan.trials_attempted, 2);
        // (6,0) -> (4,0) costs 2; stepping onto built track at (3,0) is credited.
        assert_eq!(plan.total_cost, 2);
        for x in 0..7 {
            assert!(plan.network.contains(c(x, 0)));
        }
        assert!(!existing.contains(c(6, 0)));
    }

    #[test]
    fn ferry_route_through_connect() {
        let mut g = plain(11, 11);
        for p in g.bounds().points().collect::<Vec<_>>() {
            g.set_point(p, BLANK).unwrap();
        }
        for p in [c(1, 0), c(2, 0), c(9, 10), c(8, 10)] {
            g.set_terrain(p, Terrain::Plain).unwrap();
        }
        g.set_terrain(c(0, 0), Terrain::Harbor).unwrap();
        g.set_terrain(c(10, 10), Terrain::MajorHarbor).unwrap();
        g.pair_harbors(c(0, 0), c(10, 10), 5).unwrap();

        let plan = connect(&g, None, &[single(2, 0), single(8, 10)], 2, &mut rng(4)).unwrap();
        assert_eq!(plan.total_cost, 11);
        assert_eq!(plan.paths.len(), 1);
        assert_eq!(path_cost(&g, &plan.paths[0]), Ok(11));

        // Both ends on harbors: whichever side starts, the crossing is paid once.
        for seed in 0..4 {
            let plan = connect(&g, None, &[single(0, 0), single(10, 10)], 2, &mut rng(seed)).unwrap();
            assert_eq!(plan.trials_completed, 2);
            assert_eq!(plan.paths.len(), 1);
            assert_eq!(plan.paths[0].len(), 2);
            assert_eq!(plan.total_cost, 8);
        }
    }

    #[test]
    fn trial_hitting_the_expansion_cap_is_dropped() {
        // Open 3x3 patch around (1,1) with a one-wide corridor out to (6,1).
        let mut g = plain(7, 3);
        for p in g.bounds().points().collect::<Vec<_>>() {
            if p.x >= 3 && p.y != 1 {
                g.set_point(p, BLANK).unwrap();
            }
        }
        let groups = [single(1, 1), single(6, 1)];

        // From the patch every point is expanded before the corridor end; from the corridor end far fewer.
        let opts = ConnectOptions { tries: 2, limits: SearchLimits { max_expansions: Some(12) } };
        let plan = connect_with(&g, None, &groups, opts, &mut rng(2)).unwrap();
        assert_eq!(plan.trials_attempted, 2);
        assert_eq!(plan.trials_completed, 1);
        assert_eq!(plan.total_cost, 5);
        assert_eq!(plan.paths[0].first(), Some(&c(6, 1)));
        assert_eq!(plan.paths[0].last(), Some(&c(1, 1)));

        let opts = ConnectOptions { tries: 2, limits: SearchLimits { max_expansions: Some(3) } };
        let err = connect_with(&g, None, &groups, opts, &mut rng(2)).unwrap_err();
        assert_eq!(err, ConnectError::Unreachable { trials: 2 });
    }

    #[test]
    fn unreachable_groups_fail_every_trial() {
        let mut g = plain(5, 1);
        g.set_point(c(2, 0), BLANK).unwrap();
        let err = connect(&g, None, &[single(0, 0), single(4, 0)], 3, &mut rng(1)).unwrap_err();
        assert_eq!(err, ConnectError::Unreachable { trials: 2 });
    }

    #[test]
    fn invalid_member_is_rejected() {
        let g = plain(3, 3);
        let err = connect(&g, None, &[single(0, 0), single(9, 9)], 3, &mut rng(1)).unwrap_err();
        assert_eq!(err, ConnectError::Grid(GridError::InvalidCoordinate(c(9, 9))));
    }

    #[test]
    fn existing_network_must_match_board() {
        let g = plain(3, 3);
        let mut other = OwnedNetwork::new(Bounds::new(0, 5, 0, 5));
        other.add_track(&[c(0, 0)]).unwrap();
        let err = connect(&g, Some(&other), &[single(0, 0)], 3, &mut rng(1)).unwrap_err();
        assert!(matches!(err, ConnectError::Grid(GridError::DimensionMismatch { .. })));
    }

    #[test]
    fn trials_never_exceed_group_count() {
        let g = plain(4, 4);
        let groups = [single(0, 0), single(3, 3), single(0, 3)];
        let plan = connect(&g, None, &groups, 50, &mut rng(6)).unwrap();
        assert_eq!(plan.trials_attempted, 3);
        let plan = connect(&g, None, &groups, 1, &mut rng(6)).unwrap();
        assert_eq!(plan.trials_attempted, 1);
    }

    #[test]
    fn same_seed_same_plan() {
        let mut g = plain(8, 8);
        g.set_terrain(c(3, 3), Terrain::Alpine).unwrap();
        g.set_terrain(c(4, 2), Terrain::Mountain).unwrap();
        let groups = [single(0, 0), single(7, 7), single(0, 7), single(7, 0)];
        let a = connect(&g, None, &groups, 4, &mut rng(99)).unwrap();
        let b = connect(&g, None, &groups, 4, &mut rng(99)).unwrap();
        assert_eq!(a.paths, b.paths);
        assert_eq!(a.total_cost, b.total_cost);
        assert_eq!(a.network, b.network);
    }
}
