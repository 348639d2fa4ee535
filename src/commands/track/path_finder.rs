use log::debug;
use rand::Rng;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use super::cost_grid::CostGrid;
use super::error::{GridError, SearchError};
use super::models::Coord;
use super::neighbor_policy::neighbors;
use super::owned_network::OwnedNetwork;

/// Goal condition for a search.
///
/// `prepaid` marks goal points whose occupancy is already paid for (built
/// track being joined); stepping onto one is credited its standalone point
/// cost. Plain closures never credit.
pub trait Goal {
    fn reached(&self, c: Coord) -> bool;

    fn prepaid(&self, _c: Coord) -> bool {
        false
    }
}

impl<F: Fn(Coord) -> bool> Goal for F {
    fn reached(&self, c: Coord) -> bool {
        self(c)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct AtPoint(pub Coord);

impl Goal for AtPoint {
    fn reached(&self, c: Coord) -> bool {
        c == self.0
    }
}

#[derive(Copy, Clone, Debug)]
pub struct AnyOf<'a>(pub &'a [Coord]);

impl Goal for AnyOf<'_> {
    fn reached(&self, c: Coord) -> bool {
        self.0.contains(&c)
    }
}

/// Any point of an existing network; joining built track is credited.
#[derive(Copy, Clone, Debug)]
pub struct OnNetwork<'a>(pub &'a OwnedNetwork);

impl Goal for OnNetwork<'_> {
    fn reached(&self, c: Coord) -> bool {
        self.0.contains(c)
    }

    fn prepaid(&self, c: Coord) -> bool {
        self.0.has_track_at(c)
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct SearchLimits {
    /// Maximum nodes expanded before giving up; defaults to the grid's point count.
    pub max_expansions: Option<usize>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FoundPath {
    pub path: Vec<Coord>,
    pub cost: u32,
}

#[derive(Copy, Clone, Debug)]
struct SearchNode {
    coord: Coord,
    cost: u32,
    penalty: u32,
    parent: Option<usize>,
}

impl SearchNode {
    fn priority(&self) -> u64 {
        self.cost as u64 + self.penalty as u64
    }
}

/// Min-priority frontier over node indices. Ties at the minimum are broken uniformly at random.
#[derive(Default)]
struct Frontier {
    heap: BinaryHeap<Reverse<(u64, usize)>>,
}

impl Frontier {
    fn push(&mut self, priority: u64, idx: usize) {
        self.heap.push(Reverse((priority, idx)));
    }

    fn pop_min<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        let Reverse((min, first)) = self.heap.pop()?;
        let mut tied = vec![first];
        while let Some(&Reverse((p, idx))) = self.heap.peek() {
            if p != min {
                break;
            }
            self.heap.pop();
            tied.push(idx);
        }
        let pick = tied.swap_remove(rng.gen_range(0..tied.len()));
        for idx in tied {
            self.push(min, idx);
        }
        Some(pick)
    }
}

/// Cost of moving `from -> to` for a network that already owns `owned`.
///
/// Stepping onto a claimed point is free when arriving along claimed track or
/// from unclaimed ground; linking two claimed points without track between
/// them pays the normal build cost.
pub fn network_step_cost(grid: &CostGrid, owned: Option<&OwnedNetwork>, from: Coord, to: Coord) -> Result<u32, GridError> {
    let Some(net) = owned else {
        return grid.edge_cost(from, to);
    };
    let (from_claimed, to_claimed) = (net.contains(from), net.contains(to));
    if to_claimed && (!from_claimed || net.contains_step(from, to)) {
        return Ok(0);
    }
    grid.step_cost(from, to, from_claimed && to_claimed)
}

/// Standalone occupancy cost taken off a step that lands on a prepaid goal point.
fn occupancy_credit<G: Goal + ?Sized>(grid: &CostGrid, goal: &G, to: Coord) -> Result<u32, GridError> {
    if goal.reached(to) && goal.prepaid(to) {
        grid.point_cost(to)
    } else {
        Ok(0)
    }
}

pub fn find_path<G, R>(
    sources: &[Coord],
    grid: &CostGrid,
    owned: Option<&OwnedNetwork>,
    goal: &G,
    reverse: bool,
    rng: &mut R,
) -> Result<Option<FoundPath>, SearchError>
where
    G: Goal + ?Sized,
    R: Rng + ?Sized,
{
    find_path_limited(sources, grid, owned, goal, reverse, SearchLimits::default(), rng)
}

/// Uniform-cost search from every source (each at cost 0) to the first point satisfying `goal`.
///
/// The returned path runs goal-to-source, or source-to-goal when `reverse` is
/// set. `Ok(None)` means no route exists.
pub fn find_path_limited<G, R>(
    sources: &[Coord],
    grid: &CostGrid,
    owned: Option<&OwnedNetwork>,
    goal: &G,
    reverse: bool,
    limits: SearchLimits,
    rng: &mut R,
) -> Result<Option<FoundPath>, SearchError>
where
    G: Goal + ?Sized,
    R: Rng + ?Sized,
{
    let limit = limits.max_expansions.unwrap_or_else(|| grid.bounds().point_count());
    let mut nodes: Vec<SearchNode> = Vec::new();
    let mut frontier = Frontier::default();
    let mut visited: HashSet<Coord> = HashSet::new();

    for &s in sources {
        if !grid.is_valid(s) {
            return Err(GridError::InvalidCoordinate(s).into());
        }
        nodes.push(SearchNode { coord: s, cost: 0, penalty: 0, parent: None });
        frontier.push(0, nodes.len() - 1);
    }

    let mut expanded = 0usize;
    while let Some(idx) = frontier.pop_min(rng) {
        let node = nodes[idx];
        if !visited.insert(node.coord) {
            continue;
        }
        expanded += 1;
        if expanded > limit {
            return Err(SearchError::ExpansionLimit { limit });
        }

        if goal.reached(node.coord) {
            let path = trace_back(&nodes, idx, reverse);
            debug!(
                "search: reached {} from {} sources, cost={} len={} expanded={}",
                node.coord,
                sources.len(),
                node.cost,
                path.len(),
                expanded
            );
            return Ok(Some(FoundPath { path, cost: node.cost }));
        }

        let at_harbor = grid.is_harbor(node.coord);
        for n in neighbors(node.coord) {
            if !grid.is_valid(n) || visited.contains(&n) {
                continue;
            }
            // Harbor to harbor only via the ferry jump below.
            if at_harbor && grid.is_harbor(n) {
                continue;
            }
            let step = network_step_cost(grid, owned, node.coord, n)?;
            let step = step.saturating_sub(occupancy_credit(grid, goal, n)?);
            nodes.push(SearchNode { coord: n, cost: node.cost + step, penalty: node.penalty, parent: Some(idx) });
            let pushed = nodes.len() - 1;
            frontier.push(nodes[pushed].priority(), pushed);
        }

        if at_harbor {
            let other = grid.paired_harbor(node.coord)?;
            if !visited.contains(&other) {
                let crossing = ferry_charge(grid, node.coord, node.parent.is_none())?;
                nodes.push(SearchNode {
                    coord: other,
                    cost: node.cost + crossing,
                    penalty: node.penalty + grid.harbor_penalty(),
                    parent: Some(idx),
                });
                let pushed = nodes.len() - 1;
                frontier.push(nodes[pushed].priority(), pushed);
            }
        }
    }

    debug!("search: no route from {} sources after {} expansions", sources.len(), expanded);
    Ok(None)
}

fn trace_back(nodes: &[SearchNode], mut idx: usize, reverse: bool) -> Vec<Coord> {
    let mut path = vec![nodes[idx].coord];
    while let Some(parent) = nodes[idx].parent {
        idx = parent;
        path.push(nodes[idx].coord);
    }
    if reverse {
        path.reverse();
    }
    path
}

/// Crossing charge for a ferry jump out of `harbor`.
///
/// The crossing is part of the harbor's entry cost, so it is only still owed
/// when the route starts on the departure harbor.
fn ferry_charge(grid: &CostGrid, harbor: Coord, departs_from_source: bool) -> Result<u32, GridError> {
    if departs_from_source {
        grid.point_cost(harbor)
    } else {
        Ok(0)
    }
}

/// Recomputes the build cost of a source-to-goal path on an unowned board.
pub fn path_cost(grid: &CostGrid, path: &[Coord]) -> Result<u32, GridError> {
    network_path_cost(grid, None, path)
}

/// Recomputes the build cost of a source-to-goal path for a network owning `owned`.
///
/// Each step is priced with [`network_step_cost`]; a ferry jump is priced
/// like the search prices it. No goal occupancy credit is applied.
pub fn network_path_cost(grid: &CostGrid, owned: Option<&OwnedNetwork>, path: &[Coord]) -> Result<u32, GridError> {
    let mut total = 0;
    for (i, pair) in path.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        if grid.is_harbor(a) && grid.paired_harbor(a)? == b {
            total += ferry_charge(grid, a, i == 0)?;
            continue;
        }
        total += network_step_cost(grid, owned, a, b)?;
    }
    Ok(total)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PathSummary {
    pub from: Option<Coord>,
    pub to: Option<Coord>,
    pub cost: u32,
    pub length: usize,
}

impl PathSummary {
    pub fn of(found: &FoundPath) -> Self {
        Self {
            from: found.path.first().copied(),
            to: found.path.last().copied(),
            cost: found.cost,
            length: found.path.len(),
        }
    }
}
