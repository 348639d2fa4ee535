use std::collections::BTreeSet;

use super::error::GridError;
use super::models::{Bounds, Coord};
use super::neighbor_policy::{is_one_step, Offset, FORWARD_OFFSETS, HEX_OFFSETS};

/// Track claimed by one player, over the same double-resolution layout as the cost grid.
///
/// A point cell is set once it is built on, an edge cell once track is laid
/// along it. `representatives` are the points the network has to stay
/// connected to; pruning re-anchors them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnedNetwork {
    bounds: Bounds,
    cells: Vec<bool>,
    representatives: BTreeSet<Coord>,
}

impl OwnedNetwork {
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds, cells: vec![false; bounds.width() * bounds.height()], representatives: BTreeSet::new() }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn representatives(&self) -> &BTreeSet<Coord> {
        &self.representatives
    }

    /// Search sources for this network: its representatives, or every claimed
    /// point when none were recorded.
    pub fn anchors(&self) -> Vec<Coord> {
        if self.representatives.is_empty() {
            self.claimed_points().collect()
        } else {
            self.representatives.iter().copied().collect()
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|&b| b)
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|b| *b = false);
        self.representatives.clear();
    }

    fn index(&self, (col, row): (usize, usize)) -> usize {
        row * self.bounds.width() + col
    }

    fn point_index(&self, c: Coord) -> Option<usize> {
        self.bounds.point_cell(c).map(|cell| self.index(cell))
    }

    fn edge_index(&self, c: Coord, Offset(dx, dy): Offset) -> Option<usize> {
        self.bounds.edge_cell(c, dx, dy).map(|cell| self.index(cell))
    }

    pub fn contains(&self, c: Coord) -> bool {
        self.point_index(c).map(|i| self.cells[i]).unwrap_or(false)
    }

    pub fn contains_edge(&self, c: Coord, direction: Offset) -> bool {
        if !is_one_step(direction.0, direction.1) {
            return false;
        }
        self.edge_index(c, direction).map(|i| self.cells[i]).unwrap_or(false)
    }

    /// True when track runs directly between `a` and `b`.
    pub fn contains_step(&self, a: Coord, b: Coord) -> bool {
        let (dx, dy) = a.delta_to(b);
        self.contains_edge(a, Offset(dx, dy))
    }

    /// Claimed point or representative.
    pub fn covers(&self, c: Coord) -> bool {
        self.contains(c) || self.representatives.contains(&c)
    }

    /// Claimed point with at least one claimed incident edge.
    pub fn has_track_at(&self, c: Coord) -> bool {
        self.contains(c) && HEX_OFFSETS.iter().any(|&dir| self.contains_edge(c, dir))
    }

    /// Claims every point of `sequence` and the edge between each adjacent
    /// consecutive pair. Non-adjacent steps (joins between concatenated
    /// sub-paths) are skipped.
    pub fn add_track(&mut self, sequence: &[Coord]) -> Result<(), GridError> {
        for (i, &c) in sequence.iter().enumerate() {
            let idx = self.point_index(c).ok_or(GridError::InvalidCoordinate(c))?;
            self.cells[idx] = true;
            if let Some(&next) = sequence.get(i + 1) {
                let (dx, dy) = c.delta_to(next);
                if is_one_step(dx, dy) {
                    if let Some(e) = self.edge_index(c, Offset(dx, dy)) {
                        self.cells[e] = true;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn add_representative(&mut self, c: Coord) -> Result<(), GridError> {
        let idx = self.point_index(c).ok_or(GridError::InvalidCoordinate(c))?;
        if self.is_empty() {
            self.cells[idx] = true;
        }
        self.representatives.insert(c);
        Ok(())
    }

    pub fn union(&mut self, other: &OwnedNetwork) -> Result<(), GridError> {
        if self.bounds != other.bounds {
            return Err(GridError::DimensionMismatch { left: self.bounds, right: other.bounds });
        }
        for (mine, theirs) in self.cells.iter_mut().zip(other.cells.iter()) {
            *mine |= *theirs;
        }
        self.representatives.extend(other.representatives.iter().copied());
        Ok(())
    }

    /// Re-anchors on `anchor` and drops every other claimed point that has no
    /// claimed incident edge.
    pub fn remove_unconnected(&mut self, anchor: Coord) -> Result<(), GridError> {
        if self.point_index(anchor).is_none() {
            return Err(GridError::InvalidCoordinate(anchor));
        }
        self.representatives.clear();
        self.representatives.insert(anchor);

        let orphans: Vec<Coord> = self
            .claimed_points()
            .filter(|&c| c != anchor && !self.has_track_at(c))
            .collect();
        for c in orphans {
            if let Some(idx) = self.point_index(c) {
                self.cells[idx] = false;
            }
        }
        Ok(())
    }

    pub fn claimed_points(&self) -> impl Iterator<Item = Coord> + '_ {
        self.bounds.points().filter(move |&c| self.contains(c))
    }

    /// Every claimed edge once, in x-major coordinate order. Re-scans on each call.
    pub fn iter_edges(&self) -> impl Iterator<Item = (Coord, Coord)> + '_ {
        self.bounds.points().flat_map(move |c| {
            FORWARD_OFFSETS
                .into_iter()
                .filter(move |&dir| self.contains_edge(c, dir))
                .map(move |Offset(dx, dy)| (c, c.offset(dx, dy)))
        })
    }
}
