use std::collections::HashMap;

use super::error::GridError;
use super::models::{Bounds, Coord};
use super::neighbor_policy::is_one_step;

pub const BLANK: char = ' ';

/// Extra crossing cost when either side of a ferry line is a major harbor.
pub const MAJOR_HARBOR_SURCHARGE: u32 = 3;

/// Frontier priority added to a harbor jump when the grid is in high-penalty mode.
pub const HIGH_HARBOR_PENALTY: u32 = 10;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Terrain {
    Plain,
    Lake,
    Mountain,
    Alpine,
    SmallCity,
    MediumCity,
    Harbor,
    MajorHarbor,
}

impl Terrain {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            '.' => Some(Terrain::Plain),
            'L' => Some(Terrain::Lake),
            'm' => Some(Terrain::Mountain),
            'a' => Some(Terrain::Alpine),
            'S' => Some(Terrain::SmallCity),
            'M' => Some(Terrain::MediumCity),
            'h' => Some(Terrain::Harbor),
            'H' => Some(Terrain::MajorHarbor),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Terrain::Plain => '.',
            Terrain::Lake => 'L',
            Terrain::Mountain => 'm',
            Terrain::Alpine => 'a',
            Terrain::SmallCity => 'S',
            Terrain::MediumCity => 'M',
            Terrain::Harbor => 'h',
            Terrain::MajorHarbor => 'H',
        }
    }

    pub fn is_harbor(self) -> bool {
        matches!(self, Terrain::Harbor | Terrain::MajorHarbor)
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum HarborPenaltyMode {
    #[default]
    Normal,
    High,
}

/// Board terrain plus per-edge crossing surcharges, stored at double resolution.
#[derive(Clone, Debug)]
pub struct CostGrid {
    bounds: Bounds,
    rows: Vec<Vec<char>>,
    harbors: HashMap<Coord, (Coord, u32)>,
    harbor_penalty_mode: HarborPenaltyMode,
}

impl CostGrid {
    /// Builds a grid from raw rows (row 0 at `max_y`). Short rows and missing
    /// trailing rows are padded with blanks.
    pub fn new(bounds: Bounds, mut rows: Vec<Vec<char>>, harbors: HashMap<Coord, (Coord, u32)>) -> Result<Self, GridError> {
        let (width, height) = (bounds.width(), bounds.height());
        if rows.len() > height || rows.iter().any(|r| r.len() > width) {
            return Err(GridError::MalformedRows { expected_rows: height, expected_width: width });
        }
        rows.resize_with(height, Vec::new);
        for row in rows.iter_mut() {
            row.resize(width, BLANK);
        }
        let grid = Self { bounds, rows, harbors, harbor_penalty_mode: HarborPenaltyMode::Normal };
        grid.check_harbor_table()?;
        Ok(grid)
    }

    /// Every point set to `terrain`, every edge free.
    pub fn filled(bounds: Bounds, terrain: Terrain) -> Self {
        let mut rows = vec![vec![BLANK; bounds.width()]; bounds.height()];
        for c in bounds.points() {
            if let Some((col, row)) = bounds.point_cell(c) {
                rows[row][col] = terrain.code();
            }
        }
        Self { bounds, rows, harbors: HashMap::new(), harbor_penalty_mode: HarborPenaltyMode::Normal }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn harbor_penalty_mode(&self) -> HarborPenaltyMode {
        self.harbor_penalty_mode
    }

    pub fn set_harbor_penalty_mode(&mut self, mode: HarborPenaltyMode) {
        self.harbor_penalty_mode = mode;
    }

    /// Priority penalty for a ferry jump. Never part of a recorded cost.
    pub fn harbor_penalty(&self) -> u32 {
        match self.harbor_penalty_mode {
            HarborPenaltyMode::Normal => 0,
            HarborPenaltyMode::High => HIGH_HARBOR_PENALTY,
        }
    }

    pub fn set_point(&mut self, c: Coord, code: char) -> Result<(), GridError> {
        let (col, row) = self.bounds.point_cell(c).ok_or(GridError::InvalidCoordinate(c))?;
        self.rows[row][col] = code;
        Ok(())
    }

    pub fn set_terrain(&mut self, c: Coord, terrain: Terrain) -> Result<(), GridError> {
        self.set_point(c, terrain.code())
    }

    /// Records a river/strait surcharge (0-9) on the edge between two adjacent points.
    pub fn set_surcharge(&mut self, a: Coord, b: Coord, surcharge: u32) -> Result<(), GridError> {
        let (dx, dy) = a.delta_to(b);
        if !is_one_step(dx, dy) {
            return Err(GridError::NonAdjacentStep { from: a, to: b });
        }
        let (col, row) = self.bounds.edge_cell(a, dx, dy).ok_or(GridError::InvalidCoordinate(b))?;
        self.rows[row][col] = if surcharge == 0 {
            BLANK
        } else {
            char::from_digit(surcharge.min(9), 10).unwrap_or('9')
        };
        Ok(())
    }

    /// Pairs two harbor points in both directions with a ferry `cost`.
    pub fn pair_harbors(&mut self, a: Coord, b: Coord, cost: u32) -> Result<(), GridError> {
        for c in [a, b] {
            if !self.is_harbor(c) {
                return Err(GridError::NotAHarbor(c));
            }
        }
        self.harbors.insert(a, (b, cost));
        self.harbors.insert(b, (a, cost));
        Ok(())
    }

    pub fn cell_at(&self, c: Coord) -> Option<char> {
        self.bounds.point_cell(c).map(|(col, row)| self.rows[row][col])
    }

    pub fn is_valid(&self, c: Coord) -> bool {
        matches!(self.cell_at(c), Some(code) if code != BLANK)
    }

    pub fn is_harbor(&self, c: Coord) -> bool {
        matches!(self.cell_at(c), Some('h') | Some('H'))
    }

    pub fn terrain(&self, c: Coord) -> Result<Terrain, GridError> {
        match self.cell_at(c) {
            None | Some(BLANK) => Err(GridError::InvalidCoordinate(c)),
            Some(code) => Terrain::from_code(code).ok_or(GridError::UnrecognizedTerrain { code, at: c }),
        }
    }

    pub fn paired_harbor(&self, c: Coord) -> Result<Coord, GridError> {
        self.harbor_crossing(c).map(|(other, _)| other)
    }

    /// Partner harbor and ferry cost for `c`.
    pub fn harbor_crossing(&self, c: Coord) -> Result<(Coord, u32), GridError> {
        if !self.is_harbor(c) {
            return Err(GridError::NotAHarbor(c));
        }
        self.harbors.get(&c).copied().ok_or(GridError::UnpairedHarbor(c))
    }

    /// Cost of first occupying `c`, with no travel-edge component.
    pub fn point_cost(&self, c: Coord) -> Result<u32, GridError> {
        let cost = match self.terrain(c)? {
            Terrain::Plain | Terrain::Lake => 1,
            Terrain::Mountain => 2,
            Terrain::Alpine => 5,
            Terrain::SmallCity | Terrain::MediumCity => 3,
            Terrain::Harbor => {
                let (other, ferry) = self.harbor_crossing(c)?;
                if self.cell_at(other) == Some('H') {
                    ferry + MAJOR_HARBOR_SURCHARGE
                } else {
                    ferry
                }
            }
            Terrain::MajorHarbor => {
                let (_, ferry) = self.harbor_crossing(c)?;
                ferry + MAJOR_HARBOR_SURCHARGE
            }
        };
        Ok(cost)
    }

    /// Surcharge recorded on the edge leaving `c` in direction `(dx, dy)`.
    pub fn surcharge(&self, c: Coord, dx: i32, dy: i32) -> Result<u32, GridError> {
        let (col, row) = self
            .bounds
            .edge_cell(c, dx, dy)
            .ok_or(GridError::InvalidCoordinate(c.offset(dx, dy)))?;
        match self.rows[row][col] {
            BLANK => Ok(0),
            code => code.to_digit(10).ok_or(GridError::UnrecognizedTerrain { code, at: c }),
        }
    }

    /// Cost of building from `from` onto the adjacent point `to`.
    pub fn edge_cost(&self, from: Coord, to: Coord) -> Result<u32, GridError> {
        self.step_cost(from, to, false)
    }

    /// Like [`CostGrid::edge_cost`], but a lake-to-lake step is free when the
    /// caller reports both endpoints as already claimed by the mover's network.
    pub fn step_cost(&self, from: Coord, to: Coord, both_claimed: bool) -> Result<u32, GridError> {
        if !self.is_valid(from) {
            return Err(GridError::InvalidCoordinate(from));
        }
        if !self.is_valid(to) {
            return Err(GridError::InvalidCoordinate(to));
        }
        let (dx, dy) = from.delta_to(to);
        if !is_one_step(dx, dy) {
            return Err(GridError::NonAdjacentStep { from, to });
        }
        if both_claimed && self.terrain(from)? == Terrain::Lake && self.terrain(to)? == Terrain::Lake {
            return Ok(0);
        }
        Ok(self.point_cost(to)? + self.surcharge(from, dx, dy)?)
    }

    fn check_harbor_table(&self) -> Result<(), GridError> {
        for (&a, &(b, cost)) in self.harbors.iter() {
            if !self.is_harbor(a) {
                return Err(GridError::NotAHarbor(a));
            }
            if !self.is_harbor(b) {
                return Err(GridError::NotAHarbor(b));
            }
            if self.harbors.get(&b) != Some(&(a, cost)) {
                return Err(GridError::UnpairedHarbor(a));
            }
        }
        for c in self.bounds.points() {
            if self.is_harbor(c) && !self.harbors.contains_key(&c) {
                return Err(GridError::UnpairedHarbor(c));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::track::neighbor_policy::{neighbors, HEX_OFFSETS, Offset};

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    fn plain(w: i32, h: i32) -> CostGrid {
        CostGrid::filled(Bounds::new(0, w - 1, 0, h - 1), Terrain::Plain)
    }

    #[test]
    fn validity_and_lookup() {
        let mut g = plain(3, 3);
        g.set_point(c(1, 1), BLANK).unwrap();
        assert_eq!(g.cell_at(c(0, 0)), Some('.'));
        assert_eq!(g.cell_at(c(3, 0)), None);
        assert!(g.is_valid(c(0, 0)));
        assert!(!g.is_valid(c(1, 1)));
        assert!(!g.is_valid(c(-1, 0)));
        assert_eq!(g.terrain(c(1, 1)), Err(GridError::InvalidCoordinate(c(1, 1))));
    }

    #[test]
    fn terrain_cost_table() {
        let mut g = plain(4, 1);
        g.set_terrain(c(1, 0), Terrain::Mountain).unwrap();
        g.set_terrain(c(2, 0), Terrain::Alpine).unwrap();
        g.set_terrain(c(3, 0), Terrain::MediumCity).unwrap();
        assert_eq!(g.edge_cost(c(0, 0), c(1, 0)), Ok(2));
        assert_eq!(g.edge_cost(c(1, 0), c(2, 0)), Ok(5));
        assert_eq!(g.edge_cost(c(2, 0), c(3, 0)), Ok(3));
        assert_eq!(g.edge_cost(c(1, 0), c(0, 0)), Ok(1));
        assert_eq!(g.point_cost(c(2, 0)), Ok(5));
    }

    #[test]
    fn surcharge_is_added_in_both_directions() {
        let mut g = plain(2, 2);
        g.set_surcharge(c(1, 0), c(0, 1), 4).unwrap();
        assert_eq!(g.edge_cost(c(1, 0), c(0, 1)), Ok(5));
        assert_eq!(g.edge_cost(c(0, 1), c(1, 0)), Ok(5));
        assert_eq!(g.edge_cost(c(0, 0), c(1, 0)), Ok(1));
    }

    #[test]
    fn edge_cost_rejects_bad_input() {
        let mut g = plain(3, 3);
        assert_eq!(
            g.edge_cost(c(0, 0), c(1, 1)),
            Err(GridError::NonAdjacentStep { from: c(0, 0), to: c(1, 1) })
        );
        assert_eq!(g.edge_cost(c(0, 0), c(-1, 0)), Err(GridError::InvalidCoordinate(c(-1, 0))));
        g.set_point(c(1, 0), 'x').unwrap();
        assert_eq!(
            g.edge_cost(c(0, 0), c(1, 0)),
            Err(GridError::UnrecognizedTerrain { code: 'x', at: c(1, 0) })
        );
    }

    #[test]
    fn lake_steps_are_free_only_when_both_claimed() {
        let mut g = plain(2, 1);
        g.set_terrain(c(0, 0), Terrain::Lake).unwrap();
        g.set_terrain(c(1, 0), Terrain::Lake).unwrap();
        assert_eq!(g.edge_cost(c(0, 0), c(1, 0)), Ok(1));
        assert_eq!(g.step_cost(c(0, 0), c(1, 0), true), Ok(0));
    }

    #[test]
    fn harbor_costs_include_major_surcharge() {
        let mut g = plain(11, 11);
        g.set_terrain(c(0, 0), Terrain::Harbor).unwrap();
        g.set_terrain(c(10, 10), Terrain::MajorHarbor).unwrap();
        g.pair_harbors(c(0, 0), c(10, 10), 5).unwrap();
        assert_eq!(g.paired_harbor(c(0, 0)), Ok(c(10, 10)));
        assert_eq!(g.paired_harbor(c(10, 10)), Ok(c(0, 0)));
        assert_eq!(g.point_cost(c(0, 0)), Ok(8));
        assert_eq!(g.point_cost(c(10, 10)), Ok(8));
        assert_eq!(g.paired_harbor(c(5, 5)), Err(GridError::NotAHarbor(c(5, 5))));
    }

    #[test]
    fn constructor_rejects_unpaired_harbor() {
        let bounds = Bounds::new(0, 1, 0, 0);
        let rows = vec!["h . h".chars().collect::<Vec<_>>()];
        let err = CostGrid::new(bounds, rows.clone(), HashMap::new()).unwrap_err();
        assert!(matches!(err, GridError::MalformedRows { .. }));

        let bounds = Bounds::new(0, 2, 0, 0);
        let err = CostGrid::new(bounds, rows.clone(), HashMap::new()).unwrap_err();
        assert!(matches!(err, GridError::UnpairedHarbor(_)));

        let mut table = HashMap::new();
        table.insert(c(0, 0), (c(2, 0), 4));
        table.insert(c(2, 0), (c(0, 0), 4));
        let g = CostGrid::new(bounds, rows, table).unwrap();
        assert_eq!(g.point_cost(c(0, 0)), Ok(4));
    }

    #[test]
    fn edge_cost_depends_only_on_destination_and_edge() {
        let mut g = plain(4, 4);
        g.set_terrain(c(1, 1), Terrain::Mountain).unwrap();
        g.set_surcharge(c(1, 1), c(2, 1), 2).unwrap();
        for p in g.bounds().points().collect::<Vec<_>>() {
            for n in neighbors(p).filter(|&n| g.is_valid(n)) {
                let (dx, dy) = p.delta_to(n);
                let expected = g.point_cost(n).unwrap() + g.surcharge(p, dx, dy).unwrap();
                assert_eq!(g.edge_cost(p, n), Ok(expected));
            }
        }
        assert_eq!(HEX_OFFSETS.iter().filter(|Offset(dx, dy)| g.is_valid(c(1 + dx, 1 + dy))).count(), 6);
    }
}
