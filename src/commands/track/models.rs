use serde::{Deserialize, Serialize};
use std::fmt;

/// Axial hex coordinate on the board.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    pub fn delta_to(self, other: Coord) -> (i32, i32) {
        (other.x - self.x, other.y - self.y)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive coordinate bounds shared by a cost grid and every network built on it.
///
/// Both are stored at double resolution: point `(x, y)` lives at column
/// `2 * (x - min_x)` and row `2 * (max_y - y)`, and the cell between a point and
/// its neighbour in direction `(dx, dy)` is offset by `(dx, -dy)` from it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Bounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Bounds {
    pub fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Self {
        Self { min_x, max_x, min_y, max_y }
    }

    /// Number of columns in the double-resolution layout.
    pub fn width(&self) -> usize {
        (2 * (self.max_x - self.min_x) + 1).max(0) as usize
    }

    /// Number of rows in the double-resolution layout.
    pub fn height(&self) -> usize {
        (2 * (self.max_y - self.min_y) + 1).max(0) as usize
    }

    pub fn point_count(&self) -> usize {
        let w = (self.max_x - self.min_x + 1).max(0) as usize;
        let h = (self.max_y - self.min_y + 1).max(0) as usize;
        w * h
    }

    /// `(column, row)` of the cell holding `c`, if inside the bounds.
    pub fn point_cell(&self, c: Coord) -> Option<(usize, usize)> {
        self.cell(c, 0, 0)
    }

    /// `(column, row)` of the edge cell leaving `c` in direction `(dx, dy)`.
    pub fn edge_cell(&self, c: Coord, dx: i32, dy: i32) -> Option<(usize, usize)> {
        self.cell(c, dx, dy)
    }

    fn cell(&self, c: Coord, dx: i32, dy: i32) -> Option<(usize, usize)> {
        let col = 2 * (c.x - self.min_x) + dx;
        let row = 2 * (self.max_y - c.y) - dy;
        if col < 0 || row < 0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        if col < self.width() && row < self.height() {
            Some((col, row))
        } else {
            None
        }
    }

    /// Every point coordinate, x-major then y, matching the order edges are reported in.
    pub fn points(&self) -> impl Iterator<Item = Coord> + '_ {
        (self.min_x..=self.max_x).flat_map(move |x| (self.min_y..=self.max_y).map(move |y| Coord::new(x, y)))
    }
}

/// A set of interchangeable goal points; reaching any one satisfies the group.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TerminalGroup {
    #[serde(default)]
    pub name: Option<String>,
    pub members: Vec<Coord>,
}

impl TerminalGroup {
    pub fn new<I: IntoIterator<Item = Coord>>(members: I) -> Self {
        Self { name: None, members: members.into_iter().collect() }
    }

    pub fn named<I: IntoIterator<Item = Coord>>(name: &str, members: I) -> Self {
        Self { name: Some(name.to_string()), members: members.into_iter().collect() }
    }

    pub fn label(&self) -> String {
        match &self.name {
            Some(n) => n.clone(),
            None => format!("{:?}", self.members),
        }
    }
}
