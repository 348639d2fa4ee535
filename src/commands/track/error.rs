use thiserror::Error;

use super::models::{Bounds, Coord};

/// Caller bugs or corrupt map input. Never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("point {0} is off the board or on a blank cell")]
    InvalidCoordinate(Coord),
    #[error("{from} and {to} are not one hex step apart")]
    NonAdjacentStep { from: Coord, to: Coord },
    #[error("unrecognized board code {code:?} at {at}")]
    UnrecognizedTerrain { code: char, at: Coord },
    #[error("point {0} is not a harbor")]
    NotAHarbor(Coord),
    #[error("harbor {0} has no symmetric entry in the harbor table")]
    UnpairedHarbor(Coord),
    #[error("network shapes differ: {left:?} vs {right:?}")]
    DimensionMismatch { left: Bounds, right: Bounds },
    #[error("board rows do not match bounds: expected {expected_rows} rows of {expected_width} cells")]
    MalformedRows { expected_rows: usize, expected_width: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("search gave up after expanding {limit} nodes")]
    ExpansionLimit { limit: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("no trial connected every terminal group ({trials} attempted)")]
    Unreachable { trials: usize },
}
