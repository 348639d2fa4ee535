//! Text and JSON inputs: the ASCII board, its harbor list, track files and terminal groups.
//!
//! Board file: a header line `min_x max_x min_y max_y`, then the
//! double-resolution rows, first row at `max_y`. Even columns of even rows
//! are points; the cells between them hold edge surcharges. Harbor file: one
//! `x1,y1 x2,y2 cost` pair per line, `#` starts a comment.

use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::commands::track::cost_grid::CostGrid;
use crate::commands::track::models::{Bounds, Coord, TerminalGroup};
use crate::commands::track::owned_network::OwnedNetwork;

pub fn parse_coord(s: &str) -> Result<Coord> {
    let (x, y) = s
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split_once(',')
        .ok_or_else(|| anyhow!("expected x,y but got {:?}", s))?;
    let x = x.trim().parse::<i32>().with_context(|| format!("bad x in {:?}", s))?;
    let y = y.trim().parse::<i32>().with_context(|| format!("bad y in {:?}", s))?;
    Ok(Coord::new(x, y))
}

pub fn parse_harbors(text: &str) -> Result<HashMap<Coord, (Coord, u32)>> {
    let mut table = HashMap::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 3 {
            bail!("harbor line {}: expected `x1,y1 x2,y2 cost`, got {:?}", lineno + 1, raw);
        }
        let a = parse_coord(parts[0]).with_context(|| format!("harbor line {}", lineno + 1))?;
        let b = parse_coord(parts[1]).with_context(|| format!("harbor line {}", lineno + 1))?;
        let cost = parts[2]
            .parse::<u32>()
            .with_context(|| format!("harbor line {}: bad cost {:?}", lineno + 1, parts[2]))?;
        table.insert(a, (b, cost));
        table.insert(b, (a, cost));
    }
    Ok(table)
}

pub fn parse_board(board_text: &str, harbor_text: &str) -> Result<CostGrid> {
    let mut lines = board_text.lines();
    let header = lines.next().ok_or_else(|| anyhow!("board file is empty"))?;
    let nums = header
        .split_whitespace()
        .map(|t| t.parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("bad board header {:?}", header))?;
    let [min_x, max_x, min_y, max_y] = nums.as_slice() else {
        bail!("board header needs `min_x max_x min_y max_y`, got {:?}", header);
    };
    let bounds = Bounds::new(*min_x, *max_x, *min_y, *max_y);
    let rows: Vec<Vec<char>> = lines.map(|l| l.trim_end_matches('\r').chars().collect()).collect();
    let harbors = parse_harbors(harbor_text)?;
    let grid = CostGrid::new(bounds, rows, harbors)?;
    Ok(grid)
}

pub fn load_board(board_path: &Path, harbor_path: Option<&Path>) -> Result<CostGrid> {
    let board_text = fs::read_to_string(board_path)
        .with_context(|| format!("Failed to read board at {}", board_path.display()))?;
    let harbor_text = match harbor_path {
        Some(p) => fs::read_to_string(p).with_context(|| format!("Failed to read harbors at {}", p.display()))?,
        None => String::new(),
    };
    parse_board(&board_text, &harbor_text).with_context(|| format!("Invalid board {}", board_path.display()))
}

/// Builds a network from a JSON array of paths.
pub fn load_track(path: &Path, bounds: Bounds) -> Result<OwnedNetwork> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read track at {}", path.display()))?;
    let paths: Vec<Vec<Coord>> =
        serde_json::from_str(&text).with_context(|| format!("Invalid track JSON in {}", path.display()))?;
    let mut net = OwnedNetwork::new(bounds);
    for p in &paths {
        net.add_track(p)?;
    }
    Ok(net)
}

/// Writes paths in the shape [`load_track`] reads.
pub fn save_track(path: &Path, paths: &[Vec<Coord>]) -> Result<()> {
    let text = serde_json::to_string_pretty(paths)?;
    fs::write(path, text).with_context(|| format!("Failed to write track to {}", path.display()))
}

pub fn load_groups(path: &Path) -> Result<Vec<TerminalGroup>> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read groups at {}", path.display()))?;
    let groups = serde_json::from_str(&text).with_context(|| format!("Invalid groups JSON in {}", path.display()))?;
    Ok(groups)
}
