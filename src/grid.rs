//! Static obstacle map loaded once at startup and shared read-only by
//! every other component (`instance`, `constraint_table`, `astar`).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::MapfError;

/// Row/column position on the grid. `(row, col)`, both zero-indexed.
pub type Cell = (usize, usize);

/// The four cardinal moves plus waiting in place.
pub const MOVES: [(isize, isize); 5] = [(-1, 0), (1, 0), (0, -1), (0, 1), (0, 0)];

/// Immutable obstacle grid: `height` rows by `width` columns of
/// passable/blocked cells, parsed once from a map file.
#[derive(Debug, Clone)]
pub struct Grid {
    height: usize,
    width: usize,
    passable: Vec<bool>,
}

impl Grid {
    /// Parses the MovingAI-style map format described in the map file
    /// interface: a `type`/`height H`/`width W`/`map` header followed by
    /// `H` lines of `W` characters, `.` passable and `@`/`T` blocked (any
    /// other character is treated as passable).
    pub fn from_map_file<P: AsRef<Path>>(path: P) -> Result<Self, MapfError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| MapfError::Parse(format!("{}: {e}", path.display())))?;
        let mut lines = BufReader::new(file).lines();

        let _type = lines
            .next()
            .ok_or_else(|| MapfError::Parse("missing 'type' header line".into()))??;

        let height = parse_header_usize(&mut lines, "height")?;
        let width = parse_header_usize(&mut lines, "width")?;

        let _map_token = lines
            .next()
            .ok_or_else(|| MapfError::Parse("missing 'map' header line".into()))??;

        let mut passable = Vec::with_capacity(height * width);
        let mut row_count = 0;
        for line in lines.by_ref().take(height) {
            let line = line.map_err(|e| MapfError::Parse(e.to_string()))?;
            let chars: Vec<char> = line.chars().collect();
            if chars.len() < width {
                return Err(MapfError::Parse(format!(
                    "row {row_count} has {} columns, expected {width}",
                    chars.len()
                )));
            }
            for ch in chars.into_iter().take(width) {
                passable.push(ch != '@' && ch != 'T');
            }
            row_count += 1;
        }
        if row_count != height {
            return Err(MapfError::Parse(format!(
                "map body has {row_count} rows, expected {height}"
            )));
        }

        Ok(Grid {
            height,
            width,
            passable,
        })
    }

    /// Builds a grid directly from a vector of rows of booleans (`true`
    /// = passable). Used by tests and by callers embedding literal grids.
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let mut passable = Vec::with_capacity(height * width);
        for row in rows {
            assert_eq!(row.len(), width, "ragged grid rows");
            passable.extend(row);
        }
        Grid {
            height,
            width,
            passable,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.0 < self.height && cell.1 < self.width
    }

    pub fn is_passable(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && self.passable[cell.0 * self.width + cell.1]
    }

    /// Passable neighbors of `cell`, including `cell` itself (the wait
    /// move). Order is stable (N, S, E, W, wait as laid out in `MOVES`
    /// filtered to the ones that land in-bounds and passable).
    pub fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        MOVES
            .iter()
            .filter_map(|&(dr, dc)| {
                let nr = cell.0 as isize + dr;
                let nc = cell.1 as isize + dc;
                if nr < 0 || nc < 0 {
                    return None;
                }
                let next = (nr as usize, nc as usize);
                self.is_passable(next).then_some(next)
            })
            .collect()
    }
}

fn parse_header_usize(
    lines: &mut std::io::Lines<BufReader<File>>,
    field: &str,
) -> Result<usize, MapfError> {
    let line = lines
        .next()
        .ok_or_else(|| MapfError::Parse(format!("missing '{field}' header line")))??;
    line.split_whitespace()
        .last()
        .ok_or_else(|| MapfError::Parse(format!("malformed '{field}' header line: {line:?}")))?
        .parse::<usize>()
        .map_err(|_| MapfError::Parse(format!("malformed '{field}' header line: {line:?}")))
}
