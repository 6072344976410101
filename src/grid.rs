//! Grid - Toroidal cell storage and wraparound coordinates
//!
//! ## Addressing
//!
//! ```text
//! col ∈ [0, cols)   row ∈ [0, rows)
//! (col, row) → cells[row * cols + col]
//! ```
//!
//! Every `(col, row)` pair over all of `i64` is valid: components are reduced
//! with `rem_euclid`, so `-1` names the last column/row. There is no
//! out-of-bounds state.
//!
//! ## Coordinates
//!
//! A [`Coordinate`] is an owned position bound to a grid's dimensions. Any
//! number of observers can be attached with [`Coordinate::on_move`]; each
//! observer gets a `before` hook (old position) and an `after` hook (new
//! position), and is removed again with the returned [`ObserverToken`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FungeError, Result};

/// A single grid cell
pub type Cell = char;

/// The empty cell
pub const BLANK: Cell = ' ';

/// Facing direction of anything that walks the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All four directions, clockwise from up
    pub const ALL: [Direction; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Unit step as (d_col, d_row)
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    /// Rendered heading in degrees (up = 0, clockwise)
    pub const fn rotation_degrees(self) -> f64 {
        match self {
            Self::Up => 0.0,
            Self::Right => 90.0,
            Self::Down => 180.0,
            Self::Left => 270.0,
        }
    }

    /// Map an arrow opcode (`^ > v <`) to its direction
    pub const fn from_arrow(c: char) -> Option<Self> {
        match c {
            '^' => Some(Self::Up),
            '>' => Some(Self::Right),
            'v' => Some(Self::Down),
            '<' => Some(Self::Left),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
            Self::Left => "left",
        }
    }
}

impl FromStr for Direction {
    type Err = FungeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "up" => Ok(Self::Up),
            "right" => Ok(Self::Right),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            other => Err(FungeError::InvalidDirection(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A normalized grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub col: usize,
    pub row: usize,
}

impl Position {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Reduce `(col, row)` into `[0, cols) × [0, rows)`
fn wrap(cols: usize, rows: usize, col: i64, row: i64) -> Position {
    Position {
        col: col.rem_euclid(cols as i64) as usize,
        row: row.rem_euclid(rows as i64) as usize,
    }
}

/// Fixed-size 2D cell storage with wraparound addressing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToroidalGrid {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl ToroidalGrid {
    /// Create a blank grid. Both dimensions must be at least 1.
    pub fn new(cols: usize, rows: usize) -> Result<Self> {
        if cols == 0 || rows == 0 {
            return Err(FungeError::InvalidConfig(format!(
                "grid must be at least 1x1, got {}x{}",
                cols, rows
            )));
        }
        let len = cols.checked_mul(rows).ok_or_else(|| {
            FungeError::InvalidConfig(format!("grid {}x{} is too large", cols, rows))
        })?;
        Ok(Self {
            cols,
            rows,
            cells: vec![BLANK; len],
        })
    }

    /// Build a grid exactly large enough to hold `source` (one line per row)
    pub fn from_source(source: &str) -> Self {
        let lines: Vec<Vec<char>> = source.lines().map(|l| l.chars().collect()).collect();
        let cols = lines.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let rows = lines.len().max(1);

        let mut cells = vec![BLANK; cols * rows];
        for (row, line) in lines.iter().enumerate() {
            for (col, &c) in line.iter().enumerate() {
                cells[row * cols + col] = c;
            }
        }
        Self { cols, rows, cells }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Reduce both components modulo the grid dimensions
    pub fn normalize(&self, col: i64, row: i64) -> Position {
        wrap(self.cols, self.rows, col, row)
    }

    pub fn get(&self, col: i64, row: i64) -> Cell {
        self.get_at(self.normalize(col, row))
    }

    pub fn set(&mut self, col: i64, row: i64, cell: Cell) {
        let pos = self.normalize(col, row);
        self.set_at(pos, cell);
    }

    /// Read an already-normalized position (wrapped again if it is not)
    pub fn get_at(&self, pos: Position) -> Cell {
        let pos = wrap(self.cols, self.rows, pos.col as i64, pos.row as i64);
        self.cells[pos.row * self.cols + pos.col]
    }

    pub fn set_at(&mut self, pos: Position, cell: Cell) {
        let pos = wrap(self.cols, self.rows, pos.col as i64, pos.row as i64);
        self.cells[pos.row * self.cols + pos.col] = cell;
    }

    /// Iterate rows as slices
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols)
    }
}

impl fmt::Display for ToroidalGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.iter_rows() {
            let line: String = row.iter().collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

/// Handle returned by [`Coordinate::on_move`], used to detach the observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken(u32);

/// Hook invoked with a position (old one for `before`, new one for `after`)
pub type MoveHook = Box<dyn FnMut(Position)>;

struct Observer {
    token: ObserverToken,
    before: MoveHook,
    after: MoveHook,
}

/// An owned `(col, row)` bound to a grid's dimensions
pub struct Coordinate {
    position: Position,
    cols: usize,
    rows: usize,
    observers: Vec<Observer>,
    next_token: u32,
}

impl Coordinate {
    /// Create a coordinate on `grid`, normalizing the starting position
    pub fn new(grid: &ToroidalGrid, col: i64, row: i64) -> Self {
        Self {
            position: grid.normalize(col, row),
            cols: grid.cols(),
            rows: grid.rows(),
            observers: Vec::new(),
            next_token: 0,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn col(&self) -> usize {
        self.position.col
    }

    pub fn row(&self) -> usize {
        self.position.row
    }

    /// Move to `(col, row)` modulo the grid, firing observers around the move
    pub fn move_to(&mut self, col: i64, row: i64) {
        self.fire_before();
        self.position = wrap(self.cols, self.rows, col, row);
        self.fire_after();
    }

    pub fn move_to_position(&mut self, pos: Position) {
        self.move_to(pos.col as i64, pos.row as i64);
    }

    /// Step one cell in `direction`
    pub fn move_by(&mut self, direction: Direction) {
        let (dc, dr) = direction.delta();
        self.move_to(self.position.col as i64 + dc, self.position.row as i64 + dr);
    }

    /// Fire observers without changing the position
    pub fn touch(&mut self) {
        self.fire_before();
        self.fire_after();
    }

    /// Attach a pair of move hooks. Hooks do not fire on registration.
    pub fn on_move(&mut self, before: MoveHook, after: MoveHook) -> ObserverToken {
        let token = ObserverToken(self.next_token);
        self.next_token += 1;
        self.observers.push(Observer { token, before, after });
        token
    }

    /// Detach an observer. Returns false if the token was already removed.
    pub fn remove_observer(&mut self, token: ObserverToken) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.token != token);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn fire_before(&mut self) {
        let pos = self.position;
        for observer in &mut self.observers {
            (observer.before)(pos);
        }
    }

    fn fire_after(&mut self) {
        let pos = self.position;
        for observer in &mut self.observers {
            (observer.after)(pos);
        }
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinate")
            .field("position", &self.position)
            .field("cols", &self.cols)
            .field("rows", &self.rows)
            .field("observers", &self.observers.len())
            .finish()
    }
}
