//! Board - A playable session: grid, pointers, cursor and animations
//!
//! The host owns the event loop and feeds the board three kinds of calls:
//!
//! ```text
//! handle_input(event, now, surface)   discrete keyboard-style input
//! poll(now, surface)                  fire clock ticks that are due
//! frame(now, surface)                 advance pointer animations
//! ```
//!
//! All three run to completion before returning. Visual changes are pushed
//! to the host's [`RenderSurface`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use crate::clock::{Clock, TickReport, Toggle};
use crate::config::Config;
use crate::error::{FungeError, Result};
use crate::grid::{Cell, Coordinate, Direction, Position, ToroidalGrid, BLANK};
use crate::loader;
use crate::tween::{AnimationScheduler, Snapshot, TweenHandle};
use crate::vm::{
    animation_targets, InstructionPointer, Interpreter, PointerId, Positionable, SharedScheduler,
};

/// Discrete input delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    MoveCursor(Direction),
    ToggleRun,
    /// Write a character under the cursor (space clears the cell)
    WriteChar(char),
    /// Teleport the pointer to the cursor and face `Direction`
    MovePointerToCursor(Direction),
}

/// Host-side painter
pub trait RenderSurface {
    /// Place a pointer glyph at interpolated `left`/`top` (cells) and `rotation` (degrees)
    fn paint_pointer(&mut self, id: PointerId, values: &Snapshot);

    fn set_cell_glyph(&mut self, pos: Position, cell: Cell);

    fn set_cursor(&mut self, pos: Position, highlighted: bool);

    fn set_pointer_active(&mut self, id: PointerId, active: bool);

    fn remove_pointer(&mut self, id: PointerId);
}

type CursorPaints = Rc<RefCell<Vec<(Position, bool)>>>;

pub struct Board {
    config: Config,
    grid: ToroidalGrid,
    clock: Clock,
    scheduler: SharedScheduler,
    cursor: Coordinate,
    cursor_paints: CursorPaints,
    next_pointer: u32,
}

impl Board {
    /// Blank board with one pointer at (0, 0) facing right
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let grid = ToroidalGrid::new(config.cols, config.rows)?;
        Self::from_grid(config, grid, Interpreter::new())
    }

    /// Board preloaded with program text
    pub fn load(config: Config, source: &str) -> Result<Self> {
        let grid = loader::load_string(source, &config)?;
        Self::from_grid(config, grid, Interpreter::new())
    }

    /// Build a board around an existing grid. The grid must match the
    /// configured dimensions.
    pub fn from_grid(config: Config, grid: ToroidalGrid, interpreter: Interpreter) -> Result<Self> {
        config.validate()?;
        if grid.cols() != config.cols || grid.rows() != config.rows {
            return Err(FungeError::InvalidConfig(format!(
                "grid is {}x{}, config expects {}x{}",
                grid.cols(),
                grid.rows(),
                config.cols,
                config.rows
            )));
        }

        let scheduler = Rc::new(RefCell::new(AnimationScheduler::new()));
        let clock = Clock::new(config.tick_period(), interpreter)?;

        let cursor_paints: CursorPaints = Rc::new(RefCell::new(Vec::new()));
        let mut cursor = Coordinate::new(&grid, 0, 0);
        let before = Rc::clone(&cursor_paints);
        let after = Rc::clone(&cursor_paints);
        cursor.on_move(
            Box::new(move |pos| before.borrow_mut().push((pos, false))),
            Box::new(move |pos| after.borrow_mut().push((pos, true))),
        );

        let mut board = Self {
            config,
            grid,
            clock,
            scheduler,
            cursor,
            cursor_paints,
            next_pointer: 0,
        };
        board.spawn_pointer(Position::default(), Direction::Right)?;
        Ok(board)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn grid(&self) -> &ToroidalGrid {
        &self.grid
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn cursor(&self) -> Position {
        self.cursor.position()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// The lowest-id live pointer
    pub fn pointer(&self) -> Option<&InstructionPointer> {
        self.clock.pointers().first()
    }

    pub fn pointers(&self) -> &[InstructionPointer] {
        self.clock.pointers()
    }

    /// True while any pointer animation still needs frames
    pub fn is_animating(&self) -> bool {
        self.scheduler.borrow().has_pending()
    }

    /// Add a pointer at `pos` facing `direction`
    pub fn spawn_pointer(&mut self, pos: Position, direction: Direction) -> Result<PointerId> {
        let id = PointerId(self.next_pointer);
        let ip = InstructionPointer::new(
            id,
            &self.grid,
            pos.col as i64,
            pos.row as i64,
            direction,
            &self.scheduler,
            self.config.animation_duration(),
        )?;
        self.next_pointer += 1;
        self.clock.add_pointer(ip);
        Ok(id)
    }

    /// Paint every cell, the cursor and every pointer at rest
    pub fn render_all(&mut self, surface: &mut dyn RenderSurface) {
        for (row, cells) in self.grid.iter_rows().enumerate() {
            for (col, &cell) in cells.iter().enumerate() {
                surface.set_cell_glyph(Position::new(col, row), cell);
            }
        }
        self.cursor_paints.borrow_mut().clear();
        surface.set_cursor(self.cursor.position(), true);
        for ip in self.clock.pointers() {
            surface.paint_pointer(ip.id(), &animation_targets(ip.position(), ip.direction()));
            surface.set_pointer_active(ip.id(), ip.is_active());
        }
    }

    /// Apply one input event. Starting the clock returns its first tick.
    pub fn handle_input(
        &mut self,
        event: InputEvent,
        now: Duration,
        surface: &mut dyn RenderSurface,
    ) -> Result<Option<TickReport>> {
        let report = match event {
            InputEvent::MoveCursor(dir) => {
                self.cursor.move_by(dir);
                None
            }
            InputEvent::WriteChar(c) => {
                let pos = self.cursor.position();
                let cell = if c == ' ' { BLANK } else { c };
                self.grid.set_at(pos, cell);
                surface.set_cell_glyph(pos, cell);
                None
            }
            InputEvent::MovePointerToCursor(dir) => {
                let target = self.cursor.position();
                match self.clock.pointers().first().map(|ip| ip.id()) {
                    Some(id) => {
                        if let Some(ip) = self.clock.pointer_mut(id) {
                            ip.move_to(target);
                            ip.set_direction(dir);
                        }
                    }
                    None => {
                        let id = self.spawn_pointer(target, dir)?;
                        surface.paint_pointer(id, &animation_targets(target, dir));
                        let active = self.clock.pointer(id).is_some_and(|ip| ip.is_active());
                        surface.set_pointer_active(id, active);
                    }
                }
                None
            }
            InputEvent::ToggleRun => match self.clock.toggle(now, &mut self.grid) {
                Toggle::Started(report) => {
                    for ip in self.clock.pointers() {
                        surface.set_pointer_active(ip.id(), true);
                    }
                    self.publish(&report, surface);
                    Some(report)
                }
                Toggle::Stopped => {
                    for ip in self.clock.pointers() {
                        surface.set_pointer_active(ip.id(), false);
                    }
                    None
                }
            },
        };
        self.flush_cursor(surface);
        Ok(report)
    }

    /// Fire every clock tick due at `now`
    pub fn poll(&mut self, now: Duration, surface: &mut dyn RenderSurface) -> Vec<TickReport> {
        let reports = self.clock.poll(now, &mut self.grid);
        for report in &reports {
            self.publish(report, surface);
        }
        reports
    }

    /// Advance pointer animations to `now`. Returns how many were painted.
    pub fn frame(&mut self, now: Duration, surface: &mut dyn RenderSurface) -> usize {
        let owners: BTreeMap<_, _> = self
            .clock
            .pointers()
            .iter()
            .map(|ip| (ip.tween(), ip.id()))
            .collect();
        let mut paint = |handle: TweenHandle, values: &Snapshot| {
            if let Some(&id) = owners.get(&handle) {
                surface.paint_pointer(id, values);
            }
        };
        self.scheduler.borrow_mut().frame(now, &mut paint)
    }

    /// Replace the whole board with a fresh blank one under `config`
    pub fn reconfigure(&mut self, config: Config) -> Result<()> {
        *self = Self::new(config)?;
        Ok(())
    }

    fn publish(&self, report: &TickReport, surface: &mut dyn RenderSurface) {
        for write in &report.writes {
            surface.set_cell_glyph(write.position, write.cell);
        }
        for id in &report.terminated {
            surface.remove_pointer(*id);
        }
    }

    fn flush_cursor(&mut self, surface: &mut dyn RenderSurface) {
        for (pos, highlighted) in self.cursor_paints.borrow_mut().drain(..) {
            surface.set_cursor(pos, highlighted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        glyphs: Vec<(Position, Cell)>,
        cursor: Vec<(Position, bool)>,
        active: Vec<(PointerId, bool)>,
        painted: Vec<(PointerId, Snapshot)>,
        removed: Vec<PointerId>,
    }

    impl RenderSurface for Recorder {
        fn paint_pointer(&mut self, id: PointerId, values: &Snapshot) {
            self.painted.push((id, values.clone()));
        }
        fn set_cell_glyph(&mut self, pos: Position, cell: Cell) {
            self.glyphs.push((pos, cell));
        }
        fn set_cursor(&mut self, pos: Position, highlighted: bool) {
            self.cursor.push((pos, highlighted));
        }
        fn set_pointer_active(&mut self, id: PointerId, active: bool) {
            self.active.push((id, active));
        }
        fn remove_pointer(&mut self, id: PointerId) {
            self.removed.push(id);
        }
    }

    fn config() -> Config {
        Config {
            rows: 3,
            cols: 3,
            tick_period_ms: 100,
            animation_load_factor: 0.5,
        }
    }

    #[test]
    fn test_cursor_moves_and_repaints() {
        let mut board = Board::new(config()).unwrap();
        let mut surface = Recorder::default();
        board
            .handle_input(InputEvent::MoveCursor(Direction::Left), Duration::ZERO, &mut surface)
            .unwrap();
        assert_eq!(board.cursor(), Position::new(2, 0));
        assert_eq!(
            surface.cursor,
            vec![(Position::new(0, 0), false), (Position::new(2, 0), true)]
        );
    }

    #[test]
    fn test_write_char_under_cursor() {
        let mut board = Board::new(config()).unwrap();
        let mut surface = Recorder::default();
        let t = Duration::ZERO;
        board.handle_input(InputEvent::MoveCursor(Direction::Down), t, &mut surface).unwrap();
        board.handle_input(InputEvent::WriteChar('7'), t, &mut surface).unwrap();
        assert_eq!(board.grid().get(0, 1), '7');
        board.handle_input(InputEvent::WriteChar(' '), t, &mut surface).unwrap();
        assert_eq!(board.grid().get(0, 1), BLANK);
        assert_eq!(surface.glyphs.len(), 2);
    }

    #[test]
    fn test_move_pointer_to_cursor() {
        let mut board = Board::new(config()).unwrap();
        let mut surface = Recorder::default();
        let t = Duration::ZERO;
        board.handle_input(InputEvent::MoveCursor(Direction::Up), t, &mut surface).unwrap();
        board
            .handle_input(InputEvent::MovePointerToCursor(Direction::Up), t, &mut surface)
            .unwrap();
        let ip = board.pointer().unwrap();
        assert_eq!(ip.position(), Position::new(0, 2));
        assert_eq!(ip.direction(), Direction::Up);
        assert!(board.is_animating());
    }

    #[test]
    fn test_toggle_marks_pointer_active() {
        let mut board = Board::new(config()).unwrap();
        let mut surface = Recorder::default();
        let first = board
            .handle_input(InputEvent::ToggleRun, Duration::ZERO, &mut surface)
            .unwrap();
        assert_eq!(first.map(|r| r.tick), Some(1));
        assert!(board.pointer().unwrap().is_active());
        board
            .handle_input(InputEvent::ToggleRun, Duration::from_millis(5), &mut surface)
            .unwrap();
        assert_eq!(surface.active, vec![(PointerId(0), true), (PointerId(0), false)]);
    }

    #[test]
    fn test_frames_paint_pointer_until_settled() {
        let mut board = Board::new(config()).unwrap();
        let mut surface = Recorder::default();
        board.handle_input(InputEvent::ToggleRun, Duration::ZERO, &mut surface).unwrap();

        // Tick 1 moved the pointer from (0,0) to (1,0); animation lasts 50ms.
        assert_eq!(board.frame(Duration::from_millis(0), &mut surface), 1);
        assert_eq!(board.frame(Duration::from_millis(25), &mut surface), 1);
        assert_eq!(board.frame(Duration::from_millis(50), &mut surface), 1);
        assert_eq!(board.frame(Duration::from_millis(60), &mut surface), 0);

        let lefts: Vec<f64> = surface.painted.iter().map(|(_, v)| v["left"]).collect();
        assert_eq!(lefts, vec![0.0, 0.5, 1.0]);
        assert!(!board.is_animating());
    }

    #[test]
    fn test_respawn_after_terminate() {
        let mut board = Board::load(config(), "@").unwrap();
        let mut surface = Recorder::default();
        board.handle_input(InputEvent::ToggleRun, Duration::ZERO, &mut surface).unwrap();
        assert!(board.pointer().is_none());
        assert!(!board.is_running());
        assert_eq!(surface.removed, vec![PointerId(0)]);

        board
            .handle_input(InputEvent::MovePointerToCursor(Direction::Down), Duration::ZERO, &mut surface)
            .unwrap();
        assert_eq!(board.pointer().unwrap().id(), PointerId(1));
        assert_eq!(surface.painted.last().map(|(id, _)| *id), Some(PointerId(1)));
        assert_eq!(surface.active.last(), Some(&(PointerId(1), false)));
    }

    #[test]
    fn test_grid_size_must_match_config() {
        let grid = ToroidalGrid::new(4, 3).unwrap();
        assert!(Board::from_grid(config(), grid, Interpreter::new()).is_err());
    }
}
