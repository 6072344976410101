//! Instruction pointer - a walker with a heading, a stack and a tween
//!
//! Each pointer owns a [`Coordinate`] and registers one move observer on it.
//! Whenever the coordinate moves (or is touched after a heading change) the
//! observer retargets the pointer's tween toward the new cell and heading:
//!
//! ```text
//! left     = col        modulus cols
//! top      = row        modulus rows
//! rotation = heading°   modulus 360   (up 0, right 90, down 180, left 270)
//! ```
//!
//! The tween runs for the configured animation duration, which is always a
//! fraction of the tick period.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::error::{FungeError, Result};
use crate::grid::{Coordinate, Direction, ObserverToken, Position, ToroidalGrid};
use crate::tween::{AnimationScheduler, Snapshot, TweenHandle};

use super::Stack;

/// Scheduler shared by every pointer on a board
pub type SharedScheduler = Rc<RefCell<AnimationScheduler>>;

/// Stable identity of a pointer, also its tick order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u32);

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ip{}", self.0)
    }
}

/// Something with a position and heading that can walk the grid
pub trait Positionable {
    fn position(&self) -> Position;

    fn direction(&self) -> Direction;

    /// Face `direction` without moving
    fn set_direction(&mut self, direction: Direction);

    /// Move one cell along the current heading
    fn step_forward(&mut self);

    /// Teleport to `position`
    fn move_to(&mut self, position: Position);
}

/// Animation channel targets for a pointer at `pos` facing `direction`
pub fn animation_targets(pos: Position, direction: Direction) -> Snapshot {
    let mut values = Snapshot::new();
    values.insert("left".to_string(), pos.col as f64);
    values.insert("top".to_string(), pos.row as f64);
    values.insert("rotation".to_string(), direction.rotation_degrees());
    values
}

fn animation_moduli(cols: usize, rows: usize) -> Snapshot {
    let mut moduli = Snapshot::new();
    moduli.insert("left".to_string(), cols as f64);
    moduli.insert("top".to_string(), rows as f64);
    moduli.insert("rotation".to_string(), 360.0);
    moduli
}

pub struct InstructionPointer {
    id: PointerId,
    coord: Coordinate,
    heading: Rc<Cell<Direction>>,
    stack: Stack,
    string_mode: bool,
    active: bool,
    scheduler: SharedScheduler,
    tween: TweenHandle,
    observer: ObserverToken,
}

impl InstructionPointer {
    /// Create a pointer at `(col, row)` facing `direction`, bound to a new
    /// tween on `scheduler`. `animation` must be non-zero.
    pub fn new(
        id: PointerId,
        grid: &ToroidalGrid,
        col: i64,
        row: i64,
        direction: Direction,
        scheduler: &SharedScheduler,
        animation: Duration,
    ) -> Result<Self> {
        if animation.is_zero() {
            return Err(FungeError::NonPositiveDuration(animation));
        }

        let mut coord = Coordinate::new(grid, col, row);
        let heading = Rc::new(Cell::new(direction));

        let tween = scheduler.borrow_mut().bind(
            &animation_targets(coord.position(), direction),
            &animation_moduli(grid.cols(), grid.rows()),
        )?;

        let hook_scheduler = Rc::clone(scheduler);
        let hook_heading = Rc::clone(&heading);
        let observer = coord.on_move(
            Box::new(|_| {}),
            Box::new(move |pos| {
                let targets = animation_targets(pos, hook_heading.get());
                if let Err(e) = hook_scheduler
                    .borrow_mut()
                    .update(tween, animation, &targets)
                {
                    log::error!("{}: animation update failed: {}", id, e);
                }
            }),
        );

        Ok(Self {
            id,
            coord,
            heading,
            stack: Stack::new(),
            string_mode: false,
            active: false,
            scheduler: Rc::clone(scheduler),
            tween,
            observer,
        })
    }

    pub fn id(&self) -> PointerId {
        self.id
    }

    pub fn tween(&self) -> TweenHandle {
        self.tween
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut Stack {
        &mut self.stack
    }

    pub fn string_mode(&self) -> bool {
        self.string_mode
    }

    pub fn toggle_string_mode(&mut self) {
        self.string_mode = !self.string_mode;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl Positionable for InstructionPointer {
    fn position(&self) -> Position {
        self.coord.position()
    }

    fn direction(&self) -> Direction {
        self.heading.get()
    }

    fn set_direction(&mut self, direction: Direction) {
        self.heading.set(direction);
        self.coord.touch();
    }

    fn step_forward(&mut self) {
        self.coord.move_by(self.heading.get());
    }

    fn move_to(&mut self, position: Position) {
        self.coord.move_to_position(position);
    }
}

impl Drop for InstructionPointer {
    fn drop(&mut self) {
        self.coord.remove_observer(self.observer);
        if let Ok(mut scheduler) = self.scheduler.try_borrow_mut() {
            scheduler.unbind(self.tween);
        }
    }
}

impl fmt::Debug for InstructionPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstructionPointer")
            .field("id", &self.id)
            .field("position", &self.coord.position())
            .field("direction", &self.heading.get())
            .field("stack", &self.stack)
            .field("string_mode", &self.string_mode)
            .field("active", &self.active)
            .field("tween", &self.tween)
            .finish()
    }
}
