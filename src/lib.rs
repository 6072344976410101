//! # Gridfunge - Instruction pointers on a torus
//!
//! A two-dimensional playground where programs are characters laid out on a
//! wrap-around grid and one or more instruction pointers walk it, one cell
//! per clock tick.
//!
//! ## Core Components
//!
//! - **ToroidalGrid**: Fixed-size character grid; every coordinate wraps
//! - **Grid VM**: Instruction pointers, per-pointer stacks, single-char opcodes
//! - **Clock**: Fixed-period ticks, all pointers stepped in id order
//! - **ModularTween**: Shortest-way-around interpolation for wrapped values
//! - **Board**: Cursor, keyboard-style input and render callbacks for a host
//!
//! ## Example
//!
//! ```ignore
//! use gridfunge::{Board, Config, InputEvent};
//!
//! let mut board = Board::load(Config::default(), "67*@")?;
//! board.handle_input(InputEvent::ToggleRun, now, &mut surface)?;
//! loop {
//!     board.poll(now, &mut surface);
//!     board.frame(now, &mut surface);
//! }
//! ```

// Toroidal grid and coordinates
pub mod grid;
pub use grid::{Cell, Coordinate, Direction, ObserverToken, Position, ToroidalGrid, BLANK};

// Shortest-path tweening
pub mod tween;
pub use tween::{AnimationScheduler, FrameSink, ModularTween, Snapshot, TweenHandle};

// Grid VM - pointers, stacks, opcodes
pub mod vm;
pub use vm::{
    InstructionPointer, Interpreter, Opcode, PointerId, Positionable, Stack, StepResult,
};

// Tick driver
pub mod clock;
pub use clock::{Clock, TickReport, Toggle};

// Board configuration
pub mod config;
pub use config::Config;

// Interactive session
pub mod board;
pub use board::{Board, InputEvent, RenderSurface};

// Program loader
pub mod loader;
pub use loader::{load_path, load_string};

// Error types
mod error;
pub use error::{FungeError, Result};
