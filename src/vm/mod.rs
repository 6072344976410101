//! Grid VM - Instruction pointers executing single-character opcodes
//!
//! A program is the contents of a [`ToroidalGrid`](crate::grid::ToroidalGrid).
//! Each [`InstructionPointer`] walks the grid carrying its own [`Stack`];
//! the [`Interpreter`] executes exactly one cell per pointer per tick.
//!
//! ```text
//! cell under pointer ──decode──> Opcode ──execute──> stack / heading / grid
//!                                                      │
//!                                              advance one cell (two after #)
//! ```

mod interpreter;
mod opcode;
mod pointer;
mod stack;

pub use interpreter::{GridWrite, Interpreter, StepResult};
pub use opcode::{BinaryOp, Opcode};
pub use pointer::{
    animation_targets, InstructionPointer, PointerId, Positionable, SharedScheduler,
};
pub use stack::Stack;
