//! Interpreter - Executes the cell under an instruction pointer
//!
//! One step is: read the cell under the pointer, dispatch it, then advance
//! the pointer along its heading (twice after `#`). Dispatch order:
//!
//! 1. String mode: push the cell's code point (a closing `"` leaves string
//!    mode instead)
//! 2. Digit: push its value
//! 3. Arrow: set heading
//! 4. Anything else: decode via [`Opcode::decode`]; unknown cells are no-ops
//!
//! A failed instruction (stack underflow) is a per-pointer fault: the stack
//! is left untouched, the pointer does not advance, and the error is
//! returned in [`StepResult::Fault`].

mod ops_control;
mod ops_grid;
mod ops_stack;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{FungeError, Result};
use crate::grid::{Cell, Position, ToroidalGrid};

use super::{InstructionPointer, Opcode, Positionable};

/// Result of executing a single step
#[derive(Debug)]
pub enum StepResult {
    /// Executed and advanced
    Continue,
    /// `@` - the pointer terminated
    Halt,
    /// Instruction aborted; the pointer stays on the faulting cell
    Fault(FungeError),
}

impl StepResult {
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}

/// A cell written by `p`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridWrite {
    pub position: Position,
    pub cell: Cell,
}

/// How the pointer moves after an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Next,
    Bridge,
    Halt,
}

/// Opcode dispatcher. Owns the RNG used by `?` and a log of grid writes.
pub struct Interpreter {
    pub(super) rng: StdRng,
    pub(super) writes: Vec<GridWrite>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            writes: Vec::new(),
        }
    }

    /// Deterministic `?` for tests and replays
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            writes: Vec::new(),
        }
    }

    /// Interpret the cell under `ip`, then advance it
    pub fn step(&mut self, ip: &mut InstructionPointer, grid: &mut ToroidalGrid) -> StepResult {
        let cell = grid.get_at(ip.position());
        match self.execute(ip, grid, cell) {
            Ok(Flow::Next) => {
                ip.step_forward();
                StepResult::Continue
            }
            Ok(Flow::Bridge) => {
                ip.step_forward();
                ip.step_forward();
                StepResult::Continue
            }
            Ok(Flow::Halt) => {
                log::info!("{} terminated at {}", ip.id(), ip.position());
                StepResult::Halt
            }
            Err(e) => {
                log::warn!("{} fault at {} on {:?}: {}", ip.id(), ip.position(), cell, e);
                StepResult::Fault(e)
            }
        }
    }

    /// Grid writes made since the last call, in execution order
    pub fn take_writes(&mut self) -> Vec<GridWrite> {
        std::mem::take(&mut self.writes)
    }

    fn execute(
        &mut self,
        ip: &mut InstructionPointer,
        grid: &mut ToroidalGrid,
        cell: Cell,
    ) -> Result<Flow> {
        if ip.string_mode() {
            if cell == '"' {
                ip.toggle_string_mode();
            } else {
                ip.stack_mut().push(cell as i64);
            }
            return Ok(Flow::Next);
        }

        let Some(op) = Opcode::decode(cell) else {
            return Ok(Flow::Next);
        };

        match op {
            Opcode::Digit(d) => {
                ip.stack_mut().push(d as i64);
                Ok(Flow::Next)
            }
            Opcode::Steer(dir) => {
                ip.set_direction(dir);
                Ok(Flow::Next)
            }

            // Stack ops (ops_stack.rs)
            Opcode::Binary(bin) => self.execute_binary(ip, bin),
            Opcode::Not => self.execute_not(ip),
            Opcode::Duplicate => self.execute_duplicate(ip),
            Opcode::Swap => self.execute_swap(ip),
            Opcode::Discard => self.execute_discard(ip),

            // Control flow (ops_control.rs)
            Opcode::ToggleStringMode => {
                ip.toggle_string_mode();
                Ok(Flow::Next)
            }
            Opcode::RandomDirection => self.execute_random_direction(ip),
            Opcode::HorizontalIf => self.execute_horizontal_if(ip),
            Opcode::VerticalIf => self.execute_vertical_if(ip),
            Opcode::Bridge => Ok(Flow::Bridge),
            Opcode::Terminate => Ok(Flow::Halt),
            Opcode::Reserved(c) => {
                log::debug!("unimplemented opcode {}", c);
                Ok(Flow::Next)
            }

            // Grid ops (ops_grid.rs)
            Opcode::Put => self.execute_put(ip, grid),
            Opcode::Get => self.execute_get(ip, grid),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Direction, BLANK};
    use crate::tween::AnimationScheduler;
    use crate::vm::{PointerId, SharedScheduler};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    struct Fixture {
        grid: ToroidalGrid,
        ip: InstructionPointer,
        interp: Interpreter,
        _sched: SharedScheduler,
    }

    fn fixture(source: &str) -> Fixture {
        let grid = ToroidalGrid::from_source(source);
        let sched = Rc::new(RefCell::new(AnimationScheduler::new()));
        let ip = InstructionPointer::new(
            PointerId(0),
            &grid,
            0,
            0,
            Direction::Right,
            &sched,
            Duration::from_millis(100),
        )
        .unwrap();
        Fixture {
            grid,
            ip,
            interp: Interpreter::with_seed(7),
            _sched: sched,
        }
    }

    impl Fixture {
        fn run(&mut self, steps: usize) {
            for _ in 0..steps {
                let result = self.interp.step(&mut self.ip, &mut self.grid);
                assert!(matches!(result, StepResult::Continue), "{:?}", result);
            }
        }

        fn stack(&self) -> &[i64] {
            self.ip.stack().as_slice()
        }

        fn with_stack(mut self, values: &[i64]) -> Self {
            for &v in values {
                self.ip.stack_mut().push(v);
            }
            self
        }
    }

    #[test]
    fn test_digit_addition() {
        let mut f = fixture("55+");
        f.run(3);
        assert_eq!(f.stack(), &[10]);
        assert_eq!(f.ip.position(), Position::new(0, 0));
    }

    #[test]
    fn test_subtraction_operand_order() {
        let mut f = fixture("93-");
        f.run(3);
        assert_eq!(f.stack(), &[6]);

        let mut f = fixture("93`");
        f.run(3);
        assert_eq!(f.stack(), &[1]);

        let mut f = fixture("72/72%");
        f.run(6);
        assert_eq!(f.stack(), &[3, 1]);
    }

    #[test]
    fn test_divide_by_zero_pushes_zero() {
        let mut f = fixture("50/");
        f.run(3);
        assert_eq!(f.stack(), &[0]);
    }

    #[test]
    fn test_string_mode_pushes_code_points() {
        let mut f = fixture("\"a1\"  ");
        f.run(4);
        assert_eq!(f.stack(), &['a' as i64, '1' as i64]);
        assert!(!f.ip.string_mode());
    }

    #[test]
    fn test_duplicate_and_swap() {
        let mut f = fixture(":").with_stack(&[3]);
        f.run(1);
        assert_eq!(f.stack(), &[3, 3]);

        let mut f = fixture("\\").with_stack(&[1, 2]);
        f.run(1);
        assert_eq!(f.stack(), &[2, 1]);

        let mut f = fixture("$").with_stack(&[1, 2]);
        f.run(1);
        assert_eq!(f.stack(), &[1]);
    }

    #[test]
    fn test_not() {
        let mut f = fixture("0!5!");
        f.run(4);
        assert_eq!(f.stack(), &[1, 0]);
    }

    #[test]
    fn test_horizontal_if() {
        let mut f = fixture("_").with_stack(&[0]);
        f.ip.set_direction(Direction::Up);
        f.run(1);
        assert_eq!(f.ip.direction(), Direction::Right);

        let mut f = fixture("_").with_stack(&[4]);
        f.run(1);
        assert_eq!(f.ip.direction(), Direction::Left);
        assert!(f.stack().is_empty());
    }

    #[test]
    fn test_vertical_if() {
        let mut f = fixture("|").with_stack(&[0]);
        f.run(1);
        assert_eq!(f.ip.direction(), Direction::Down);

        let mut f = fixture("|").with_stack(&[-1]);
        f.run(1);
        assert_eq!(f.ip.direction(), Direction::Up);
    }

    #[test]
    fn test_arrows_steer() {
        let mut f = fixture("v\n \n> ");
        f.run(2);
        assert_eq!(f.ip.position(), Position::new(0, 2));
        f.run(1);
        assert_eq!(f.ip.direction(), Direction::Right);
        assert_eq!(f.ip.position(), Position::new(1, 2));
    }

    #[test]
    fn test_bridge_skips_cell() {
        let mut f = fixture("#12");
        f.run(2);
        assert_eq!(f.stack(), &[2]);
    }

    #[test]
    fn test_random_direction_is_cardinal() {
        let mut f = fixture("?");
        for _ in 0..16 {
            f.ip.move_to(Position::new(0, 0));
            f.run(1);
            assert!(Direction::ALL.contains(&f.ip.direction()));
        }
    }

    #[test]
    fn test_put_and_get() {
        let mut f = fixture("\"A\"21p21g\n\n");
        f.run(9);
        assert_eq!(f.grid.get(2, 1), 'A');
        assert_eq!(f.stack(), &[65]);
        let writes = f.interp.take_writes();
        assert_eq!(
            writes,
            vec![GridWrite {
                position: Position::new(2, 1),
                cell: 'A'
            }]
        );
        assert!(f.interp.take_writes().is_empty());
    }

    #[test]
    fn test_put_invalid_char_writes_blank() {
        let mut f = fixture("pp\nxx").with_stack(&[-1, 0, 1]);
        f.run(1);
        for &v in &[0xD800, 1, 1] {
            f.ip.stack_mut().push(v);
        }
        f.run(1);

        assert_eq!(f.grid.get(0, 1), BLANK);
        assert_eq!(f.grid.get(1, 1), BLANK);
        assert!(f.stack().is_empty());
        let cells: Vec<_> = f.interp.take_writes().iter().map(|w| w.cell).collect();
        assert_eq!(cells, vec![BLANK, BLANK]);
    }

    #[test]
    fn test_get_blank_is_space() {
        let mut f = fixture("30g ");
        f.run(3);
        assert_eq!(f.stack(), &[' ' as i64]);
    }

    #[test]
    fn test_underflow_faults_without_advancing() {
        let mut f = fixture("5+");
        f.run(1);
        let result = f.interp.step(&mut f.ip, &mut f.grid);
        assert!(matches!(
            result,
            StepResult::Fault(FungeError::StackUnderflow { needed: 2, available: 1 })
        ));
        assert_eq!(f.stack(), &[5]);
        assert_eq!(f.ip.position(), Position::new(1, 0));
    }

    #[test]
    fn test_put_underflow_leaves_stack() {
        let mut f = fixture("p").with_stack(&[1, 2]);
        let result = f.interp.step(&mut f.ip, &mut f.grid);
        assert!(result.is_fault());
        assert_eq!(f.stack(), &[1, 2]);
        assert!(f.interp.take_writes().is_empty());
    }

    #[test]
    fn test_terminate_halts_in_place() {
        let mut f = fixture(" @");
        f.run(1);
        let result = f.interp.step(&mut f.ip, &mut f.grid);
        assert!(matches!(result, StepResult::Halt));
        assert_eq!(f.ip.position(), Position::new(1, 0));
    }

    #[test]
    fn test_reserved_and_unknown_are_noops() {
        let mut f = fixture(".,&~x ");
        f.run(6);
        assert!(f.stack().is_empty());
        assert_eq!(f.ip.position(), Position::new(0, 0));
    }
}
