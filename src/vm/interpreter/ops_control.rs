//! Control flow operation implementations for the Interpreter

use rand::Rng;

use super::{Flow, Interpreter};
use crate::error::Result;
use crate::grid::Direction;
use crate::vm::{InstructionPointer, Positionable};

impl Interpreter {
    pub(super) fn execute_random_direction(&mut self, ip: &mut InstructionPointer) -> Result<Flow> {
        let dir = Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];
        ip.set_direction(dir);
        Ok(Flow::Next)
    }

    pub(super) fn execute_horizontal_if(&mut self, ip: &mut InstructionPointer) -> Result<Flow> {
        let x = ip.stack_mut().pop()?;
        ip.set_direction(if x == 0 { Direction::Right } else { Direction::Left });
        Ok(Flow::Next)
    }

    pub(super) fn execute_vertical_if(&mut self, ip: &mut InstructionPointer) -> Result<Flow> {
        let x = ip.stack_mut().pop()?;
        ip.set_direction(if x == 0 { Direction::Down } else { Direction::Up });
        Ok(Flow::Next)
    }
}
