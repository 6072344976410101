//! Grid access operation implementations for the Interpreter

use super::{Flow, GridWrite, Interpreter};
use crate::error::Result;
use crate::grid::{ToroidalGrid, BLANK};
use crate::vm::InstructionPointer;

impl Interpreter {
    /// `p` - pop y, pop x, pop v; write `chr(v)` at (x, y)
    pub(super) fn execute_put(
        &mut self,
        ip: &mut InstructionPointer,
        grid: &mut ToroidalGrid,
    ) -> Result<Flow> {
        let stack = ip.stack_mut();
        stack.require(3)?;
        let y = stack.pop()?;
        let x = stack.pop()?;
        let v = stack.pop()?;

        let cell = u32::try_from(v)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or(BLANK);
        let position = grid.normalize(x, y);
        grid.set_at(position, cell);
        self.writes.push(GridWrite { position, cell });
        Ok(Flow::Next)
    }

    /// `g` - pop y, pop x; push the code point at (x, y)
    pub(super) fn execute_get(
        &mut self,
        ip: &mut InstructionPointer,
        grid: &mut ToroidalGrid,
    ) -> Result<Flow> {
        let stack = ip.stack_mut();
        stack.require(2)?;
        let y = stack.pop()?;
        let x = stack.pop()?;
        stack.push(grid.get(x, y) as i64);
        Ok(Flow::Next)
    }
}
