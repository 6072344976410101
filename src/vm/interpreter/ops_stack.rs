//! Stack and arithmetic operation implementations for the Interpreter

use super::{Flow, Interpreter};
use crate::error::Result;
use crate::vm::{BinaryOp, InstructionPointer};

impl Interpreter {
    pub(super) fn execute_binary(&mut self, ip: &mut InstructionPointer, op: BinaryOp) -> Result<Flow> {
        let stack = ip.stack_mut();
        stack.require(2)?;
        let a = stack.pop()?;
        let b = stack.pop()?;
        let value = match op.apply(b, a) {
            Some(v) => v,
            None => {
                log::warn!("{} by zero ({} {} {}), pushing 0", op.symbol(), b, op.symbol(), a);
                0
            }
        };
        stack.push(value);
        Ok(Flow::Next)
    }

    pub(super) fn execute_not(&mut self, ip: &mut InstructionPointer) -> Result<Flow> {
        let stack = ip.stack_mut();
        let x = stack.pop()?;
        stack.push((x == 0) as i64);
        Ok(Flow::Next)
    }

    pub(super) fn execute_duplicate(&mut self, ip: &mut InstructionPointer) -> Result<Flow> {
        let stack = ip.stack_mut();
        let x = stack.peek()?;
        stack.push(x);
        Ok(Flow::Next)
    }

    pub(super) fn execute_swap(&mut self, ip: &mut InstructionPointer) -> Result<Flow> {
        let stack = ip.stack_mut();
        stack.require(2)?;
        let a = stack.pop()?;
        let b = stack.pop()?;
        stack.push(a);
        stack.push(b);
        Ok(Flow::Next)
    }

    pub(super) fn execute_discard(&mut self, ip: &mut InstructionPointer) -> Result<Flow> {
        ip.stack_mut().pop()?;
        Ok(Flow::Next)
    }
}
