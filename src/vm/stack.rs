//! Stack - Per-pointer LIFO of signed integer cells
//!
//! Characters are stored as their code point. Popping an empty stack is an
//! explicit [`FungeError::StackUnderflow`], never a silent zero.

use std::fmt;

use crate::error::{FungeError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    cells: Vec<i64>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: i64) {
        self.cells.push(value);
    }

    pub fn pop(&mut self) -> Result<i64> {
        self.require(1)?;
        Ok(self.cells.pop().unwrap_or_default())
    }

    /// Top of stack without removing it
    pub fn peek(&self) -> Result<i64> {
        self.cells.last().copied().ok_or(FungeError::StackUnderflow {
            needed: 1,
            available: 0,
        })
    }

    /// Fail unless at least `needed` entries are present.
    ///
    /// Opcodes call this before popping so a failed instruction leaves the
    /// stack as it was.
    pub fn require(&self, needed: usize) -> Result<()> {
        if self.cells.len() < needed {
            return Err(FungeError::StackUnderflow {
                needed,
                available: self.cells.len(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Entries bottom to top
    pub fn as_slice(&self) -> &[i64] {
        &self.cells
    }
}

impl From<Vec<i64>> for Stack {
    fn from(cells: Vec<i64>) -> Self {
        Self { cells }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "]")
    }
}
