//! Opcode - Instruction set for grid programs
//!
//! Every cell is a single character. Outside string mode a character decodes
//! to at most one opcode; anything that does not decode is a no-op.
//!
//! | Group      | Characters            | Effect                                   |
//! |------------|-----------------------|------------------------------------------|
//! | Literal    | `0`-`9`               | push digit value                         |
//! | Steering   | `^ > v <` `?`         | set facing (fixed or random)             |
//! | Arithmetic | `+ - * / %`           | pop a, pop b, push `b op a`              |
//! | Logic      | `` ` `` `!`           | greater-than, logical not                |
//! | Branch     | `_ \|`                | pop, pick horizontal / vertical facing   |
//! | Stack      | `: \ $`               | duplicate, swap, discard                 |
//! | Control    | `" # @`               | string mode, bridge, terminate           |
//! | Grid       | `p g`                 | put / get cell                           |
//! | Reserved   | `. , & ~`             | recognised, not implemented              |

use std::fmt;

use crate::grid::Direction;

/// Binary arithmetic operators, applied as `b op a` where `a` was on top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    /// `` ` `` - 1 if b > a else 0
    Greater,
}

impl BinaryOp {
    /// Evaluate `b op a`. Division and remainder by zero yield None.
    pub fn apply(self, b: i64, a: i64) -> Option<i64> {
        match self {
            Self::Add => Some(b.wrapping_add(a)),
            Self::Sub => Some(b.wrapping_sub(a)),
            Self::Mul => Some(b.wrapping_mul(a)),
            Self::Div => (a != 0).then(|| b.wrapping_div(a)),
            Self::Rem => (a != 0).then(|| b.wrapping_rem(a)),
            Self::Greater => Some((b > a) as i64),
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Rem => '%',
            Self::Greater => '`',
        }
    }
}

/// A decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `0`-`9`
    Digit(u8),
    /// `^ > v <`
    Steer(Direction),
    /// `"`
    ToggleStringMode,
    /// `?`
    RandomDirection,
    Binary(BinaryOp),
    /// `!`
    Not,
    /// `_` - right if zero else left
    HorizontalIf,
    /// `|` - down if zero else up
    VerticalIf,
    /// `:`
    Duplicate,
    /// `\`
    Swap,
    /// `$`
    Discard,
    /// `#` - skip the next cell
    Bridge,
    /// `p`
    Put,
    /// `g`
    Get,
    /// `@`
    Terminate,
    /// `. , & ~`
    Reserved(char),
}

impl Opcode {
    /// Decode a cell outside string mode
    pub fn decode(c: char) -> Option<Self> {
        if let Some(d) = c.to_digit(10) {
            return Some(Self::Digit(d as u8));
        }
        if let Some(dir) = Direction::from_arrow(c) {
            return Some(Self::Steer(dir));
        }
        let op = match c {
            '"' => Self::ToggleStringMode,
            '?' => Self::RandomDirection,
            '+' => Self::Binary(BinaryOp::Add),
            '-' => Self::Binary(BinaryOp::Sub),
            '*' => Self::Binary(BinaryOp::Mul),
            '/' => Self::Binary(BinaryOp::Div),
            '%' => Self::Binary(BinaryOp::Rem),
            '`' => Self::Binary(BinaryOp::Greater),
            '!' => Self::Not,
            '_' => Self::HorizontalIf,
            '|' => Self::VerticalIf,
            ':' => Self::Duplicate,
            '\\' => Self::Swap,
            '$' => Self::Discard,
            '#' => Self::Bridge,
            'p' => Self::Put,
            'g' => Self::Get,
            '@' => Self::Terminate,
            '.' | ',' | '&' | '~' => Self::Reserved(c),
            _ => return None,
        };
        Some(op)
    }

    /// Character this opcode decodes from
    pub fn symbol(self) -> char {
        match self {
            Self::Digit(d) => char::from(b'0' + d),
            Self::Steer(Direction::Up) => '^',
            Self::Steer(Direction::Right) => '>',
            Self::Steer(Direction::Down) => 'v',
            Self::Steer(Direction::Left) => '<',
            Self::ToggleStringMode => '"',
            Self::RandomDirection => '?',
            Self::Binary(op) => op.symbol(),
            Self::Not => '!',
            Self::HorizontalIf => '_',
            Self::VerticalIf => '|',
            Self::Duplicate => ':',
            Self::Swap => '\\',
            Self::Discard => '$',
            Self::Bridge => '#',
            Self::Put => 'p',
            Self::Get => 'g',
            Self::Terminate => '@',
            Self::Reserved(c) => c,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
