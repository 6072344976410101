//! Error types for gridfunge

use thiserror::Error;

/// Gridfunge error type
#[derive(Debug, Error)]
pub enum FungeError {
    /// Direction symbol outside up/right/down/left
    #[error("Invalid direction: {0:?}")]
    InvalidDirection(String),

    /// Configuration rejected at load time
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Animation duration of zero (or negative/non-finite)
    #[error("Animation duration must be positive, got {0:?}")]
    NonPositiveDuration(std::time::Duration),

    /// Channel modulus must be finite and positive
    #[error("Invalid modulus for channel {channel}: {modulus}")]
    InvalidModulus { channel: String, modulus: f64 },

    /// Channel value (initial or target) must be finite
    #[error("Invalid value for channel {channel}: {value}")]
    InvalidValue { channel: String, value: f64 },

    /// Tween handle not bound to the scheduler
    #[error("Unknown tween handle: {0}")]
    UnknownTween(u32),

    /// Target or modulus missing for a bound channel
    #[error("Missing channel: {0}")]
    MissingChannel(String),

    /// Pop on a stack without enough entries
    #[error("Stack underflow: needed {needed}, available {available}")]
    StackUnderflow { needed: usize, available: usize },

    /// Board source does not fit the configured grid
    #[error("Program too large: {width}x{height} does not fit {cols}x{rows}")]
    ProgramTooLarge {
        width: usize,
        height: usize,
        cols: usize,
        rows: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FungeError>;
