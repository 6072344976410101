//! Board Loader - Place program text onto a configured grid
//!
//! # Usage
//!
//! ```ignore
//! use gridfunge::{Config, loader::load_path};
//!
//! let grid = load_path("programs/countdown.bf", &Config::default())?;
//! ```
//!
//! One line of text per row, starting at (0, 0). Short lines and missing
//! rows are blank. A program wider or taller than the configured board is
//! rejected rather than truncated.

use std::path::Path;

use anyhow::Context;

use crate::config::Config;
use crate::error::{FungeError, Result};
use crate::grid::ToroidalGrid;

/// Load program text onto a blank grid sized by `config`
pub fn load_string(source: &str, config: &Config) -> Result<ToroidalGrid> {
    config.validate()?;

    let lines: Vec<Vec<char>> = source.lines().map(|l| l.chars().collect()).collect();
    let width = lines.iter().map(Vec::len).max().unwrap_or(0);
    let height = lines.len();
    if width > config.cols || height > config.rows {
        return Err(FungeError::ProgramTooLarge {
            width,
            height,
            cols: config.cols,
            rows: config.rows,
        });
    }

    let mut grid = ToroidalGrid::new(config.cols, config.rows)?;
    for (row, line) in lines.iter().enumerate() {
        for (col, &c) in line.iter().enumerate() {
            grid.set(col as i64, row as i64, c);
        }
    }
    Ok(grid)
}

/// Read a program file and load it with [`load_string`]
pub fn load_path(path: impl AsRef<Path>, config: &Config) -> anyhow::Result<ToroidalGrid> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let grid = load_string(&source, config)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(grid)
}
