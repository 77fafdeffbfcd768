//! Error types

use thiserror::Error;

use crate::maze::{Axis, Cell, Direction};

/// Failures of maze construction, persistence and search
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MazeError {
    /// Requested maze shape is empty or too large to address
    #[error("invalid maze dimensions {floors}x{rows}x{cols}")]
    InvalidDimension {
        floors: usize,
        rows: usize,
        cols: usize,
    },

    /// Serialized maze bytes do not describe a valid maze
    #[error("malformed maze data: {0}")]
    MalformedData(String),

    /// Compressed stream cannot be expanded
    #[error("corrupt compressed stream: {0}")]
    CorruptStream(String),

    /// Cross-section index outside of `[0, len)`
    #[error("cross-section index {index} out of range for axis {axis} of length {len}")]
    IndexOutOfRange { axis: Axis, index: usize, len: usize },

    /// Search exhausted the frontier without reaching the goal
    #[error("goal is unreachable from start")]
    Unreachable,

    #[error("start cell {0} is outside the maze")]
    InvalidStart(Cell),

    #[error("goal cell {0} is outside the maze")]
    InvalidGoal(Cell),

    #[error("cell {0} is outside the maze")]
    CellOutOfBounds(Cell),

    /// Outer walls of the maze cannot be carved
    #[error("cannot carve boundary wall {direction:?} of cell {cell}")]
    BoundaryWall { cell: Cell, direction: Direction },
}

pub type Result<T> = std::result::Result<T, MazeError>;
