//! Errors raised while building a simulation.
//!
//! Stepping never fails. Anything that can go wrong at runtime is a soft
//! fault that gets counted in [`StepStats`](crate::flip::StepStats) and logged.

/// Construction-time failure.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Grid must be at least 3x3 so a solid border leaves an interior.
    InvalidDimensions { width: usize, height: usize },
    /// Mask data does not match the declared grid size.
    MaskSizeMismatch { expected: usize, found: usize },
    /// Every cell is solid, there is nowhere to put fluid.
    NoOpenCells,
    /// A seed particle lies outside `[0, width) x [0, height)`.
    SeedOutOfBounds { index: usize, x: f32, y: f32 },
    /// A seed particle starts inside a solid cell.
    SeedInSolid { index: usize, x: f32, y: f32 },
    /// A configuration value is outside its allowed range.
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::InvalidDimensions { width, height } => {
                write!(f, "Grid {}x{} is too small (minimum 3x3)", width, height)
            }
            SimError::MaskSizeMismatch { expected, found } => {
                write!(f, "Mask has {} cells, expected {}", found, expected)
            }
            SimError::NoOpenCells => write!(f, "Mask has no open cells"),
            SimError::SeedOutOfBounds { index, x, y } => {
                write!(f, "Seed particle {} at ({}, {}) is outside the grid", index, x, y)
            }
            SimError::SeedInSolid { index, x, y } => {
                write!(f, "Seed particle {} at ({}, {}) is inside a solid cell", index, x, y)
            }
            SimError::InvalidConfig { field, reason } => {
                write!(f, "Invalid config value `{}`: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for SimError {}
