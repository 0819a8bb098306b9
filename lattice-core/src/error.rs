use thiserror::Error;

/// Failures raised by lattice access and sweep setup.
///
/// A non-positive temperature is deliberately absent: the dynamics treat it as
/// a skipped step, not a failure.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("cell ({row}, {col}) is outside the {height}x{width} lattice")]
    OutOfBounds {
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    },
    #[error("lattice dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("{name} range has max {max} below min {min}")]
    InvalidRange {
        name: &'static str,
        min: f64,
        max: f64,
    },
    #[error("density {0} must lie in [0, 1]")]
    InvalidDensity(f64),
    #[error("diagram resolution must be at least 1")]
    InvalidResolution,
    #[error("occupancy must be 0 or 1, got {0}")]
    InvalidOccupancy(u8),
}

pub type Result<T> = std::result::Result<T, Error>;
