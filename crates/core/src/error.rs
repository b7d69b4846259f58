//! Error taxonomy for the simulation core.

use thiserror::Error;

/// Errors surfaced by the simulation core.
///
/// `OutOfBounds` is a contract violation (hosts clamp normalised coordinates
/// before they reach the core). `InvalidForce`, `InvalidMaterial` and
/// `InvalidRadius` reject a single input; the simulation keeps running.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Construction with a zero extent. No partial engine is created.
    #[error("invalid grid dimensions {width}x{height}: both extents must be non-zero")]
    InvalidDimensions {
        /// Requested width in cells
        width: u32,
        /// Requested height in cells
        height: u32,
    },

    /// Coordinate outside `[0, width) x [0, height)`.
    #[error("coordinate ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Requested x (may be negative for neighbour lookups)
        x: i64,
        /// Requested y
        y: i64,
        /// Grid width
        width: u32,
        /// Grid height
        height: u32,
    },

    /// Non-finite force magnitude or direction.
    #[error("force must be finite, got ({x}, {y})")]
    InvalidForce {
        /// x component (or scalar magnitude)
        x: f32,
        /// y component (zero for scalar magnitudes)
        y: f32,
    },

    /// Unknown material id, usually from a stale palette.
    #[error("unknown material id {0}")]
    InvalidMaterial(u8),

    /// Negative or non-finite brush or injection radius.
    #[error("radius must be finite and non-negative, got {0}")]
    InvalidRadius(f32),

    /// Caller-provided pixel buffer of the wrong length.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize {
        /// Bytes required (`width * height * 4`)
        expected: usize,
        /// Bytes provided
        actual: usize,
    },

    /// Engine configuration outside its supported range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SimError {
    /// Out-of-bounds error for a signed coordinate pair
    pub(crate) fn out_of_bounds(x: i64, y: i64, width: u32, height: u32) -> Self {
        SimError::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether this error rejects a single input rather than an engine setup
    pub fn is_input_rejection(&self) -> bool {
        matches!(
            self,
            SimError::InvalidForce { .. }
                | SimError::InvalidMaterial(_)
                | SimError::InvalidRadius(_)
                | SimError::OutOfBounds { .. }
        )
    }
}

/// Result alias used across the core.
pub type SimResult<T> = Result<T, SimError>;
