//! Double-buffered grids: the cell grid and the force field

pub mod buffer;
pub mod cell_grid;
pub mod force_field;

// Re-export main types
pub use buffer::DoubleBuffer;
pub use cell_grid::Grid;
pub use force_field::{check_injection, falloff, ForceField, ForceStrength, Injection};
