//! Per-step update kernels
//!
//! The rule engine advances the cell grid; the advection and diffusion
//! stencils advance the force field. Each kernel reads one buffer and writes
//! another, so the grid and field types own the swapping.

pub mod advection;
pub mod diffusion;
pub mod profiler;
pub mod rules;

// Re-exports
pub use diffusion::DiffusionParams;
pub use profiler::{FrameTimer, ProfilerScope};
pub use rules::RuleEngine;
