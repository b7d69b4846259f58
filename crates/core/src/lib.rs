//! Falling-Sand Simulation Core Library
//!
//! A 2D grid of typed cells (Empty, Water, Sand, Wall) evolved by
//! cellular-automaton rules, optionally coupled to a continuous force field
//! that is advected, diffused and decayed each step. Users paint materials
//! and push the field with a circular brush between steps.
//!
//! ## Step Model
//!
//! Every grid and field is double buffered. Input only queues edits;
//! [`Simulator::step`] applies them, computes the next buffers and swaps
//! them together, so a renderer never observes a partial step.
//!
//! ```rust
//! use sands_core::{MaterialId, Scenario, SimulationMode, Simulator};
//!
//! let mut sim = Simulator::new(32, 32, SimulationMode::Automaton)?;
//! sim.seed(&Scenario::Floor)?;
//! sim.paint(0.5, 0.9, MaterialId::Sand)?;
//! for frame in 0..60 {
//!     sim.step(frame, true);
//! }
//! assert!(sim.grid().count(MaterialId::Sand) > 0);
//! # Ok::<(), sands_core::SimError>(())
//! ```

// Core types and utilities
pub mod config;
pub mod core_types;
pub mod error;

// Double-buffered state
pub mod grid;

// Update kernels
pub mod solver;

// Input and orchestration
pub mod interaction;
pub mod simulation;

// Presentation
pub mod render;

// Re-export core types
pub use core_types::{Cell, MaterialId, MaterialInfo, Vec2};
pub use error::{SimError, SimResult};

// Re-export configuration
pub use config::{BrushConfig, EngineConfig, FieldConfig, RuleConfig, SimulationMode, WallPolicy};

// Re-export simulation types
pub use grid::{ForceField, ForceStrength, Grid, Injection};
pub use interaction::{Brush, BrushPayload, BrushState, BrushTool, PointerButton};
pub use simulation::{Scenario, Simulator, StepReport};
pub use solver::RuleEngine;
