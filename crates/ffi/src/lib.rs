//! C ABI for the falling-sand simulation core.
//!
//! Every fallible entry point returns a [`SandsErrorCode`]; on failure the
//! message is available from [`sands_get_last_error`] on the same thread.
//! The header `SandsFFI.h` is generated by the build script.

mod brush;
mod error;
mod helpers;
mod instance;
mod queries;
mod simulation;

pub use brush::{
    sands_pointer_down, sands_pointer_move, sands_pointer_up, sands_set_brush_material,
    sands_set_brush_radius, sands_set_brush_tool,
};
pub use error::{sands_get_last_error, sands_get_last_error_code, SandsErrorCode};
pub use instance::{sands_destroy, sands_new, SandsInstance};
pub use queries::{
    sands_cell_at, sands_dimensions, sands_force_at, sands_material_count, sands_material_info,
    sands_render_force_rgba, sands_render_rgba, sands_step_count, SandsMaterialInfo,
};
pub use simulation::{
    sands_apply_force, sands_paint, sands_paint_cell, sands_seed, sands_step, SandsStepReport,
};
