//! Pointer input and queued edits

pub mod brush;
pub mod edit_queue;

pub use brush::{Brush, BrushPayload, BrushState, BrushTool, PointerButton};
pub use edit_queue::{BrushEdit, EditQueue, EditSource};
