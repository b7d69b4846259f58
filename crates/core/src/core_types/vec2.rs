//! Vector type alias for 2D positions, forces, and directions.

use nalgebra::Vector2;

/// 2D vector type for grid-space positions, force samples, and brush directions.
///
/// This is a simple alias for `nalgebra::Vector2<f32>`, used throughout
/// the engine for force-field samples, injection centres, and pointer deltas.
pub type Vec2 = Vector2<f32>;
