//! Semi-Lagrangian self-advection of the force field
//!
//! Each cell traces back along its own vector and takes the bilinearly
//! sampled value found there. The sample is a convex combination of four
//! existing vectors, so advection cannot raise the max norm.

use crate::core_types::Vec2;
use rayon::prelude::*;

/// Advect `field_in` by itself into `field_out`
///
/// `scale` is the trace distance in cells per unit of velocity. Departure
/// points are clamped to the grid, so edge cells sample edge values.
pub fn advect_cpu(
    field_in: &[Vec2],
    field_out: &mut [Vec2],
    width: usize,
    height: usize,
    scale: f32,
) {
    debug_assert_eq!(field_in.len(), width * height);
    debug_assert_eq!(field_out.len(), width * height);

    field_out
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let v = field_in[y * width + x];
                let from_x = x as f32 - scale * v.x;
                let from_y = y as f32 - scale * v.y;
                *out = sample_bilinear(field_in, width, height, from_x, from_y);
            }
        });
}

/// Bilinear sample at a fractional cell index, clamped to the grid
pub fn sample_bilinear(field: &[Vec2], width: usize, height: usize, x: f32, y: f32) -> Vec2 {
    let max_x = (width - 1) as f32;
    let max_y = (height - 1) as f32;
    let x = if x.is_finite() { x.clamp(0.0, max_x) } else { 0.0 };
    let y = if y.is_finite() { y.clamp(0.0, max_y) } else { 0.0 };

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let tx = x - x0 as f32;
    let ty = y - y0 as f32;

    let bottom = field[y0 * width + x0] * (1.0 - tx) + field[y0 * width + x1] * tx;
    let top = field[y1 * width + x0] * (1.0 - tx) + field[y1 * width + x1] * tx;
    bottom * (1.0 - ty) + top * ty
}
