//! Decay and diffusion stencil for the force field
//!
//! One explicit relaxation step toward the 4-neighbour mean, then uniform
//! decay:
//! ```text
//! v' = damping * ((1 - diffusion) * v + diffusion * mean(N4(v)))
//! ```
//!
//! Boundaries are Neumann: the mean only covers neighbours inside the grid,
//! so edge cells neither leak nor gain momentum from outside.

use crate::core_types::Vec2;
use rayon::prelude::*;

/// Parameters for one decay/diffusion pass
#[derive(Debug, Clone, Copy)]
pub struct DiffusionParams {
    /// Per-step multiplier in (0, 1]
    pub damping: f32,
    /// Blend toward the neighbour mean in [0, 1]
    pub diffusion: f32,
}

/// CPU implementation of the decay/diffusion pass
///
/// Reads `field_in` and overwrites every element of `field_out`. Rows are
/// processed in parallel.
///
/// Both terms are convex combinations of inputs scaled by `damping`, so for
/// parameters in range the max norm of the output never exceeds the input's.
pub fn step_decay_diffusion_cpu(
    field_in: &[Vec2],
    field_out: &mut [Vec2],
    width: usize,
    height: usize,
    params: DiffusionParams,
) {
    debug_assert_eq!(field_in.len(), width * height);
    debug_assert_eq!(field_out.len(), width * height);

    let keep = 1.0 - params.diffusion;

    field_out
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let idx = y * width + x;
                let v = field_in[idx];

                let blended = if params.diffusion > 0.0 {
                    let mut sum = Vec2::zeros();
                    let mut count = 0_u8;
                    if x > 0 {
                        sum += field_in[idx - 1];
                        count += 1;
                    }
                    if x + 1 < width {
                        sum += field_in[idx + 1];
                        count += 1;
                    }
                    if y > 0 {
                        sum += field_in[idx - width];
                        count += 1;
                    }
                    if y + 1 < height {
                        sum += field_in[idx + width];
                        count += 1;
                    }
                    if count == 0 {
                        // 1x1 grid
                        v
                    } else {
                        v * keep + sum * (params.diffusion / f32::from(count))
                    }
                } else {
                    v
                };

                *out = blended * params.damping;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn max_norm(field: &[Vec2]) -> f32 {
        field.iter().fold(0.0, |max, v| max.max(v.norm()))
    }

    #[test]
    fn test_pure_decay_scales_every_vector() {
        let width = 4;
        let height = 3;
        let field_in: Vec<Vec2> = (0..width * height)
            .map(|i| Vec2::new(i as f32, -(i as f32) * 0.5))
            .collect();
        let mut field_out = vec![Vec2::zeros(); width * height];

        let params = DiffusionParams {
            damping: 0.9,
            diffusion: 0.0,
        };
        step_decay_diffusion_cpu(&field_in, &mut field_out, width, height, params);

        for (before, after) in field_in.iter().zip(&field_out) {
            assert_relative_eq!(after.norm(), 0.9 * before.norm(), epsilon = 1e-5);
        }
    }

    #[test]
    fn test_diffusion_spreads_to_neighbours_only() {
        let width = 5;
        let height = 5;
        let mut field_in = vec![Vec2::zeros(); width * height];
        let centre = 2 * width + 2;
        field_in[centre] = Vec2::new(4.0, 0.0);
        let mut field_out = vec![Vec2::zeros(); width * height];

        let params = DiffusionParams {
            damping: 1.0,
            diffusion: 0.5,
        };
        step_decay_diffusion_cpu(&field_in, &mut field_out, width, height, params);

        assert_relative_eq!(field_out[centre].x, 2.0);
        // Each interior neighbour sees one non-zero of four
        for idx in [centre - 1, centre + 1, centre - width, centre + width] {
            assert_relative_eq!(field_out[idx].x, 0.5);
        }
        // Diagonals untouched in a single pass
        assert_eq!(field_out[centre - width - 1], Vec2::zeros());
    }

    #[test]
    fn test_uniform_field_is_preserved_at_edges() {
        let width = 3;
        let height = 3;
        let field_in = vec![Vec2::new(1.0, 2.0); width * height];
        let mut field_out = vec![Vec2::zeros(); width * height];

        let params = DiffusionParams {
            damping: 1.0,
            diffusion: 1.0,
        };
        step_decay_diffusion_cpu(&field_in, &mut field_out, width, height, params);

        for v in &field_out {
            assert_relative_eq!(v.x, 1.0);
            assert_relative_eq!(v.y, 2.0);
        }
    }

    #[test]
    fn test_max_norm_never_grows() {
        let width = 6;
        let height = 4;
        let field_in: Vec<Vec2> = (0..width * height)
            .map(|i| Vec2::new(((i * 7) % 5) as f32 - 2.0, ((i * 3) % 4) as f32))
            .collect();
        let mut field_out = vec![Vec2::zeros(); width * height];

        for diffusion in [0.0, 0.25, 1.0] {
            let params = DiffusionParams {
                damping: 1.0,
                diffusion,
            };
            step_decay_diffusion_cpu(&field_in, &mut field_out, width, height, params);
            assert!(max_norm(&field_out) <= max_norm(&field_in) + 1e-5);
        }
    }

    #[test]
    fn test_single_cell_grid() {
        let field_in = vec![Vec2::new(3.0, 4.0)];
        let mut field_out = vec![Vec2::zeros()];
        let params = DiffusionParams {
            damping: 0.5,
            diffusion: 1.0,
        };
        step_decay_diffusion_cpu(&field_in, &mut field_out, 1, 1, params);
        assert_relative_eq!(field_out[0].norm(), 2.5);
    }
}
