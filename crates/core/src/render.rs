//! RGBA8 export for display surfaces
//!
//! Both writers fill a caller-owned buffer of `width * height * 4` bytes,
//! top row first (the grid itself stores the bottom row first). Rows are
//! written in parallel and nothing is allocated.

use crate::core_types::material::unit_to_u8;
use crate::core_types::MaterialId;
use crate::error::{SimError, SimResult};
use crate::grid::{ForceField, Grid};
use rayon::prelude::*;

/// Bytes needed to export a `width` x `height` image
pub fn rgba_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

fn check_len(width: u32, height: u32, out: &[u8]) -> SimResult<()> {
    let expected = rgba_len(width, height);
    if out.len() == expected {
        Ok(())
    } else {
        Err(SimError::BufferSize {
            expected,
            actual: out.len(),
        })
    }
}

/// Write each cell's palette color
///
/// # Errors
///
/// Returns [`SimError::BufferSize`] if `out` is not exactly
/// [`rgba_len`] bytes.
pub fn write_cells_rgba(grid: &Grid, out: &mut [u8]) -> SimResult<()> {
    let (width, height) = grid.dimensions();
    check_len(width, height, out)?;

    let colors: [[u8; 4]; MaterialId::COUNT] = [
        MaterialId::Empty.color_rgba8(),
        MaterialId::Water.color_rgba8(),
        MaterialId::Sand.color_rgba8(),
        MaterialId::Wall.color_rgba8(),
    ];
    let w = width as usize;
    let h = height as usize;
    let cells = grid.cells();

    out.par_chunks_mut(w * 4)
        .enumerate()
        .for_each(|(row, pixels)| {
            let y = h - 1 - row;
            let src = &cells[y * w..(y + 1) * w];
            for (pixel, cell) in pixels.chunks_exact_mut(4).zip(src) {
                pixel.copy_from_slice(&colors[cell.material as usize]);
            }
        });
    Ok(())
}

/// Write the force field as color
///
/// Red and green carry the x and y components mapped from
/// `[-scale, scale]` onto `[0, 255]`; blue carries the magnitude over
/// `[0, scale]`. Alpha is opaque.
///
/// # Errors
///
/// Returns [`SimError::BufferSize`] for a wrong-sized buffer and
/// [`SimError::InvalidConfig`] for a non-positive or non-finite `scale`.
pub fn write_force_rgba(field: &ForceField, scale: f32, out: &mut [u8]) -> SimResult<()> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(SimError::InvalidConfig(format!(
            "force render scale must be positive, got {scale}"
        )));
    }
    let (width, height) = field.dimensions();
    check_len(width, height, out)?;

    let w = width as usize;
    let h = height as usize;
    let vectors = field.vectors();

    out.par_chunks_mut(w * 4)
        .enumerate()
        .for_each(|(row, pixels)| {
            let y = h - 1 - row;
            let src = &vectors[y * w..(y + 1) * w];
            for (pixel, v) in pixels.chunks_exact_mut(4).zip(src) {
                pixel[0] = signed_to_u8(v.x / scale);
                pixel[1] = signed_to_u8(v.y / scale);
                pixel[2] = unit_to_u8(v.norm() / scale);
                pixel[3] = 255;
            }
        });
    Ok(())
}

#[inline]
fn signed_to_u8(v: f32) -> u8 {
    unit_to_u8(0.5 + 0.5 * v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldConfig, WallPolicy};
    use crate::core_types::Vec2;

    #[test]
    fn test_cells_top_row_first() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.paint_disk(0, 0, 0.0, MaterialId::Wall, WallPolicy::Protected);
        grid.paint_disk(1, 1, 0.0, MaterialId::Sand, WallPolicy::Protected);

        let mut out = vec![0_u8; rgba_len(2, 2)];
        write_cells_rgba(&grid, &mut out).unwrap();

        // Top row: Empty, Sand
        assert_eq!(&out[0..4], &MaterialId::Empty.color_rgba8());
        assert_eq!(&out[4..8], &MaterialId::Sand.color_rgba8());
        // Bottom row: Wall, Empty
        assert_eq!(&out[8..12], &MaterialId::Wall.color_rgba8());
        assert_eq!(&out[12..16], &MaterialId::Empty.color_rgba8());
    }

    #[test]
    fn test_wrong_buffer_size() {
        let grid = Grid::new(3, 3).unwrap();
        let mut out = vec![0_u8; 10];
        assert_eq!(
            write_cells_rgba(&grid, &mut out),
            Err(SimError::BufferSize {
                expected: 36,
                actual: 10
            })
        );
    }

    #[test]
    fn test_force_colors() {
        let mut field = ForceField::new(2, 1, FieldConfig::default()).unwrap();
        field.set_next(0, 0, Vec2::new(2.0, 0.0)).unwrap();
        field.swap();

        let mut out = vec![0_u8; rgba_len(2, 1)];
        write_force_rgba(&field, 2.0, &mut out).unwrap();
        assert_eq!(&out[0..4], &[255, 128, 255, 255]);
        // Zero vector sits at mid grey with no magnitude
        assert_eq!(&out[4..8], &[128, 128, 0, 255]);

        assert!(write_force_rgba(&field, 0.0, &mut out).is_err());
    }
}
