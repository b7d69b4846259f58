//! Double-buffered 2D cell grid
//!
//! Row-major storage (`index = y * width + x`) with the origin at the
//! bottom-left, matching the normalised input convention. The front buffer
//! is the only one readers ever see; the rule engine writes the back buffer
//! and the simulator swaps them at the end of a step.

use super::buffer::DoubleBuffer;
use crate::config::WallPolicy;
use crate::core_types::{Cell, MaterialId};
use crate::error::{SimError, SimResult};
use rustc_hash::{FxBuildHasher, FxHashMap};
use std::fmt;

/// Fixed-size W×H grid of cells with front/back buffers
#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: DoubleBuffer<Cell>,
}

impl Grid {
    /// Create an all-Empty grid
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidDimensions`] if either extent is zero or the
    /// cell count does not fit in memory indices.
    pub fn new(width: u32, height: u32) -> SimResult<Self> {
        let len = cell_count(width, height)?;
        Ok(Self {
            width,
            height,
            cells: DoubleBuffer::new(len, Cell::EMPTY),
        })
    }

    /// `(width, height)` in cells
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Width in cells
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; zero-sized grids are rejected at construction
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether a signed coordinate lies inside the grid
    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    /// Row-major index of `(x, y)`
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] outside `[0, W) x [0, H)`.
    #[inline]
    pub fn index_of(&self, x: u32, y: u32) -> SimResult<usize> {
        if x < self.width && y < self.height {
            Ok(self.index_unchecked(x as usize, y as usize))
        } else {
            Err(SimError::out_of_bounds(
                i64::from(x),
                i64::from(y),
                self.width,
                self.height,
            ))
        }
    }

    #[inline]
    pub(crate) fn index_unchecked(&self, x: usize, y: usize) -> usize {
        y * self.width as usize + x
    }

    /// Read a cell from the current (front) buffer
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] outside the grid.
    pub fn get(&self, x: u32, y: u32) -> SimResult<Cell> {
        let idx = self.index_of(x, y)?;
        Ok(self.cells.front()[idx])
    }

    /// Material at a signed coordinate; anything outside the grid reads as Wall
    #[inline]
    pub fn material_or_wall(&self, x: i64, y: i64) -> MaterialId {
        if self.contains(x, y) {
            self.cells.front()[self.index_unchecked(x as usize, y as usize)].material
        } else {
            MaterialId::Wall
        }
    }

    /// Write a cell into the next (back) buffer only
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] outside the grid.
    pub fn set_next(&mut self, x: u32, y: u32, cell: Cell) -> SimResult<()> {
        let idx = self.index_of(x, y)?;
        self.cells.back_mut()[idx] = cell;
        Ok(())
    }

    /// Exchange current and next buffers in O(1)
    #[inline]
    pub fn swap(&mut self) {
        self.cells.swap();
    }

    /// Current cells, row-major from the bottom row
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        self.cells.front()
    }

    /// Current buffer for reading, next buffer for writing
    #[inline]
    pub(crate) fn split_mut(&mut self) -> (&[Cell], &mut [Cell]) {
        self.cells.split_mut()
    }

    /// Overwrite a disk of the current buffer, honouring the wall policy.
    ///
    /// Cells with `dx² + dy² <= radius²` around the integer centre are
    /// written; radius 0 writes exactly the centre. Returns how many cells
    /// changed material.
    pub(crate) fn paint_disk(
        &mut self,
        cx: u32,
        cy: u32,
        radius: f32,
        material: MaterialId,
        policy: WallPolicy,
    ) -> usize {
        let reach = radius.floor() as i64;
        let r_sq = radius * radius;
        let (cx, cy) = (i64::from(cx), i64::from(cy));
        let x_lo = cx.saturating_sub(reach).max(0);
        let x_hi = cx.saturating_add(reach).min(i64::from(self.width) - 1);
        let y_lo = cy.saturating_sub(reach).max(0);
        let y_hi = cy.saturating_add(reach).min(i64::from(self.height) - 1);

        let width = self.width as usize;
        let front = self.cells.front_mut();
        let mut changed = 0;
        for y in y_lo..=y_hi {
            let dy = y - cy;
            for x in x_lo..=x_hi {
                let dx = x - cx;
                if ((dx * dx + dy * dy) as f32) > r_sq {
                    continue;
                }
                let cell = &mut front[y as usize * width + x as usize];
                if !paint_allowed(cell.material, material, policy) || cell.material == material {
                    continue;
                }
                cell.material = material;
                changed += 1;
            }
        }
        changed
    }

    /// Count every material in the current buffer
    pub fn material_counts(&self) -> FxHashMap<MaterialId, usize> {
        let mut counts =
            FxHashMap::with_capacity_and_hasher(MaterialId::COUNT, FxBuildHasher);
        for cell in self.cells.front() {
            *counts.entry(cell.material).or_insert(0) += 1;
        }
        counts
    }

    /// Number of current cells holding `material`
    pub fn count(&self, material: MaterialId) -> usize {
        self.cells
            .front()
            .iter()
            .filter(|c| c.material == material)
            .count()
    }

    /// Current row `y` (bottom row is 0)
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] if `y >= height`.
    pub fn row(&self, y: u32) -> SimResult<&[Cell]> {
        if y >= self.height {
            return Err(SimError::out_of_bounds(
                0,
                i64::from(y),
                self.width,
                self.height,
            ));
        }
        let start = self.index_unchecked(0, y as usize);
        Ok(&self.cells.front()[start..start + self.width as usize])
    }
}

/// Whether paint of `incoming` may replace `existing` under `policy`
#[inline]
pub(crate) fn paint_allowed(existing: MaterialId, incoming: MaterialId, policy: WallPolicy) -> bool {
    match policy {
        WallPolicy::Overwrite => true,
        WallPolicy::Protected => existing != MaterialId::Wall || incoming == MaterialId::Wall,
    }
}

fn cell_count(width: u32, height: u32) -> SimResult<usize> {
    if width == 0 || height == 0 {
        return Err(SimError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(SimError::InvalidDimensions { width, height })
}

/// ASCII dump, top row first
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height as usize).rev() {
            let start = self.index_unchecked(0, y);
            for cell in &self.cells.front()[start..start + self.width as usize] {
                write!(f, "{}", cell.material.glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
