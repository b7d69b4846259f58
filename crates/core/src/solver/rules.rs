//! Cellular-automaton transition rules
//!
//! One `advance` reads the front grid and writes the complete back grid.
//! Rows are scanned bottom-up so a particle that falls frees its cell before
//! the row above is visited. Within a row the sweep direction alternates with
//! the step parity to avoid a persistent sideways bias.
//!
//! Conflicts are first-writer-wins in scan order:
//! - `claimed[i]`: some mover has already landed in cell `i` this step
//! - `moved[i]`: the particle that started in cell `i` has already moved
//!
//! A target is open when it is unclaimed and either Empty in the front
//! buffer or vacated this step. Sand may also swap with Water that has not
//! moved. Every move writes both endpoints, so Sand and Water counts are
//! conserved exactly.

use crate::config::RuleConfig;
use crate::core_types::{Cell, MaterialId, Vec2};
use crate::grid::Grid;

/// How a mover may enter a target cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    /// Target is empty or vacated
    Free,
    /// Target holds unmoved water which rises into the source cell
    Swap,
}

/// Rule engine with per-step scratch masks sized to the grid
#[derive(Debug, Clone)]
pub struct RuleEngine {
    config: RuleConfig,
    claimed: Vec<bool>,
    moved: Vec<bool>,
}

/// Borrowed view of one step's state
struct Pass<'a> {
    front: &'a [Cell],
    back: &'a mut [Cell],
    claimed: &'a mut [bool],
    moved: &'a mut [bool],
    force: Option<&'a [Vec2]>,
    width: usize,
    height: usize,
    step: u64,
    config: &'a RuleConfig,
}

impl RuleEngine {
    /// Create an engine with masks for a `width` x `height` grid
    pub fn new(width: u32, height: u32, config: RuleConfig) -> Self {
        let len = width as usize * height as usize;
        Self {
            config,
            claimed: vec![false; len],
            moved: vec![false; len],
        }
    }

    /// Current tunables
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Replace the tunables
    pub fn set_config(&mut self, config: RuleConfig) {
        self.config = config;
    }

    /// Compute the back grid from the front grid
    ///
    /// `force` is the current force field, row-major like the grid; when
    /// present, water spreads toward the sign of its x component. `step` is
    /// the simulator's step counter and drives every parity tie-break.
    ///
    /// Returns the number of particles that moved. The caller swaps.
    pub fn advance(&mut self, grid: &mut Grid, force: Option<&[Vec2]>, step: u64) -> usize {
        let (width, height) = grid.dimensions();
        let (width, height) = (width as usize, height as usize);
        let len = width * height;

        if self.claimed.len() != len {
            self.claimed.resize(len, false);
            self.moved.resize(len, false);
        }
        self.claimed.fill(false);
        self.moved.fill(false);

        let (front, back) = grid.split_mut();
        back.copy_from_slice(front);

        let mut pass = Pass {
            front,
            back,
            claimed: &mut self.claimed,
            moved: &mut self.moved,
            force: force.filter(|f| f.len() == len),
            width,
            height,
            step,
            config: &self.config,
        };

        let reverse = step % 2 == 1;
        let mut moved_count = 0;
        for y in 0..height {
            for i in 0..width {
                let x = if reverse { width - 1 - i } else { i };
                if pass.update_cell(x, y) {
                    moved_count += 1;
                }
            }
        }
        moved_count
    }
}

impl Pass<'_> {
    /// Apply the rule for the particle starting at `(x, y)`
    fn update_cell(&mut self, x: usize, y: usize) -> bool {
        let idx = y * self.width + x;
        if self.moved[idx] {
            return false;
        }
        match self.front[idx].material {
            MaterialId::Sand => self.update_sand(x, y),
            MaterialId::Water => self.update_water(x, y),
            MaterialId::Empty | MaterialId::Wall => false,
        }
    }

    fn update_sand(&mut self, x: usize, y: usize) -> bool {
        let (x, y) = (x as i64, y as i64);
        if self.try_move(x, y, x, y - 1, true) {
            return true;
        }
        self.try_diagonals(x, y)
    }

    fn update_water(&mut self, x: usize, y: usize) -> bool {
        let idx = y * self.width + x;
        let (x, y) = (x as i64, y as i64);
        if self.try_move(x, y, x, y - 1, false) || self.try_diagonals(x, y) {
            return true;
        }
        if !self.config.water_spread {
            return false;
        }

        let prefer_left = match self.force {
            Some(force) if force[idx].x.abs() > self.config.water_drift_threshold => {
                force[idx].x < 0.0
            }
            _ => (x + y + self.step as i64) % 2 == 0,
        };
        let (first, second) = if prefer_left { (-1, 1) } else { (1, -1) };
        self.try_move(x, y, x + first, y, false) || self.try_move(x, y, x + second, y, false)
    }

    /// Below-left and below-right, in the step's preferred order
    fn try_diagonals(&mut self, x: i64, y: i64) -> bool {
        let prefer_left = (x + self.step as i64) % 2 == 0;
        let (first, second) = if prefer_left { (-1, 1) } else { (1, -1) };
        self.try_move(x, y, x + first, y - 1, false) || self.try_move(x, y, x + second, y - 1, false)
    }

    fn entry(&self, tx: i64, ty: i64, allow_swap: bool) -> Option<Entry> {
        // Outside the grid reads as Wall
        if tx < 0 || ty < 0 || tx >= self.width as i64 || ty >= self.height as i64 {
            return None;
        }
        let tidx = ty as usize * self.width + tx as usize;
        if self.claimed[tidx] {
            return None;
        }
        if self.moved[tidx] {
            return Some(Entry::Free);
        }
        match self.front[tidx].material {
            MaterialId::Empty => Some(Entry::Free),
            MaterialId::Water if allow_swap => Some(Entry::Swap),
            _ => None,
        }
    }

    fn try_move(&mut self, x: i64, y: i64, tx: i64, ty: i64, allow_swap: bool) -> bool {
        let Some(entry) = self.entry(tx, ty, allow_swap) else {
            return false;
        };
        let src = y as usize * self.width + x as usize;
        let dst = ty as usize * self.width + tx as usize;

        self.back[dst] = self.front[src];
        self.claimed[dst] = true;
        self.moved[src] = true;
        match entry {
            Entry::Free => self.back[src] = Cell::EMPTY,
            Entry::Swap => {
                self.back[src] = self.front[dst];
                self.claimed[src] = true;
                self.moved[dst] = true;
            }
        }
        true
    }
}
