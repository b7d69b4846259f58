//! Edit queue
//!
//! Input between steps is recorded here and applied exactly once at the
//! start of the next playing step, so a renderer never observes a half
//! applied edit. The pending buffer is handed out and returned each step so
//! its capacity is reused.
//!
//! Pointer strokes own a single slot per step: a newer brush edit replaces
//! the queued one in place, so the queue never holds more than one brush
//! edit no matter how many pointer events arrive between steps.

use crate::core_types::{MaterialId, Vec2};
use crate::grid::ForceStrength;

/// One queued modification
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrushEdit {
    /// Overwrite a disk of cells
    Material {
        /// Integer centre cell
        cell: (u32, u32),
        /// Radius in cells; 0 is the centre cell only
        radius: f32,
        /// Material written
        material: MaterialId,
    },
    /// Inject into the force field
    Force {
        /// Centre in continuous grid units
        center: Vec2,
        /// Push shape and magnitude
        strength: ForceStrength,
        /// Cutoff distance in cells
        radius: f32,
    },
}

/// Where an edit came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditSource {
    /// Direct API call or scenario seeding
    Direct,
    /// Pointer stroke
    Brush,
}

/// FIFO of edits awaiting the next playing step
#[derive(Debug)]
pub struct EditQueue {
    pending: Vec<BrushEdit>,
    brush_slot: Option<usize>,
    applied_total: u64,
}

impl Default for EditQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EditQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(32),
            brush_slot: None,
            applied_total: 0,
        }
    }

    /// Queue an edit for the next playing step
    ///
    /// A brush edit overwrites the brush edit already queued this step and
    /// keeps its position in the order.
    pub fn submit(&mut self, edit: BrushEdit, source: EditSource) {
        match (source, self.brush_slot) {
            (EditSource::Brush, Some(slot)) => self.pending[slot] = edit,
            (EditSource::Brush, None) => {
                self.brush_slot = Some(self.pending.len());
                self.pending.push(edit);
            }
            (EditSource::Direct, _) => self.pending.push(edit),
        }
    }

    /// Number of queued edits
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether a pointer stroke queued an edit since the last flush
    pub fn has_brush_edit(&self) -> bool {
        self.brush_slot.is_some()
    }

    /// Total edits applied over the queue's lifetime
    pub fn applied_total(&self) -> u64 {
        self.applied_total
    }

    /// Take all pending edits for processing
    ///
    /// Hand the buffer back with [`EditQueue::recycle`] to keep its capacity.
    pub fn take_pending(&mut self) -> Vec<BrushEdit> {
        self.brush_slot = None;
        std::mem::take(&mut self.pending)
    }

    /// Return a drained buffer after processing `applied` edits
    pub fn recycle(&mut self, mut buffer: Vec<BrushEdit>, applied: usize) {
        self.applied_total += applied as u64;
        buffer.clear();
        if self.pending.is_empty() && buffer.capacity() > self.pending.capacity() {
            self.pending = buffer;
        }
    }
}
