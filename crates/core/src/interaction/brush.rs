//! Interactive brush
//!
//! The brush turns pointer input in normalised coordinates into queued
//! edits. It is `Idle` until a pointer goes down, then `Active` with the
//! payload chosen by the current tool and the pressed button.

use super::edit_queue::BrushEdit;
use crate::config::BrushConfig;
use crate::core_types::{MaterialId, Vec2};
use crate::error::{SimError, SimResult};
use crate::grid::ForceStrength;

/// What the brush applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrushTool {
    /// Paint the selected material
    #[default]
    Material,
    /// Push the force field
    Force,
}

impl BrushTool {
    /// Convert from u8 for FFI compatibility
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(BrushTool::Material),
            1 => Some(BrushTool::Force),
            _ => None,
        }
    }

    /// Convert to u8 for FFI compatibility
    pub fn as_u8(&self) -> u8 {
        match self {
            BrushTool::Material => 0,
            BrushTool::Force => 1,
        }
    }
}

/// Pointer button that started a stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Paint / push
    Primary,
    /// Erase / pull
    Secondary,
}

impl PointerButton {
    /// Convert from u8 for FFI compatibility
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(PointerButton::Primary),
            1 => Some(PointerButton::Secondary),
            _ => None,
        }
    }
}

/// Payload of an active stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrushPayload {
    /// Overwrite cells with a material
    Material(MaterialId),
    /// Inject force with this magnitude
    Force {
        /// Positive pushes outward or along the stroke
        magnitude: f32,
    },
}

/// Brush state machine
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BrushState {
    /// Pointer up
    #[default]
    Idle,
    /// Pointer down with the payload chosen at press time
    Active(BrushPayload),
}

/// Cursor that translates pointer input into edits
#[derive(Debug, Clone)]
pub struct Brush {
    state: BrushState,
    position: Vec2,
    radius: f32,
    direction: Vec2,
    tool: BrushTool,
    config: BrushConfig,
}

impl Brush {
    /// Create an idle brush
    pub fn new(config: BrushConfig) -> Self {
        Self {
            state: BrushState::Idle,
            position: Vec2::zeros(),
            radius: 0.0,
            direction: Vec2::zeros(),
            tool: BrushTool::Material,
            config,
        }
    }

    /// Current state
    pub fn state(&self) -> BrushState {
        self.state
    }

    /// Whether a stroke is in progress
    pub fn is_active(&self) -> bool {
        matches!(self.state, BrushState::Active(_))
    }

    /// Last pointer position, normalised
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Radius in grid cells; zero while idle
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Radius the next stroke starts with
    pub fn configured_radius(&self) -> f32 {
        self.config.radius
    }

    /// Unit direction of the last pointer motion in grid space, or zero
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Selected tool
    pub fn tool(&self) -> BrushTool {
        self.tool
    }

    /// Material painted by the primary button
    pub fn material(&self) -> MaterialId {
        self.config.material
    }

    /// Set the radius for this and future strokes
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidRadius`] for negative or non-finite radii.
    pub fn set_radius(&mut self, radius: f32) -> SimResult<()> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(SimError::InvalidRadius(radius));
        }
        self.config.radius = radius;
        if self.is_active() {
            self.radius = radius;
        }
        Ok(())
    }

    /// Select the material for future strokes
    pub fn set_material(&mut self, material: MaterialId) {
        self.config.material = material;
    }

    /// Select the tool for future strokes
    pub fn set_tool(&mut self, tool: BrushTool) {
        self.tool = tool;
    }

    /// Start a stroke at a clamped normalised position
    pub fn pointer_down(&mut self, position: Vec2, button: PointerButton) -> BrushPayload {
        let payload = match (self.tool, button) {
            (BrushTool::Material, PointerButton::Primary) => {
                BrushPayload::Material(self.config.material)
            }
            (BrushTool::Material, PointerButton::Secondary) => {
                BrushPayload::Material(MaterialId::Empty)
            }
            (BrushTool::Force, PointerButton::Primary) => BrushPayload::Force {
                magnitude: self.config.primary_force,
            },
            (BrushTool::Force, PointerButton::Secondary) => BrushPayload::Force {
                magnitude: self.config.secondary_force,
            },
        };
        self.state = BrushState::Active(payload);
        self.position = position;
        self.radius = self.config.radius;
        self.direction = Vec2::zeros();
        payload
    }

    /// Move the cursor; `extent` is the grid size used to derive direction
    ///
    /// Returns whether an active stroke actually moved, i.e. whether the
    /// stroke has a new edit to queue.
    pub fn pointer_move(&mut self, position: Vec2, extent: (u32, u32)) -> bool {
        if position == self.position {
            return false;
        }
        let scale = Vec2::new(extent.0 as f32, extent.1 as f32);
        let delta = (position - self.position).component_mul(&scale);
        self.position = position;
        if let BrushState::Active(BrushPayload::Force { .. }) = self.state {
            if let Some(unit) = delta.try_normalize(f32::EPSILON) {
                self.direction = unit;
            }
        }
        self.is_active()
    }

    /// End the stroke
    pub fn pointer_up(&mut self) {
        self.state = BrushState::Idle;
        self.radius = 0.0;
        self.direction = Vec2::zeros();
    }

    /// Edit for the current stroke at the current position, if any
    pub fn edit(&self, extent: (u32, u32)) -> Option<BrushEdit> {
        let BrushState::Active(payload) = self.state else {
            return None;
        };
        Some(match payload {
            BrushPayload::Material(material) => BrushEdit::Material {
                cell: footprint_center(self.position, extent),
                radius: self.radius,
                material,
            },
            BrushPayload::Force { magnitude } => {
                let strength = if self.direction == Vec2::zeros() {
                    ForceStrength::Radial(magnitude)
                } else {
                    ForceStrength::Directional(self.direction * magnitude)
                };
                BrushEdit::Force {
                    center: to_grid_units(self.position, extent),
                    strength,
                    radius: self.radius,
                }
            }
        })
    }
}

impl Default for Brush {
    fn default() -> Self {
        Self::new(BrushConfig::default())
    }
}

/// Validate and clamp a normalised coordinate pair into `[0, 1]²`
///
/// # Errors
///
/// Returns [`SimError::OutOfBounds`] for non-finite coordinates.
pub fn clamp_normalised(x: f32, y: f32, extent: (u32, u32)) -> SimResult<Vec2> {
    if !(x.is_finite() && y.is_finite()) {
        return Err(SimError::out_of_bounds(
            x as i64, y as i64, extent.0, extent.1,
        ));
    }
    Ok(Vec2::new(x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)))
}

/// Integer cell under a normalised position, `(⌊x·W⌋, ⌊y·H⌋)` clamped
pub fn footprint_center(position: Vec2, extent: (u32, u32)) -> (u32, u32) {
    let (width, height) = extent;
    let x = ((position.x * width as f32).floor() as u32).min(width - 1);
    let y = ((position.y * height as f32).floor() as u32).min(height - 1);
    (x, y)
}

/// Normalised position in continuous grid units
pub fn to_grid_units(position: Vec2, extent: (u32, u32)) -> Vec2 {
    Vec2::new(position.x * extent.0 as f32, position.y * extent.1 as f32)
}
