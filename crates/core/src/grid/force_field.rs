//! Double-buffered 2D force field
//!
//! One `Vec2` per grid cell, advanced by an optional self-advection pass,
//! then decay and diffusion, then any injections queued since the last step.
//! Injections land in the back buffer, so they become visible together with
//! the rest of the step at the next swap.

use super::buffer::DoubleBuffer;
use crate::config::FieldConfig;
use crate::core_types::Vec2;
use crate::error::{SimError, SimResult};
use crate::solver::advection::advect_cpu;
use crate::solver::diffusion::{step_decay_diffusion_cpu, DiffusionParams};
use tracing::{info, warn};

/// How an injection pushes the field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForceStrength {
    /// Away from the centre with this magnitude; negative pulls inward
    Radial(f32),
    /// Along a fixed vector
    Directional(Vec2),
}

impl ForceStrength {
    fn is_finite(&self) -> bool {
        match self {
            ForceStrength::Radial(m) => m.is_finite(),
            ForceStrength::Directional(v) => v.x.is_finite() && v.y.is_finite(),
        }
    }

    fn components(&self) -> (f32, f32) {
        match self {
            ForceStrength::Radial(m) => (*m, 0.0),
            ForceStrength::Directional(v) => (v.x, v.y),
        }
    }
}

/// A queued force contribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Injection {
    /// Centre in continuous grid units (cell `(x, y)` spans `[x, x+1)`)
    pub center: Vec2,
    /// Push shape and magnitude
    pub strength: ForceStrength,
    /// Cutoff distance in cells
    pub radius: f32,
}

/// Validate an injection before it is queued
///
/// # Errors
///
/// Returns [`SimError::InvalidForce`] for a non-finite centre or strength
/// and [`SimError::InvalidRadius`] for a negative or non-finite radius.
pub fn check_injection(center: Vec2, strength: ForceStrength, radius: f32) -> SimResult<()> {
    if !strength.is_finite() {
        let (x, y) = strength.components();
        return Err(SimError::InvalidForce { x, y });
    }
    if !(center.x.is_finite() && center.y.is_finite()) {
        return Err(SimError::InvalidForce {
            x: center.x,
            y: center.y,
        });
    }
    if !radius.is_finite() || radius < 0.0 {
        return Err(SimError::InvalidRadius(radius));
    }
    Ok(())
}

/// Falloff weight at distance `d` from an injection centre
///
/// Monotonically decreasing, 1 at the centre and zero beyond `radius`.
#[inline]
pub fn falloff(d: f32, radius: f32) -> f32 {
    if d <= radius {
        1.0 / (1.0 + d * d)
    } else {
        0.0
    }
}

/// W×H vector field with front/back buffers
#[derive(Debug, Clone)]
pub struct ForceField {
    width: u32,
    height: u32,
    vectors: DoubleBuffer<Vec2>,
    scratch: Vec<Vec2>,
    pending: Vec<Injection>,
    config: FieldConfig,
}

impl ForceField {
    /// Create an all-zero field
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidDimensions`] for a zero extent and
    /// [`SimError::InvalidConfig`] for out-of-range tunables.
    pub fn new(width: u32, height: u32, config: FieldConfig) -> SimResult<Self> {
        if width == 0 || height == 0 {
            return Err(SimError::InvalidDimensions { width, height });
        }
        config.validate()?;
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(SimError::InvalidDimensions { width, height })?;

        info!(
            "Force field {}x{} (damping {}, diffusion {}, advection {})",
            width, height, config.damping, config.diffusion, config.advection
        );

        Ok(Self {
            width,
            height,
            vectors: DoubleBuffer::new(len, Vec2::zeros()),
            scratch: vec![Vec2::zeros(); len],
            pending: Vec::new(),
            config,
        })
    }

    /// `(width, height)` in cells
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Current tunables
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Replace the tunables
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] and keeps the old values if the new
    /// ones are out of range.
    pub fn set_config(&mut self, config: FieldConfig) -> SimResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Current vector at `(x, y)`
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] outside the field.
    pub fn get(&self, x: u32, y: u32) -> SimResult<Vec2> {
        let idx = self.index_of(x, y)?;
        Ok(self.vectors.front()[idx])
    }

    /// Write a vector into the back buffer only
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] outside the field.
    pub fn set_next(&mut self, x: u32, y: u32, v: Vec2) -> SimResult<()> {
        let idx = self.index_of(x, y)?;
        self.vectors.back_mut()[idx] = v;
        Ok(())
    }

    /// Exchange current and next buffers in O(1)
    #[inline]
    pub fn swap(&mut self) {
        self.vectors.swap();
    }

    /// Current vectors, row-major from the bottom row
    #[inline]
    pub fn vectors(&self) -> &[Vec2] {
        self.vectors.front()
    }

    /// Largest current vector length
    pub fn max_magnitude(&self) -> f32 {
        self.vectors
            .front()
            .iter()
            .fold(0.0, |max, v| max.max(v.norm()))
    }

    /// Injections queued for the next advance
    pub fn pending_injections(&self) -> &[Injection] {
        &self.pending
    }

    /// Queue a force injection for the next advance
    ///
    /// Injections queued before one advance add up. A radial push has no
    /// direction at its own centre, so a cell whose centre lands exactly on
    /// `center` stays zero while its in-radius neighbours are pushed.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidForce`] for a non-finite centre or strength
    /// and [`SimError::InvalidRadius`] for a negative or non-finite radius.
    /// The injection is dropped; the field is unchanged.
    pub fn apply_force(
        &mut self,
        center: Vec2,
        strength: ForceStrength,
        radius: f32,
    ) -> SimResult<()> {
        if let Err(err) = check_injection(center, strength, radius) {
            warn!("Rejected force injection: {}", err);
            return Err(err);
        }
        self.pending.push(Injection {
            center,
            strength,
            radius,
        });
        Ok(())
    }

    /// Advance the back buffer one step from the front buffer
    ///
    /// Returns the number of injections consumed. The caller swaps.
    pub fn advance(&mut self) -> usize {
        let width = self.width as usize;
        let height = self.height as usize;
        let params = DiffusionParams {
            damping: self.config.damping,
            diffusion: self.config.diffusion,
        };

        if self.config.advection > 0.0 {
            advect_cpu(
                self.vectors.front(),
                &mut self.scratch,
                width,
                height,
                self.config.advection,
            );
            step_decay_diffusion_cpu(
                &self.scratch,
                self.vectors.back_mut(),
                width,
                height,
                params,
            );
        } else {
            let (front, back) = self.vectors.split_mut();
            step_decay_diffusion_cpu(front, back, width, height, params);
        }

        let applied = self.pending.len();
        let back = self.vectors.back_mut();
        for injection in self.pending.drain(..) {
            deposit(back, width, height, &injection);
        }
        applied
    }

    fn index_of(&self, x: u32, y: u32) -> SimResult<usize> {
        if x < self.width && y < self.height {
            Ok(y as usize * self.width as usize + x as usize)
        } else {
            Err(SimError::out_of_bounds(
                i64::from(x),
                i64::from(y),
                self.width,
                self.height,
            ))
        }
    }
}

/// Add one injection into `field`, visiting only the bounding box of its disk
fn deposit(field: &mut [Vec2], width: usize, height: usize, injection: &Injection) {
    let Injection {
        center,
        strength,
        radius,
    } = *injection;

    let x_lo = (center.x - radius - 0.5).floor().max(0.0) as usize;
    let y_lo = (center.y - radius - 0.5).floor().max(0.0) as usize;
    let x_hi = ((center.x + radius - 0.5).ceil().max(0.0) as usize).min(width - 1);
    let y_hi = ((center.y + radius - 0.5).ceil().max(0.0) as usize).min(height - 1);

    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            let offset = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
            let d = offset.norm();
            let weight = falloff(d, radius);
            if weight == 0.0 {
                continue;
            }
            let push = match strength {
                ForceStrength::Radial(magnitude) => {
                    if d > 0.0 {
                        offset * (magnitude * weight / d)
                    } else {
                        continue;
                    }
                }
                ForceStrength::Directional(v) => v * weight,
            };
            field[y * width + x] += push;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn still_field(width: u32, height: u32) -> ForceField {
        let config = FieldConfig {
            damping: 1.0,
            diffusion: 0.0,
            advection: 0.0,
        };
        ForceField::new(width, height, config).unwrap()
    }

    #[test]
    fn test_falloff_is_monotonic_with_cutoff() {
        assert_eq!(falloff(0.0, 2.0), 1.0);
        assert!(falloff(1.0, 2.0) > falloff(1.5, 2.0));
        assert!(falloff(2.0, 2.0) > 0.0);
        assert_eq!(falloff(2.01, 2.0), 0.0);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            ForceField::new(0, 4, FieldConfig::default()),
            Err(SimError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_injection_is_invisible_until_swap() {
        let mut field = still_field(4, 4);
        field
            .apply_force(Vec2::new(2.0, 2.0), ForceStrength::Radial(10.0), 2.0)
            .unwrap();
        assert_eq!(field.pending_injections().len(), 1);

        assert_eq!(field.advance(), 1);
        assert!(field.pending_injections().is_empty());
        assert_eq!(field.max_magnitude(), 0.0);

        field.swap();
        assert!(field.max_magnitude() > 0.0);
    }

    #[test]
    fn test_radial_injection_points_outward_inside_radius() {
        let mut field = still_field(8, 8);
        let center = Vec2::new(4.0, 4.0);
        field
            .apply_force(center, ForceStrength::Radial(5.0), 2.0)
            .unwrap();
        field.advance();
        field.swap();

        for y in 0..8 {
            for x in 0..8 {
                let offset = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
                let v = field.get(x, y).unwrap();
                if offset.norm() > 2.0 {
                    assert_eq!(v, Vec2::zeros(), "({x}, {y}) outside radius");
                } else {
                    assert!(v.dot(&offset) > 0.0, "({x}, {y}) should point outward");
                }
            }
        }
    }

    #[test]
    fn test_radial_injection_skips_coincident_cell() {
        let mut field = still_field(3, 3);
        field
            .apply_force(Vec2::new(1.5, 1.5), ForceStrength::Radial(8.0), 1.0)
            .unwrap();
        field.advance();
        field.swap();

        assert_eq!(field.get(1, 1).unwrap(), Vec2::zeros());
        assert_relative_eq!(field.get(2, 1).unwrap().x, 4.0);
        assert_relative_eq!(field.get(1, 0).unwrap().y, -4.0);
        // Diagonals sit at sqrt(2), outside the radius
        assert_eq!(field.get(0, 0).unwrap(), Vec2::zeros());
    }

    #[test]
    fn test_negative_radial_pulls_inward() {
        let mut field = still_field(4, 4);
        field
            .apply_force(Vec2::new(2.0, 2.0), ForceStrength::Radial(-3.0), 1.0)
            .unwrap();
        field.advance();
        field.swap();
        // Cell (2, 2) has its centre up and right of the injection point
        let v = field.get(2, 2).unwrap();
        assert!(v.x < 0.0 && v.y < 0.0);
    }

    #[test]
    fn test_directional_injection_weights_by_falloff() {
        let mut field = still_field(3, 1);
        let push = Vec2::new(0.0, 2.0);
        field
            .apply_force(Vec2::new(1.5, 0.5), ForceStrength::Directional(push), 1.0)
            .unwrap();
        field.advance();
        field.swap();

        assert_relative_eq!(field.get(1, 0).unwrap().y, 2.0);
        assert_relative_eq!(field.get(0, 0).unwrap().y, 1.0);
        assert_relative_eq!(field.get(2, 0).unwrap().y, 1.0);
    }

    #[test]
    fn test_injections_accumulate() {
        let mut field = still_field(3, 3);
        let push = ForceStrength::Directional(Vec2::new(1.0, 0.0));
        field.apply_force(Vec2::new(1.5, 1.5), push, 0.0).unwrap();
        field.apply_force(Vec2::new(1.5, 1.5), push, 0.0).unwrap();
        assert_eq!(field.advance(), 2);
        field.swap();
        assert_relative_eq!(field.get(1, 1).unwrap().x, 2.0);
        assert_eq!(field.get(0, 1).unwrap(), Vec2::zeros());
    }

    #[test]
    fn test_invalid_force_rejected() {
        let mut field = still_field(4, 4);
        let center = Vec2::new(1.0, 1.0);

        let err = field
            .apply_force(center, ForceStrength::Radial(f32::NAN), 1.0)
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidForce { .. }));

        let err = field
            .apply_force(
                center,
                ForceStrength::Directional(Vec2::new(f32::INFINITY, 0.0)),
                1.0,
            )
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidForce { .. }));

        assert_eq!(
            field
                .apply_force(center, ForceStrength::Radial(1.0), -1.0)
                .unwrap_err(),
            SimError::InvalidRadius(-1.0)
        );
        assert!(field.pending_injections().is_empty());
    }

    #[test]
    fn test_decay_scales_without_diffusion() {
        let config = FieldConfig {
            damping: 0.5,
            diffusion: 0.0,
            advection: 0.0,
        };
        let mut field = ForceField::new(2, 2, config).unwrap();
        field.set_next(0, 1, Vec2::new(3.0, 4.0)).unwrap();
        field.swap();

        field.advance();
        field.swap();
        assert_relative_eq!(field.get(0, 1).unwrap().norm(), 2.5);
    }

    #[test]
    fn test_set_config_validates() {
        let mut field = still_field(2, 2);
        let bad = FieldConfig {
            damping: 2.0,
            ..FieldConfig::default()
        };
        assert!(field.set_config(bad).is_err());
        assert_eq!(field.config().damping, 1.0);
    }
}
