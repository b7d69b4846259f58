//! Engine configuration
//!
//! Every section has a `Default` tuned for a 60 Hz interactive grid and
//! derives serde so hosts can keep presets in their own settings files.
//! Missing fields fall back to their defaults.

use crate::core_types::MaterialId;
use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};

/// Which subsystems advance on each playing step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SimulationMode {
    /// Cellular automaton only; no force field is allocated
    #[default]
    Automaton,
    /// Force field only; the grid is kept but never advanced
    Field,
    /// Automaton coupled to the force field (water drifts with the field)
    Both,
}

impl SimulationMode {
    /// Whether the rule engine runs in this mode
    #[inline]
    pub const fn runs_automaton(self) -> bool {
        matches!(self, SimulationMode::Automaton | SimulationMode::Both)
    }

    /// Whether a force field exists in this mode
    #[inline]
    pub const fn has_field(self) -> bool {
        matches!(self, SimulationMode::Field | SimulationMode::Both)
    }

    /// Convert from u8 for FFI compatibility
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(SimulationMode::Automaton),
            1 => Some(SimulationMode::Field),
            2 => Some(SimulationMode::Both),
            _ => None,
        }
    }
}

/// What material paint does to Wall cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WallPolicy {
    /// Non-Wall paint skips Wall cells: users sculpt but cannot erase boundaries
    #[default]
    Protected,
    /// Any paint replaces Wall cells
    Overwrite,
}

/// Rule engine tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Minimum `|force.x|` at a water cell before the field decides its
    /// sideways direction (coupled mode only)
    pub water_drift_threshold: f32,

    /// Whether water spreads sideways when it cannot fall
    pub water_spread: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            water_drift_threshold: 0.5,
            water_spread: true,
        }
    }
}

/// Force field tuning
///
/// Each stage of the field step is a convex combination scaled by `damping`,
/// so any value inside the validated ranges is unconditionally stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Per-step multiplier in (0, 1]; 1.0 disables decay
    pub damping: f32,

    /// Blend toward the neighbour mean in [0, 1]; 0.0 disables diffusion
    pub diffusion: f32,

    /// Semi-Lagrangian self-advection distance in cells per unit velocity;
    /// 0.0 disables advection
    pub advection: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            damping: 0.96,
            diffusion: 0.2,
            advection: 0.0,
        }
    }
}

impl FieldConfig {
    /// Check the field tunables against their stable ranges
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(invalid("field.damping", self.damping, "must be in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.diffusion) {
            return Err(invalid("field.diffusion", self.diffusion, "must be in [0, 1]"));
        }
        if !self.advection.is_finite() || self.advection < 0.0 {
            return Err(invalid(
                "field.advection",
                self.advection,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Brush defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    /// Radius in grid cells applied on pointer-down
    pub radius: f32,

    /// Material painted by the primary button
    pub material: MaterialId,

    /// Force magnitude for the primary button (positive pushes outward)
    pub primary_force: f32,

    /// Force magnitude for the secondary button
    pub secondary_force: f32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            radius: 3.0,
            material: MaterialId::Sand,
            primary_force: 1000.0,
            secondary_force: -10000.0,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Subsystems to advance
    pub mode: SimulationMode,
    /// Rule engine tuning
    pub rules: RuleConfig,
    /// Force field tuning
    pub field: FieldConfig,
    /// Brush defaults
    pub brush: BrushConfig,
    /// Paint behaviour over Wall cells
    pub wall_policy: WallPolicy,
}

impl EngineConfig {
    /// Default configuration for the given mode
    #[must_use]
    pub fn for_mode(mode: SimulationMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Check every tunable against its supported range
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> SimResult<()> {
        self.field.validate()?;
        if !self.rules.water_drift_threshold.is_finite() || self.rules.water_drift_threshold < 0.0
        {
            return Err(invalid(
                "rules.water_drift_threshold",
                self.rules.water_drift_threshold,
                "must be finite and non-negative",
            ));
        }
        let brush = &self.brush;
        if !brush.radius.is_finite() || brush.radius < 0.0 {
            return Err(invalid("brush.radius", brush.radius, "must be finite and non-negative"));
        }
        if !brush.primary_force.is_finite() {
            return Err(invalid("brush.primary_force", brush.primary_force, "must be finite"));
        }
        if !brush.secondary_force.is_finite() {
            return Err(invalid(
                "brush.secondary_force",
                brush.secondary_force,
                "must be finite",
            ));
        }
        Ok(())
    }
}

fn invalid(name: &str, value: f32, constraint: &str) -> SimError {
    SimError::InvalidConfig(format!("{name} {constraint}, got {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(EngineConfig::for_mode(SimulationMode::Both).validate().is_ok());
    }

    #[test]
    fn test_damping_range() {
        let mut config = EngineConfig::default();
        config.field.damping = 0.0;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

        config.field.damping = 1.0;
        assert!(config.validate().is_ok());

        config.field.damping = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_diffusion_and_advection_range() {
        let mut config = EngineConfig::default();
        config.field.diffusion = 1.5;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidConfig("field.diffusion must be in [0, 1], got 1.5".into())
        );

        config.field.diffusion = 0.0;
        config.field.advection = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "mode": "Both", "field": { "damping": 0.5 } }"#).unwrap();
        assert_eq!(config.mode, SimulationMode::Both);
        assert_eq!(config.field.damping, 0.5);
        assert_eq!(config.field.diffusion, FieldConfig::default().diffusion);
        assert_eq!(config.wall_policy, WallPolicy::Protected);
        assert_eq!(config.brush.material, MaterialId::Sand);
    }

    #[test]
    fn test_mode_flags() {
        assert!(SimulationMode::Automaton.runs_automaton());
        assert!(!SimulationMode::Automaton.has_field());
        assert!(!SimulationMode::Field.runs_automaton());
        assert!(SimulationMode::Both.runs_automaton() && SimulationMode::Both.has_field());
        assert_eq!(SimulationMode::from_u8(2), Some(SimulationMode::Both));
        assert_eq!(SimulationMode::from_u8(3), None);
    }
}
