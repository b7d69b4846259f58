//! Simulation orchestration
//!
//! `Simulator` owns the grid, the optional force field, the rule engine and
//! the brush. Input methods only queue edits; `step` applies them, advances
//! whichever subsystems the mode enables and swaps their buffers together,
//! so readers always see a fully completed step.

pub mod scenario;

pub use scenario::Scenario;

use crate::config::{EngineConfig, SimulationMode};
use crate::core_types::{Cell, MaterialId, Vec2};
use crate::error::{SimError, SimResult};
use crate::grid::{check_injection, ForceField, ForceStrength, Grid};
use crate::interaction::brush::{clamp_normalised, footprint_center, to_grid_units};
use crate::interaction::{Brush, BrushEdit, BrushTool, EditQueue, EditSource, PointerButton};
use crate::solver::{FrameTimer, ProfilerScope, RuleEngine};
use tracing::{debug, error, info, trace, warn};

/// Outcome of one call to [`Simulator::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    /// Step counter after the call
    pub step: u64,
    /// Particles moved by the rule engine
    pub moved_cells: usize,
    /// Queued edits applied at the start of the step
    pub edits_applied: usize,
    /// Whether the simulation advanced (false while paused)
    pub advanced: bool,
}

/// Falling-sand simulation with an optional coupled force field
pub struct Simulator {
    config: EngineConfig,
    grid: Grid,
    field: Option<ForceField>,
    rules: RuleEngine,
    brush: Brush,
    edits: EditQueue,
    step_count: u64,
    frame_index: u64,
    timer: FrameTimer,
}

impl Simulator {
    /// Create a simulator with default tuning for `mode`
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidDimensions`] if either extent is zero.
    pub fn new(width: u32, height: u32, mode: SimulationMode) -> SimResult<Self> {
        Self::with_config(width, height, EngineConfig::for_mode(mode))
    }

    /// Create a simulator from a full configuration
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidDimensions`] if either extent is zero and
    /// [`SimError::InvalidConfig`] if a tunable is out of range.
    pub fn with_config(width: u32, height: u32, config: EngineConfig) -> SimResult<Self> {
        config.validate()?;
        let grid = Grid::new(width, height)?;
        let field = if config.mode.has_field() {
            Some(ForceField::new(width, height, config.field.clone())?)
        } else {
            None
        };

        info!(
            "Simulator created: {}x{} grid, mode={:?}, wall policy={:?}",
            width, height, config.mode, config.wall_policy
        );

        Ok(Self {
            rules: RuleEngine::new(width, height, config.rules.clone()),
            brush: Brush::new(config.brush.clone()),
            config,
            grid,
            field,
            edits: EditQueue::new(),
            step_count: 0,
            frame_index: 0,
            timer: FrameTimer::new(),
        })
    }

    /// Advance one step if `playing`
    ///
    /// While paused nothing changes and queued edits stay queued; only the
    /// frame index is recorded. A pointer stroke holds at most one queued
    /// edit, so dragging while paused does not grow the queue. While playing the step flushes queued edits,
    /// advances the rule engine and/or the force field, swaps their buffers
    /// and increments the step counter.
    pub fn step(&mut self, frame_index: u64, playing: bool) -> StepReport {
        self.frame_index = frame_index;
        if !playing {
            return StepReport {
                step: self.step_count,
                ..StepReport::default()
            };
        }

        let scope = ProfilerScope::new("step");

        // A held pointer keeps painting even without motion
        if !self.edits.has_brush_edit() {
            if let Some(edit) = self.brush.edit(self.grid.dimensions()) {
                self.edits.submit(edit, EditSource::Brush);
            }
        }
        let edits_applied = self.flush_edits();

        let moved_cells = if self.config.mode.runs_automaton() {
            let force = self.field.as_ref().map(ForceField::vectors);
            let moved = self.rules.advance(&mut self.grid, force, self.step_count);
            self.grid.swap();
            moved
        } else {
            0
        };

        if let Some(field) = self.field.as_mut() {
            field.advance();
            field.swap();
        }

        self.step_count += 1;
        self.timer.record(scope.elapsed_ms());

        debug!(
            "Step {} (frame {}): moved={}, edits={} ({} total), {:.3} ms",
            self.step_count,
            frame_index,
            moved_cells,
            edits_applied,
            self.edits.applied_total(),
            self.timer.last_frame_time_ms()
        );

        StepReport {
            step: self.step_count,
            moved_cells,
            edits_applied,
            advanced: true,
        }
    }

    /// Apply every queued edit to the current buffers
    fn flush_edits(&mut self) -> usize {
        let pending = self.edits.take_pending();
        let mut applied = 0;
        for edit in &pending {
            match *edit {
                BrushEdit::Material {
                    cell: (x, y),
                    radius,
                    material,
                } => {
                    let changed =
                        self.grid
                            .paint_disk(x, y, radius, material, self.config.wall_policy);
                    trace!(
                        "Painted {} at ({}, {}) r={}: {} cells changed",
                        material,
                        x,
                        y,
                        radius,
                        changed
                    );
                    applied += 1;
                }
                BrushEdit::Force {
                    center,
                    strength,
                    radius,
                } => match self.field.as_mut() {
                    Some(field) => {
                        if field.apply_force(center, strength, radius).is_ok() {
                            trace!(
                                "Force {:?} at ({:.2}, {:.2}) r={}",
                                strength,
                                center.x,
                                center.y,
                                radius
                            );
                            applied += 1;
                        }
                    }
                    None => trace!("Force edit dropped: no force field in this mode"),
                },
            }
        }
        self.edits.recycle(pending, applied);
        applied
    }

    fn reject<T>(err: SimError) -> SimResult<T> {
        if err.is_input_rejection() {
            warn!("Rejected input: {}", err);
        } else {
            error!("Rejected request: {}", err);
        }
        Err(err)
    }

    fn position(&self, x_norm: f32, y_norm: f32) -> SimResult<Vec2> {
        clamp_normalised(x_norm, y_norm, self.grid.dimensions()).or_else(Self::reject)
    }

    fn queue_force(&mut self, center: Vec2, strength: ForceStrength, radius: f32) -> SimResult<()> {
        if let Err(err) = check_injection(center, strength, radius) {
            return Self::reject(err);
        }
        if self.field.is_none() {
            debug!("Ignoring force input in {:?} mode", self.config.mode);
            return Ok(());
        }
        self.edits.submit(
            BrushEdit::Force {
                center,
                strength,
                radius,
            },
            EditSource::Direct,
        );
        Ok(())
    }

    /// Queue a disk of `material` at a normalised position, using the
    /// brush radius
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] for non-finite coordinates.
    pub fn paint(&mut self, x_norm: f32, y_norm: f32, material: MaterialId) -> SimResult<()> {
        let pos = self.position(x_norm, y_norm)?;
        let cell = footprint_center(pos, self.grid.dimensions());
        self.edits.submit(
            BrushEdit::Material {
                cell,
                radius: self.brush.configured_radius(),
                material,
            },
            EditSource::Direct,
        );
        Ok(())
    }

    /// Queue a single-cell write
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] outside the grid.
    pub fn paint_cell(&mut self, x: u32, y: u32, material: MaterialId) -> SimResult<()> {
        if let Err(err) = self.grid.index_of(x, y) {
            return Self::reject(err);
        }
        self.edits.submit(
            BrushEdit::Material {
                cell: (x, y),
                radius: 0.0,
                material,
            },
            EditSource::Direct,
        );
        Ok(())
    }

    /// Queue a radial force injection at a normalised position
    ///
    /// Positive magnitudes push outward. A cell whose centre coincides with
    /// the injection point has no outward direction and receives nothing.
    /// Ignored when the mode has no field.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] for non-finite coordinates,
    /// [`SimError::InvalidForce`] for a non-finite magnitude and
    /// [`SimError::InvalidRadius`] for a bad radius.
    pub fn apply_force(
        &mut self,
        x_norm: f32,
        y_norm: f32,
        magnitude: f32,
        radius: f32,
    ) -> SimResult<()> {
        let pos = self.position(x_norm, y_norm)?;
        let center = to_grid_units(pos, self.grid.dimensions());
        self.queue_force(center, ForceStrength::Radial(magnitude), radius)
    }

    /// Queue a directional force injection at a normalised position
    ///
    /// # Errors
    ///
    /// Same as [`Simulator::apply_force`].
    pub fn apply_directional_force(
        &mut self,
        x_norm: f32,
        y_norm: f32,
        direction: Vec2,
        radius: f32,
    ) -> SimResult<()> {
        let pos = self.position(x_norm, y_norm)?;
        let center = to_grid_units(pos, self.grid.dimensions());
        self.queue_force(center, ForceStrength::Directional(direction), radius)
    }

    /// Set the brush radius in cells
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidRadius`] for negative or non-finite radii.
    pub fn set_brush_radius(&mut self, radius: f32) -> SimResult<()> {
        self.brush.set_radius(radius).or_else(Self::reject)
    }

    /// Select the material painted by the primary button
    pub fn set_brush_material(&mut self, material: MaterialId) {
        self.brush.set_material(material);
    }

    /// Select the brush tool
    pub fn set_brush_tool(&mut self, tool: BrushTool) {
        self.brush.set_tool(tool);
    }

    /// Press the pointer and queue the first brush edit
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] for non-finite coordinates.
    pub fn pointer_down(&mut self, x_norm: f32, y_norm: f32, button: PointerButton) -> SimResult<()> {
        let pos = self.position(x_norm, y_norm)?;
        let payload = self.brush.pointer_down(pos, button);
        trace!("Pointer down at ({:.3}, {:.3}): {:?}", pos.x, pos.y, payload);
        self.queue_brush_edit();
        Ok(())
    }

    /// Move the pointer; queues a brush edit while a stroke is active
    ///
    /// The edit replaces any brush edit already queued for the next step,
    /// and a move to the current position queues nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] for non-finite coordinates.
    pub fn pointer_move(&mut self, x_norm: f32, y_norm: f32) -> SimResult<()> {
        let pos = self.position(x_norm, y_norm)?;
        if self.brush.pointer_move(pos, self.grid.dimensions()) {
            self.queue_brush_edit();
        }
        Ok(())
    }

    /// Release the pointer
    pub fn pointer_up(&mut self) {
        self.brush.pointer_up();
    }

    fn queue_brush_edit(&mut self) {
        match self.brush.edit(self.grid.dimensions()) {
            Some(BrushEdit::Force { .. }) if self.field.is_none() => {}
            Some(edit) => self.edits.submit(edit, EditSource::Brush),
            None => {}
        }
    }

    /// Queue the cells of a starting layout
    ///
    /// Returns the number of edits queued; they land on the next playing step.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] for invalid scenario parameters.
    pub fn seed(&mut self, scenario: &Scenario) -> SimResult<usize> {
        let edits = scenario.edits(self.grid.dimensions()).or_else(Self::reject)?;
        let count = edits.len();
        for edit in edits {
            self.edits.submit(edit, EditSource::Direct);
        }
        info!("Seeded {:?}: {} cells queued", scenario, count);
        Ok(count)
    }

    /// Current cell at `(x, y)`
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] outside the grid.
    pub fn cell_at(&self, x: u32, y: u32) -> SimResult<Cell> {
        self.grid.get(x, y)
    }

    /// Current force at `(x, y)`; zero when the mode has no field
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] outside the grid.
    pub fn force_at(&self, x: u32, y: u32) -> SimResult<Vec2> {
        match &self.field {
            Some(field) => field.get(x, y),
            None => self.grid.index_of(x, y).map(|_| Vec2::zeros()),
        }
    }

    /// `(width, height)` in cells
    pub fn dimensions(&self) -> (u32, u32) {
        self.grid.dimensions()
    }

    /// Steps advanced while playing
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Frame index passed to the last `step` call
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Subsystems advanced each step
    pub fn mode(&self) -> SimulationMode {
        self.config.mode
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current grid
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Current force field, if the mode has one
    pub fn force_field(&self) -> Option<&ForceField> {
        self.field.as_ref()
    }

    /// Brush state
    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    /// Edits waiting for the next playing step
    pub fn pending_edits(&self) -> usize {
        self.edits.len()
    }

    /// Step timing
    pub fn frame_timer(&self) -> &FrameTimer {
        &self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            Simulator::new(0, 10, SimulationMode::Automaton),
            Err(SimError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.field.damping = 0.0;
        assert!(matches!(
            Simulator::with_config(4, 4, config),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_field_presence_follows_mode() {
        let sim = Simulator::new(4, 4, SimulationMode::Automaton).unwrap();
        assert!(sim.force_field().is_none());
        assert_eq!(sim.force_at(1, 1).unwrap(), Vec2::zeros());
        assert!(sim.force_at(4, 0).is_err());

        let sim = Simulator::new(4, 4, SimulationMode::Both).unwrap();
        assert!(sim.force_field().is_some());
    }

    #[test]
    fn test_edits_wait_for_playing_step() {
        let mut sim = Simulator::new(4, 4, SimulationMode::Automaton).unwrap();
        sim.paint_cell(1, 0, MaterialId::Wall).unwrap();
        assert_eq!(sim.pending_edits(), 1);

        let report = sim.step(0, false);
        assert!(!report.advanced);
        assert_eq!(sim.cell_at(1, 0).unwrap(), Cell::EMPTY);
        assert_eq!(sim.pending_edits(), 1);

        let report = sim.step(1, true);
        assert_eq!(report.edits_applied, 1);
        assert_eq!(report.step, 1);
        assert_eq!(sim.cell_at(1, 0).unwrap(), Cell::WALL);
        assert_eq!(sim.pending_edits(), 0);
    }

    #[test]
    fn test_step_counter_independent_of_frame_index() {
        let mut sim = Simulator::new(2, 2, SimulationMode::Automaton).unwrap();
        sim.step(100, true);
        sim.step(7, false);
        sim.step(3, true);
        assert_eq!(sim.step_count(), 2);
        assert_eq!(sim.frame_index(), 3);
    }

    #[test]
    fn test_rejected_inputs_leave_queue_untouched() {
        let mut sim = Simulator::new(4, 4, SimulationMode::Field).unwrap();
        assert!(matches!(
            sim.paint(f32::NAN, 0.5, MaterialId::Sand),
            Err(SimError::OutOfBounds { .. })
        ));
        assert!(matches!(
            sim.apply_force(0.5, 0.5, f32::INFINITY, 1.0),
            Err(SimError::InvalidForce { .. })
        ));
        assert_eq!(
            sim.apply_force(0.5, 0.5, 1.0, -2.0),
            Err(SimError::InvalidRadius(-2.0))
        );
        assert!(sim.paint_cell(4, 0, MaterialId::Sand).is_err());
        assert!(sim.set_brush_radius(f32::NAN).is_err());
        assert_eq!(sim.pending_edits(), 0);
    }

    #[test]
    fn test_force_input_ignored_without_field() {
        let mut sim = Simulator::new(4, 4, SimulationMode::Automaton).unwrap();
        sim.apply_force(0.5, 0.5, 10.0, 2.0).unwrap();
        assert_eq!(sim.pending_edits(), 0);
    }

    #[test]
    fn test_field_mode_keeps_painted_cells() {
        let mut sim = Simulator::new(4, 4, SimulationMode::Field).unwrap();
        sim.paint_cell(2, 3, MaterialId::Sand).unwrap();
        sim.step(0, true);
        sim.step(1, true);
        // Grid is not advanced in field-only mode
        assert_eq!(sim.cell_at(2, 3).unwrap().material, MaterialId::Sand);
    }

    #[test]
    fn test_held_brush_keeps_painting() {
        let mut sim = Simulator::new(6, 6, SimulationMode::Automaton).unwrap();
        sim.set_brush_radius(0.0).unwrap();
        sim.pointer_down(0.5, 0.99, PointerButton::Primary).unwrap();
        assert_eq!(sim.pending_edits(), 1);

        let report = sim.step(0, true);
        assert_eq!(report.edits_applied, 1);

        // No motion: the next step re-applies once
        let report = sim.step(1, true);
        assert_eq!(report.edits_applied, 1);
        assert_eq!(sim.grid().count(MaterialId::Sand), 2);

        sim.pointer_up();
        let report = sim.step(2, true);
        assert_eq!(report.edits_applied, 0);
    }

    #[test]
    fn test_seed_queues_scenario() {
        let mut sim = Simulator::new(5, 4, SimulationMode::Automaton).unwrap();
        assert_eq!(sim.seed(&Scenario::Boxed).unwrap(), 14);
        sim.step(0, true);
        assert_eq!(sim.grid().count(MaterialId::Wall), 14);
    }
}
