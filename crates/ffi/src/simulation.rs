use sands_core::{MaterialId, Scenario, StepReport};

use crate::error::{DefaultSandsError, SandsErrorCode};
use crate::helpers::{instance_from_ptr, track_result, with_sim_mut};
use crate::instance::SandsInstance;

/// C layout of a step outcome.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SandsStepReport {
    /// Step counter after the call.
    pub step: u64,
    /// Particles moved by the rule engine.
    pub moved_cells: usize,
    /// Queued edits applied at the start of the step.
    pub edits_applied: usize,
    /// False while paused.
    pub advanced: bool,
}

impl From<StepReport> for SandsStepReport {
    fn from(report: StepReport) -> Self {
        Self {
            step: report.step,
            moved_cells: report.moved_cells,
            edits_applied: report.edits_applied,
            advanced: report.advanced,
        }
    }
}

/// Advance the simulation by one step.
///
/// When `playing` is false only the frame index is recorded; queued input
/// stays queued. `out_report` may be null.
///
/// Thread-safe: takes the write lock for the whole step.
///
/// # Safety
/// - `ptr` must be null or a live pointer from `sands_new`.
/// - `out_report` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn sands_step(
    ptr: *const SandsInstance,
    frame_index: u64,
    playing: bool,
    out_report: *mut SandsStepReport,
) -> SandsErrorCode {
    track_result(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let report = with_sim_mut(instance, |sim| sim.step(frame_index, playing))?;
        if !out_report.is_null() {
            // SAFETY: non-null, validity is the caller's contract.
            unsafe { out_report.write(report.into()); }
        }
        Ok(())
    })
}

/// Queue a preset layout.
///
/// `scenario`: 0 = empty, 1 = walled box, 2 = floor, 3 = sand pile.
/// Cells land on the next playing `sands_step`.
///
/// # Safety
/// `ptr` must be null or a live pointer from `sands_new`.
#[no_mangle]
pub unsafe extern "C" fn sands_seed(ptr: *const SandsInstance, scenario: u8) -> SandsErrorCode {
    track_result(|| {
        let scenario = match scenario {
            0 => Scenario::Empty,
            1 => Scenario::Boxed,
            2 => Scenario::Floor,
            3 => Scenario::SandPile,
            other => {
                return Err(DefaultSandsError::invalid_parameter(format!(
                    "unknown scenario {other}"
                )));
            }
        };
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_sim_mut(instance, |sim| sim.seed(&scenario))??;
        Ok(())
    })
}

/// Queue a material disk at a normalised position using the brush radius.
///
/// `x`, `y` are in `[0, 1]` with `y = 0` at the bottom; values outside are
/// clamped.
///
/// # Safety
/// `ptr` must be null or a live pointer from `sands_new`.
#[no_mangle]
pub unsafe extern "C" fn sands_paint(
    ptr: *const SandsInstance,
    x: f32,
    y: f32,
    material: u8,
) -> SandsErrorCode {
    track_result(|| {
        let material = MaterialId::from_u8(material)?;
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_sim_mut(instance, |sim| sim.paint(x, y, material))??;
        Ok(())
    })
}

/// Queue a single-cell write at integer cell coordinates.
///
/// # Safety
/// `ptr` must be null or a live pointer from `sands_new`.
#[no_mangle]
pub unsafe extern "C" fn sands_paint_cell(
    ptr: *const SandsInstance,
    x: u32,
    y: u32,
    material: u8,
) -> SandsErrorCode {
    track_result(|| {
        let material = MaterialId::from_u8(material)?;
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_sim_mut(instance, |sim| sim.paint_cell(x, y, material))??;
        Ok(())
    })
}

/// Queue a radial force injection. Positive `magnitude` pushes outward.
///
/// Validated but ignored in automaton-only mode.
///
/// # Safety
/// `ptr` must be null or a live pointer from `sands_new`.
#[no_mangle]
pub unsafe extern "C" fn sands_apply_force(
    ptr: *const SandsInstance,
    x: f32,
    y: f32,
    magnitude: f32,
    radius: f32,
) -> SandsErrorCode {
    track_result(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_sim_mut(instance, |sim| sim.apply_force(x, y, magnitude, radius))??;
        Ok(())
    })
}
