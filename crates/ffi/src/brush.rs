use sands_core::{BrushTool, MaterialId, PointerButton, Simulator};

use crate::error::{DefaultSandsError, SandsErrorCode};
use crate::helpers::{instance_from_ptr, track_result, with_sim_mut};
use crate::instance::SandsInstance;

/// Set the brush radius in cells.
///
/// # Safety
/// `ptr` must be null or a live pointer from `sands_new`.
#[no_mangle]
pub unsafe extern "C" fn sands_set_brush_radius(
    ptr: *const SandsInstance,
    radius: f32,
) -> SandsErrorCode {
    track_result(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_sim_mut(instance, |sim| sim.set_brush_radius(radius))??;
        Ok(())
    })
}

/// Select the material painted by the primary button.
///
/// # Safety
/// `ptr` must be null or a live pointer from `sands_new`.
#[no_mangle]
pub unsafe extern "C" fn sands_set_brush_material(
    ptr: *const SandsInstance,
    material: u8,
) -> SandsErrorCode {
    track_result(|| {
        let material = MaterialId::from_u8(material)?;
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_sim_mut(instance, |sim| sim.set_brush_material(material))?;
        Ok(())
    })
}

/// Select the brush tool: 0 = material, 1 = force.
///
/// # Safety
/// `ptr` must be null or a live pointer from `sands_new`.
#[no_mangle]
pub unsafe extern "C" fn sands_set_brush_tool(ptr: *const SandsInstance, tool: u8) -> SandsErrorCode {
    track_result(|| {
        let tool = BrushTool::from_u8(tool).ok_or_else(|| {
            DefaultSandsError::invalid_parameter(format!("unknown brush tool {tool}"))
        })?;
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_sim_mut(instance, |sim| sim.set_brush_tool(tool))?;
        Ok(())
    })
}

/// Press the pointer at a normalised position.
///
/// `button`: 0 = primary (paint / push), 1 = secondary (erase / pull).
///
/// # Safety
/// `ptr` must be null or a live pointer from `sands_new`.
#[no_mangle]
pub unsafe extern "C" fn sands_pointer_down(
    ptr: *const SandsInstance,
    x: f32,
    y: f32,
    button: u8,
) -> SandsErrorCode {
    track_result(|| {
        let button = PointerButton::from_u8(button).ok_or_else(|| {
            DefaultSandsError::invalid_parameter(format!("unknown pointer button {button}"))
        })?;
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_sim_mut(instance, |sim| sim.pointer_down(x, y, button))??;
        Ok(())
    })
}

/// Move the pointer; paints along the path while a stroke is active.
///
/// # Safety
/// `ptr` must be null or a live pointer from `sands_new`.
#[no_mangle]
pub unsafe extern "C" fn sands_pointer_move(ptr: *const SandsInstance, x: f32, y: f32) -> SandsErrorCode {
    track_result(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_sim_mut(instance, |sim| sim.pointer_move(x, y))??;
        Ok(())
    })
}

/// Release the pointer and end the stroke.
///
/// # Safety
/// `ptr` must be null or a live pointer from `sands_new`.
#[no_mangle]
pub unsafe extern "C" fn sands_pointer_up(ptr: *const SandsInstance) -> SandsErrorCode {
    track_result(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_sim_mut(instance, Simulator::pointer_up)?;
        Ok(())
    })
}
