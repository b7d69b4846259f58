use sands_core::render::{write_cells_rgba, write_force_rgba};
use sands_core::{MaterialId, SimError, Simulator};
use std::ffi::CString;
use std::os::raw::c_char;
use std::sync::LazyLock;

use crate::error::{DefaultSandsError, SandsErrorCode};
use crate::helpers::{instance_from_ptr, track_result, with_sim, write_out};
use crate::instance::SandsInstance;

/// Palette entry for building material pickers.
/// Keep this layout stable for C/C++/C# consumers.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SandsMaterialInfo {
    /// Material id, also its palette index.
    pub id: u8,
    /// Null-terminated display name. Static; do not free.
    pub name: *const c_char,
    /// Display color as normalised RGBA.
    pub color: [f32; 4],
}

static MATERIAL_NAMES: LazyLock<Vec<CString>> = LazyLock::new(|| {
    MaterialId::palette()
        .iter()
        .map(|info| CString::new(info.name).unwrap_or_default())
        .collect()
});

/// Material id of the current cell at `(x, y)`, `y = 0` at the bottom.
///
/// Thread-safe: read lock only.
///
/// # Safety
/// - `ptr` must be null or a live pointer from `sands_new`.
/// - `out_material` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn sands_cell_at(
    ptr: *const SandsInstance,
    x: u32,
    y: u32,
    out_material: *mut u8,
) -> SandsErrorCode {
    track_result(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let cell = with_sim(instance, |sim| sim.cell_at(x, y))??;
        unsafe { write_out(out_material, "out_material", cell.material.as_u8()) }
    })
}

/// Force vector at `(x, y)`. Zero in automaton-only mode.
///
/// # Safety
/// - `ptr` must be null or a live pointer from `sands_new`.
/// - `out_x`, `out_y` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn sands_force_at(
    ptr: *const SandsInstance,
    x: u32,
    y: u32,
    out_x: *mut f32,
    out_y: *mut f32,
) -> SandsErrorCode {
    track_result(|| {
        if out_y.is_null() {
            return Err(DefaultSandsError::null_pointer("out_y"));
        }
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let force = with_sim(instance, |sim| sim.force_at(x, y))??;
        unsafe {
            write_out(out_x, "out_x", force.x)?;
            write_out(out_y, "out_y", force.y)
        }
    })
}

/// Grid extent in cells.
///
/// # Safety
/// - `ptr` must be null or a live pointer from `sands_new`.
/// - `out_width`, `out_height` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn sands_dimensions(
    ptr: *const SandsInstance,
    out_width: *mut u32,
    out_height: *mut u32,
) -> SandsErrorCode {
    track_result(|| {
        if out_height.is_null() {
            return Err(DefaultSandsError::null_pointer("out_height"));
        }
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let (width, height) = with_sim(instance, Simulator::dimensions)?;
        unsafe {
            write_out(out_width, "out_width", width)?;
            write_out(out_height, "out_height", height)
        }
    })
}

/// Number of playing steps taken so far.
///
/// # Safety
/// - `ptr` must be null or a live pointer from `sands_new`.
/// - `out_steps` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn sands_step_count(
    ptr: *const SandsInstance,
    out_steps: *mut u64,
) -> SandsErrorCode {
    track_result(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let steps = with_sim(instance, Simulator::step_count)?;
        unsafe { write_out(out_steps, "out_steps", steps) }
    })
}

/// Fill `out_pixels` with the grid as RGBA8, top row first.
///
/// `len` must equal `width * height * 4`.
///
/// # Safety
/// - `ptr` must be null or a live pointer from `sands_new`.
/// - `out_pixels` must be null or valid for `len` byte writes.
#[no_mangle]
pub unsafe extern "C" fn sands_render_rgba(
    ptr: *const SandsInstance,
    out_pixels: *mut u8,
    len: usize,
) -> SandsErrorCode {
    track_result(|| {
        if out_pixels.is_null() {
            return Err(DefaultSandsError::null_pointer("out_pixels"));
        }
        let instance = unsafe { instance_from_ptr(ptr) }?;
        // SAFETY: non-null and sized by the caller's contract.
        let pixels = unsafe { std::slice::from_raw_parts_mut(out_pixels, len) };
        with_sim(instance, |sim| write_cells_rgba(sim.grid(), pixels))??;
        Ok(())
    })
}

/// Fill `out_pixels` with the force field as RGBA8, top row first.
///
/// Components map `[-scale, scale]` onto red and green; blue is magnitude.
/// Fails with `InvalidParameter` when the simulator has no field.
///
/// # Safety
/// - `ptr` must be null or a live pointer from `sands_new`.
/// - `out_pixels` must be null or valid for `len` byte writes.
#[no_mangle]
pub unsafe extern "C" fn sands_render_force_rgba(
    ptr: *const SandsInstance,
    scale: f32,
    out_pixels: *mut u8,
    len: usize,
) -> SandsErrorCode {
    track_result(|| {
        if out_pixels.is_null() {
            return Err(DefaultSandsError::null_pointer("out_pixels"));
        }
        let instance = unsafe { instance_from_ptr(ptr) }?;
        // SAFETY: non-null and sized by the caller's contract.
        let pixels = unsafe { std::slice::from_raw_parts_mut(out_pixels, len) };
        with_sim(instance, |sim| match sim.force_field() {
            Some(field) => write_force_rgba(field, scale, pixels),
            None => Err(SimError::InvalidConfig(format!(
                "{:?} mode has no force field",
                sim.mode()
            ))),
        })??;
        Ok(())
    })
}

/// Number of entries in the material palette.
#[no_mangle]
pub extern "C" fn sands_material_count() -> u32 {
    MaterialId::COUNT as u32
}

/// Palette entry `index`, in stable palette order.
///
/// # Safety
/// `out_info` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn sands_material_info(
    index: u32,
    out_info: *mut SandsMaterialInfo,
) -> SandsErrorCode {
    track_result(|| {
        let slot = index as usize;
        let info = MaterialId::palette().get(slot).ok_or_else(|| {
            DefaultSandsError::invalid_parameter(format!(
                "material index {index} is outside the palette of {}",
                MaterialId::COUNT
            ))
        })?;
        let name = MATERIAL_NAMES
            .get(slot)
            .map_or(std::ptr::null(), |name| name.as_ptr());
        let entry = SandsMaterialInfo {
            id: info.id.as_u8(),
            name,
            color: info.color,
        };
        unsafe { write_out(out_info, "out_info", entry) }
    })
}
