use sands_core::{SimulationMode, Simulator};
use std::ptr;
use std::sync::RwLock;

use crate::error::{DefaultSandsError, SandsErrorCode};
use crate::helpers::{clear_last_error, track_error};

/// Opaque simulation handle owned by the host.
///
/// # Thread Safety
/// The simulator sits behind an `RwLock`: queries take the read lock and
/// may run concurrently; input and `sands_step` take the write lock.
/// A host may step on a worker thread while the render thread reads
/// pixels, and will never observe a half-finished step.
///
/// ## Host Loop (C)
/// ```c
/// SandsInstance* sim = NULL;
/// if (sands_new(256, 192, 2, &sim) != Ok) {
///     fprintf(stderr, "%s\n", sands_get_last_error());
///     return;
/// }
/// uint64_t frame = 0;
/// while (running) {
///     sands_pointer_move(sim, mouse_x / view_w, 1.0f - mouse_y / view_h);
///     sands_step(sim, frame++, !paused, NULL);
///     sands_render_rgba(sim, pixels, 256 * 192 * 4);
/// }
/// sands_destroy(sim);
/// ```
pub struct SandsInstance {
    pub(crate) sim: RwLock<Simulator>,
}

impl SandsInstance {
    fn new(width: u32, height: u32, mode: u8) -> Result<Box<Self>, DefaultSandsError> {
        let mode = SimulationMode::from_u8(mode).ok_or_else(|| {
            DefaultSandsError::invalid_parameter(format!(
                "mode must be 0 (automaton), 1 (field) or 2 (both), got {mode}"
            ))
        })?;
        let sim = Simulator::new(width, height, mode)?;
        Ok(Box::new(Self {
            sim: RwLock::new(sim),
        }))
    }
}

/// Create a simulator and return it via out-parameter.
///
/// Parameters
/// - `width`, `height`: grid extent in cells, both non-zero.
/// - `mode`: 0 = automaton only, 1 = force field only, 2 = both.
/// - `out_instance`: receives the instance on success, null on failure.
///
/// Returns
/// - `SandsErrorCode::Ok` on success
/// - `SandsErrorCode::NullPointer` if `out_instance` is null
/// - `SandsErrorCode::InvalidDimensions` if either extent is zero
/// - `SandsErrorCode::InvalidParameter` for an unknown `mode`
///
/// # Safety
/// - `out_instance` must be null or valid for writes.
/// - The caller owns the returned instance and MUST release it with
///   `sands_destroy` exactly once.
#[no_mangle]
pub unsafe extern "C" fn sands_new(
    width: u32,
    height: u32,
    mode: u8,
    out_instance: *mut *mut SandsInstance,
) -> SandsErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultSandsError::null_pointer("out_instance"));
    }

    match SandsInstance::new(width, height, mode) {
        Ok(instance) => {
            unsafe {
                *out_instance = Box::into_raw(instance);
            }
            clear_last_error();
            SandsErrorCode::Ok
        }
        Err(error) => {
            unsafe {
                // Null on failure so hosts can't destroy garbage
                *out_instance = ptr::null_mut();
            }
            track_error(&error)
        }
    }
}

/// Destroy an instance created by `sands_new`. Null is a no-op.
///
/// # Safety
/// - `ptr` must come from `sands_new` and not have been destroyed already.
/// - The pointer must not be used after this call.
#[no_mangle]
pub unsafe extern "C" fn sands_destroy(ptr: *mut SandsInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: the pointer was produced by `Box::into_raw` in `sands_new`.
    unsafe {
        drop(Box::from_raw(ptr));
    }
}
