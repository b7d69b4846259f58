use crate::error::{with_last_error_mut, DefaultSandsError, SandsError, SandsErrorCode};
use crate::instance::SandsInstance;
use sands_core::Simulator;
use std::ffi::CString;

/// Record an error in thread-local storage.
pub(crate) fn set_last_error(error: &impl SandsError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Record an error and return its code.
#[inline]
pub(crate) fn track_error(error: &impl SandsError) -> SandsErrorCode {
    set_last_error(error);
    error.code()
}

/// Reset thread-local error state after a successful call.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = SandsErrorCode::Ok;
    });
}

/// Run an FFI body and translate its outcome into an error code.
pub(crate) fn track_result<F>(body: F) -> SandsErrorCode
where
    F: FnOnce() -> Result<(), DefaultSandsError>,
{
    match body() {
        Ok(()) => {
            clear_last_error();
            SandsErrorCode::Ok
        }
        Err(error) => track_error(&error),
    }
}

/// Borrow an instance from a caller pointer.
///
/// # Safety
/// `ptr` must be null or a live pointer returned by `sands_new`.
pub(crate) unsafe fn instance_from_ptr<'a>(
    ptr: *const SandsInstance,
) -> Result<&'a SandsInstance, DefaultSandsError> {
    // SAFETY: non-null pointers come from `Box::into_raw` in `sands_new`.
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultSandsError::null_pointer("ptr"))
}

/// Run `f` under the simulator read lock.
pub(crate) fn with_sim<F, T>(instance: &SandsInstance, f: F) -> Result<T, DefaultSandsError>
where
    F: FnOnce(&Simulator) -> T,
{
    let sim = instance
        .sim
        .read()
        .map_err(|_| DefaultSandsError::lock_poisoned("RwLock"))?;
    Ok(f(&sim))
}

/// Run `f` under the simulator write lock.
pub(crate) fn with_sim_mut<F, T>(instance: &SandsInstance, f: F) -> Result<T, DefaultSandsError>
where
    F: FnOnce(&mut Simulator) -> T,
{
    let mut sim = instance
        .sim
        .write()
        .map_err(|_| DefaultSandsError::lock_poisoned("RwLock"))?;
    Ok(f(&mut sim))
}

/// Write `value` through an out-parameter.
///
/// # Safety
/// `out` must be null or valid for a write of `T`.
pub(crate) unsafe fn write_out<T>(
    out: *mut T,
    name: &str,
    value: T,
) -> Result<(), DefaultSandsError> {
    if out.is_null() {
        return Err(DefaultSandsError::null_pointer(name));
    }
    // SAFETY: checked non-null; validity is the caller's contract.
    unsafe { out.write(value); }
    Ok(())
}
