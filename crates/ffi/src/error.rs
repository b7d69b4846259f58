use sands_core::SimError;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for errors crossing the C boundary.
///
/// `code()` is what the caller receives as a return value; `msg()` is kept
/// in thread-local storage for `sands_get_last_error`.
pub(crate) trait SandsError {
    /// Error code returned across the FFI boundary.
    fn code(&self) -> SandsErrorCode;

    /// Human-readable diagnostic.
    fn msg(&self) -> &str;
}

/// Error code plus message, built from FFI argument checks or core errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultSandsError {
    code: SandsErrorCode,
    msg: String,
}

impl DefaultSandsError {
    /// Null pointer passed where non-null is required.
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: SandsErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// The simulator lock was poisoned by a panic on another thread.
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: SandsErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// Out-of-range enum discriminant or similar argument error.
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: SandsErrorCode::InvalidParameter,
            msg: message,
        }
    }
}

impl From<&SimError> for DefaultSandsError {
    fn from(error: &SimError) -> Self {
        let code = match error {
            SimError::InvalidDimensions { .. } => SandsErrorCode::InvalidDimensions,
            SimError::OutOfBounds { .. } => SandsErrorCode::OutOfBounds,
            SimError::InvalidForce { .. } => SandsErrorCode::InvalidForce,
            SimError::InvalidMaterial(_) => SandsErrorCode::InvalidMaterial,
            SimError::InvalidRadius(_) => SandsErrorCode::InvalidRadius,
            SimError::BufferSize { .. } => SandsErrorCode::BufferSize,
            SimError::InvalidConfig(_) => SandsErrorCode::InvalidParameter,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl From<SimError> for DefaultSandsError {
    fn from(error: SimError) -> Self {
        Self::from(&error)
    }
}

impl SandsError for DefaultSandsError {
    fn code(&self) -> SandsErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by `sands_*` functions.
/// 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandsErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Null pointer passed where non-null required.
    NullPointer = 1,

    /// Internal lock was poisoned by a panic.
    LockPoisoned = 2,

    /// Grid width or height is zero.
    InvalidDimensions = 3,

    /// Cell coordinate outside the grid.
    OutOfBounds = 4,

    /// Force magnitude or position is not finite.
    InvalidForce = 5,

    /// Material id outside the palette.
    InvalidMaterial = 6,

    /// Brush or injection radius is negative or not finite.
    InvalidRadius = 7,

    /// Pixel buffer length does not match `width * height * 4`.
    BufferSize = 8,

    /// Any other invalid argument.
    InvalidParameter = 9,
}

thread_local! {
    /// Most recent FFI error on this thread (message, code).
    /// The `CString` is owned here so the pointer handed out stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, SandsErrorCode)> = const { RefCell::new((None, SandsErrorCode::Ok)) };
}

pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, SandsErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, SandsErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns null if the last call on this thread succeeded.
///
/// The pointer is valid until the next `sands_*` call on the same thread.
/// **DO NOT FREE THIS POINTER**.
///
/// ```c
/// SandsInstance* sim = NULL;
/// if (sands_new(0, 64, 0, &sim) != Ok) {
///     fprintf(stderr, "sands_new failed: %s\n", sands_get_last_error());
/// }
/// ```
#[no_mangle]
pub extern "C" fn sands_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code on this thread.
///
/// `SandsErrorCode::Ok` if the last call succeeded.
#[no_mangle]
pub extern "C" fn sands_get_last_error_code() -> SandsErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
