use aero_flow_core::ConfigError;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for errors that cross the FFI boundary.
///
/// - `code()` is what the C caller receives as a return value
/// - `msg()` is what `flow_sim_get_last_error` hands back afterwards
pub(crate) trait FlowSimError {
    fn code(&self) -> FlowSimErrorCode;

    fn msg(&self) -> &str;
}

/// Error value with a code and a formatted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultFlowSimError {
    code: FlowSimErrorCode,
    msg: String,
}

impl DefaultFlowSimError {
    /// Null pointer passed where a valid one was required.
    ///
    /// # Arguments
    /// * `param_name` - Name of the offending parameter (e.g., `"out_instance"`, `"ptr"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: FlowSimErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// A lock was poisoned by a panic on another thread.
    ///
    /// # Arguments
    /// * `lock_name` - Which lock failed (e.g., `"simulation"`, `"positions"`)
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: FlowSimErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// The configuration was rejected by the core crate.
    pub fn invalid_config(error: &ConfigError) -> Self {
        Self {
            code: FlowSimErrorCode::InvalidConfig,
            msg: format!("Invalid configuration: {error}"),
        }
    }

    /// A scalar argument was out of its accepted domain.
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: FlowSimErrorCode::InvalidParameter,
            msg: message,
        }
    }
}

impl FlowSimError for DefaultFlowSimError {
    fn code(&self) -> FlowSimErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

impl From<ConfigError> for DefaultFlowSimError {
    fn from(error: ConfigError) -> Self {
        Self::invalid_config(&error)
    }
}

/// FFI error codes. 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowSimErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Null pointer passed where non-null required.
    NullPointer = 1,

    /// Internal lock was poisoned by a panic.
    LockPoisoned = 2,

    /// Configuration failed validation (geometry, trail length or budget).
    InvalidConfig = 3,

    /// Invalid scalar argument passed to a function.
    InvalidParameter = 4,
}

impl From<DefaultFlowSimError> for FlowSimErrorCode {
    fn from(error: DefaultFlowSimError) -> Self {
        error.code
    }
}

thread_local! {
    /// Most recent FFI error on this thread (C string, error code).
    /// The `CString` is owned here so the pointer handed out stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, FlowSimErrorCode)> = const { RefCell::new((None, FlowSimErrorCode::Ok)) };
}

pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, FlowSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, FlowSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns `null` when the last call on this thread succeeded.
///
/// The pointer stays valid until the next FFI call on the same thread.
/// **DO NOT FREE THIS POINTER**.
///
/// Example:
/// ```cpp
/// FlowSimInstance* sim = nullptr;
/// FlowSimErrorCode err = flow_sim_new(&config, &sim);
/// if (err != FlowSimErrorCode::Ok) {
///     const char* error = flow_sim_get_last_error();
///     if (error) {
///         printf("Flow sim creation failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn flow_sim_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code for this thread.
#[no_mangle]
pub extern "C" fn flow_sim_get_last_error_code() -> FlowSimErrorCode {
    with_last_error(|(_cstring, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_maps_to_invalid_config() {
        let err = DefaultFlowSimError::from(ConfigError::ZeroTrailLength);
        assert_eq!(err.code(), FlowSimErrorCode::InvalidConfig);
        assert!(err.msg().starts_with("Invalid configuration"));
    }

    #[test]
    fn test_null_pointer_message_names_parameter() {
        let err = DefaultFlowSimError::null_pointer("out_len");
        assert_eq!(err.code(), FlowSimErrorCode::NullPointer);
        assert!(err.msg().contains("out_len"));
    }
}
