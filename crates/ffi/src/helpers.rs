use crate::error::{with_last_error_mut, DefaultFlowSimError, FlowSimError, FlowSimErrorCode};
use crate::instance::FlowSimInstance;
use aero_flow_core::FlowSimulation;
use std::ffi::CString;

/// Record `error` in thread-local storage.
pub(crate) fn set_last_error(error: &impl FlowSimError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Record `error` and return its code.
#[inline]
pub(crate) fn track_error(error: &impl FlowSimError) -> FlowSimErrorCode {
    set_last_error(error);
    error.code()
}

/// Record the error side of `result`, or clear the slot on success.
pub(crate) fn track_result<T, E: FlowSimError>(result: &Result<T, E>) -> FlowSimErrorCode {
    match result {
        Ok(_) => {
            clear_last_error();
            FlowSimErrorCode::Ok
        }
        Err(error) => track_error(error),
    }
}

pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = FlowSimErrorCode::Ok;
    });
}

/// Run `f` and convert its result into an error code.
pub(crate) fn handle_ffi_result_error<F, E>(f: F) -> FlowSimErrorCode
where
    F: FnOnce() -> Result<(), E>,
    E: FlowSimError,
{
    track_result(&f())
}

/// Borrow the instance behind a raw handle.
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by `flow_sim_new`.
pub(crate) unsafe fn instance_from_ptr<'a>(
    ptr: *const FlowSimInstance,
) -> Result<&'a FlowSimInstance, DefaultFlowSimError> {
    // SAFETY: non-null handles come from `Box::into_raw` in `flow_sim_new`.
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultFlowSimError::null_pointer("ptr"))
}

/// Run `f` under the simulation's read lock.
pub(crate) fn with_sim<F, R>(instance: &FlowSimInstance, f: F) -> Result<R, DefaultFlowSimError>
where
    F: FnOnce(&FlowSimulation) -> R,
{
    let sim = instance
        .sim
        .read()
        .map_err(|_| DefaultFlowSimError::lock_poisoned("simulation"))?;
    Ok(f(&sim))
}

/// Run `f` under the simulation's write lock.
pub(crate) fn with_sim_mut<F, R>(
    instance: &FlowSimInstance,
    f: F,
) -> Result<R, DefaultFlowSimError>
where
    F: FnOnce(&mut FlowSimulation) -> R,
{
    let mut sim = instance
        .sim
        .write()
        .map_err(|_| DefaultFlowSimError::lock_poisoned("simulation"))?;
    Ok(f(&mut sim))
}

/// Reject NaN and infinite scalars before they reach the simulation.
pub(crate) fn require_finite(name: &str, value: f32) -> Result<f32, DefaultFlowSimError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DefaultFlowSimError::invalid_parameter(format!(
            "Parameter '{name}' must be finite, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{flow_sim_get_last_error, flow_sim_get_last_error_code};

    #[test]
    fn test_track_error_then_clear() {
        let code = track_error(&DefaultFlowSimError::null_pointer("ptr"));
        assert_eq!(code, FlowSimErrorCode::NullPointer);
        assert_eq!(flow_sim_get_last_error_code(), FlowSimErrorCode::NullPointer);
        assert!(!flow_sim_get_last_error().is_null());

        clear_last_error();
        assert_eq!(flow_sim_get_last_error_code(), FlowSimErrorCode::Ok);
        assert!(flow_sim_get_last_error().is_null());
    }

    #[test]
    fn test_require_finite_rejects_nan() {
        assert!(require_finite("speed", 120.0).is_ok());
        let err = require_finite("speed", f32::NAN).unwrap_err();
        assert_eq!(err.code(), FlowSimErrorCode::InvalidParameter);
    }

    #[test]
    fn test_instance_from_null_is_error() {
        let result = unsafe { instance_from_ptr(std::ptr::null()) };
        assert!(result.is_err());
    }
}
