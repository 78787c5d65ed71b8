use aero_flow_core::{CarGeometry, ControlState, FlowConfig, FlowSimulation, FlowStyle};
use std::ptr;
use std::sync::{Mutex, RwLock};

use crate::error::{DefaultFlowSimError, FlowSimErrorCode};
use crate::helpers::{track_error, track_result};
use crate::queries::FlowSegment;

/// Construction parameters for `flow_sim_new`.
///
/// Mirrors the core `FlowConfig`; the live controls start at their defaults
/// and are changed afterwards through the `flow_sim_set_*` functions.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FlowSimConfig {
    /// Total element slots, fixed for the lifetime of the instance.
    pub line_budget: usize,
    /// Trail cap for streamlines, ignored for particles.
    pub points_per_line: usize,
    /// Render single-point particles instead of trails.
    pub particles: bool,
    pub car_length: f32,
    pub car_width: f32,
    pub car_height: f32,
    /// When false, `seed` is ignored and the generator is seeded from the OS.
    pub has_seed: bool,
    pub seed: u64,
}

impl Default for FlowSimConfig {
    fn default() -> Self {
        let config = FlowConfig::default();
        FlowSimConfig {
            line_budget: config.line_budget,
            points_per_line: config.points_per_line,
            particles: false,
            car_length: config.car.length,
            car_width: config.car.width,
            car_height: config.car.height,
            has_seed: false,
            seed: 0,
        }
    }
}

impl From<FlowSimConfig> for FlowConfig {
    fn from(config: FlowSimConfig) -> Self {
        FlowConfig {
            line_budget: config.line_budget,
            points_per_line: config.points_per_line,
            style: if config.particles {
                FlowStyle::Particles
            } else {
                FlowStyle::Streamlines
            },
            car: CarGeometry {
                length: config.car_length,
                width: config.car_width,
                height: config.car_height,
            },
            seed: config.has_seed.then_some(config.seed),
            controls: ControlState::default(),
        }
    }
}

/// Opaque flow simulation handle.
///
/// # Thread Safety
/// The simulation sits behind an `RwLock`: queries share the read lock and
/// ticks or control changes take the write lock. Frame copies handed out to
/// C live in per-buffer `Mutex` caches owned by the instance, so returned
/// pointers stay valid until the next copy into the same buffer.
pub struct FlowSimInstance {
    pub(crate) sim: RwLock<FlowSimulation>,
    pub(crate) positions: Mutex<Vec<f32>>,
    pub(crate) colors: Mutex<Vec<f32>>,
    pub(crate) segments: Mutex<Vec<FlowSegment>>,
}

impl FlowSimInstance {
    pub(crate) fn new(config: FlowConfig) -> Result<Box<Self>, DefaultFlowSimError> {
        let sim = FlowSimulation::new(config)?;
        let points = sim.config().line_budget * sim.config().max_points();
        Ok(Box::new(FlowSimInstance {
            sim: RwLock::new(sim),
            positions: Mutex::new(Vec::with_capacity(points * 3)),
            colors: Mutex::new(Vec::with_capacity(points * 4)),
            segments: Mutex::new(Vec::new()),
        }))
    }
}

/// Create a new flow simulation.
///
/// - `config` may be null, in which case the default configuration is used
///   (600 streamlines of 80 points around a 5 x 2 x 1 m car).
/// - On success `*out_instance` receives the handle; release it with
///   `flow_sim_destroy`.
///
/// Returns
/// - `FlowSimErrorCode::Ok` (0) on success
/// - `FlowSimErrorCode::NullPointer` if `out_instance` is null
/// - `FlowSimErrorCode::InvalidConfig` if the geometry, trail length or
///   budget is rejected (`*out_instance` is set to null)
///
/// # Safety
///
/// - `config` must be null or point to a valid `FlowSimConfig`.
/// - `out_instance` must be a valid pointer to writable storage.
#[no_mangle]
pub unsafe extern "C" fn flow_sim_new(
    config: *const FlowSimConfig,
    out_instance: *mut *mut FlowSimInstance,
) -> FlowSimErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultFlowSimError::null_pointer("out_instance"));
    }

    // SAFETY: caller guarantees `config` is null or valid.
    let config = unsafe { config.as_ref() }.copied().unwrap_or_default();
    let result = FlowSimInstance::new(config.into());
    let code = track_result(&result);

    // SAFETY: checked non-null above.
    unsafe {
        *out_instance = match result {
            Ok(instance) => Box::into_raw(instance),
            Err(_) => ptr::null_mut(),
        };
    }
    code
}

/// Destroy an instance created by `flow_sim_new`. Null is a no-op.
///
/// # Safety
///
/// `ptr` must be null or a pointer returned by `flow_sim_new` that has not
/// already been destroyed. Buffers previously returned for it become dangling.
#[no_mangle]
pub unsafe extern "C" fn flow_sim_destroy(ptr: *mut FlowSimInstance) {
    if !ptr.is_null() {
        // SAFETY: ownership returns to Rust exactly once.
        drop(unsafe { Box::from_raw(ptr) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> FlowSimConfig {
        FlowSimConfig {
            line_budget: 60,
            points_per_line: 10,
            has_seed: true,
            seed: 7,
            ..FlowSimConfig::default()
        }
    }

    #[test]
    fn test_new_and_destroy() {
        let config = small_config();
        let mut instance = ptr::null_mut();
        let code = unsafe { flow_sim_new(&config, &mut instance) };
        assert_eq!(code, FlowSimErrorCode::Ok);
        assert!(!instance.is_null());
        unsafe { flow_sim_destroy(instance) };
    }

    #[test]
    fn test_null_config_uses_defaults() {
        let mut instance = ptr::null_mut();
        let code = unsafe { flow_sim_new(ptr::null(), &mut instance) };
        assert_eq!(code, FlowSimErrorCode::Ok);
        let capacity = unsafe { (*instance).sim.read().unwrap().capacity() };
        assert_eq!(capacity, 600);
        unsafe { flow_sim_destroy(instance) };
    }

    #[test]
    fn test_invalid_geometry_is_rejected() {
        let config = FlowSimConfig {
            car_width: -1.0,
            ..small_config()
        };
        let mut instance = ptr::null_mut();
        let code = unsafe { flow_sim_new(&config, &mut instance) };
        assert_eq!(code, FlowSimErrorCode::InvalidConfig);
        assert!(instance.is_null());
    }

    #[test]
    fn test_null_out_instance() {
        let code = unsafe { flow_sim_new(ptr::null(), ptr::null_mut()) };
        assert_eq!(code, FlowSimErrorCode::NullPointer);
    }

    #[test]
    fn test_destroy_null_is_noop() {
        unsafe { flow_sim_destroy(ptr::null_mut()) };
    }
}
