use aero_flow_core::{ColorMode, FlowSimulation, TickStats};

use crate::error::{DefaultFlowSimError, FlowSimErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, require_finite, with_sim_mut};
use crate::instance::FlowSimInstance;

/// Per-tick outcome counts.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowTickStats {
    pub advanced: usize,
    pub reseeded: usize,
    /// Elements left untouched because `dt` was zero, negative or not finite.
    pub skipped: usize,
}

impl From<TickStats> for FlowTickStats {
    fn from(stats: TickStats) -> Self {
        FlowTickStats {
            advanced: stats.advanced,
            reseeded: stats.reseeded,
            skipped: stats.skipped,
        }
    }
}

/// Advance every element by `dt` seconds and rebuild the frame buffers.
///
/// A `dt` that is zero, negative or not finite leaves the population as it
/// was and is reported through `skipped`.
///
/// - `out_stats` is optional; pass null to ignore the counts.
///
/// # Safety
///
/// - `ptr` must be null or a live pointer returned by `flow_sim_new`.
/// - `out_stats` must be null or point to writable `FlowTickStats`.
#[no_mangle]
pub unsafe extern "C" fn flow_sim_tick(
    ptr: *const FlowSimInstance,
    dt: f32,
    out_stats: *mut FlowTickStats,
) -> FlowSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let stats = with_sim_mut(instance, |sim| sim.tick(dt))?;
        if !out_stats.is_null() {
            // SAFETY: caller guarantees a non-null `out_stats` is writable.
            unsafe { *out_stats = stats.into() };
        }
        Ok::<(), DefaultFlowSimError>(())
    })
}

/// Run a write-locked mutation against the instance behind `ptr`.
unsafe fn mutate<F>(ptr: *const FlowSimInstance, f: F) -> FlowSimErrorCode
where
    F: FnOnce(&mut FlowSimulation) -> Result<(), DefaultFlowSimError>,
{
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        with_sim_mut(instance, f)?
    })
}

/// Move the car along the travel axis (metres).
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by `flow_sim_new`.
#[no_mangle]
pub unsafe extern "C" fn flow_sim_set_car_position(
    ptr: *const FlowSimInstance,
    position: f32,
) -> FlowSimErrorCode {
    unsafe {
        mutate(ptr, |sim| {
            sim.set_car_position(require_finite("position", position)?);
            Ok(())
        })
    }
}

/// Set the car speed in km/h, clamped to `[0, 500]`.
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by `flow_sim_new`.
#[no_mangle]
pub unsafe extern "C" fn flow_sim_set_car_speed(
    ptr: *const FlowSimInstance,
    speed_kmh: f32,
) -> FlowSimErrorCode {
    unsafe {
        mutate(ptr, |sim| {
            sim.set_car_speed(require_finite("speed_kmh", speed_kmh)?);
            Ok(())
        })
    }
}

/// Open or close the rear-wing flap. Changing state regenerates vortices.
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by `flow_sim_new`.
#[no_mangle]
pub unsafe extern "C" fn flow_sim_set_drs(
    ptr: *const FlowSimInstance,
    open: bool,
) -> FlowSimErrorCode {
    unsafe {
        mutate(ptr, |sim| {
            sim.set_drs(open);
            Ok(())
        })
    }
}

/// Set the minimum seed spacing, clamped to `[0.005, 1.0]`.
/// Re-lays out the laminar population.
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by `flow_sim_new`.
#[no_mangle]
pub unsafe extern "C" fn flow_sim_set_min_distance(
    ptr: *const FlowSimInstance,
    distance: f32,
) -> FlowSimErrorCode {
    unsafe {
        mutate(ptr, |sim| {
            sim.set_min_distance(require_finite("distance", distance)?);
            Ok(())
        })
    }
}

/// Set the vortex intensity, clamped to `[0, 2]`. Regenerates vortices.
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by `flow_sim_new`.
#[no_mangle]
pub unsafe extern "C" fn flow_sim_set_vortex_intensity(
    ptr: *const FlowSimInstance,
    intensity: f32,
) -> FlowSimErrorCode {
    unsafe {
        mutate(ptr, |sim| {
            sim.set_vortex_intensity(require_finite("intensity", intensity)?);
            Ok(())
        })
    }
}

/// Select the color scheme: 0 = pressure, 1 = zone.
///
/// Returns `FlowSimErrorCode::InvalidParameter` for any other value.
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by `flow_sim_new`.
#[no_mangle]
pub unsafe extern "C" fn flow_sim_set_color_mode(
    ptr: *const FlowSimInstance,
    mode: u8,
) -> FlowSimErrorCode {
    unsafe {
        mutate(ptr, |sim| {
            let mode = match mode {
                0 => ColorMode::Pressure,
                1 => ColorMode::Zone,
                other => {
                    return Err(DefaultFlowSimError::invalid_parameter(format!(
                        "Unknown color mode {other}, expected 0 (pressure) or 1 (zone)"
                    )))
                }
            };
            sim.set_color_mode(mode);
            Ok(())
        })
    }
}

/// Toggle car-relative anchoring of trails and reseeds.
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by `flow_sim_new`.
#[no_mangle]
pub unsafe extern "C" fn flow_sim_set_relative_dynamics(
    ptr: *const FlowSimInstance,
    enabled: bool,
) -> FlowSimErrorCode {
    unsafe {
        mutate(ptr, |sim| {
            sim.set_relative_dynamics(enabled);
            Ok(())
        })
    }
}

/// Toggle per-zone spacing multipliers. Re-lays out the population.
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by `flow_sim_new`.
#[no_mangle]
pub unsafe extern "C" fn flow_sim_set_adaptive_density(
    ptr: *const FlowSimInstance,
    enabled: bool,
) -> FlowSimErrorCode {
    unsafe {
        mutate(ptr, |sim| {
            sim.set_adaptive_density(enabled);
            Ok(())
        })
    }
}

/// Reseed every element in place at the current car position and regenerate
/// the vortices. Controls are left as they are.
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by `flow_sim_new`.
#[no_mangle]
pub unsafe extern "C" fn flow_sim_reset(ptr: *const FlowSimInstance) -> FlowSimErrorCode {
    unsafe {
        mutate(ptr, |sim| {
            sim.reset_all();
            Ok(())
        })
    }
}
