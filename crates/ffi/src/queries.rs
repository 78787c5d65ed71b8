use aero_flow_core::{FlowFrame, LineSegment, PopulationStats};
use std::ptr;
use std::sync::Mutex;

use crate::error::{DefaultFlowSimError, FlowSimErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, track_error, with_sim};
use crate::instance::FlowSimInstance;

/// One element's run of samples in the position and color buffers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowSegment {
    /// Index of the first sample (not the first float).
    pub offset: usize,
    /// Sample count.
    pub len: usize,
    pub is_vortex: bool,
    /// 0 front wing, 1 top, 2 side, 3 rear wing, 4 floor, 5 vortex core.
    pub zone: u8,
}

impl From<&LineSegment> for FlowSegment {
    fn from(segment: &LineSegment) -> Self {
        FlowSegment {
            offset: segment.offset,
            len: segment.len,
            is_vortex: segment.is_vortex,
            zone: segment.zone.id(),
        }
    }
}

/// Population snapshot.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlowPopulationStats {
    pub capacity: usize,
    pub elements: usize,
    pub vortices: usize,
    pub total_points: usize,
    pub skipped_seeds: usize,
    /// Element count per zone, indexed like `FlowSegment::zone`.
    pub by_zone: [usize; 6],
    pub tick_count: u64,
    pub elapsed: f32,
}

impl FlowPopulationStats {
    fn new(stats: &PopulationStats, tick_count: u64, elapsed: f32) -> Self {
        FlowPopulationStats {
            capacity: stats.capacity,
            elements: stats.elements,
            vortices: stats.vortices,
            total_points: stats.total_points,
            skipped_seeds: stats.skipped_seeds,
            by_zone: stats.by_zone,
            tick_count,
            elapsed,
        }
    }
}

/// Refill `cache` from the current frame and publish it through the out pointers.
///
/// On error both outputs are reset to null / 0.
unsafe fn publish<T, F>(
    ptr: *const FlowSimInstance,
    select: impl FnOnce(&FlowSimInstance) -> &Mutex<Vec<T>>,
    lock_name: &str,
    fill: F,
    out_len: *mut usize,
    out_array: *mut *const T,
) -> FlowSimErrorCode
where
    F: FnOnce(&FlowFrame, &mut Vec<T>),
{
    if out_len.is_null() {
        return track_error(&DefaultFlowSimError::null_pointer("out_len"));
    }
    if out_array.is_null() {
        // SAFETY: checked non-null above.
        unsafe { *out_len = 0 };
        return track_error(&DefaultFlowSimError::null_pointer("out_array"));
    }

    let result = handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let mut cache = select(instance)
            .lock()
            .map_err(|_| DefaultFlowSimError::lock_poisoned(lock_name))?;
        cache.clear();
        with_sim(instance, |sim| fill(sim.snapshot(), &mut *cache))?;

        // SAFETY: both outputs checked non-null above.
        unsafe {
            *out_len = cache.len();
            *out_array = cache.as_ptr();
        }
        Ok::<(), DefaultFlowSimError>(())
    });

    if result != FlowSimErrorCode::Ok {
        // SAFETY: both outputs checked non-null above.
        unsafe {
            *out_array = ptr::null();
            *out_len = 0;
        }
    }
    result
}

/// Copy the last frame's positions as packed `x, y, z` floats.
///
/// - `*out_len` receives the float count (three per sample).
/// - The buffer is owned by the instance and stays valid until the next call
///   to this function or `flow_sim_clear_buffers`. **Do not free it.**
///
/// Example:
/// ```cpp
/// uintptr_t len = 0;
/// const float* positions = nullptr;
/// if (flow_sim_get_positions(sim, &len, &positions) == FlowSimErrorCode::Ok) {
///     upload_vertices(positions, len / 3);
/// }
/// ```
///
/// # Safety
///
/// - `ptr` must be null or a live pointer returned by `flow_sim_new`.
/// - `out_len` and `out_array` must be valid writable pointers.
#[no_mangle]
pub unsafe extern "C" fn flow_sim_get_positions(
    ptr: *const FlowSimInstance,
    out_len: *mut usize,
    out_array: *mut *const f32,
) -> FlowSimErrorCode {
    unsafe {
        publish(
            ptr,
            |instance| &instance.positions,
            "positions",
            |frame, cache| cache.extend(frame.positions().iter().flatten()),
            out_len,
            out_array,
        )
    }
}

/// Copy the last frame's colors as packed `r, g, b, a` floats, trail fade applied.
///
/// Same ownership rules as `flow_sim_get_positions`.
///
/// # Safety
///
/// - `ptr` must be null or a live pointer returned by `flow_sim_new`.
/// - `out_len` and `out_array` must be valid writable pointers.
#[no_mangle]
pub unsafe extern "C" fn flow_sim_get_colors(
    ptr: *const FlowSimInstance,
    out_len: *mut usize,
    out_array: *mut *const f32,
) -> FlowSimErrorCode {
    unsafe {
        publish(
            ptr,
            |instance| &instance.colors,
            "colors",
            |frame, cache| cache.extend(frame.colors().iter().flatten()),
            out_len,
            out_array,
        )
    }
}

/// Copy the last frame's per-element segments.
///
/// Same ownership rules as `flow_sim_get_positions`.
///
/// # Safety
///
/// - `ptr` must be null or a live pointer returned by `flow_sim_new`.
/// - `out_len` and `out_array` must be valid writable pointers.
#[no_mangle]
pub unsafe extern "C" fn flow_sim_get_segments(
    ptr: *const FlowSimInstance,
    out_len: *mut usize,
    out_array: *mut *const FlowSegment,
) -> FlowSimErrorCode {
    unsafe {
        publish(
            ptr,
            |instance| &instance.segments,
            "segments",
            |frame, cache| cache.extend(frame.segments().iter().map(FlowSegment::from)),
            out_len,
            out_array,
        )
    }
}

/// Release the cached frame copies. Previously returned buffers become invalid.
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by `flow_sim_new`.
#[no_mangle]
pub unsafe extern "C" fn flow_sim_clear_buffers(ptr: *const FlowSimInstance) -> FlowSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let poisoned = DefaultFlowSimError::lock_poisoned;
        let mut positions = instance.positions.lock().map_err(|_| poisoned("positions"))?;
        let mut colors = instance.colors.lock().map_err(|_| poisoned("colors"))?;
        let mut segments = instance.segments.lock().map_err(|_| poisoned("segments"))?;
        *positions = Vec::new();
        *colors = Vec::new();
        *segments = Vec::new();
        Ok::<(), DefaultFlowSimError>(())
    })
}

/// Fill `out_stats` with the current population breakdown.
///
/// # Safety
///
/// - `ptr` must be null or a live pointer returned by `flow_sim_new`.
/// - `out_stats` must be a valid writable pointer.
#[no_mangle]
pub unsafe extern "C" fn flow_sim_get_stats(
    ptr: *const FlowSimInstance,
    out_stats: *mut FlowPopulationStats,
) -> FlowSimErrorCode {
    if out_stats.is_null() {
        return track_error(&DefaultFlowSimError::null_pointer("out_stats"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let stats = with_sim(instance, |sim| {
            FlowPopulationStats::new(&sim.stats(), sim.tick_count(), sim.elapsed())
        })?;
        // SAFETY: checked non-null above.
        unsafe { *out_stats = stats };
        Ok::<(), DefaultFlowSimError>(())
    })
}
