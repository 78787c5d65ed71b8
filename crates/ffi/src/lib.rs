//! C ABI over `aero-flow-core`.
//!
//! Every function returns a [`FlowSimErrorCode`]; details of the most recent
//! failure on the calling thread are available from `flow_sim_get_last_error`.
//! The header is written to `AeroFlowFFI.h` at the workspace root by the
//! build script.

mod error;
mod helpers;
mod instance;
mod queries;
mod simulation;

pub use error::{flow_sim_get_last_error, flow_sim_get_last_error_code, FlowSimErrorCode};
pub use instance::{flow_sim_destroy, flow_sim_new, FlowSimConfig, FlowSimInstance};
pub use queries::{
    flow_sim_clear_buffers, flow_sim_get_colors, flow_sim_get_positions, flow_sim_get_segments,
    flow_sim_get_stats, FlowPopulationStats, FlowSegment,
};
pub use simulation::{
    flow_sim_reset, flow_sim_set_adaptive_density, flow_sim_set_car_position,
    flow_sim_set_car_speed, flow_sim_set_color_mode, flow_sim_set_drs, flow_sim_set_min_distance,
    flow_sim_set_relative_dynamics, flow_sim_set_vortex_intensity, flow_sim_tick, FlowTickStats,
};
