//! Aerodynamic Flow Visualisation Core
//!
//! A procedural airflow model around a single car, built for real-time
//! display rather than accuracy. Flow elements (point particles or polyline
//! streamlines) are seeded in emission zones around the body, pushed along
//! by empirical zone-triggered forces, aged, and recycled in place.
//!
//! ## Pipeline
//!
//! - [`seeding`]: minimum-spacing rejection sampling per zone, plus the
//!   vortex cores clustered at the wing tips
//! - [`forces`]: body deflection, front and rear wing, DRS, ground effect,
//!   wake, vortex spiral, turbulence
//! - [`lifecycle`]: aging, history, reseed-on-expiry, car-relative anchoring
//! - [`color`]: pressure or zone palettes, velocity brightness, life fade
//! - [`render`]: flat position and color buffers for a GPU uploader
//!
//! [`FlowSimulation`] ties them together; [`telemetry`] adds the downforce,
//! drag, and tyre estimates shown next to the flow.

pub mod color;
pub mod core_types;
pub mod element;
pub mod forces;
pub mod lifecycle;
pub mod params;
pub mod render;
pub mod seeding;
pub mod simulation;
pub mod telemetry;

// Re-export core types
pub use core_types::{FlowRng, Rgb, Rgba, SpatialIndex, Vec3, ZoneType};
pub use element::{ElementShape, FlowElement, Motion, VortexSource};

// Re-export configuration
pub use params::{
    CarGeometry, ColorMode, ConfigError, ControlState, FlowConfig, FlowStyle, SimulationParams,
};

// Re-export the simulation surface
pub use forces::FieldSample;
pub use lifecycle::TickOutcome;
pub use render::{FlowFrame, LineSegment, RenderSink};
pub use seeding::{Population, Seeder};
pub use simulation::{FlowSimulation, PopulationStats, TickStats};
pub use telemetry::{AeroModel, Metric, TelemetryLog, TelemetrySample};
