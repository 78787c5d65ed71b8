//! Construction-time configuration, operator controls, and the per-tick
//! parameter snapshot.
//!
//! `ControlState` is the only mutable, process-wide state. It changes between
//! frames in response to operator input. At the start of every tick the
//! simulation copies it into a `SimulationParams`, which every other module
//! reads; no component ever sees a half-applied control change.

use crate::core_types::{Vec3, ZoneType};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Car speed the flow constants were tuned at (km/h); `speed_factor` is 1 here.
pub const REFERENCE_SPEED_KMH: f32 = 250.0;
/// Upper bound for the car speed control (km/h).
pub const MAX_CAR_SPEED_KMH: f32 = 500.0;
/// Bounds for the global minimum seed spacing (metres).
pub const MIN_DISTANCE_RANGE: (f32, f32) = (0.005, 1.0);
/// Upper bound for the vortex intensity control.
pub const MAX_VORTEX_INTENSITY: f32 = 2.0;
/// Largest line budget accepted at construction.
pub const MAX_LINE_BUDGET: usize = 100_000;

/// Spacing multipliers applied when adaptive density is on.
const FRONT_WING_SPACING: f32 = 0.8;
const FLOOR_SPACING: f32 = 0.7;
/// Fallback slots are always seeded with the loosest spacing.
pub const FALLBACK_SPACING: f32 = 0.5;

/// Construction errors. Nothing after construction can fail.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A car dimension is zero, negative, or not finite.
    InvalidGeometry { field: &'static str, value: f32 },
    /// Streamlines need room for at least one point.
    ZeroTrailLength,
    /// The requested line budget exceeds [`MAX_LINE_BUDGET`].
    BudgetTooLarge(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidGeometry { field, value } => {
                write!(f, "Car {field} must be finite and positive, got {value}")
            }
            ConfigError::ZeroTrailLength => {
                write!(f, "Streamlines need at least one point per line")
            }
            ConfigError::BudgetTooLarge(budget) => {
                write!(
                    f,
                    "Line budget {budget} exceeds the maximum of {MAX_LINE_BUDGET}"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Car body dimensions in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarGeometry {
    /// Along the travel (z) axis
    pub length: f32,
    /// Across the car (x axis)
    pub width: f32,
    /// Ground to the top of the airbox (y axis)
    pub height: f32,
}

impl Default for CarGeometry {
    fn default() -> Self {
        CarGeometry {
            length: 5.0,
            width: 2.0,
            height: 1.0,
        }
    }
}

impl CarGeometry {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGeometry`] naming the first bad dimension.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidGeometry { field, value });
            }
        }
        Ok(())
    }
}

/// How flow elements are stored and drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlowStyle {
    /// Poly-line trails with bounded history
    #[default]
    Streamlines,
    /// Single points overwritten in place
    Particles,
}

/// Base color source for laminar elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    #[default]
    Pressure,
    Zone,
}

/// Operator-facing knobs. Every setter clamps instead of rejecting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlState {
    /// Car reference position along the travel (z) axis
    pub car_position: f32,
    /// km/h
    pub car_speed: f32,
    pub drs_open: bool,
    /// Global minimum seed spacing in metres
    pub min_distance: f32,
    pub vortex_intensity: f32,
    pub color_mode: ColorMode,
    /// Translate stored trail history with the car
    pub relative_dynamics: bool,
    /// Apply zone-specific spacing multipliers
    pub adaptive_density: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        ControlState {
            car_position: -50.0,
            car_speed: 400.0,
            drs_open: false,
            min_distance: 0.05,
            vortex_intensity: 2.0,
            color_mode: ColorMode::Pressure,
            relative_dynamics: true,
            adaptive_density: true,
        }
    }
}

/// Clamp with NaN mapping to `fallback` so a bad input never poisons state.
#[inline]
fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

impl ControlState {
    /// Bring every field of a deserialized state back into range.
    pub fn sanitized(self) -> Self {
        let mut state = ControlState::default();
        state.set_car_position(self.car_position);
        state.set_car_speed(self.car_speed);
        state.set_drs(self.drs_open);
        state.set_min_distance(self.min_distance);
        state.set_vortex_intensity(self.vortex_intensity);
        state.set_color_mode(self.color_mode);
        state.set_relative_dynamics(self.relative_dynamics);
        state.set_adaptive_density(self.adaptive_density);
        state
    }

    /// Non-finite positions are ignored.
    pub fn set_car_position(&mut self, position: f32) {
        if position.is_finite() {
            self.car_position = position;
        }
        debug!(car_position = self.car_position, "car position set");
    }

    pub fn set_car_speed(&mut self, speed_kmh: f32) {
        self.car_speed = clamp_or(speed_kmh, 0.0, MAX_CAR_SPEED_KMH, self.car_speed);
        debug!(car_speed = self.car_speed, "car speed set");
    }

    /// Returns true when the DRS state actually changed.
    pub fn set_drs(&mut self, open: bool) -> bool {
        let changed = self.drs_open != open;
        self.drs_open = open;
        debug!(drs_open = open, changed, "DRS set");
        changed
    }

    pub fn set_min_distance(&mut self, distance: f32) {
        self.min_distance = clamp_or(
            distance,
            MIN_DISTANCE_RANGE.0,
            MIN_DISTANCE_RANGE.1,
            self.min_distance,
        );
        debug!(min_distance = self.min_distance, "min distance set");
    }

    pub fn set_vortex_intensity(&mut self, intensity: f32) {
        self.vortex_intensity = clamp_or(
            intensity,
            0.0,
            MAX_VORTEX_INTENSITY,
            self.vortex_intensity,
        );
        debug!(
            vortex_intensity = self.vortex_intensity,
            "vortex intensity set"
        );
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
        debug!(?mode, "color mode set");
    }

    pub fn set_relative_dynamics(&mut self, enabled: bool) {
        self.relative_dynamics = enabled;
        debug!(enabled, "relative dynamics set");
    }

    pub fn set_adaptive_density(&mut self, enabled: bool) {
        self.adaptive_density = enabled;
        debug!(enabled, "adaptive density set");
    }
}

/// Construction-time configuration for a [`crate::FlowSimulation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Total number of element slots, fixed for the simulation's lifetime
    pub line_budget: usize,
    /// Trail cap for streamlines
    pub points_per_line: usize,
    pub style: FlowStyle,
    pub car: CarGeometry,
    /// Seed for reproducible runs; `None` draws from the OS
    pub seed: Option<u64>,
    pub controls: ControlState,
}

impl Default for FlowConfig {
    fn default() -> Self {
        FlowConfig {
            line_budget: 600,
            points_per_line: 80,
            style: FlowStyle::Streamlines,
            car: CarGeometry::default(),
            seed: None,
            controls: ControlState::default(),
        }
    }
}

impl FlowConfig {
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for bad car geometry, a zero trail cap on
    /// streamlines, or an oversized line budget.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.car.validate()?;
        if self.style == FlowStyle::Streamlines && self.points_per_line == 0 {
            return Err(ConfigError::ZeroTrailLength);
        }
        if self.line_budget > MAX_LINE_BUDGET {
            return Err(ConfigError::BudgetTooLarge(self.line_budget));
        }
        Ok(())
    }

    /// History bound each element is created with.
    pub fn max_points(&self) -> usize {
        match self.style {
            FlowStyle::Streamlines => self.points_per_line,
            FlowStyle::Particles => 1,
        }
    }
}

/// Immutable view of the controls and geometry for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    pub car: CarGeometry,
    pub car_position: f32,
    pub car_speed: f32,
    pub drs_open: bool,
    pub min_distance: f32,
    pub vortex_intensity: f32,
    pub color_mode: ColorMode,
    pub relative_dynamics: bool,
    pub adaptive_density: bool,
}

impl SimulationParams {
    pub fn new(car: CarGeometry, controls: &ControlState) -> Self {
        SimulationParams {
            car,
            car_position: controls.car_position,
            car_speed: controls.car_speed,
            drs_open: controls.drs_open,
            min_distance: controls.min_distance,
            vortex_intensity: controls.vortex_intensity,
            color_mode: controls.color_mode,
            relative_dynamics: controls.relative_dynamics,
            adaptive_density: controls.adaptive_density,
        }
    }

    /// Car speed relative to [`REFERENCE_SPEED_KMH`].
    #[inline]
    pub fn speed_factor(&self) -> f32 {
        self.car_speed / REFERENCE_SPEED_KMH
    }

    /// World-space translation of the car frame.
    #[inline]
    pub fn car_offset(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.car_position)
    }

    #[inline]
    pub fn to_car_frame(&self, world: Vec3) -> Vec3 {
        world - self.car_offset()
    }

    #[inline]
    pub fn to_world(&self, offset: Vec3) -> Vec3 {
        offset + self.car_offset()
    }

    /// Spacing multiplier for seeding into `zone`.
    pub fn spacing_multiplier(&self, zone: ZoneType) -> f32 {
        if !self.adaptive_density {
            return 1.0;
        }
        match zone {
            ZoneType::FrontWing => FRONT_WING_SPACING,
            ZoneType::Floor => FLOOR_SPACING,
            _ => 1.0,
        }
    }

    /// Minimum spacing between seeds in `zone`.
    pub fn spacing(&self, zone: ZoneType) -> f32 {
        self.min_distance * self.spacing_multiplier(zone)
    }

    /// Minimum spacing for fallback slots.
    pub fn fallback_spacing(&self) -> f32 {
        self.min_distance * FALLBACK_SPACING
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams::new(CarGeometry::default(), &ControlState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config_is_valid() {
        let config = FlowConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_points(), 80);
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let mut config = FlowConfig::default();
        config.car.width = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidGeometry {
                field: "width",
                value: 0.0
            })
        );

        config.car.width = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_trail_only_rejected_for_streamlines() {
        let mut config = FlowConfig {
            points_per_line: 0,
            ..FlowConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTrailLength));

        config.style = FlowStyle::Particles;
        assert!(config.validate().is_ok());
        assert_eq!(config.max_points(), 1);
    }

    #[test]
    fn test_setters_clamp() {
        let mut controls = ControlState::default();

        controls.set_vortex_intensity(5.0);
        assert_eq!(controls.vortex_intensity, 2.0);
        controls.set_vortex_intensity(-1.0);
        assert_eq!(controls.vortex_intensity, 0.0);

        controls.set_car_speed(900.0);
        assert_eq!(controls.car_speed, MAX_CAR_SPEED_KMH);
        controls.set_car_speed(f32::NAN);
        assert_eq!(controls.car_speed, MAX_CAR_SPEED_KMH);

        controls.set_min_distance(0.0);
        assert_eq!(controls.min_distance, MIN_DISTANCE_RANGE.0);

        controls.set_car_position(f32::INFINITY);
        assert_eq!(controls.car_position, -50.0);
    }

    #[test]
    fn test_drs_reports_change() {
        let mut controls = ControlState::default();
        assert!(!controls.set_drs(false));
        assert!(controls.set_drs(true));
        assert!(!controls.set_drs(true));
    }

    #[test]
    fn test_sanitized_deserialized_controls() {
        let controls: ControlState =
            serde_json::from_str(r#"{"car_speed": 9000.0, "vortex_intensity": 3.5}"#).unwrap();
        let controls = controls.sanitized();
        assert_eq!(controls.car_speed, MAX_CAR_SPEED_KMH);
        assert_eq!(controls.vortex_intensity, MAX_VORTEX_INTENSITY);
        assert_eq!(controls.car_position, -50.0);
    }

    #[test]
    fn test_params_snapshot() {
        let params = SimulationParams::default();
        assert_relative_eq!(params.speed_factor(), 1.6);
        assert_eq!(params.car_offset(), Vec3::new(0.0, 0.0, -50.0));

        let world = params.to_world(Vec3::new(1.0, 0.5, 2.0));
        assert_relative_eq!(world.z, -48.0);
        assert_relative_eq!(params.to_car_frame(world).z, 2.0);
    }

    #[test]
    fn test_adaptive_spacing() {
        let mut params = SimulationParams::default();
        assert_relative_eq!(params.spacing(ZoneType::FrontWing), 0.04);
        assert_relative_eq!(params.spacing(ZoneType::Floor), 0.035);
        assert_relative_eq!(params.spacing(ZoneType::Top), 0.05);
        assert_relative_eq!(params.fallback_spacing(), 0.025);

        params.adaptive_density = false;
        assert_relative_eq!(params.spacing(ZoneType::FrontWing), 0.05);
        assert_relative_eq!(params.fallback_spacing(), 0.025);
    }
}
