//! Empirical force-field magnitudes.
//!
//! Displacement terms are metres per 60 Hz reference frame and get scaled by
//! `dt * 60` at evaluation. Region bounds are fractions of car length (L),
//! width (W), and height (H) in the car frame.

/// Frame rate the per-frame magnitudes were tuned at.
pub const REFERENCE_FRAME_RATE: f32 = 60.0;

// Car body: |x| < 0.2W, 0.15H < y < 0.8H, |z| < 0.35L
pub const BODY_HALF_WIDTH: f32 = 0.2;
pub const BODY_FLOOR: f32 = 0.15;
pub const BODY_ROOF: f32 = 0.8;
pub const BODY_HALF_LENGTH: f32 = 0.35;
pub const BODY_DEFLECTION: f32 = 0.03;

// Front wing: -0.6L < z < -0.4L, |x| < 0.6W, y < 0.35H
pub const FRONT_WING_Z: (f32, f32) = (-0.6, -0.4);
pub const FRONT_WING_HALF_SPAN: f32 = 0.6;
pub const FRONT_WING_TOP: f32 = 0.35;
/// Below this height the wing pulls flow down, above it pushes it up.
pub const FRONT_WING_SPLIT: f32 = 0.15;
pub const FRONT_WING_DOWNFORCE: f32 = 0.025;
pub const FRONT_WING_UPWASH: f32 = 0.01;
/// Lateral distance past which the tip kick applies.
pub const FRONT_WING_TIP: f32 = 0.45;
pub const FRONT_WING_TIP_KICK: f32 = 0.015;

// Rear wing: 0.3L < z < 0.5L, |x| < 0.5W, 0.5H < y < 1.1H
pub const REAR_WING_Z: (f32, f32) = (0.3, 0.5);
pub const REAR_WING_HALF_SPAN: f32 = 0.5;
pub const REAR_WING_Y: (f32, f32) = (0.5, 1.1);
pub const REAR_WING_DOWNFORCE: f32 = 0.04;
/// Downforce multiplier with the flap open.
pub const DRS_DOWNFORCE_SCALE: f32 = 0.4;
pub const REAR_WING_PUSH: f32 = 0.02;
pub const DRS_REAR_PUSH: f32 = 0.035;
/// Turbulent band directly behind the wing ends at this z.
pub const REAR_TURBULENCE_END: f32 = 0.7;
pub const REAR_TURBULENCE: f32 = 0.02;
pub const DRS_TURBULENCE_SCALE: f32 = 0.5;

// Ground effect: y < 0.2H, |x| < 0.4W, |z| < 0.4L
pub const GROUND_EFFECT_TOP: f32 = 0.2;
pub const GROUND_EFFECT_HALF_WIDTH: f32 = 0.4;
pub const GROUND_EFFECT_HALF_LENGTH: f32 = 0.4;
pub const VENTURI_ACCELERATION: f32 = 1.2;
pub const GROUND_HUG: f32 = 0.8;
pub const VENTURI_PULL: f32 = 0.002;
pub const DIFFUSER_EXPANSION: f32 = 0.012;
pub const DIFFUSER_LIFT: f32 = 0.01;
/// Flow under the floor never dips below this height (metres).
pub const ROAD_CLEARANCE: f32 = 0.01;
/// Floor pressure under the car stays inside this band.
pub const FLOOR_PRESSURE: (f32, f32) = (0.05, 0.2);

// Wake: z > 0.3L
pub const WAKE_START: f32 = 0.3;
pub const WAKE_STRENGTH: f32 = 0.05;
/// e-folding distance of the wake (metres).
pub const WAKE_DECAY: f32 = 2.0;
pub const WAKE_UPWASH: f32 = 0.5;
pub const DRS_WAKE_UPWASH: f32 = 0.3;
/// DRS-reduced upwash region: |x| < 0.3W, z < 0.6L
pub const DRS_WAKE_HALF_WIDTH: f32 = 0.3;
pub const DRS_WAKE_END: f32 = 0.6;

pub const TURBULENCE: f32 = 0.01;

// Vortex spiral
pub const VORTEX_PHASE_RATE: f32 = 0.1;
pub const VORTEX_RADIUS: f32 = 0.1;
/// Spiral radius reaches zero this far (metres) from the core axis.
pub const VORTEX_FALLOFF: f32 = 2.0;
pub const VORTEX_TURBULENCE: f32 = 0.005;
