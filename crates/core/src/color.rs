//! Derived attribute mapping: pressure, zone, velocity, life, and vortex
//! identity in; an RGBA sample out. Every channel it emits lies in [0, 1].

use crate::core_types::{Rgb, Rgba, ZoneType};
use crate::element::{FlowElement, Motion, VortexSource};
use crate::params::{ColorMode, SimulationParams};

/// Alpha never drops below this, so live trails never vanish outright.
pub const MIN_ALPHA: f32 = 0.1;

const VORTEX_ALPHA: f32 = 0.9;

// Pressure gradient stops
const LOW_BLUE: Rgb = Rgb::new(0.0, 0.3, 1.0);
const TEAL: Rgb = Rgb::new(0.0, 0.7, 0.7);
const GREEN: Rgb = Rgb::new(0.0, 0.7, 0.3);
const YELLOW: Rgb = Rgb::new(0.7, 0.7, 0.0);
const ORANGE: Rgb = Rgb::new(1.0, 0.5, 0.0);
const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);

/// Five-band piecewise-linear pressure gradient.
///
/// | pressure  | color            |
/// |-----------|------------------|
/// | < 0.2     | blue             |
/// | 0.2 - 0.4 | blue to teal     |
/// | 0.4 - 0.6 | green to yellow  |
/// | 0.6 - 0.8 | yellow to orange |
/// | >= 0.8    | orange to red    |
pub fn pressure_gradient(pressure: f32) -> Rgb {
    let p = if pressure.is_nan() { 0.0 } else { pressure };
    let band = |lo: f32| (p - lo) / 0.2;
    if p < 0.2 {
        LOW_BLUE
    } else if p < 0.4 {
        LOW_BLUE.lerp(TEAL, band(0.2))
    } else if p < 0.6 {
        GREEN.lerp(YELLOW, band(0.4))
    } else if p < 0.8 {
        YELLOW.lerp(ORANGE, band(0.6))
    } else {
        ORANGE.lerp(RED, band(0.8))
    }
}

/// Fixed per-zone color for zone mode.
pub fn zone_color(zone: ZoneType) -> Rgb {
    match zone {
        ZoneType::FrontWing => Rgb::new(0.9, 0.2, 0.2),
        ZoneType::Top => Rgb::new(0.2, 0.7, 0.2),
        ZoneType::Side => Rgb::new(0.2, 0.5, 0.9),
        ZoneType::RearWing => Rgb::new(0.9, 0.7, 0.2),
        ZoneType::Floor => Rgb::new(0.9, 0.2, 0.9),
        ZoneType::VortexCore => Rgb::GRAY,
    }
}

/// Saturated vortex palette, brightened by strength.
pub fn vortex_color(source: VortexSource, drs_open: bool, strength: f32) -> Rgb {
    let base = match (source, drs_open) {
        (VortexSource::FrontWing, _) => Rgb::new(0.2, 0.5, 1.0),
        (VortexSource::RearWing, true) => Rgb::new(1.0, 0.8, 0.2),
        (VortexSource::RearWing, false) => Rgb::new(1.0, 0.4, 0.1),
    };
    base.scale(0.7 + strength * 0.3).clamped()
}

/// Brightness multiplier from velocity magnitude, in [0.5, 1.5].
pub fn velocity_brightness(velocity: f32) -> f32 {
    if velocity.is_nan() {
        1.0
    } else {
        (velocity / 10.0).clamp(0.5, 1.5)
    }
}

#[inline]
fn alpha_floor(alpha: f32) -> f32 {
    if alpha.is_nan() {
        MIN_ALPHA
    } else {
        alpha.clamp(MIN_ALPHA, 1.0)
    }
}

/// Color of a freshly pushed head sample.
pub fn head_color(element: &FlowElement, params: &SimulationParams) -> Rgba {
    let life_ratio = element.life_ratio();
    match *element.motion() {
        Motion::Vortex {
            strength, source, ..
        } => vortex_color(source, params.drs_open, strength)
            .with_alpha(alpha_floor(life_ratio * VORTEX_ALPHA)),
        Motion::Laminar => {
            let base = match params.color_mode {
                ColorMode::Pressure => pressure_gradient(element.pressure()),
                ColorMode::Zone => zone_color(element.zone()),
            };
            base.scale(velocity_brightness(element.velocity()))
                .clamped()
                .with_alpha(alpha_floor(life_ratio))
        }
    }
}

/// Fade a stored sample's alpha by its position along the trail,
/// `t = 0` at the head and `t = 1` at the tail.
pub fn trail_alpha(base_alpha: f32, t: f32) -> f32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    alpha_floor(base_alpha * (1.0 - t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Vec3;
    use crate::element::ElementSeed;
    use approx::assert_relative_eq;

    fn assert_rgb_near(actual: Rgb, expected: Rgb) {
        for (a, e) in actual.to_array().into_iter().zip(expected.to_array()) {
            assert_relative_eq!(a, e, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_gradient_band_edges() {
        assert_rgb_near(pressure_gradient(0.0), LOW_BLUE);
        assert_rgb_near(pressure_gradient(0.2), LOW_BLUE);
        assert_rgb_near(pressure_gradient(0.4), GREEN);
        assert_rgb_near(pressure_gradient(0.6), YELLOW);
        assert_rgb_near(pressure_gradient(0.8), ORANGE);
        assert_rgb_near(pressure_gradient(1.0), RED);

        let mid = pressure_gradient(0.3);
        assert_relative_eq!(mid.g, 0.5, epsilon = 1e-5);
        assert_relative_eq!(mid.b, 0.85, epsilon = 1e-5);
    }

    #[test]
    fn test_gradient_out_of_range_stays_in_unit() {
        for p in [-3.0, 1.7, f32::NAN, f32::INFINITY] {
            let c = pressure_gradient(p);
            for channel in c.to_array() {
                assert!((0.0..=1.0).contains(&channel), "p={p} gave {c:?}");
            }
        }
    }

    #[test]
    fn test_trail_alpha_floor() {
        assert_eq!(trail_alpha(1.0, 0.0), 1.0);
        assert_eq!(trail_alpha(1.0, 1.0), MIN_ALPHA);
        assert_relative_eq!(trail_alpha(0.8, 0.5), 0.4);
        assert_eq!(trail_alpha(0.0, 0.0), MIN_ALPHA);
    }

    #[test]
    fn test_vortex_palette_by_drs() {
        let open = vortex_color(VortexSource::RearWing, true, 1.0);
        let closed = vortex_color(VortexSource::RearWing, false, 1.0);
        assert!(open.g > closed.g);
        assert_rgb_near(
            vortex_color(VortexSource::FrontWing, true, 0.0),
            Rgb::new(0.14, 0.35, 0.7),
        );
    }

    #[test]
    fn test_head_color_channels_in_range() {
        let mut params = SimulationParams::default();
        for mode in [ColorMode::Pressure, ColorMode::Zone] {
            params.color_mode = mode;
            for zone in ZoneType::LAMINAR {
                for (pressure, velocity) in [(0.0, 0.0), (1.0, 12.0), (0.5, 30.0)] {
                    let seed = ElementSeed {
                        zone,
                        motion: Motion::Laminar,
                        offset: Vec3::zeros(),
                        direction: Vec3::z(),
                        pressure,
                        velocity,
                        base_life: 4.0,
                    };
                    let mut element =
                        FlowElement::new(&seed, 4, false, Vec3::zeros(), 1.0, 0.0);
                    for life in [4.0, 0.0] {
                        element.life = life;
                        let c = head_color(&element, &params);
                        for channel in c.to_array() {
                            assert!((0.0..=1.0).contains(&channel));
                        }
                        assert!(c.a >= MIN_ALPHA);
                    }
                }
            }
        }
    }
}
