//! Emission boxes and seed attributes per zone.
//!
//! All boxes are in the car frame: x across the car, y up from the road,
//! z along the travel axis with the car body spanning `[-L/2, L/2]`.

use crate::core_types::{FlowRng, Vec3, ZoneType};
use crate::element::VortexSource;
use crate::params::{CarGeometry, SimulationParams};

/// Uniform ranges (min, max) per axis. Equal bounds pin that axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneBox {
    pub x: (f32, f32),
    pub y: (f32, f32),
    pub z: (f32, f32),
}

impl ZoneBox {
    pub fn sample(&self, rng: &mut FlowRng) -> Vec3 {
        Vec3::new(
            rng.range(self.x.0, self.x.1),
            rng.range(self.y.0, self.y.1),
            rng.range(self.z.0, self.z.1),
        )
    }

    pub fn contains(&self, p: Vec3) -> bool {
        let within = |v: f32, (lo, hi): (f32, f32)| v >= lo && v <= hi;
        within(p.x, self.x) && within(p.y, self.y) && within(p.z, self.z)
    }
}

/// Attribute ranges drawn once per seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneProfile {
    pub pressure: (f32, f32),
    pub velocity: (f32, f32),
    pub life: (f32, f32),
    /// Advance direction before normalisation
    pub direction: Vec3,
}

const LAMINAR_LIFE: (f32, f32) = (3.0, 5.0);
const VORTEX_LIFE: (f32, f32) = (4.0, 6.0);
const VORTEX_VELOCITY: (f32, f32) = (6.0, 10.0);
const FRONT_VORTEX_PRESSURE: (f32, f32) = (0.2, 0.4);

/// Fixed share of the line budget per laminar zone.
pub fn zone_share(zone: ZoneType) -> f32 {
    match zone {
        ZoneType::FrontWing => 0.25,
        ZoneType::Top | ZoneType::Side | ZoneType::RearWing => 0.15,
        ZoneType::Floor => 0.20,
        ZoneType::VortexCore => 0.0,
    }
}

/// Emission box for a laminar zone. Side elements sit on the port or
/// starboard flank depending on `slot` parity. Vortex cores are anchored
/// rather than boxed and return `None`.
pub fn zone_box(zone: ZoneType, slot: usize, car: &CarGeometry) -> Option<ZoneBox> {
    let (l, w, h) = (car.length, car.width, car.height);
    let bounds = match zone {
        ZoneType::FrontWing => ZoneBox {
            x: (-0.6 * w, 0.6 * w),
            y: (0.05, 0.3 * h),
            z: (-0.5 * l - 0.2, -0.5 * l),
        },
        ZoneType::Top => ZoneBox {
            x: (-0.25 * w, 0.25 * w),
            y: (h, h + 0.2),
            z: (-0.3 * l, 0.3 * l),
        },
        ZoneType::Side => {
            let x = side_sign(slot) * 0.25 * w;
            ZoneBox {
                x: (x, x),
                y: (0.2, 0.5 * h),
                z: (-0.2 * l, 0.2 * l),
            }
        }
        ZoneType::RearWing => ZoneBox {
            x: (-0.45 * w, 0.45 * w),
            y: (0.45 * h, 0.9 * h),
            z: (0.4 * l, 0.4 * l),
        },
        ZoneType::Floor => ZoneBox {
            x: (-0.4 * w, 0.4 * w),
            y: (0.05, 0.05),
            z: (-0.3 * l, 0.3 * l),
        },
        ZoneType::VortexCore => return None,
    };
    Some(bounds)
}

/// Seed attributes for a laminar zone under the current DRS state.
pub fn zone_profile(zone: ZoneType, slot: usize, drs_open: bool) -> ZoneProfile {
    let laminar = |pressure, velocity, direction| ZoneProfile {
        pressure,
        velocity,
        life: LAMINAR_LIFE,
        direction,
    };
    match zone {
        ZoneType::FrontWing => laminar((0.7, 1.0), (5.0, 8.0), Vec3::z()),
        ZoneType::Top => laminar((0.3, 0.6), (7.0, 10.0), Vec3::z()),
        ZoneType::Side => laminar(
            (0.4, 0.7),
            (6.0, 9.0),
            Vec3::new(side_sign(slot) * 0.2, 0.0, 1.0),
        ),
        ZoneType::RearWing if drs_open => {
            laminar((0.1, 0.3), (5.0, 8.0), Vec3::new(0.0, 0.05, 1.0))
        }
        ZoneType::RearWing => laminar((0.1, 0.4), (4.0, 6.0), Vec3::new(0.0, 0.1, 1.0)),
        ZoneType::Floor => laminar((0.1, 0.3), (8.0, 12.0), Vec3::new(0.0, -0.05, 1.0)),
        ZoneType::VortexCore => ZoneProfile {
            pressure: FRONT_VORTEX_PRESSURE,
            velocity: VORTEX_VELOCITY,
            life: VORTEX_LIFE,
            direction: Vec3::z(),
        },
    }
}

#[inline]
fn side_sign(slot: usize) -> f32 {
    if slot % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Per-axis scatter around a vortex anchor (metres).
pub const VORTEX_JITTER: f32 = 0.05;
/// Relative spread of vortex strength around the anchor's nominal value.
pub const VORTEX_STRENGTH_SPREAD: f32 = 0.2;

/// A wing-tip (or DRS flap) point vortex lines are clustered around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VortexAnchor {
    pub position: Vec3,
    pub strength: f32,
    pub source: VortexSource,
}

impl VortexAnchor {
    /// Pressure range for lines shed from this anchor.
    pub fn pressure_range(&self, drs_open: bool) -> (f32, f32) {
        match (self.source, drs_open) {
            (VortexSource::FrontWing, _) => FRONT_VORTEX_PRESSURE,
            (VortexSource::RearWing, true) => (0.1, 0.2),
            (VortexSource::RearWing, false) => (0.3, 0.5),
        }
    }
}

/// Vortex anchors for the current geometry and DRS state.
pub fn vortex_anchors(params: &SimulationParams) -> Vec<VortexAnchor> {
    let car = &params.car;
    let half_span = car.width * 0.45;
    let front = |x: f32| VortexAnchor {
        position: Vec3::new(x, car.height * 0.21, -car.length * 0.5),
        strength: 0.8,
        source: VortexSource::FrontWing,
    };
    let rear_z = car.length * 0.4;
    let rear = |position: Vec3, strength: f32| VortexAnchor {
        position,
        strength,
        source: VortexSource::RearWing,
    };
    let tip_strength = if params.drs_open { 0.5 } else { 1.0 };

    let mut anchors = vec![
        front(half_span),
        front(-half_span),
        rear(Vec3::new(car.width * 0.405, car.height * 0.81, rear_z), tip_strength),
        rear(Vec3::new(-car.width * 0.405, car.height * 0.81, rear_z), tip_strength),
    ];

    // A closed flap sheds from its trailing edge and both edges
    if !params.drs_open {
        anchors.push(rear(Vec3::new(0.0, car.height * 0.855, rear_z + 0.1), 0.9));
        anchors.push(rear(
            Vec3::new(car.width * 0.27, car.height * 0.837, rear_z + 0.05),
            0.7,
        ));
        anchors.push(rear(
            Vec3::new(-car.width * 0.27, car.height * 0.837, rear_z + 0.05),
            0.7,
        ));
    }

    anchors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_laminar_shares_leave_room() {
        let total: f32 = ZoneType::LAMINAR.iter().map(|z| zone_share(*z)).sum();
        assert!((total - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_side_alternates() {
        let car = CarGeometry::default();
        let left = zone_box(ZoneType::Side, 0, &car).unwrap();
        let right = zone_box(ZoneType::Side, 1, &car).unwrap();
        assert!(left.x.0 > 0.0);
        assert!(right.x.0 < 0.0);
        assert!(zone_profile(ZoneType::Side, 0, false).direction.x > 0.0);
        assert!(zone_profile(ZoneType::Side, 1, false).direction.x < 0.0);
    }

    #[test]
    fn test_samples_stay_in_box() {
        let car = CarGeometry::default();
        let mut rng = FlowRng::from_seed(3);
        for zone in ZoneType::LAMINAR {
            let bounds = zone_box(zone, 0, &car).unwrap();
            for _ in 0..100 {
                assert!(bounds.contains(bounds.sample(&mut rng)));
            }
        }
        assert!(zone_box(ZoneType::VortexCore, 0, &car).is_none());
    }

    #[test]
    fn test_anchor_sets_follow_drs() {
        let mut params = SimulationParams::default();
        let closed = vortex_anchors(&params);
        assert_eq!(closed.len(), 7);
        assert_eq!(closed[2].strength, 1.0);

        params.drs_open = true;
        let open = vortex_anchors(&params);
        assert_eq!(open.len(), 4);
        assert_eq!(open[2].strength, 0.5);
        assert!(open
            .iter()
            .filter(|a| a.source == VortexSource::FrontWing)
            .all(|a| a.strength == 0.8));
    }
}
