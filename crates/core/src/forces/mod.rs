//! Force field evaluator.
//!
//! A composition of zone-triggered perturbations on top of straight
//! advection, not a fluid solver. Evaluation is read-only: derived updates
//! (floor pressure, vortex phase) come back in the [`FieldSample`] and the
//! advance engine applies them.

pub mod constants;

use crate::core_types::{FlowRng, Vec3, ZoneType};
use crate::element::{FlowElement, Motion};
use crate::params::SimulationParams;
use constants::{
    BODY_DEFLECTION, BODY_FLOOR, BODY_HALF_LENGTH, BODY_HALF_WIDTH, BODY_ROOF, DIFFUSER_EXPANSION,
    DIFFUSER_LIFT, DRS_DOWNFORCE_SCALE, DRS_REAR_PUSH, DRS_TURBULENCE_SCALE, DRS_WAKE_END,
    DRS_WAKE_HALF_WIDTH, DRS_WAKE_UPWASH, FLOOR_PRESSURE, FRONT_WING_DOWNFORCE,
    FRONT_WING_HALF_SPAN, FRONT_WING_SPLIT, FRONT_WING_TIP, FRONT_WING_TIP_KICK, FRONT_WING_TOP,
    FRONT_WING_UPWASH, FRONT_WING_Z, GROUND_EFFECT_HALF_LENGTH, GROUND_EFFECT_HALF_WIDTH,
    GROUND_EFFECT_TOP, GROUND_HUG, REAR_TURBULENCE, REAR_TURBULENCE_END, REAR_WING_DOWNFORCE,
    REAR_WING_HALF_SPAN, REAR_WING_PUSH, REAR_WING_Y, REAR_WING_Z, REFERENCE_FRAME_RATE,
    ROAD_CLEARANCE, TURBULENCE, VENTURI_ACCELERATION, VENTURI_PULL, VORTEX_FALLOFF,
    VORTEX_PHASE_RATE, VORTEX_RADIUS, VORTEX_TURBULENCE, WAKE_DECAY, WAKE_START, WAKE_STRENGTH,
    WAKE_UPWASH,
};

/// One evaluation's output.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FieldSample {
    /// World-space head displacement for this tick
    pub displacement: Vec3,
    /// New pressure, when the evaluation changed it
    pub pressure: Option<f32>,
    /// Advanced spiral phase for vortex elements
    pub vortex_phase: Option<f32>,
}

/// `0.5 + 0.5 * speed_factor`, the common speed scaling of perturbations.
#[inline]
fn speed_scale(speed_factor: f32) -> f32 {
    0.5 + 0.5 * speed_factor
}

#[inline]
fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Evaluate the field at `element`'s head.
pub fn evaluate(
    element: &FlowElement,
    params: &SimulationParams,
    dt: f32,
    rng: &mut FlowRng,
) -> FieldSample {
    match *element.motion() {
        Motion::Vortex {
            strength,
            phase,
            core,
            ..
        } => vortex_motion(element, strength, phase, core, params, dt, rng),
        Motion::Laminar => laminar_motion(element, params, dt, rng),
    }
}

fn laminar_motion(
    element: &FlowElement,
    params: &SimulationParams,
    dt: f32,
    rng: &mut FlowRng,
) -> FieldSample {
    let frame = dt * REFERENCE_FRAME_RATE;
    let sf = params.speed_factor();
    let rel = params.to_car_frame(element.head());

    let mut displacement = element.direction() * element.speed() * dt;
    displacement += body_deflection(rel, params) * frame;
    displacement += front_wing(rel, params) * frame;
    displacement += rear_wing(rel, params, rng) * frame;
    displacement += wake(rel, params) * frame;

    let mut pressure = None;
    if in_ground_effect(rel, params) {
        displacement = ground_effect(displacement, rel, params, frame);
        if element.zone() == ZoneType::Floor {
            pressure = Some(
                (element.pressure() * 0.5).clamp(FLOOR_PRESSURE.0, FLOOR_PRESSURE.1),
            );
        }
    }

    displacement += rng.jitter_vec(TURBULENCE * speed_scale(sf) * frame);

    FieldSample {
        displacement,
        pressure,
        vortex_phase: None,
    }
}

/// Push away from the nearest face of the body box, if inside it.
pub fn body_deflection(rel: Vec3, params: &SimulationParams) -> Vec3 {
    let car = &params.car;
    let half_w = BODY_HALF_WIDTH * car.width;
    let half_l = BODY_HALF_LENGTH * car.length;
    let floor = BODY_FLOOR * car.height;
    let roof = BODY_ROOF * car.height;

    let inside = rel.x.abs() < half_w && rel.y > floor && rel.y < roof && rel.z.abs() < half_l;
    if !inside {
        return Vec3::zeros();
    }

    // Distance to each face with its outward normal
    let faces = [
        (roof - rel.y, Vec3::y()),
        (rel.y - floor, -Vec3::y()),
        (half_w - rel.x.abs(), Vec3::x() * sign(rel.x)),
        (rel.z + half_l, -Vec3::z()),
        (half_l - rel.z, Vec3::z()),
    ];
    let normal = faces
        .iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map_or(Vec3::y(), |face| face.1);

    normal * BODY_DEFLECTION * speed_scale(params.speed_factor())
}

/// Downforce or upwash over the front wing, plus the lateral tip kick.
pub fn front_wing(rel: Vec3, params: &SimulationParams) -> Vec3 {
    let car = &params.car;
    let in_region = rel.z > FRONT_WING_Z.0 * car.length
        && rel.z < FRONT_WING_Z.1 * car.length
        && rel.x.abs() < FRONT_WING_HALF_SPAN * car.width
        && rel.y < FRONT_WING_TOP * car.height;
    if !in_region {
        return Vec3::zeros();
    }

    let mut push = if rel.y < FRONT_WING_SPLIT * car.height {
        Vec3::new(0.0, -FRONT_WING_DOWNFORCE, 0.0)
    } else {
        Vec3::new(0.0, FRONT_WING_UPWASH, 0.0)
    };

    if rel.x.abs() > FRONT_WING_TIP * car.width {
        push.x += sign(rel.x) * FRONT_WING_TIP_KICK;
        push.y += FRONT_WING_TIP_KICK * 0.5;
    }
    push
}

/// Rear wing downforce and rearward push, DRS-aware, with turbulence in
/// the band just behind the wing.
pub fn rear_wing(rel: Vec3, params: &SimulationParams, rng: &mut FlowRng) -> Vec3 {
    let car = &params.car;
    let laterally_inside = rel.x.abs() < REAR_WING_HALF_SPAN * car.width
        && rel.y > REAR_WING_Y.0 * car.height
        && rel.y < REAR_WING_Y.1 * car.height;
    if !laterally_inside {
        return Vec3::zeros();
    }

    if rel.z > REAR_WING_Z.0 * car.length && rel.z < REAR_WING_Z.1 * car.length {
        let (downforce, push) = if params.drs_open {
            (REAR_WING_DOWNFORCE * DRS_DOWNFORCE_SCALE, DRS_REAR_PUSH)
        } else {
            (REAR_WING_DOWNFORCE, REAR_WING_PUSH)
        };
        return Vec3::new(0.0, -downforce, push);
    }

    if rel.z >= REAR_WING_Z.1 * car.length && rel.z <= REAR_TURBULENCE_END * car.length {
        let amount = if params.drs_open {
            REAR_TURBULENCE * DRS_TURBULENCE_SCALE
        } else {
            REAR_TURBULENCE
        };
        return rng.jitter_vec(amount);
    }

    Vec3::zeros()
}

/// Inward curl and upwash behind the car, decaying with distance.
pub fn wake(rel: Vec3, params: &SimulationParams) -> Vec3 {
    let car = &params.car;
    let start = WAKE_START * car.length;
    if rel.z <= start {
        return Vec3::zeros();
    }

    let strength = WAKE_STRENGTH * (-(rel.z - start) / WAKE_DECAY).exp();
    let speed_multiplier = 0.8 + params.speed_factor() * 0.4;

    let upwash = if params.drs_open
        && rel.x.abs() < DRS_WAKE_HALF_WIDTH * car.width
        && rel.z < DRS_WAKE_END * car.length
    {
        DRS_WAKE_UPWASH
    } else {
        WAKE_UPWASH
    };

    Vec3::new(
        -sign(rel.x) * strength * speed_multiplier,
        strength * upwash * speed_multiplier,
        0.0,
    )
}

/// True under the floor, where the venturi accelerates the flow.
pub fn in_ground_effect(rel: Vec3, params: &SimulationParams) -> bool {
    let car = &params.car;
    rel.y < GROUND_EFFECT_TOP * car.height
        && rel.x.abs() < GROUND_EFFECT_HALF_WIDTH * car.width
        && rel.z.abs() < GROUND_EFFECT_HALF_LENGTH * car.length
}

/// Venturi acceleration ahead of the midpoint, diffuser expansion past it.
fn ground_effect(mut d: Vec3, rel: Vec3, params: &SimulationParams, frame: f32) -> Vec3 {
    let car = &params.car;
    d.z *= VENTURI_ACCELERATION * (1.0 + 0.5 * params.speed_factor());
    d.y *= GROUND_HUG;

    if rel.z <= 0.0 {
        d.y -= VENTURI_PULL * frame;
    } else {
        let t = (rel.z / (GROUND_EFFECT_HALF_LENGTH * car.length)).clamp(0.0, 1.0);
        d.x += sign(rel.x) * DIFFUSER_EXPANSION * t * frame;
        d.y += DIFFUSER_LIFT * t * frame;
    }

    // Keep the flow above the road
    let floor = ROAD_CLEARANCE - rel.y;
    if d.y < floor {
        d.y = floor;
    }
    d
}

/// Spiral around the element's anchor core with constant forward drift.
fn vortex_motion(
    element: &FlowElement,
    strength: f32,
    phase: f32,
    core: Vec3,
    params: &SimulationParams,
    dt: f32,
    rng: &mut FlowRng,
) -> FieldSample {
    let frame = dt * REFERENCE_FRAME_RATE;
    let sf = params.speed_factor();
    let rel = params.to_car_frame(element.head());

    let phase = phase + VORTEX_PHASE_RATE * sf * frame;
    let rotation_speed = speed_scale(sf);

    let axis_distance = (rel.xy() - core.xy()).norm();
    let radius = strength
        * VORTEX_RADIUS
        * params.vortex_intensity
        * (1.0 - (axis_distance / VORTEX_FALLOFF).min(1.0))
        * frame;

    let angle = phase * rotation_speed;
    let turbulence = VORTEX_TURBULENCE * speed_scale(sf) * frame;
    let displacement = Vec3::new(
        radius * angle.cos() + rng.jitter(turbulence),
        radius * angle.sin() + rng.jitter(turbulence),
        element.speed() * dt,
    );

    FieldSample {
        displacement,
        pressure: None,
        vortex_phase: Some(phase),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> SimulationParams {
        SimulationParams {
            car_position: 0.0,
            ..SimulationParams::default()
        }
    }

    #[test]
    fn test_body_pushes_out_of_nearest_face() {
        let p = params();
        // Just under the roof (0.8H) in the middle of the car
        let roof = body_deflection(Vec3::new(0.0, 0.75, 0.0), &p);
        assert!(roof.y > 0.0);
        assert_eq!(roof.x, 0.0);

        // Near the starboard flank
        let flank = body_deflection(Vec3::new(0.38, 0.5, 0.0), &p);
        assert!(flank.x > 0.0);

        // Near the nose of the body box
        let nose = body_deflection(Vec3::new(0.0, 0.5, -1.7), &p);
        assert!(nose.z < 0.0);

        assert_eq!(body_deflection(Vec3::new(0.0, 2.0, 0.0), &p), Vec3::zeros());
    }

    #[test]
    fn test_front_wing_split() {
        let p = params();
        let low = front_wing(Vec3::new(0.0, 0.1, -2.6), &p);
        assert_relative_eq!(low.y, -FRONT_WING_DOWNFORCE);
        let high = front_wing(Vec3::new(0.0, 0.25, -2.6), &p);
        assert_relative_eq!(high.y, FRONT_WING_UPWASH);
        let tip = front_wing(Vec3::new(-1.0, 0.1, -2.6), &p);
        assert!(tip.x < 0.0);
    }

    #[test]
    fn test_drs_reduces_rear_downforce() {
        let mut p = params();
        let mut rng = FlowRng::from_seed(1);
        let on_wing = Vec3::new(0.0, 0.8, 2.0);

        let closed = rear_wing(on_wing, &p, &mut rng);
        p.drs_open = true;
        let open = rear_wing(on_wing, &p, &mut rng);

        assert!(closed.y < open.y);
        assert!(open.y < 0.0);
        assert!(open.z > closed.z);
    }

    #[test]
    fn test_wake_curls_inward_and_decays() {
        let p = params();
        let near = wake(Vec3::new(0.5, 0.5, 2.0), &p);
        let far = wake(Vec3::new(0.5, 0.5, 8.0), &p);
        assert!(near.x < 0.0);
        assert!(near.x.abs() > far.x.abs());
        assert!(wake(Vec3::new(-0.5, 0.5, 2.0), &p).x > 0.0);
        assert_eq!(wake(Vec3::new(0.5, 0.5, 1.0), &p), Vec3::zeros());
    }

    #[test]
    fn test_ground_effect_accelerates_and_stays_above_road() {
        let p = params();
        let rel = Vec3::new(0.2, 0.02, -1.0);
        assert!(in_ground_effect(rel, &p));

        let base = Vec3::new(0.0, -0.5, 0.1);
        let d = ground_effect(base, rel, &p, 1.0);
        assert!(d.z > base.z);
        assert!(rel.y + d.y >= ROAD_CLEARANCE - 1e-6);

        let diffuser = ground_effect(Vec3::new(0.0, 0.0, 0.1), Vec3::new(0.2, 0.05, 1.5), &p, 1.0);
        assert!(diffuser.x > 0.0);
        assert!(diffuser.y > 0.0);
    }
}
