//! Per-element state machine: Seeded, Active, Expired, then reseeded in
//! place. There is no terminal state.

use crate::color;
use crate::core_types::FlowRng;
use crate::element::{FlowElement, Motion};
use crate::forces::{self, FieldSample};
use crate::params::SimulationParams;
use std::f32::consts::TAU;

/// Reseed position and direction jitter per unit of speed factor.
pub const RESEED_JITTER: f32 = 0.02;
/// A reseed draws its lifetime from this multiple of the base life.
pub const RESEED_LIFE_RANGE: (f32, f32) = (0.8, 1.2);

/// What a tick did to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The head moved along the field
    Advanced,
    /// Life ran out; the element restarted at its seed offset
    Reseeded,
    /// Non-positive or non-finite `dt`; nothing changed
    Skipped,
}

/// Advance one element by `dt` seconds.
///
/// With relative dynamics on, stored history is first translated by the
/// car's movement since this element last looked, so trails stay attached
/// to the car. The last observed car position is always updated, and the
/// element's speed is refreshed from the snapshot's speed factor.
pub fn advance(
    element: &mut FlowElement,
    params: &SimulationParams,
    dt: f32,
    rng: &mut FlowRng,
) -> TickOutcome {
    if !dt.is_finite() || dt <= 0.0 {
        return TickOutcome::Skipped;
    }

    let car_delta = params.car_position - element.last_car_position;
    if params.relative_dynamics && car_delta != 0.0 {
        element.translate_history(car_delta);
    }
    element.last_car_position = params.car_position;

    element.life -= dt;
    if element.life <= 0.0 {
        reseed(element, params, rng);
        return TickOutcome::Reseeded;
    }

    // Live elements follow the car speed of this tick's snapshot
    element.speed = element.velocity * params.speed_factor();
    let sample = forces::evaluate(element, params, dt, rng);
    apply(element, &sample);

    let head = element.head() + sample.displacement;
    let color = color::head_color(element, params);
    element.push_head(head, color);
    TickOutcome::Advanced
}

/// Apply the derived-field half of an evaluation.
fn apply(element: &mut FlowElement, sample: &FieldSample) {
    if let Some(pressure) = sample.pressure {
        element.pressure = pressure;
    }
    if let (Some(new_phase), Motion::Vortex { phase, .. }) =
        (sample.vortex_phase, &mut element.motion)
    {
        *phase = new_phase;
    }
}

/// Restart `element` near its fixed car-frame seed offset.
///
/// Position and direction get a small jitter that grows with car speed, the
/// lifetime is redrawn around the zone's base life, and speed picks up the
/// current speed factor.
pub fn reseed(element: &mut FlowElement, params: &SimulationParams, rng: &mut FlowRng) {
    let sf = params.speed_factor();
    let jitter = RESEED_JITTER * sf;

    let offset = element.initial_offset + rng.jitter_vec(jitter);
    let direction = element.base_direction + rng.jitter_vec(jitter);
    element.direction = direction
        .try_normalize(f32::EPSILON)
        .unwrap_or(element.base_direction);

    element.initial_life =
        element.base_life * rng.range(RESEED_LIFE_RANGE.0, RESEED_LIFE_RANGE.1);
    element.life = element.initial_life;
    element.pressure = element.base_pressure;
    element.speed = element.velocity * sf;
    if let Motion::Vortex { phase, .. } = &mut element.motion {
        *phase = rng.range(0.0, TAU);
    }
    element.last_car_position = params.car_position;

    let color = color::head_color(element, params);
    element.reset_history(params.to_world(offset), color);
}
