//! Behavioural properties of seeding, aging, trails, colors, and anchoring
use aero_flow_core::core_types::SpatialIndex;
use aero_flow_core::lifecycle::{advance, TickOutcome};
use aero_flow_core::{
    FlowElement, FlowRng, FlowStyle, Seeder, SimulationParams, Vec3, ZoneType,
};
use approx::assert_relative_eq;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Seed exactly `count` front-wing elements, retrying saturated slots.
fn seed_front_wing(count: usize, params: &SimulationParams, rng: &mut FlowRng) -> Vec<FlowElement> {
    let seeder = Seeder::new(FlowStyle::Streamlines, 80);
    let mut accepted = SpatialIndex::new(params.min_distance);
    let mut elements = Vec::with_capacity(count);
    let mut slot = 0;
    while elements.len() < count {
        if let Some(element) = seeder.seed(ZoneType::FrontWing, slot, params, &mut accepted, rng) {
            elements.push(element);
        }
        slot += 1;
        assert!(slot < count * 10, "front wing zone saturated");
    }
    elements
}

#[test]
fn test_front_wing_seed_spacing() {
    let params = SimulationParams {
        min_distance: 0.05,
        ..SimulationParams::default()
    };
    let mut rng = FlowRng::from_seed(100);
    let elements = seed_front_wing(100, &params, &mut rng);

    for (i, a) in elements.iter().enumerate() {
        for b in &elements[i + 1..] {
            let d = (a.head() - b.head()).norm();
            assert!(d >= 0.04 - 1e-5, "seeds {d} m apart");
        }
    }
}

#[test]
fn test_thousand_ticks_keep_count_and_life_bounds() {
    let params = SimulationParams::default();
    let mut rng = FlowRng::from_seed(101);
    let mut elements = seed_front_wing(100, &params, &mut rng);
    let dt = 0.016;

    for _ in 0..1000 {
        for element in &mut elements {
            let before = element.life();
            let outcome = advance(element, &params, dt, &mut rng);
            match outcome {
                TickOutcome::Advanced => {
                    assert!(element.life() < before);
                    assert!(element.life() > 0.0);
                }
                TickOutcome::Reseeded => {
                    let ratio = element.life() / element.base_life();
                    assert!((0.8..=1.2).contains(&ratio));
                }
                TickOutcome::Skipped => panic!("valid dt skipped"),
            }
            assert!(element.life() >= -dt);
            assert!(element.life() <= element.initial_life());
            assert!(element.len() <= element.max_points());
        }
        assert_eq!(elements.len(), 100);
    }
}

#[test]
fn test_trail_capacity_under_long_runs() {
    let params = SimulationParams::default();
    let mut rng = FlowRng::from_seed(102);
    let seeder = Seeder::new(FlowStyle::Streamlines, 12);
    let mut accepted = SpatialIndex::new(params.min_distance);
    let mut element = seeder
        .seed(ZoneType::Floor, 0, &params, &mut accepted, &mut rng)
        .unwrap();

    let mut longest = 0;
    for _ in 0..400 {
        advance(&mut element, &params, 0.02, &mut rng);
        assert!(element.len() <= 12);
        assert_eq!(element.points().len(), element.colors().len());
        longest = longest.max(element.len());
    }
    assert_eq!(longest, 12);
}

#[test]
fn test_colors_stay_in_unit_range() {
    let mut params = SimulationParams::default();
    let mut rng = FlowRng::from_seed(103);
    let seeder = Seeder::new(FlowStyle::Streamlines, 20);
    let mut accepted = SpatialIndex::new(params.min_distance);

    let mut elements: Vec<FlowElement> = ZoneType::ALL
        .iter()
        .filter_map(|zone| seeder.seed(*zone, 0, &params, &mut accepted, &mut rng))
        .collect();
    assert_eq!(elements.len(), ZoneType::ALL.len());

    for step in 0..600 {
        params.drs_open = step % 200 < 100;
        for element in &mut elements {
            advance(element, &params, 0.016, &mut rng);
            for color in element.colors() {
                for channel in color.to_array() {
                    assert!((0.0..=1.0).contains(&channel), "channel {channel}");
                }
                assert!(color.a >= 0.1);
            }
        }
    }
}

#[test]
fn test_relative_dynamics_anchors_history() {
    let mut params = SimulationParams::default();
    let mut rng = FlowRng::from_seed(104);
    let mut elements = seed_front_wing(10, &params, &mut rng);
    for _ in 0..10 {
        for element in &mut elements {
            advance(element, &params, 0.016, &mut rng);
        }
    }

    let d = 0.75;
    let before: Vec<Vec<Vec3>> = elements
        .iter()
        .map(|e| e.points().copied().collect())
        .collect();
    params.car_position += d;
    for element in &mut elements {
        assert_eq!(advance(element, &params, 0.016, &mut rng), TickOutcome::Advanced);
    }

    for (element, old) in elements.iter().zip(&before) {
        // New head first, then the shifted history
        for (new, old) in element.points().skip(1).zip(old) {
            assert_relative_eq!(new.z - old.z, d, epsilon = 1e-4);
            assert_eq!(new.y, old.y);
        }
    }
}

#[test]
fn test_world_anchored_history_without_relative_dynamics() {
    let mut params = SimulationParams {
        relative_dynamics: false,
        ..SimulationParams::default()
    };
    let mut rng = FlowRng::from_seed(105);
    let mut elements = seed_front_wing(5, &params, &mut rng);
    for element in &mut elements {
        advance(element, &params, 0.016, &mut rng);
    }
    let before: Vec<Vec<Vec3>> = elements
        .iter()
        .map(|e| e.points().copied().collect())
        .collect();

    params.car_position += 2.0;
    for element in &mut elements {
        advance(element, &params, 0.016, &mut rng);
    }
    for (element, old) in elements.iter().zip(&before) {
        for (new, old) in element.points().skip(1).zip(old) {
            assert_eq!(new, old);
        }
        assert_eq!(element.last_car_position(), params.car_position);
    }
}

#[test]
fn test_reseed_follows_moved_car() {
    let mut params = SimulationParams::default();
    let mut rng = FlowRng::from_seed(106);
    let mut element = seed_front_wing(1, &params, &mut rng).remove(0);

    params.car_position = 20.0;
    let dt = element.life() + 0.1;
    assert_eq!(advance(&mut element, &params, dt, &mut rng), TickOutcome::Reseeded);

    let relative = params.to_car_frame(element.head());
    let jitter = 0.02 * params.speed_factor();
    for (r, o) in relative.iter().zip(element.initial_offset().iter()) {
        assert!((r - o).abs() <= jitter + 1e-4);
    }
}

#[test]
fn test_population_spacing_without_adaptive_density() {
    let params = SimulationParams {
        min_distance: 0.08,
        adaptive_density: false,
        ..SimulationParams::default()
    };
    let mut rng = FlowRng::from_seed(107);
    let seeder = Seeder::new(FlowStyle::Streamlines, 80);
    let population = seeder.seed_population(600, &params, &mut rng);
    assert!(population.laminar.len() > 100);

    let offsets: Vec<Vec3> = population
        .laminar
        .iter()
        .map(FlowElement::initial_offset)
        .collect();
    for (i, a) in offsets.iter().enumerate() {
        for b in &offsets[i + 1..] {
            let d = (a - b).norm();
            assert!(d >= params.min_distance - 1e-5, "laminar seeds {d} m apart");
        }
    }
}
