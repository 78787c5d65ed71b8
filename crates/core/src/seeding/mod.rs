//! Spatial seeding: rejection-sampled placement of flow elements inside the
//! emission zones, plus the clustered vortex-core layout.

pub mod zones;

use crate::color;
use crate::core_types::{FlowRng, SpatialIndex, Vec3, ZoneType};
use crate::element::{ElementSeed, FlowElement, Motion};
use crate::params::{FlowStyle, SimulationParams};
use std::f32::consts::TAU;
use tracing::{debug, trace};
use zones::{
    vortex_anchors, zone_box, zone_profile, zone_share, VortexAnchor, VORTEX_JITTER,
    VORTEX_STRENGTH_SPREAD,
};

/// Candidate positions tried per slot before the slot is given up.
pub const MAX_SEED_ATTEMPTS: usize = 10;

/// Vortex lines per budget slot per unit of intensity.
const VORTEX_SHARE: f32 = 0.1;
/// Vortex lines never take more than this share of the budget.
const VORTEX_CAP_SHARE: f32 = 0.2;
const LINES_PER_ANCHOR: f32 = 3.0;

/// Result of seeding a full layout.
#[derive(Debug, Clone)]
pub struct Population {
    /// Zone-apportioned laminar elements
    pub laminar: Vec<FlowElement>,
    /// Looser-spaced elements filling slots the zones left over
    pub fallback: Vec<FlowElement>,
    pub vortices: Vec<FlowElement>,
    /// Car-frame offsets of every spaced seed (laminar and fallback)
    pub accepted: SpatialIndex,
    /// Budget slots left empty once fallback sampling gave up
    pub skipped: usize,
}

impl Population {
    pub fn len(&self) -> usize {
        self.laminar.len() + self.fallback.len() + self.vortices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Number of vortex lines for a budget and intensity.
pub fn vortex_count(budget: usize, intensity: f32) -> usize {
    let n = budget as f32;
    let wanted = (n * VORTEX_SHARE * intensity.max(0.0)).floor() as usize;
    wanted.min((n * VORTEX_CAP_SHARE).floor() as usize)
}

/// Lines clustered around each vortex anchor.
pub fn lines_per_anchor(intensity: f32) -> usize {
    ((LINES_PER_ANCHOR * intensity.max(0.0)).floor() as usize).max(1)
}

/// Creates elements in the configured style.
#[derive(Debug, Clone, Copy)]
pub struct Seeder {
    style: FlowStyle,
    max_points: usize,
}

impl Seeder {
    pub fn new(style: FlowStyle, max_points: usize) -> Self {
        Seeder { style, max_points }
    }

    /// Seed one element into `zone`.
    ///
    /// Laminar zones sample up to [`MAX_SEED_ATTEMPTS`] candidates and take
    /// the first one at least `params.spacing(zone)` away from every offset
    /// in `accepted`, then record it there. `None` means the slot saturated.
    /// Vortex cores use anchor `slot % anchors` and ignore spacing.
    pub fn seed(
        &self,
        zone: ZoneType,
        slot: usize,
        params: &SimulationParams,
        accepted: &mut SpatialIndex,
        rng: &mut FlowRng,
    ) -> Option<FlowElement> {
        if zone == ZoneType::VortexCore {
            let anchors = vortex_anchors(params);
            let anchor = anchors.get(slot % anchors.len().max(1))?;
            return Some(self.seed_vortex(anchor, params, rng));
        }
        self.seed_spaced(zone, slot, params.spacing(zone), params, accepted, rng)
    }

    fn seed_spaced(
        &self,
        zone: ZoneType,
        slot: usize,
        spacing: f32,
        params: &SimulationParams,
        accepted: &mut SpatialIndex,
        rng: &mut FlowRng,
    ) -> Option<FlowElement> {
        let bounds = zone_box(zone, slot, &params.car)?;

        for _ in 0..MAX_SEED_ATTEMPTS {
            let offset = bounds.sample(rng);
            if !accepted.is_clear(offset, spacing) {
                continue;
            }
            accepted.insert(offset);

            let profile = zone_profile(zone, slot, params.drs_open);
            let seed = ElementSeed {
                zone,
                motion: Motion::Laminar,
                offset,
                direction: profile.direction.normalize(),
                pressure: rng.range(profile.pressure.0, profile.pressure.1),
                velocity: rng.range(profile.velocity.0, profile.velocity.1),
                base_life: rng.range(profile.life.0, profile.life.1),
            };
            return Some(self.spawn(&seed, params));
        }

        trace!(%zone, slot, spacing, "seed slot saturated");
        None
    }

    fn seed_vortex(
        &self,
        anchor: &VortexAnchor,
        params: &SimulationParams,
        rng: &mut FlowRng,
    ) -> FlowElement {
        let profile = zone_profile(ZoneType::VortexCore, 0, params.drs_open);
        let (p_min, p_max) = anchor.pressure_range(params.drs_open);
        let motion = Motion::Vortex {
            strength: anchor.strength * (1.0 + rng.jitter(VORTEX_STRENGTH_SPREAD)),
            phase: rng.range(0.0, TAU),
            source: anchor.source,
            core: anchor.position,
        };
        let seed = ElementSeed {
            zone: ZoneType::VortexCore,
            motion,
            offset: anchor.position + rng.jitter_vec(VORTEX_JITTER),
            direction: Vec3::z(),
            pressure: rng.range(p_min, p_max),
            velocity: rng.range(profile.velocity.0, profile.velocity.1),
            base_life: rng.range(profile.life.0, profile.life.1),
        };
        self.spawn(&seed, params)
    }

    fn spawn(&self, seed: &ElementSeed, params: &SimulationParams) -> FlowElement {
        let mut element = FlowElement::new(
            seed,
            self.max_points,
            self.style == FlowStyle::Particles,
            params.to_world(seed.offset),
            params.speed_factor(),
            params.car_position,
        );
        element.set_head_color(color::head_color(&element, params));
        element
    }

    /// Vortex lines for the current intensity and DRS state, clustered
    /// around each anchor in turn until the count is reached.
    pub fn seed_vortices(
        &self,
        budget: usize,
        params: &SimulationParams,
        rng: &mut FlowRng,
    ) -> Vec<FlowElement> {
        let count = vortex_count(budget, params.vortex_intensity);
        let per_anchor = lines_per_anchor(params.vortex_intensity);
        let mut vortices = Vec::with_capacity(count);

        'anchors: for anchor in &vortex_anchors(params) {
            for _ in 0..per_anchor {
                if vortices.len() >= count {
                    break 'anchors;
                }
                vortices.push(self.seed_vortex(anchor, params, rng));
            }
        }

        debug!(
            requested = count,
            seeded = vortices.len(),
            drs_open = params.drs_open,
            "vortices seeded"
        );
        vortices
    }

    /// Fill `slots` with fallback elements from random laminar zones at the
    /// loose fallback spacing. Returns the elements and the skipped count.
    pub fn seed_fallback(
        &self,
        slots: usize,
        params: &SimulationParams,
        accepted: &mut SpatialIndex,
        rng: &mut FlowRng,
    ) -> (Vec<FlowElement>, usize) {
        let spacing = params.fallback_spacing();
        let mut elements = Vec::with_capacity(slots);
        let mut skipped = 0;

        for slot in 0..slots {
            let zone = ZoneType::LAMINAR[rng.index(ZoneType::LAMINAR.len())];
            match self.seed_spaced(zone, slot, spacing, params, accepted, rng) {
                Some(element) => elements.push(element),
                None => skipped += 1,
            }
        }
        (elements, skipped)
    }

    /// Seed a complete layout for `budget` slots.
    pub fn seed_population(
        &self,
        budget: usize,
        params: &SimulationParams,
        rng: &mut FlowRng,
    ) -> Population {
        let mut accepted = SpatialIndex::new(params.min_distance);
        let mut laminar = Vec::with_capacity(budget);

        for zone in ZoneType::LAMINAR {
            let slots = (budget as f32 * zone_share(zone)) as usize;
            // Saturated slots fall through to fallback sampling
            laminar.extend(
                (0..slots).filter_map(|slot| self.seed(zone, slot, params, &mut accepted, rng)),
            );
        }

        let mut vortices = self.seed_vortices(budget, params, rng);
        vortices.truncate(budget.saturating_sub(laminar.len()));

        let remaining = budget.saturating_sub(laminar.len() + vortices.len());
        let (fallback, skipped) = self.seed_fallback(remaining, params, &mut accepted, rng);

        debug!(
            budget,
            laminar = laminar.len(),
            fallback = fallback.len(),
            vortices = vortices.len(),
            skipped,
            "population seeded"
        );

        Population {
            laminar,
            fallback,
            vortices,
            accepted,
            skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vortex_count_scaling() {
        assert_eq!(vortex_count(600, 0.0), 0);
        assert_eq!(vortex_count(600, 1.0), 60);
        // 10% * 2.0 hits the 20% cap exactly
        assert_eq!(vortex_count(600, 2.0), 120);
        assert_eq!(vortex_count(600, 5.0), 120);
        assert_eq!(lines_per_anchor(0.0), 1);
        assert_eq!(lines_per_anchor(2.0), 6);
    }

    #[test]
    fn test_vortices_cluster_around_anchors() {
        let seeder = Seeder::new(FlowStyle::Streamlines, 80);
        let params = SimulationParams::default();
        let mut rng = FlowRng::from_seed(5);

        let vortices = seeder.seed_vortices(600, &params, &mut rng);
        // 7 anchors with 6 lines each, below the 120-line cap
        assert_eq!(vortices.len(), 42);

        for v in &vortices {
            let Motion::Vortex {
                strength, phase, core, ..
            } = *v.motion()
            else {
                panic!("expected vortex motion");
            };
            let offset = v.initial_offset() - core;
            assert!(offset.iter().all(|c| c.abs() <= VORTEX_JITTER));
            assert!((0.0..TAU).contains(&phase));
            assert!((0.4..=1.2).contains(&strength));
            assert_eq!(v.zone(), ZoneType::VortexCore);
        }
    }

    #[test]
    fn test_population_respects_budget() {
        let seeder = Seeder::new(FlowStyle::Streamlines, 80);
        let params = SimulationParams::default();
        let mut rng = FlowRng::from_seed(9);

        let population = seeder.seed_population(600, &params, &mut rng);
        assert!(population.len() <= 600);
        // Zone shares cover 540 slots; fallback tops up what they leave
        assert!(population.len() >= 540);
        assert_eq!(population.vortices.len(), 42);
        assert_eq!(
            population.accepted.len(),
            population.laminar.len() + population.fallback.len()
        );
        assert_eq!(population.skipped, 600 - population.len());
        assert!(population.laminar.iter().all(|e| !e.is_vortex()));
        assert!(population.vortices.iter().all(FlowElement::is_vortex));
    }

    #[test]
    fn test_saturated_slot_returns_none() {
        let seeder = Seeder::new(FlowStyle::Streamlines, 80);
        let mut params = SimulationParams::default();
        params.min_distance = 10.0;
        let mut rng = FlowRng::from_seed(2);
        let mut accepted = SpatialIndex::new(params.min_distance);

        assert!(seeder
            .seed(ZoneType::Top, 0, &params, &mut accepted, &mut rng)
            .is_some());
        // The whole top box fits inside one exclusion radius
        assert!(seeder
            .seed(ZoneType::Top, 1, &params, &mut accepted, &mut rng)
            .is_none());
        assert_eq!(accepted.len(), 1);
    }

    #[test]
    fn test_seeds_start_at_world_offset() {
        let seeder = Seeder::new(FlowStyle::Particles, 80);
        let params = SimulationParams::default();
        let mut rng = FlowRng::from_seed(4);
        let mut accepted = SpatialIndex::new(params.min_distance);

        let element = seeder
            .seed(ZoneType::Floor, 0, &params, &mut accepted, &mut rng)
            .unwrap();
        assert_eq!(element.head(), params.to_world(element.initial_offset()));
        assert_eq!(element.len(), 1);
        assert_eq!(element.life(), element.initial_life());
        assert!((3.0..5.0).contains(&element.base_life()));
    }

    #[test]
    fn test_skipped_counts_only_empty_slots() {
        let seeder = Seeder::new(FlowStyle::Streamlines, 80);
        let params = SimulationParams {
            min_distance: 0.3,
            ..SimulationParams::default()
        };
        let mut rng = FlowRng::from_seed(12);

        let population = seeder.seed_population(600, &params, &mut rng);
        assert!(population.len() < 600, "spacing should saturate the zones");
        assert_eq!(population.skipped, 600 - population.len());
    }
}
