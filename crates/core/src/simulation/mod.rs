//! Flow simulation orchestrator
//!
//! `FlowSimulation` owns the fixed-capacity element population and drives it:
//! - snapshots the operator controls at tick start
//! - advances every element (field evaluation, aging, reseed-on-expiry)
//! - rebuilds the frame buffers once the whole population has moved
//! - reseeds or regenerates vortices when a control change requires it

pub mod stats;

pub use stats::{PopulationStats, TickStats};

use crate::core_types::{FlowRng, SpatialIndex};
use crate::element::FlowElement;
use crate::lifecycle::{self, TickOutcome};
use crate::params::{ColorMode, ConfigError, ControlState, FlowConfig, SimulationParams};
use crate::render::{FlowFrame, RenderSink};
use crate::seeding::Seeder;
use tracing::{debug, info};

/// Interactive flow visualisation state.
pub struct FlowSimulation {
    config: FlowConfig,
    controls: ControlState,
    seeder: Seeder,
    rng: FlowRng,

    // Population, in frame order
    laminar: Vec<FlowElement>,
    fallback: Vec<FlowElement>,
    vortices: Vec<FlowElement>,
    /// Car-frame offsets of laminar seeds; fallback top-ups space against it
    laminar_index: SpatialIndex,
    skipped: usize,

    frame: FlowFrame,
    elapsed: f32,
    tick_count: u64,
}

impl FlowSimulation {
    /// Seed a new simulation from `config`.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`FlowConfig::validate`].
    pub fn new(config: FlowConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let controls = config.controls.sanitized();
        let rng = config.seed.map_or_else(FlowRng::from_entropy, FlowRng::from_seed);
        let seeder = Seeder::new(config.style, config.max_points());

        let mut sim = FlowSimulation {
            config,
            controls,
            seeder,
            rng,
            laminar: Vec::new(),
            fallback: Vec::new(),
            vortices: Vec::new(),
            laminar_index: SpatialIndex::new(controls.min_distance),
            skipped: 0,
            frame: FlowFrame::default(),
            elapsed: 0.0,
            tick_count: 0,
        };
        sim.relayout();

        info!(
            capacity = sim.capacity(),
            seeded = sim.len(),
            style = ?sim.config.style,
            seed = ?sim.config.seed,
            "Flow simulation created"
        );
        Ok(sim)
    }

    /// Parameter snapshot for the current controls.
    pub fn params(&self) -> SimulationParams {
        SimulationParams::new(self.config.car, &self.controls)
    }

    #[must_use]
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    #[must_use]
    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    /// Slot count fixed at construction.
    pub fn capacity(&self) -> usize {
        self.config.line_budget
    }

    /// Live elements. May fall short of capacity when seeding saturates.
    pub fn len(&self) -> usize {
        self.laminar.len() + self.fallback.len() + self.vortices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Simulated seconds so far.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Every element in frame order: laminar, fallback, then vortices.
    pub fn elements(&self) -> impl Iterator<Item = &FlowElement> {
        self.laminar
            .iter()
            .chain(self.fallback.iter())
            .chain(self.vortices.iter())
    }

    /// Advance the whole population by `dt` seconds, then rebuild the frame.
    pub fn tick(&mut self, dt: f32) -> TickStats {
        let params = self.params();
        let mut stats = TickStats::default();

        let rng = &mut self.rng;
        for element in self
            .laminar
            .iter_mut()
            .chain(self.fallback.iter_mut())
            .chain(self.vortices.iter_mut())
        {
            match lifecycle::advance(element, &params, dt, rng) {
                TickOutcome::Advanced => stats.advanced += 1,
                TickOutcome::Reseeded => stats.reseeded += 1,
                TickOutcome::Skipped => stats.skipped += 1,
            }
        }

        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
            self.tick_count += 1;
        }
        self.rebuild_frame();

        debug!(
            tick = self.tick_count,
            advanced = stats.advanced,
            reseeded = stats.reseeded,
            points = self.frame.point_count(),
            "tick"
        );
        stats
    }

    /// Buffers for the last completed tick.
    #[must_use]
    pub fn snapshot(&self) -> &FlowFrame {
        &self.frame
    }

    /// Hand the last completed frame to `sink`.
    pub fn render(&self, sink: &mut impl RenderSink) {
        sink.submit(&self.frame);
    }

    pub fn stats(&self) -> PopulationStats {
        PopulationStats::collect(self.elements(), self.capacity(), self.skipped)
    }

    pub fn set_car_position(&mut self, position: f32) {
        self.controls.set_car_position(position);
    }

    pub fn set_car_speed(&mut self, speed_kmh: f32) {
        self.controls.set_car_speed(speed_kmh);
    }

    /// Vortex anchors and strengths depend on the flap, so a state change
    /// regenerates them.
    pub fn set_drs(&mut self, open: bool) {
        if self.controls.set_drs(open) {
            self.regenerate_vortices();
        }
    }

    pub fn set_min_distance(&mut self, distance: f32) {
        self.controls.set_min_distance(distance);
        self.relayout();
    }

    /// Always regenerates vortices, even when the clamped value is unchanged.
    pub fn set_vortex_intensity(&mut self, intensity: f32) {
        self.controls.set_vortex_intensity(intensity);
        self.regenerate_vortices();
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.controls.set_color_mode(mode);
    }

    pub fn set_relative_dynamics(&mut self, enabled: bool) {
        self.controls.set_relative_dynamics(enabled);
    }

    pub fn set_adaptive_density(&mut self, enabled: bool) {
        self.controls.set_adaptive_density(enabled);
        self.relayout();
    }

    /// Reseed every element in place at the current car position and
    /// regenerate the vortices.
    pub fn reset_all(&mut self) {
        let params = self.params();
        for element in self.laminar.iter_mut().chain(self.fallback.iter_mut()) {
            lifecycle::reseed(element, &params, &mut self.rng);
        }
        self.regenerate_vortices();
        info!(elements = self.len(), "Flow reset");
    }

    /// Discard the population and seed a fresh layout.
    fn relayout(&mut self) {
        let params = self.params();
        let population = self
            .seeder
            .seed_population(self.capacity(), &params, &mut self.rng);

        let mut laminar_index = SpatialIndex::new(params.min_distance);
        for element in &population.laminar {
            laminar_index.insert(element.initial_offset());
        }

        self.laminar = population.laminar;
        self.fallback = population.fallback;
        self.vortices = population.vortices;
        self.laminar_index = laminar_index;
        self.skipped = population.skipped;
        self.rebuild_frame();

        info!(
            laminar = self.laminar.len(),
            fallback = self.fallback.len(),
            vortices = self.vortices.len(),
            skipped = self.skipped,
            min_distance = params.min_distance,
            adaptive_density = params.adaptive_density,
            "Flow layout seeded"
        );
    }

    /// Replace the vortex lines and re-balance fallback slots so the total
    /// never exceeds capacity.
    fn regenerate_vortices(&mut self) {
        let params = self.params();
        let capacity = self.capacity();

        let mut vortices = self
            .seeder
            .seed_vortices(capacity, &params, &mut self.rng);
        vortices.truncate(capacity.saturating_sub(self.laminar.len()));
        self.vortices = vortices;

        let target = capacity.saturating_sub(self.laminar.len() + self.vortices.len());
        if self.fallback.len() > target {
            self.fallback.truncate(target);
        } else if self.fallback.len() < target {
            let mut accepted = self.laminar_index.clone();
            for element in &self.fallback {
                accepted.insert(element.initial_offset());
            }
            let (extra, _) = self.seeder.seed_fallback(
                target - self.fallback.len(),
                &params,
                &mut accepted,
                &mut self.rng,
            );
            self.fallback.extend(extra);
        }
        self.skipped = capacity.saturating_sub(self.len());
        self.rebuild_frame();

        info!(
            vortices = self.vortices.len(),
            fallback = self.fallback.len(),
            drs_open = params.drs_open,
            vortex_intensity = params.vortex_intensity,
            "Vortices regenerated"
        );
    }

    fn rebuild_frame(&mut self) {
        self.frame.rebuild(
            self.laminar
                .iter()
                .chain(self.fallback.iter())
                .chain(self.vortices.iter()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::ZoneType;
    use crate::params::FlowStyle;

    fn config(seed: u64) -> FlowConfig {
        FlowConfig {
            seed: Some(seed),
            ..FlowConfig::default()
        }
    }

    #[test]
    fn test_simulation_creation() {
        let sim = FlowSimulation::new(config(1)).unwrap();
        assert_eq!(sim.capacity(), 600);
        assert!(sim.len() <= sim.capacity());
        assert!(!sim.is_empty());
        assert_eq!(sim.snapshot().segments().len(), sim.len());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut bad = config(1);
        bad.car.length = -1.0;
        assert!(FlowSimulation::new(bad).is_err());
    }

    #[test]
    fn test_drs_toggle_regenerates_vortices() {
        let mut sim = FlowSimulation::new(config(2)).unwrap();
        assert_eq!(sim.stats().vortices, 42);

        sim.set_drs(true);
        // Four tip anchors remain with the flap open
        assert_eq!(sim.stats().vortices, 24);
        assert!(sim.len() <= sim.capacity());

        sim.set_drs(false);
        assert_eq!(sim.stats().vortices, 42);
        assert!(sim.len() <= sim.capacity());
    }

    #[test]
    fn test_zero_intensity_keeps_capacity() {
        let mut sim = FlowSimulation::new(config(3)).unwrap();
        sim.set_vortex_intensity(0.0);
        assert_eq!(sim.stats().vortices, 0);
        sim.set_vortex_intensity(7.5);
        assert_eq!(sim.controls().vortex_intensity, 2.0);
        assert!(sim.len() <= sim.capacity());
    }

    #[test]
    fn test_tick_with_bad_dt_does_not_advance_clock() {
        let mut sim = FlowSimulation::new(config(4)).unwrap();
        let stats = sim.tick(0.0);
        assert_eq!(stats.skipped, sim.len());
        assert_eq!(sim.tick_count(), 0);
        sim.tick(0.016);
        assert_eq!(sim.tick_count(), 1);
    }

    #[test]
    fn test_particles_have_single_point_segments() {
        let mut sim = FlowSimulation::new(FlowConfig {
            style: FlowStyle::Particles,
            ..config(5)
        })
        .unwrap();
        for _ in 0..20 {
            sim.tick(0.016);
        }
        assert!(sim.snapshot().segments().iter().all(|s| s.len == 1));
        assert_eq!(sim.snapshot().point_count(), sim.len());
    }

    #[test]
    fn test_relayout_on_spacing_change() {
        let mut sim = FlowSimulation::new(config(6)).unwrap();
        sim.tick(0.016);
        sim.set_min_distance(0.2);
        assert_eq!(sim.controls().min_distance, 0.2);
        // Fresh layout: every trail is back to its seed point
        assert!(sim.elements().all(|e| e.len() == 1));
        assert!(sim.stats().count(ZoneType::FrontWing) > 0);
    }

    #[test]
    fn test_skipped_seeds_match_empty_slots() {
        let mut saturating = config(7);
        saturating.controls.min_distance = 0.3;
        let mut sim = FlowSimulation::new(saturating).unwrap();

        let empty = |sim: &FlowSimulation| {
            let stats = sim.stats();
            assert!(stats.skipped_seeds <= stats.capacity);
            (stats.capacity - stats.elements, stats.skipped_seeds)
        };
        let (left, right) = empty(&sim);
        assert!(left > 0, "spacing should saturate the zones");
        assert_eq!(left, right);

        // Both the truncating and the topping-up rebalance keep the count honest
        sim.set_drs(true);
        let (left, right) = empty(&sim);
        assert_eq!(left, right);
        sim.set_vortex_intensity(0.0);
        let (left, right) = empty(&sim);
        assert_eq!(left, right);
        sim.set_vortex_intensity(2.0);
        let (left, right) = empty(&sim);
        assert_eq!(left, right);
    }
}
