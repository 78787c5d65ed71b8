//! Aerodynamic telemetry estimates and a bounded history for plotting.
//!
//! Forces are reported in kilograms-force so they share a scale with the
//! plot ranges in [`Metric::range`].

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Standard gravity, for newtons to kilograms-force.
pub const GRAVITY: f32 = 9.81;
/// Default number of retained samples.
pub const DEFAULT_HISTORY: usize = 500;
/// Shortest plot window (seconds).
pub const MIN_WINDOW: f32 = 1.0;

const DRS_DRAG_SCALE: f32 = 0.75;
const DRS_LIFT_SCALE: f32 = 0.85;
const BASE_FRONT_BALANCE: f32 = 0.42;
const RAKE_BALANCE_SHIFT: f32 = 0.05;
/// Rake (rear minus front ride height, metres) tolerated before it costs
/// ground-effect downforce.
const RAKE_THRESHOLD: f32 = 0.1;

/// Lumped coefficients of the car body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AeroModel {
    pub drag_coefficient: f32,
    /// Downforce coefficient (positive pushes the car down)
    pub lift_coefficient: f32,
    /// m²
    pub frontal_area: f32,
    /// kg/m³
    pub air_density: f32,
}

impl Default for AeroModel {
    fn default() -> Self {
        AeroModel {
            drag_coefficient: 0.7,
            lift_coefficient: 3.0,
            frontal_area: 1.5,
            air_density: 1.225,
        }
    }
}

/// Downforce multiplier from ride heights (metres). Strongest close to the
/// road; excessive rake bleeds it away. Never negative.
pub fn ground_effect_multiplier(front_ride_height: f32, rear_ride_height: f32) -> f32 {
    let average = (front_ride_height + rear_ride_height) * 0.5;
    let base = 1.0 + 0.5 * (-average * 2.0).exp();
    let rake = rear_ride_height - front_ride_height;
    let penalty = if rake > RAKE_THRESHOLD {
        (rake - RAKE_THRESHOLD) * 0.5
    } else {
        0.0
    };
    (base - penalty).max(0.0)
}

impl AeroModel {
    /// ½ρv² in pascals for a speed in km/h.
    pub fn dynamic_pressure(&self, speed_kmh: f32) -> f32 {
        let v = speed_kmh / 3.6;
        0.5 * self.air_density * v * v
    }

    /// Estimate forces, balance, and tyre temperatures for one instant.
    pub fn sample(
        &self,
        speed_kmh: f32,
        drs_active: bool,
        front_ride_height: f32,
        rear_ride_height: f32,
        time: f32,
    ) -> TelemetrySample {
        let (mut cd, mut cl) = (self.drag_coefficient, self.lift_coefficient);
        if drs_active {
            cd *= DRS_DRAG_SCALE;
            cl *= DRS_LIFT_SCALE;
        }
        cl *= ground_effect_multiplier(front_ride_height, rear_ride_height);

        let force = self.dynamic_pressure(speed_kmh) * self.frontal_area / GRAVITY;
        let downforce = cl * force;
        let drag = cd * force;

        let front_balance = (BASE_FRONT_BALANCE
            + (rear_ride_height - front_ride_height) * RAKE_BALANCE_SHIFT)
            .clamp(0.0, 1.0);

        let heat = 20.0 + (speed_kmh / 350.0) * 80.0;
        let load = downforce / 5000.0 * 20.0;

        TelemetrySample {
            time,
            speed: speed_kmh,
            downforce,
            drag,
            front_balance,
            lateral_balance: 0.0,
            tyre_temp_front: heat + load * front_balance,
            tyre_temp_rear: heat + load * (1.0 - front_balance),
            drs_active,
        }
    }
}

/// One telemetry reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Seconds since the run started
    pub time: f32,
    /// km/h
    pub speed: f32,
    /// kgf
    pub downforce: f32,
    /// kgf
    pub drag: f32,
    /// Share of downforce on the front axle
    pub front_balance: f32,
    /// Negative is left; the model is symmetric so this stays 0
    pub lateral_balance: f32,
    /// °C
    pub tyre_temp_front: f32,
    /// °C
    pub tyre_temp_rear: f32,
    pub drs_active: bool,
}

/// Plottable telemetry channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Speed,
    Downforce,
    Drag,
    FrontBalance,
    TyreTempFront,
    TyreTempRear,
    Drs,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Speed,
        Metric::Downforce,
        Metric::Drag,
        Metric::FrontBalance,
        Metric::TyreTempFront,
        Metric::TyreTempRear,
        Metric::Drs,
    ];

    /// Plot range (min, max).
    pub fn range(self) -> (f32, f32) {
        match self {
            Metric::Speed => (0.0, 350.0),
            Metric::Downforce => (0.0, 5000.0),
            Metric::Drag => (0.0, 2000.0),
            Metric::FrontBalance | Metric::Drs => (0.0, 1.0),
            Metric::TyreTempFront | Metric::TyreTempRear => (20.0, 120.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Metric::Speed => "Speed (km/h)",
            Metric::Downforce => "Downforce (kg)",
            Metric::Drag => "Drag (kg)",
            Metric::FrontBalance => "Front Balance",
            Metric::TyreTempFront => "Front Tyre Temp (°C)",
            Metric::TyreTempRear => "Rear Tyre Temp (°C)",
            Metric::Drs => "DRS Active",
        }
    }

    pub fn value(self, sample: &TelemetrySample) -> f32 {
        match self {
            Metric::Speed => sample.speed,
            Metric::Downforce => sample.downforce,
            Metric::Drag => sample.drag,
            Metric::FrontBalance => sample.front_balance,
            Metric::TyreTempFront => sample.tyre_temp_front,
            Metric::TyreTempRear => sample.tyre_temp_rear,
            Metric::Drs => f32::from(u8::from(sample.drs_active)),
        }
    }

    /// Map a value into [0, 1] over [`Metric::range`].
    pub fn normalise(self, value: f32) -> f32 {
        let (min, max) = self.range();
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bounded FIFO of telemetry samples.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryLog {
    samples: VecDeque<TelemetrySample>,
    capacity: usize,
}

impl Default for TelemetryLog {
    fn default() -> Self {
        TelemetryLog::new(DEFAULT_HISTORY)
    }
}

impl TelemetryLog {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        TelemetryLog {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest once full.
    pub fn push(&mut self, sample: TelemetrySample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&TelemetrySample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.samples.iter()
    }

    /// Samples in the trailing `seconds` (at least [`MIN_WINDOW`]) before the
    /// latest sample, plus the one just before the window so plots start at
    /// its left edge.
    pub fn window(&self, seconds: f32) -> impl Iterator<Item = &TelemetrySample> {
        let start_index = match self.samples.back() {
            Some(latest) => {
                let start = latest.time - seconds.max(MIN_WINDOW);
                let first_inside = self.samples.partition_point(|s| s.time < start);
                first_inside.saturating_sub(1)
            }
            None => 0,
        };
        self.samples.range(start_index..)
    }

    /// `(time, normalised value)` pairs for `metric` over a window.
    pub fn series(&self, metric: Metric, seconds: f32) -> Vec<(f32, f32)> {
        self.window(seconds)
            .map(|s| (s.time, metric.normalise(metric.value(s))))
            .collect()
    }
}
