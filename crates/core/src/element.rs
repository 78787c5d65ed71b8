use crate::core_types::{Rgba, Vec3, ZoneType};
use serde::{Deserialize, Serialize};
use std::collections::vec_deque;
use std::collections::VecDeque;

/// Guards `life / initial_life` against a zero denominator.
const LIFE_EPSILON: f32 = 1e-6;

/// Storage for an element's visible samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementShape {
    /// Head-first history, `points[0]` is the newest sample
    Streamline {
        points: VecDeque<Vec3>,
        colors: VecDeque<Rgba>,
        max_points: usize,
    },
    /// Single sample overwritten each tick
    Particle { position: Vec3, color: Rgba },
}

/// Wing whose tip shed a vortex element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VortexSource {
    FrontWing,
    RearWing,
}

/// How the force field advances an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Straight advection plus zone perturbations
    Laminar,
    /// Spiral around a wing-tip core
    Vortex {
        strength: f32,
        phase: f32,
        source: VortexSource,
        /// Anchor point in the car frame the spiral winds around
        core: Vec3,
    },
}

/// Everything needed to bring an element to life in a slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementSeed {
    pub zone: ZoneType,
    pub motion: Motion,
    /// Car-frame seed position
    pub offset: Vec3,
    pub direction: Vec3,
    pub pressure: f32,
    pub velocity: f32,
    /// Zone-configured nominal lifetime (seconds)
    pub base_life: f32,
}

/// A single particle or streamline.
///
/// Slots are never freed: an expired element is reseeded in place around
/// its fixed `initial_offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowElement {
    pub(crate) shape: ElementShape,
    pub(crate) motion: Motion,
    pub(crate) zone: ZoneType,

    // Lifetime (seconds), 0 <= life <= initial_life while active
    pub(crate) life: f32,
    pub(crate) initial_life: f32,
    pub(crate) base_life: f32,

    pub(crate) velocity: f32,      // Zone velocity magnitude
    pub(crate) speed: f32,         // velocity scaled by the car speed factor
    pub(crate) pressure: f32,      // Colour-only pressure proxy in [0, 1]
    pub(crate) base_pressure: f32, // Pressure restored on reseed

    pub(crate) direction: Vec3,
    pub(crate) base_direction: Vec3,
    pub(crate) initial_offset: Vec3,
    pub(crate) last_car_position: f32,
}

impl FlowElement {
    /// Build a freshly seeded element at `head` (world space).
    pub(crate) fn new(
        seed: &ElementSeed,
        max_points: usize,
        particle: bool,
        head: Vec3,
        speed_factor: f32,
        car_position: f32,
    ) -> Self {
        let shape = if particle {
            ElementShape::Particle {
                position: head,
                color: Rgba::TRANSPARENT,
            }
        } else {
            let capacity = max_points.max(1);
            let mut points = VecDeque::with_capacity(capacity);
            let mut colors = VecDeque::with_capacity(capacity);
            points.push_back(head);
            colors.push_back(Rgba::TRANSPARENT);
            ElementShape::Streamline {
                points,
                colors,
                max_points: capacity,
            }
        };

        FlowElement {
            shape,
            motion: seed.motion,
            zone: seed.zone,
            life: seed.base_life,
            initial_life: seed.base_life,
            base_life: seed.base_life,
            velocity: seed.velocity,
            speed: seed.velocity * speed_factor,
            pressure: seed.pressure,
            base_pressure: seed.pressure,
            direction: seed.direction,
            base_direction: seed.direction,
            initial_offset: seed.offset,
            last_car_position: car_position,
        }
    }

    pub fn zone(&self) -> ZoneType {
        self.zone
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn shape(&self) -> &ElementShape {
        &self.shape
    }

    pub fn is_vortex(&self) -> bool {
        matches!(self.motion, Motion::Vortex { .. })
    }

    pub fn vortex_strength(&self) -> Option<f32> {
        match self.motion {
            Motion::Vortex { strength, .. } => Some(strength),
            Motion::Laminar => None,
        }
    }

    pub fn vortex_phase(&self) -> Option<f32> {
        match self.motion {
            Motion::Vortex { phase, .. } => Some(phase),
            Motion::Laminar => None,
        }
    }

    pub fn life(&self) -> f32 {
        self.life
    }

    pub fn initial_life(&self) -> f32 {
        self.initial_life
    }

    pub fn base_life(&self) -> f32 {
        self.base_life
    }

    /// Remaining fraction of this incarnation's lifetime, in [0, 1].
    pub fn life_ratio(&self) -> f32 {
        (self.life / self.initial_life.max(LIFE_EPSILON)).clamp(0.0, 1.0)
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn pressure(&self) -> f32 {
        self.pressure
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn initial_offset(&self) -> Vec3 {
        self.initial_offset
    }

    pub fn last_car_position(&self) -> f32 {
        self.last_car_position
    }

    /// Newest sample.
    pub fn head(&self) -> Vec3 {
        match &self.shape {
            ElementShape::Streamline { points, .. } => {
                points.front().copied().unwrap_or_else(Vec3::zeros)
            }
            ElementShape::Particle { position, .. } => *position,
        }
    }

    /// Newest sample's color.
    pub fn head_color(&self) -> Rgba {
        match &self.shape {
            ElementShape::Streamline { colors, .. } => {
                colors.front().copied().unwrap_or(Rgba::TRANSPARENT)
            }
            ElementShape::Particle { color, .. } => *color,
        }
    }

    pub fn max_points(&self) -> usize {
        match &self.shape {
            ElementShape::Streamline { max_points, .. } => *max_points,
            ElementShape::Particle { .. } => 1,
        }
    }

    /// Number of stored samples.
    pub fn len(&self) -> usize {
        match &self.shape {
            ElementShape::Streamline { points, .. } => points.len(),
            ElementShape::Particle { .. } => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Samples head to tail.
    pub fn points(&self) -> Samples<'_, Vec3> {
        match &self.shape {
            ElementShape::Streamline { points, .. } => Samples::Trail(points.iter()),
            ElementShape::Particle { position, .. } => Samples::Single(Some(position)),
        }
    }

    /// Colors parallel to [`FlowElement::points`].
    pub fn colors(&self) -> Samples<'_, Rgba> {
        match &self.shape {
            ElementShape::Streamline { colors, .. } => Samples::Trail(colors.iter()),
            ElementShape::Particle { color, .. } => Samples::Single(Some(color)),
        }
    }

    /// Shift every stored sample along the travel axis.
    pub(crate) fn translate_history(&mut self, dz: f32) {
        match &mut self.shape {
            ElementShape::Streamline { points, .. } => {
                for point in points.iter_mut() {
                    point.z += dz;
                }
            }
            ElementShape::Particle { position, .. } => position.z += dz,
        }
    }

    /// Insert a new head, dropping the tail once the trail is full.
    pub(crate) fn push_head(&mut self, position: Vec3, color: Rgba) {
        match &mut self.shape {
            ElementShape::Streamline {
                points,
                colors,
                max_points,
            } => {
                points.push_front(position);
                colors.push_front(color);
                while points.len() > *max_points {
                    points.pop_back();
                    colors.pop_back();
                }
            }
            ElementShape::Particle {
                position: p,
                color: c,
            } => {
                *p = position;
                *c = color;
            }
        }
    }

    /// Replace the whole history with a single sample.
    pub(crate) fn reset_history(&mut self, position: Vec3, color: Rgba) {
        match &mut self.shape {
            ElementShape::Streamline { points, colors, .. } => {
                points.clear();
                colors.clear();
                points.push_back(position);
                colors.push_back(color);
            }
            ElementShape::Particle {
                position: p,
                color: c,
            } => {
                *p = position;
                *c = color;
            }
        }
    }

    /// Overwrite the head sample's color.
    pub(crate) fn set_head_color(&mut self, color: Rgba) {
        match &mut self.shape {
            ElementShape::Streamline { colors, .. } => {
                if let Some(head) = colors.front_mut() {
                    *head = color;
                }
            }
            ElementShape::Particle { color: c, .. } => *c = color,
        }
    }
}

/// Iterator over an element's samples, head first.
#[derive(Debug, Clone)]
pub enum Samples<'a, T> {
    Trail(vec_deque::Iter<'a, T>),
    Single(Option<&'a T>),
}

impl<'a, T> Iterator for Samples<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Samples::Trail(iter) => iter.next(),
            Samples::Single(item) => item.take(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Samples::Trail(iter) => iter.size_hint(),
            Samples::Single(item) => {
                let n = usize::from(item.is_some());
                (n, Some(n))
            }
        }
    }
}

impl<T> ExactSizeIterator for Samples<'_, T> {}
