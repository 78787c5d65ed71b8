//! Emission zones around the car.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Region a flow element was emitted from.
///
/// The zone decides the seeding box, the initial attributes, the zone-mode
/// color, and (for the floor) whether ground-effect pressure updates apply.
/// The numeric ids are stable and used across the FFI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneType {
    FrontWing,
    Top,
    Side,
    RearWing,
    Floor,
    VortexCore,
}

impl ZoneType {
    /// Zones seeded as laminar streamlines, in allocation order.
    pub const LAMINAR: [ZoneType; 5] = [
        ZoneType::FrontWing,
        ZoneType::Top,
        ZoneType::Side,
        ZoneType::RearWing,
        ZoneType::Floor,
    ];

    pub const ALL: [ZoneType; 6] = [
        ZoneType::FrontWing,
        ZoneType::Top,
        ZoneType::Side,
        ZoneType::RearWing,
        ZoneType::Floor,
        ZoneType::VortexCore,
    ];

    pub const fn id(self) -> u8 {
        match self {
            ZoneType::FrontWing => 0,
            ZoneType::Top => 1,
            ZoneType::Side => 2,
            ZoneType::RearWing => 3,
            ZoneType::Floor => 4,
            ZoneType::VortexCore => 5,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|zone| zone.id() == id)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ZoneType::FrontWing => "front-wing",
            ZoneType::Top => "top",
            ZoneType::Side => "side",
            ZoneType::RearWing => "rear-wing",
            ZoneType::Floor => "floor",
            ZoneType::VortexCore => "vortex-core",
        }
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
