use crate::core_types::ZoneType;
use crate::element::FlowElement;

/// Outcome counts for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub advanced: usize,
    pub reseeded: usize,
    /// Elements left untouched because `dt` was unusable
    pub skipped: usize,
}

/// Population breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationStats {
    pub capacity: usize,
    pub elements: usize,
    /// Element count indexed by [`ZoneType::id`]
    pub by_zone: [usize; 6],
    pub vortices: usize,
    /// Stored samples across every trail
    pub total_points: usize,
    /// Slots the last seeding pass could not place
    pub skipped_seeds: usize,
}

impl PopulationStats {
    pub(crate) fn collect<'a>(
        elements: impl IntoIterator<Item = &'a FlowElement>,
        capacity: usize,
        skipped_seeds: usize,
    ) -> Self {
        let mut stats = PopulationStats {
            capacity,
            skipped_seeds,
            ..PopulationStats::default()
        };
        for element in elements {
            stats.elements += 1;
            stats.by_zone[usize::from(element.zone().id())] += 1;
            stats.vortices += usize::from(element.is_vortex());
            stats.total_points += element.len();
        }
        stats
    }

    pub fn count(&self, zone: ZoneType) -> usize {
        self.by_zone[usize::from(zone.id())]
    }
}
