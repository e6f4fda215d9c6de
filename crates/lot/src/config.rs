//! Lot topology: how many levels, how many spots per level, how wide a row is.

use serde::{Deserialize, Serialize};

use crate::error::LotError;
use crate::vehicle::VehicleSize;

/// Number of levels in the reference lot.
pub const NUM_LEVELS: usize = 5;

/// Number of spots on each level of the reference lot.
pub const SPOTS_PER_LEVEL: usize = 30;

/// Width of a row. A row is the unit of contiguity for multi-spot vehicles.
pub const SPOTS_PER_ROW: usize = 10;

/// Fixed layout of a lot. Only occupancy changes at runtime; the topology is
/// decided once at construction and never resynchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotTopology {
    pub levels: usize,
    pub spots_per_level: usize,
    pub spots_per_row: usize,
}

impl Default for LotTopology {
    fn default() -> Self {
        Self {
            levels: NUM_LEVELS,
            spots_per_level: SPOTS_PER_LEVEL,
            spots_per_row: SPOTS_PER_ROW,
        }
    }
}

impl LotTopology {
    /// Build a topology, rejecting layouts that cannot hold a single spot.
    pub fn new(levels: usize, spots_per_level: usize, spots_per_row: usize) -> Result<Self, LotError> {
        let topology = Self {
            levels,
            spots_per_level,
            spots_per_row,
        };
        topology.validate()?;
        Ok(topology)
    }

    pub fn validate(&self) -> Result<(), LotError> {
        if self.levels == 0 || self.spots_per_level == 0 || self.spots_per_row == 0 {
            return Err(LotError::InvalidTopology(format!(
                "levels={}, spots_per_level={}, spots_per_row={} (all must be > 0)",
                self.levels, self.spots_per_level, self.spots_per_row
            )));
        }
        Ok(())
    }

    pub fn total_spots(&self) -> usize {
        self.levels * self.spots_per_level
    }

    /// Large spots occupy the first quarter of each level.
    pub fn large_spots(&self) -> usize {
        self.spots_per_level / 4
    }

    /// Motorcycle spots occupy the last quarter of each level.
    pub fn motorcycle_spots(&self) -> usize {
        self.spots_per_level / 4
    }

    /// Everything between the Large block and the Motorcycle block.
    pub fn compact_spots(&self) -> usize {
        self.spots_per_level - self.large_spots() - self.motorcycle_spots()
    }

    /// Size class of the spot at `index` within a level.
    pub fn size_at(&self, index: usize) -> VehicleSize {
        if index < self.large_spots() {
            VehicleSize::Large
        } else if index < self.large_spots() + self.compact_spots() {
            VehicleSize::Compact
        } else {
            VehicleSize::Motorcycle
        }
    }

    /// Row of the spot at `index` within a level.
    pub fn row_of(&self, index: usize) -> usize {
        index / self.spots_per_row.max(1)
    }
}
