//! The `ParkingLot` aggregate and its park / release / sync transitions.

use crate::config::LotTopology;
use crate::error::LotError;
use crate::level::Level;
use crate::snapshot::LotSnapshot;
use crate::vehicle::Vehicle;

// =============================================================================
// Placement
// =============================================================================

/// Where a vehicle ended up after a successful park.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub floor: usize,
    pub spots: Vec<usize>,
}

// =============================================================================
// ParkingLot
// =============================================================================

/// All levels of one lot, in floor (and allocation priority) order.
///
/// Invariant: `available_spots == levels.iter().map(Level::available_spots).sum()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingLot {
    topology: LotTopology,
    levels: Vec<Level>,
    total_spots: usize,
    available_spots: usize,
}

impl Default for ParkingLot {
    fn default() -> Self {
        Self::new(LotTopology::default())
    }
}

impl ParkingLot {
    pub fn new(topology: LotTopology) -> Self {
        let levels: Vec<Level> = (0..topology.levels)
            .map(|floor| Level::new(floor, &topology))
            .collect();
        Self::from_levels(topology, levels)
    }

    /// Assemble a lot from prebuilt levels (custom size layouts).
    /// Levels are renumbered by position.
    pub fn from_levels(topology: LotTopology, mut levels: Vec<Level>) -> Self {
        for (floor, level) in levels.iter_mut().enumerate() {
            level.renumber(floor);
        }
        let total_spots = levels.iter().map(Level::len).sum();
        let available_spots = levels.iter().map(Level::available_spots).sum();
        Self {
            topology,
            levels,
            total_spots,
            available_spots,
        }
    }

    pub fn topology(&self) -> &LotTopology {
        &self.topology
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, floor: usize) -> Option<&Level> {
        self.levels.get(floor)
    }

    pub fn total_spots(&self) -> usize {
        self.total_spots
    }

    pub fn available_spots(&self) -> usize {
        self.available_spots
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Park `vehicle` on the lowest floor that has a fitting run.
    ///
    /// `Ok(None)` means no level could take the vehicle; nothing changed.
    /// An `Err` means a verified run failed to occupy, which only happens
    /// when the model itself is inconsistent.
    pub fn park(&mut self, vehicle: &mut Vehicle) -> Result<Option<Placement>, LotError> {
        let needed = vehicle.spots_needed();
        let size = vehicle.size();

        for level in &mut self.levels {
            if level.available_spots() < needed {
                continue;
            }
            let Some(start) = level.find_run(needed, size) else {
                continue;
            };

            level.occupy(start, needed, vehicle.license_plate())?;
            self.available_spots -= needed;

            let floor = level.floor_number();
            let spots: Vec<usize> = (start..start + needed).collect();
            vehicle.park_in(floor, spots.iter().copied());
            return Ok(Some(Placement { floor, spots }));
        }

        Ok(None)
    }

    /// Free `spots` on `floor`, which must all be held by `plate`.
    pub fn release(&mut self, floor: usize, spots: &[usize], plate: &str) -> Result<usize, LotError> {
        let level = self.levels.get_mut(floor).ok_or_else(|| {
            LotError::InternalConsistency(format!("level {floor} does not exist"))
        })?;

        for &index in spots {
            let holder = level.spot(index).and_then(|s| s.vehicle_id());
            if holder.is_some_and(|holder| holder != plate) {
                return Err(LotError::InternalConsistency(format!(
                    "level {floor}: spot {index} is held by {}, not {plate}",
                    holder.unwrap_or_default()
                )));
            }
        }

        let released = level.release(spots)?;
        self.available_spots += released;
        Ok(released)
    }

    // -------------------------------------------------------------------------
    // Snapshot / sync
    // -------------------------------------------------------------------------

    /// Tree-shaped copy of the current state, ready to persist.
    pub fn status(&self) -> LotSnapshot {
        LotSnapshot {
            levels: self.levels.iter().map(Level::snapshot).collect(),
            total_spots: self.total_spots as u32,
            available_spots: self.available_spots as u32,
        }
    }

    /// Overwrite occupancy and counters from a persisted snapshot.
    ///
    /// Only state is copied; the topology must already match. The snapshot is
    /// validated in full before anything is written, so a rejected snapshot
    /// leaves the lot untouched.
    pub fn apply_snapshot(&mut self, snapshot: &LotSnapshot) -> Result<(), LotError> {
        if snapshot.levels.len() != self.levels.len() {
            return Err(LotError::InternalConsistency(format!(
                "persisted lot has {} levels, expected {}",
                snapshot.levels.len(),
                self.levels.len()
            )));
        }
        if snapshot.total_spots as usize != self.total_spots {
            return Err(LotError::InternalConsistency(format!(
                "persisted lot has {} total spots, expected {}",
                snapshot.total_spots, self.total_spots
            )));
        }
        for (level, stored) in self.levels.iter().zip(&snapshot.levels) {
            level.check_snapshot(stored)?;
        }
        let level_sum: u32 = snapshot.levels.iter().map(|l| l.available_spots).sum();
        if level_sum != snapshot.available_spots {
            return Err(LotError::InternalConsistency(format!(
                "persisted lot availableSpots is {} but levels sum to {}",
                snapshot.available_spots, level_sum
            )));
        }

        for (level, stored) in self.levels.iter_mut().zip(&snapshot.levels) {
            level.restore(stored);
        }
        self.available_spots = snapshot.available_spots as usize;
        Ok(())
    }

    /// Recount every level and compare with the cached counters.
    pub fn check_invariants(&self) -> Result<(), LotError> {
        let mut sum = 0;
        for level in &self.levels {
            let free = level.count_free();
            if free != level.available_spots() {
                return Err(LotError::InternalConsistency(format!(
                    "level {} caches {} available spots but {} are free",
                    level.floor_number(),
                    level.available_spots(),
                    free
                )));
            }
            sum += level.available_spots();
        }
        if sum != self.available_spots {
            return Err(LotError::InternalConsistency(format!(
                "lot caches {} available spots but levels sum to {}",
                self.available_spots, sum
            )));
        }
        Ok(())
    }
}
