//! One floor of the lot: its spots, the contiguous-run search and the
//! free-spot counter.

use std::collections::BTreeSet;

use crate::config::LotTopology;
use crate::error::LotError;
use crate::snapshot::{LevelSnapshot, SpotSnapshot};
use crate::spot::Spot;
use crate::vehicle::VehicleSize;

/// A level owns its spots by value; spots are addressed by index.
///
/// Invariant: `available_spots == spots.iter().filter(|s| s.is_available()).count()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    floor_number: usize,
    spots: Vec<Spot>,
    available_spots: usize,
}

impl Level {
    /// Build a level using the topology's size distribution
    /// (Large block, then Compact block, then Motorcycle block).
    pub fn new(floor_number: usize, topology: &LotTopology) -> Self {
        let sizes = (0..topology.spots_per_level).map(|i| topology.size_at(i));
        Self::with_sizes(floor_number, topology.spots_per_row, sizes)
    }

    /// Build a level from an explicit size list, one entry per spot.
    pub fn with_sizes(
        floor_number: usize,
        spots_per_row: usize,
        sizes: impl IntoIterator<Item = VehicleSize>,
    ) -> Self {
        let row_width = spots_per_row.max(1);
        let spots: Vec<Spot> = sizes
            .into_iter()
            .enumerate()
            .map(|(i, size)| Spot::new(floor_number, i / row_width, i, size))
            .collect();
        let available_spots = spots.len();
        Self {
            floor_number,
            spots,
            available_spots,
        }
    }

    /// Move the level (and every spot on it) to `floor_number`.
    pub(crate) fn renumber(&mut self, floor_number: usize) {
        self.floor_number = floor_number;
        for spot in &mut self.spots {
            spot.set_floor(floor_number);
        }
    }

    pub fn floor_number(&self) -> usize {
        self.floor_number
    }

    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    pub fn spot(&self, index: usize) -> Option<&Spot> {
        self.spots.get(index)
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    pub fn available_spots(&self) -> usize {
        self.available_spots
    }

    /// Free spots counted from the spots themselves, ignoring the cache.
    pub fn count_free(&self) -> usize {
        self.spots.iter().filter(|s| s.is_available()).count()
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    /// Find the first run of `spots_needed` free spots that fit `size`.
    ///
    /// Single pass in index order. The running count resets whenever the row
    /// changes or a spot is taken or too small, so a run never crosses a row
    /// boundary. Returns the index of the run's first spot.
    pub fn find_run(&self, spots_needed: usize, size: VehicleSize) -> Option<usize> {
        if spots_needed == 0 {
            return None;
        }

        let mut last_row = None;
        let mut run_len = 0;
        let mut run_start = 0;

        for (i, spot) in self.spots.iter().enumerate() {
            if last_row != Some(spot.row()) {
                run_len = 0;
                last_row = Some(spot.row());
            }

            if spot.can_fit(size) {
                if run_len == 0 {
                    run_start = i;
                }
                run_len += 1;
            } else {
                run_len = 0;
            }

            if run_len == spots_needed {
                return Some(run_start);
            }
        }

        None
    }

    // -------------------------------------------------------------------------
    // Occupancy
    // -------------------------------------------------------------------------

    /// Mark `count` spots starting at `start` as held by `vehicle_id`.
    ///
    /// All-or-nothing: every spot is checked before any is marked.
    pub fn occupy(&mut self, start: usize, count: usize, vehicle_id: &str) -> Result<(), LotError> {
        let end = start.checked_add(count).unwrap_or(usize::MAX);
        if count == 0 || end > self.spots.len() {
            return Err(LotError::InternalConsistency(format!(
                "level {}: run {}..{} is outside 0..{}",
                self.floor_number,
                start,
                end,
                self.spots.len()
            )));
        }
        if let Some(taken) = self.spots[start..end].iter().find(|s| s.is_occupied()) {
            return Err(LotError::InternalConsistency(format!(
                "level {}: spot {} is already held by {}",
                self.floor_number,
                taken.spot_number(),
                taken.vehicle_id().unwrap_or_default()
            )));
        }
        let remaining = self.available_spots.checked_sub(count).ok_or_else(|| {
            LotError::InternalConsistency(format!(
                "level {}: occupying {} spots with only {} available",
                self.floor_number, count, self.available_spots
            ))
        })?;

        for spot in &mut self.spots[start..end] {
            spot.occupy(vehicle_id);
        }
        self.available_spots = remaining;
        Ok(())
    }

    /// Clear the given spots and return how many were released.
    ///
    /// Every index must be in range, distinct and currently occupied;
    /// nothing is cleared otherwise.
    pub fn release(&mut self, indices: &[usize]) -> Result<usize, LotError> {
        let mut seen = BTreeSet::new();
        for &index in indices {
            match self.spots.get(index) {
                None => {
                    return Err(LotError::InternalConsistency(format!(
                        "level {}: spot {} does not exist",
                        self.floor_number, index
                    )))
                }
                Some(spot) if spot.is_available() => {
                    return Err(LotError::InternalConsistency(format!(
                        "level {}: spot {} is not occupied",
                        self.floor_number, index
                    )))
                }
                Some(_) => {}
            }
            if !seen.insert(index) {
                return Err(LotError::InternalConsistency(format!(
                    "level {}: spot {} released twice",
                    self.floor_number, index
                )));
            }
        }

        for &index in indices {
            self.spots[index].vacate();
        }
        self.available_spots += indices.len();
        Ok(indices.len())
    }

    // -------------------------------------------------------------------------
    // Snapshot
    // -------------------------------------------------------------------------

    pub fn snapshot(&self) -> LevelSnapshot {
        LevelSnapshot {
            floor_number: self.floor_number as u32,
            available_spots: self.available_spots as u32,
            spots: self
                .spots
                .iter()
                .map(|spot| SpotSnapshot {
                    row: spot.row() as u32,
                    spot_number: spot.spot_number() as u32,
                    size: spot.size(),
                    is_occupied: spot.is_occupied(),
                    vehicle_id: spot.vehicle_id().map(str::to_string),
                })
                .collect(),
        }
    }

    /// Check that `snapshot` describes this level's structure and is
    /// internally consistent, without touching any state.
    pub(crate) fn check_snapshot(&self, snapshot: &LevelSnapshot) -> Result<(), LotError> {
        let fault = |msg: String| {
            Err(LotError::InternalConsistency(format!(
                "level {}: {msg}",
                self.floor_number
            )))
        };

        if snapshot.floor_number as usize != self.floor_number {
            return fault(format!("persisted floor number is {}", snapshot.floor_number));
        }
        if snapshot.spots.len() != self.spots.len() {
            return fault(format!(
                "persisted level has {} spots, expected {}",
                snapshot.spots.len(),
                self.spots.len()
            ));
        }
        for (spot, stored) in self.spots.iter().zip(&snapshot.spots) {
            if stored.is_occupied != stored.vehicle_id.is_some() {
                return fault(format!(
                    "persisted spot {} has isOccupied={} but vehicleId={:?}",
                    stored.spot_number, stored.is_occupied, stored.vehicle_id
                ));
            }
            if stored.spot_number as usize != spot.spot_number() || stored.size != spot.size() {
                return fault(format!(
                    "persisted spot {} ({}) does not match spot {} ({})",
                    stored.spot_number,
                    stored.size,
                    spot.spot_number(),
                    spot.size()
                ));
            }
        }
        let free = snapshot.spots.iter().filter(|s| !s.is_occupied).count();
        if snapshot.available_spots as usize != free {
            return fault(format!(
                "persisted availableSpots is {} but {} spots are free",
                snapshot.available_spots, free
            ));
        }
        Ok(())
    }

    /// Overwrite occupancy from a snapshot already accepted by
    /// [`Level::check_snapshot`].
    pub(crate) fn restore(&mut self, snapshot: &LevelSnapshot) {
        for (spot, stored) in self.spots.iter_mut().zip(&snapshot.spots) {
            spot.set_occupant(stored.vehicle_id.clone());
        }
        self.available_spots = snapshot.available_spots as usize;
    }
}
