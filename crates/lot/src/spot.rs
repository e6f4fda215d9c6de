//! A single parking spot.

use crate::vehicle::{fits, VehicleSize};

/// The atomic unit of occupancy.
///
/// Occupancy is derived from `vehicle_id`, so a spot can never claim to be
/// occupied without naming its occupant. Only [`crate::Level`] mutates spots,
/// which keeps the level's free-spot counter honest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spot {
    floor: usize,
    row: usize,
    spot_number: usize,
    size: VehicleSize,
    vehicle_id: Option<String>,
}

impl Spot {
    pub fn new(floor: usize, row: usize, spot_number: usize, size: VehicleSize) -> Self {
        Self {
            floor,
            row,
            spot_number,
            size,
            vehicle_id: None,
        }
    }

    /// Floor number of the owning level.
    pub fn floor(&self) -> usize {
        self.floor
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn spot_number(&self) -> usize {
        self.spot_number
    }

    pub fn size(&self) -> VehicleSize {
        self.size
    }

    pub fn vehicle_id(&self) -> Option<&str> {
        self.vehicle_id.as_deref()
    }

    pub fn is_occupied(&self) -> bool {
        self.vehicle_id.is_some()
    }

    pub fn is_available(&self) -> bool {
        !self.is_occupied()
    }

    /// Free and large enough for a vehicle of `vehicle_size`.
    pub fn can_fit(&self, vehicle_size: VehicleSize) -> bool {
        self.is_available() && fits(vehicle_size, self.size)
    }

    pub(crate) fn set_floor(&mut self, floor: usize) {
        self.floor = floor;
    }

    pub(crate) fn occupy(&mut self, vehicle_id: &str) {
        self.vehicle_id = Some(vehicle_id.to_string());
    }

    pub(crate) fn vacate(&mut self) -> Option<String> {
        self.vehicle_id.take()
    }

    pub(crate) fn set_occupant(&mut self, vehicle_id: Option<String>) {
        self.vehicle_id = vehicle_id;
    }
}
