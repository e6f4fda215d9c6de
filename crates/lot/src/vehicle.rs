//! Vehicle capability model: kinds, size classes and the spot-fit predicate.

use std::fmt;
use std::str::FromStr;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::error::LotError;

// =============================================================================
// Size classes
// =============================================================================

/// Size class shared by vehicles and spots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum VehicleSize {
    Motorcycle,
    Compact,
    Large,
}

impl VehicleSize {
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleSize::Motorcycle => "Motorcycle",
            VehicleSize::Compact => "Compact",
            VehicleSize::Large => "Large",
        }
    }
}

impl fmt::Display for VehicleSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a vehicle of `vehicle` size may use a spot of `spot` size.
///
/// Not symmetric: a motorcycle fits anywhere, a compact vehicle fits compact
/// or large spots, a large vehicle fits only large spots.
pub fn fits(vehicle: VehicleSize, spot: VehicleSize) -> bool {
    match vehicle {
        VehicleSize::Motorcycle => true,
        VehicleSize::Compact => matches!(spot, VehicleSize::Compact | VehicleSize::Large),
        VehicleSize::Large => spot == VehicleSize::Large,
    }
}

// =============================================================================
// Vehicle kinds
// =============================================================================

/// The closed set of vehicle kinds the lot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum VehicleKind {
    Car,
    Motorcycle,
    Bus,
}

impl VehicleKind {
    pub const ALL: [VehicleKind; 3] = [VehicleKind::Car, VehicleKind::Motorcycle, VehicleKind::Bus];

    /// Number of adjacent spots, within one row, the kind occupies.
    pub fn spots_needed(self) -> usize {
        match self {
            VehicleKind::Car | VehicleKind::Motorcycle => 1,
            VehicleKind::Bus => 5,
        }
    }

    pub fn size(self) -> VehicleSize {
        match self {
            VehicleKind::Car => VehicleSize::Compact,
            VehicleKind::Motorcycle => VehicleSize::Motorcycle,
            VehicleKind::Bus => VehicleSize::Large,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VehicleKind::Car => "Car",
            VehicleKind::Motorcycle => "Motorcycle",
            VehicleKind::Bus => "Bus",
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleKind {
    type Err = LotError;

    /// Exact, case-sensitive match on the persisted type names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| LotError::UnknownVehicleKind(s.to_string()))
    }
}

// =============================================================================
// Vehicle
// =============================================================================

/// Position of a spot in the lot: level floor number and index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpotRef {
    pub floor: usize,
    pub spot: usize,
}

/// A vehicle built for one allocation request.
///
/// Vehicles are not kept between requests. Only the flattened record in the
/// store survives; `spots` is filled in by a successful park.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    license_plate: String,
    kind: VehicleKind,
    spots: Vec<SpotRef>,
}

impl Vehicle {
    pub fn new(license_plate: impl Into<String>, kind: VehicleKind) -> Self {
        Self {
            license_plate: license_plate.into(),
            kind,
            spots: Vec::new(),
        }
    }

    pub fn license_plate(&self) -> &str {
        &self.license_plate
    }

    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    pub fn spots_needed(&self) -> usize {
        self.kind.spots_needed()
    }

    pub fn size(&self) -> VehicleSize {
        self.kind.size()
    }

    pub fn can_fit_in(&self, spot_size: VehicleSize) -> bool {
        fits(self.size(), spot_size)
    }

    pub fn spots(&self) -> &[SpotRef] {
        &self.spots
    }

    pub fn is_parked(&self) -> bool {
        !self.spots.is_empty()
    }

    pub(crate) fn park_in(&mut self, floor: usize, spots: impl IntoIterator<Item = usize>) {
        self.spots = spots.into_iter().map(|spot| SpotRef { floor, spot }).collect();
    }

    /// Forget the occupied spots, returning them.
    pub fn clear_spots(&mut self) -> Vec<SpotRef> {
        std::mem::take(&mut self.spots)
    }
}
