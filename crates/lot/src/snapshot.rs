//! Tree-shaped view of the lot.
//!
//! This is the exact shape persisted by the store and handed to callers of
//! `status`. Spots carry no back-reference to their level (the level is the
//! enclosing node) and occupants are plain license-plate strings, so the
//! snapshot is serializable as-is.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::vehicle::VehicleSize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "camelCase")]
pub struct SpotSnapshot {
    pub row: u32,
    pub spot_number: u32,
    pub size: VehicleSize,
    pub is_occupied: bool,
    pub vehicle_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "camelCase")]
pub struct LevelSnapshot {
    pub floor_number: u32,
    pub available_spots: u32,
    pub spots: Vec<SpotSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "camelCase")]
pub struct LotSnapshot {
    pub levels: Vec<LevelSnapshot>,
    pub total_spots: u32,
    pub available_spots: u32,
}

impl LotSnapshot {
    /// Plates currently holding at least one spot, with their floor.
    pub fn occupants(&self) -> impl Iterator<Item = (u32, &SpotSnapshot)> + '_ {
        self.levels.iter().flat_map(|level| {
            level
                .spots
                .iter()
                .filter(|spot| spot.is_occupied)
                .map(move |spot| (level.floor_number, spot))
        })
    }

    /// Spot numbers held by `plate` and the floor they are on.
    pub fn spots_of(&self, plate: &str) -> Option<(u32, Vec<u32>)> {
        let mut floor = None;
        let mut spots = Vec::new();
        for (level, spot) in self.occupants() {
            if spot.vehicle_id.as_deref() == Some(plate) {
                floor.get_or_insert(level);
                spots.push(spot.spot_number);
            }
        }
        floor.map(|floor| (floor, spots))
    }
}
