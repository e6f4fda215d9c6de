//! Persisted document types: the singleton lot document and the
//! per-plate vehicle records.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use lot::{LotSnapshot, Placement, VehicleKind, VehicleSize};

/// Key of the singleton lot document.
pub const LOT_DOCUMENT_ID: &str = "config";

/// Seconds since the Unix epoch, 0 if the clock is before it.
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// =============================================================================
// Lot document
// =============================================================================

/// Stored copy of the lot.
///
/// `revision` increases by one on every successful write and is the key for
/// conditional updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct LotDocument {
    pub id: String,
    pub revision: u64,
    #[serde(flatten)]
    pub lot: LotSnapshot,
}

impl LotDocument {
    /// First revision of the singleton document.
    pub fn initial(lot: LotSnapshot) -> Self {
        Self {
            id: LOT_DOCUMENT_ID.to_string(),
            revision: 0,
            lot,
        }
    }
}

// =============================================================================
// Vehicle record
// =============================================================================

/// One row per license plate. Kept after the vehicle leaves, with
/// `is_parked == false`, so the plate's history survives a re-park.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    pub license_plate: String,
    pub vehicle_type: VehicleKind,
    pub size: VehicleSize,
    pub spots_needed: u32,
    pub is_parked: bool,
    pub level: Option<u32>,
    pub spots: Vec<u32>,
    pub parked_at: Option<u64>,
    pub exited_at: Option<u64>,
}

impl VehicleRecord {
    /// Record for a vehicle that has just been placed.
    pub fn parked(license_plate: &str, kind: VehicleKind, placement: &Placement, now: u64) -> Self {
        Self {
            license_plate: license_plate.to_string(),
            vehicle_type: kind,
            size: kind.size(),
            spots_needed: kind.spots_needed() as u32,
            is_parked: true,
            level: Some(placement.floor as u32),
            spots: placement.spots.iter().map(|&s| s as u32).collect(),
            parked_at: Some(now),
            exited_at: None,
        }
    }

    /// Mark the vehicle as gone, clearing its location.
    pub fn mark_exited(&mut self, now: u64) {
        self.is_parked = false;
        self.level = None;
        self.spots.clear();
        self.exited_at = Some(now);
    }

    /// Spot indices as stored, widened for the in-memory model.
    pub fn spot_indices(&self) -> Vec<usize> {
        self.spots.iter().map(|&s| s as usize).collect()
    }
}
