//! Request/reply values for driving a [`ParkingService`] through one entry
//! point (the bevy plugin and the headless binary both go through here).

use serde::Serialize;

use store::{LotDocument, VehicleRecord};

use crate::error::ParkingError;
use crate::parking_service::{ParkOutcome, ParkingService, RemoveOutcome, SetupOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParkingRequest {
    Setup,
    Park {
        license_plate: String,
        vehicle_type: String,
    },
    Remove {
        license_plate: String,
    },
    Status,
    ListParked,
}

impl ParkingRequest {
    pub fn name(&self) -> &'static str {
        match self {
            ParkingRequest::Setup => "setup",
            ParkingRequest::Park { .. } => "park",
            ParkingRequest::Remove { .. } => "remove",
            ParkingRequest::Status => "status",
            ParkingRequest::ListParked => "list_parked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParkingReply {
    Setup { outcome: SetupOutcome },
    Parked(ParkOutcome),
    Removed(RemoveOutcome),
    Status(LotDocument),
    ParkedVehicles { vehicles: Vec<VehicleRecord> },
}

impl ParkingService {
    /// Dispatch one request.
    pub fn handle(&self, request: &ParkingRequest) -> Result<ParkingReply, ParkingError> {
        match request {
            ParkingRequest::Setup => self
                .setup_lot()
                .map(|outcome| ParkingReply::Setup { outcome }),
            ParkingRequest::Park {
                license_plate,
                vehicle_type,
            } => self.park(license_plate, vehicle_type).map(ParkingReply::Parked),
            ParkingRequest::Remove { license_plate } => {
                self.remove(license_plate).map(ParkingReply::Removed)
            }
            ParkingRequest::Status => self.status().map(ParkingReply::Status),
            ParkingRequest::ListParked => self
                .list_parked()
                .map(|vehicles| ParkingReply::ParkedVehicles { vehicles }),
        }
    }
}
