// ---------------------------------------------------------------------------
// ParkingError: everything a park / remove / setup call can fail with
// ---------------------------------------------------------------------------

use std::fmt;

use lot::{LotError, VehicleKind};
use store::StoreError;

/// Errors surfaced to callers of [`crate::ParkingService`].
///
/// The first group is validation (nothing was read or written), the second
/// group is expected business outcomes (nothing was changed), and the last
/// two abort the operation.
#[derive(Debug)]
pub enum ParkingError {
    /// A required request field was empty.
    MissingField(&'static str),
    /// The vehicle type is not `Car`, `Motorcycle` or `Bus`.
    UnknownVehicleKind(String),
    /// Configuration that cannot describe a lot.
    InvalidConfig(String),

    /// The plate already has an active parking record.
    AlreadyParked(String),
    /// No level has a long enough run of fitting spots.
    NoAvailableSpot { license_plate: String, kind: VehicleKind },
    /// Remove for a plate with no active record.
    VehicleNotParked(String),

    /// The persisted store failed or kept losing the revision race.
    StorageUnavailable(StoreError),
    /// The in-memory model and the persisted state disagree in a way a
    /// correct run cannot produce.
    InternalConsistencyFault(String),
}

impl ParkingError {
    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            ParkingError::MissingField(_) => "MissingField",
            ParkingError::UnknownVehicleKind(_) => "UnknownVehicleKind",
            ParkingError::InvalidConfig(_) => "InvalidConfig",
            ParkingError::AlreadyParked(_) => "AlreadyParked",
            ParkingError::NoAvailableSpot { .. } => "NoAvailableSpot",
            ParkingError::VehicleNotParked(_) => "VehicleNotParked",
            ParkingError::StorageUnavailable(_) => "StorageUnavailable",
            ParkingError::InternalConsistencyFault(_) => "InternalConsistencyFault",
        }
    }

    /// Validation errors and business outcomes, as opposed to failures.
    pub fn is_expected(&self) -> bool {
        !matches!(
            self,
            ParkingError::StorageUnavailable(_) | ParkingError::InternalConsistencyFault(_)
        )
    }
}

impl fmt::Display for ParkingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParkingError::MissingField(field) => write!(f, "{field} is required"),
            ParkingError::UnknownVehicleKind(kind) => write!(f, "Unknown vehicle type: {kind}"),
            ParkingError::InvalidConfig(msg) => write!(f, "Invalid configuration: {msg}"),
            ParkingError::AlreadyParked(plate) => write!(f, "Vehicle {plate} is already parked"),
            ParkingError::NoAvailableSpot {
                license_plate,
                kind,
            } => write!(f, "No available spots for {kind} {license_plate}"),
            ParkingError::VehicleNotParked(plate) => {
                write!(f, "Vehicle {plate} not found or not parked")
            }
            ParkingError::StorageUnavailable(e) => write!(f, "Storage unavailable: {e}"),
            ParkingError::InternalConsistencyFault(msg) => {
                write!(f, "Internal consistency fault: {msg}")
            }
        }
    }
}

impl std::error::Error for ParkingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParkingError::StorageUnavailable(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for ParkingError {
    fn from(e: StoreError) -> Self {
        ParkingError::StorageUnavailable(e)
    }
}

impl From<LotError> for ParkingError {
    fn from(e: LotError) -> Self {
        match e {
            LotError::UnknownVehicleKind(kind) => ParkingError::UnknownVehicleKind(kind),
            LotError::InternalConsistency(msg) => ParkingError::InternalConsistencyFault(msg),
            LotError::InvalidTopology(msg) => ParkingError::InvalidConfig(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lot_errors_map_to_service_kinds() {
        let err: ParkingError = LotError::UnknownVehicleKind("Truck".to_string()).into();
        assert_eq!(err.kind(), "UnknownVehicleKind");
        assert!(err.is_expected());

        let err: ParkingError = LotError::InternalConsistency("x".to_string()).into();
        assert_eq!(err.kind(), "InternalConsistencyFault");
        assert!(!err.is_expected());
    }

    #[test]
    fn test_storage_error_keeps_source() {
        let err: ParkingError = StoreError::MissingLot.into();
        assert_eq!(err.kind(), "StorageUnavailable");
        assert!(std::error::Error::source(&err).is_some());
        assert!(format!("{err}").contains("not been set up"), "got: {err}");
    }

    #[test]
    fn test_display_business_outcomes() {
        let err = ParkingError::NoAvailableSpot {
            license_plate: "BUS-9".to_string(),
            kind: VehicleKind::Bus,
        };
        assert_eq!(format!("{err}"), "No available spots for Bus BUS-9");
        assert_eq!(
            format!("{}", ParkingError::AlreadyParked("ABC123".to_string())),
            "Vehicle ABC123 is already parked"
        );
        assert_eq!(
            format!("{}", ParkingError::MissingField("licensePlate")),
            "licensePlate is required"
        );
    }
}
