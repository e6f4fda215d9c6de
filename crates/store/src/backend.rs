//! The storage interface the parking service depends on.

use lot::LotSnapshot;

use crate::documents::{LotDocument, VehicleRecord};
use crate::store_error::StoreError;

/// Durable home of the singleton lot document and the vehicle records.
///
/// Implementations must make each call atomic on its own; they do not need
/// to make sequences of calls atomic. Sequencing is the service's job, with
/// [`ParkingStore::replace_lot`] as the conditional write that detects a
/// concurrent writer.
pub trait ParkingStore: Send + Sync {
    /// Read the lot document, `None` if it was never set up.
    fn load_lot(&self) -> Result<Option<LotDocument>, StoreError>;

    /// Create the lot document unless one exists. Returns whether it was
    /// created.
    fn insert_lot(&self, document: &LotDocument) -> Result<bool, StoreError>;

    /// Replace the lot contents if the stored revision is still
    /// `expected_revision`, bumping it by one. Returns the new revision.
    ///
    /// Fails with [`StoreError::RevisionConflict`] when another writer got
    /// there first and [`StoreError::MissingLot`] when there is no document.
    fn replace_lot(&self, lot: &LotSnapshot, expected_revision: u64) -> Result<u64, StoreError>;

    fn find_vehicle(&self, license_plate: &str) -> Result<Option<VehicleRecord>, StoreError>;

    /// Insert or overwrite the record keyed by its license plate.
    fn upsert_vehicle(&self, record: &VehicleRecord) -> Result<(), StoreError>;

    /// Records with `is_parked == true`, ordered by license plate.
    fn parked_vehicles(&self) -> Result<Vec<VehicleRecord>, StoreError>;
}

/// Shared revision check for backends.
pub(crate) fn check_revision(stored: &LotDocument, expected: u64) -> Result<(), StoreError> {
    if stored.revision != expected {
        return Err(StoreError::RevisionConflict {
            expected,
            found: stored.revision,
        });
    }
    Ok(())
}
