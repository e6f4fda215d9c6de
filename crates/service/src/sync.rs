//! Read-sync and write-back between the in-memory lot and the store.
//!
//! Every mutating operation pulls the lot document into the in-memory
//! [`ParkingLot`] before touching it and pushes the result back with a
//! conditional write keyed on the revision it pulled.

use lot::{LotSnapshot, ParkingLot};
use store::{ParkingStore, StoreError};

use crate::error::ParkingError;

/// Revision of the document the in-memory lot now mirrors.
pub type Revision = u64;

/// Overwrite `lot`'s occupancy from the stored document.
///
/// Structure is never copied; a document whose shape differs from `lot` is an
/// [`ParkingError::InternalConsistencyFault`] and leaves `lot` untouched.
pub fn pull(store: &dyn ParkingStore, lot: &mut ParkingLot) -> Result<Revision, ParkingError> {
    let document = store.load_lot()?.ok_or(StoreError::MissingLot)?;
    lot.apply_snapshot(&document.lot)?;
    Ok(document.revision)
}

/// Conditionally write `snapshot` over the document at `revision`.
pub fn push(
    store: &dyn ParkingStore,
    snapshot: &LotSnapshot,
    revision: Revision,
) -> Result<Revision, StoreError> {
    store.replace_lot(snapshot, revision)
}
