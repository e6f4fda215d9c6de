//! In-process store. Used by tests and by the `--memory` mode of the binary.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use lot::LotSnapshot;

use crate::backend::{check_revision, ParkingStore};
use crate::documents::{LotDocument, VehicleRecord};
use crate::store_error::StoreError;

#[derive(Debug, Default)]
struct MemoryState {
    lot: Option<LotDocument>,
    vehicles: BTreeMap<String, VehicleRecord>,
}

/// Documents held behind one mutex; every trait call is atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl ParkingStore for MemoryStore {
    fn load_lot(&self) -> Result<Option<LotDocument>, StoreError> {
        Ok(self.state()?.lot.clone())
    }

    fn insert_lot(&self, document: &LotDocument) -> Result<bool, StoreError> {
        let mut state = self.state()?;
        if state.lot.is_some() {
            return Ok(false);
        }
        state.lot = Some(document.clone());
        Ok(true)
    }

    fn replace_lot(&self, lot: &LotSnapshot, expected_revision: u64) -> Result<u64, StoreError> {
        let mut state = self.state()?;
        let stored = state.lot.as_mut().ok_or(StoreError::MissingLot)?;
        check_revision(stored, expected_revision)?;
        stored.lot = lot.clone();
        stored.revision += 1;
        Ok(stored.revision)
    }

    fn find_vehicle(&self, license_plate: &str) -> Result<Option<VehicleRecord>, StoreError> {
        Ok(self.state()?.vehicles.get(license_plate).cloned())
    }

    fn upsert_vehicle(&self, record: &VehicleRecord) -> Result<(), StoreError> {
        self.state()?
            .vehicles
            .insert(record.license_plate.clone(), record.clone());
        Ok(())
    }

    fn parked_vehicles(&self) -> Result<Vec<VehicleRecord>, StoreError> {
        Ok(self
            .state()?
            .vehicles
            .values()
            .filter(|r| r.is_parked)
            .cloned()
            .collect())
    }
}
