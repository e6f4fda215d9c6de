//! Store wrappers that inject failures and outside writers.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use lot::LotSnapshot;
use service::{ParkingService, ServiceConfig};
use store::{LotDocument, MemoryStore, ParkingStore, StoreError, VehicleRecord};

/// A [`MemoryStore`] that counts calls and fails on demand.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub calls: AtomicUsize,
    /// Every call fails with `Unavailable`.
    pub down: AtomicBool,
    /// Only `upsert_vehicle` fails.
    pub fail_upserts: AtomicBool,
    /// The next N `replace_lot` calls lose the race to an outside writer.
    pub outside_writes: AtomicU32,
    /// Runs once, right after the next successful `replace_lot`.
    pub after_replace: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_next_replace(&self, hook: impl FnOnce() + Send + 'static) {
        *self.after_replace.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected outage".to_string()));
        }
        Ok(())
    }

    /// Rewrite the stored document unchanged, bumping its revision.
    fn outside_write(&self) -> Result<(), StoreError> {
        let stored = self.inner.load_lot()?.ok_or(StoreError::MissingLot)?;
        self.inner.replace_lot(&stored.lot, stored.revision)?;
        Ok(())
    }
}

impl ParkingStore for FlakyStore {
    fn load_lot(&self) -> Result<Option<LotDocument>, StoreError> {
        self.enter()?;
        self.inner.load_lot()
    }

    fn insert_lot(&self, document: &LotDocument) -> Result<bool, StoreError> {
        self.enter()?;
        self.inner.insert_lot(document)
    }

    fn replace_lot(&self, lot: &LotSnapshot, expected_revision: u64) -> Result<u64, StoreError> {
        self.enter()?;
        let pending = self.outside_writes.load(Ordering::SeqCst);
        if pending > 0 {
            self.outside_writes.store(pending - 1, Ordering::SeqCst);
            self.outside_write()?;
        }
        let revision = self.inner.replace_lot(lot, expected_revision)?;
        let hook = self.after_replace.lock().unwrap().take();
        if let Some(hook) = hook {
            hook();
        }
        Ok(revision)
    }

    fn find_vehicle(&self, license_plate: &str) -> Result<Option<VehicleRecord>, StoreError> {
        self.enter()?;
        self.inner.find_vehicle(license_plate)
    }

    fn upsert_vehicle(&self, record: &VehicleRecord) -> Result<(), StoreError> {
        self.enter()?;
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected record failure".to_string()));
        }
        self.inner.upsert_vehicle(record)
    }

    fn parked_vehicles(&self) -> Result<Vec<VehicleRecord>, StoreError> {
        self.enter()?;
        self.inner.parked_vehicles()
    }
}

pub fn memory_service() -> ParkingService {
    ParkingService::open(Arc::new(MemoryStore::new()), ServiceConfig::default())
        .expect("memory service opens")
}

pub fn flaky_service() -> (Arc<FlakyStore>, ParkingService) {
    let store = Arc::new(FlakyStore::new());
    let service = ParkingService::open(store.clone(), ServiceConfig::default())
        .expect("flaky service opens");
    (store, service)
}

/// The lot document and the parked records describe the same occupancy.
pub fn assert_consistent(service: &ParkingService) {
    let document = service.status().expect("status");
    let parked = service.list_parked().expect("list");

    let mut from_document: Vec<(String, u32, u32)> = document
        .lot
        .occupants()
        .map(|(floor, spot)| {
            (
                spot.vehicle_id.clone().unwrap_or_default(),
                floor,
                spot.spot_number,
            )
        })
        .collect();
    let mut from_records: Vec<(String, u32, u32)> = parked
        .iter()
        .flat_map(|r| {
            let level = r.level.unwrap_or(u32::MAX);
            r.spots
                .iter()
                .map(move |&s| (r.license_plate.clone(), level, s))
        })
        .collect();
    from_document.sort();
    from_records.sort();
    assert_eq!(from_document, from_records);

    let free: u32 = document.lot.levels.iter().map(|l| l.available_spots).sum();
    assert_eq!(free, document.lot.available_spots);
    let occupied = from_document.len() as u32;
    assert_eq!(document.lot.available_spots + occupied, document.lot.total_spots);
}
