//! File-backed store: one file for the lot document, one for the vehicle
//! table, both written with [`atomic_write`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use bevy::log::{info, warn};
use bitcode::{Decode, Encode};

use lot::LotSnapshot;

use crate::atomic_write::atomic_write;
use crate::backend::{check_revision, ParkingStore};
use crate::codec::{decode_document, encode_document};
use crate::crash_recovery::clean_tmp_files;
use crate::dir_lock::{lock_dir, DirLock};
use crate::documents::{LotDocument, VehicleRecord};
use crate::store_error::StoreError;

/// File name of the lot document inside the data directory.
pub const LOT_FILE: &str = "lot.park";

/// File name of the vehicle table inside the data directory.
pub const VEHICLES_FILE: &str = "vehicles.park";

#[derive(Debug, Default, Encode, Decode)]
struct VehicleTable {
    records: Vec<VehicleRecord>,
}

/// Store rooted at a data directory.
///
/// Each call holds this handle's mutex and the directory's
/// [`crate::dir_lock`] around its read-modify-write, so the revision check in
/// [`ParkingStore::replace_lot`] is atomic across threads, handles and
/// processes sharing the directory.
/// Both locks for one call. Fields drop in order: directory first.
struct IoGuard<'a> {
    _dir: DirLock,
    _mutex: MutexGuard<'a, ()>,
}

#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    compress: bool,
    io_lock: Mutex<()>,
}

impl FileStore {
    /// Open (creating if needed) a data directory, removing interrupted
    /// writes left by a previous crash.
    pub fn open(dir: impl Into<PathBuf>, compress: bool) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let cleaned = {
            let _dir_lock = lock_dir(&dir)?;
            clean_tmp_files(&dir)?
        };
        if cleaned > 0 {
            warn!(
                "Store {}: cleaned {} interrupted write(s) from a previous run",
                dir.display(),
                cleaned
            );
        }
        info!("Opened parking store at {}", dir.display());
        Ok(Self {
            dir,
            compress,
            io_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn lock(&self) -> Result<IoGuard<'_>, StoreError> {
        let mutex = self
            .io_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("file store lock poisoned".to_string()))?;
        let dir = lock_dir(&self.dir)?;
        Ok(IoGuard {
            _dir: dir,
            _mutex: mutex,
        })
    }

    fn read_file(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.dir.join(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn read_lot(&self) -> Result<Option<LotDocument>, StoreError> {
        self.read_file(LOT_FILE)?
            .map(|bytes| decode_document(&bytes))
            .transpose()
    }

    fn write_lot(&self, document: &LotDocument) -> Result<(), StoreError> {
        let bytes = encode_document(document, self.compress);
        atomic_write(&self.dir.join(LOT_FILE), &bytes)?;
        Ok(())
    }

    fn read_vehicles(&self) -> Result<VehicleTable, StoreError> {
        match self.read_file(VEHICLES_FILE)? {
            Some(bytes) => decode_document(&bytes),
            None => Ok(VehicleTable::default()),
        }
    }

    fn write_vehicles(&self, table: &VehicleTable) -> Result<(), StoreError> {
        let bytes = encode_document(table, self.compress);
        atomic_write(&self.dir.join(VEHICLES_FILE), &bytes)?;
        Ok(())
    }
}

impl ParkingStore for FileStore {
    fn load_lot(&self) -> Result<Option<LotDocument>, StoreError> {
        let _guard = self.lock()?;
        self.read_lot()
    }

    fn insert_lot(&self, document: &LotDocument) -> Result<bool, StoreError> {
        let _guard = self.lock()?;
        if self.read_lot()?.is_some() {
            return Ok(false);
        }
        self.write_lot(document)?;
        Ok(true)
    }

    fn replace_lot(&self, lot: &LotSnapshot, expected_revision: u64) -> Result<u64, StoreError> {
        let _guard = self.lock()?;
        let mut stored = self.read_lot()?.ok_or(StoreError::MissingLot)?;
        check_revision(&stored, expected_revision)?;
        stored.lot = lot.clone();
        stored.revision += 1;
        self.write_lot(&stored)?;
        Ok(stored.revision)
    }

    fn find_vehicle(&self, license_plate: &str) -> Result<Option<VehicleRecord>, StoreError> {
        let _guard = self.lock()?;
        Ok(self
            .read_vehicles()?
            .records
            .into_iter()
            .find(|r| r.license_plate == license_plate))
    }

    fn upsert_vehicle(&self, record: &VehicleRecord) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let mut table = self.read_vehicles()?;
        match table
            .records
            .binary_search_by(|r| r.license_plate.as_str().cmp(record.license_plate.as_str()))
        {
            Ok(i) => table.records[i] = record.clone(),
            Err(i) => table.records.insert(i, record.clone()),
        }
        self.write_vehicles(&table)
    }

    fn parked_vehicles(&self) -> Result<Vec<VehicleRecord>, StoreError> {
        let _guard = self.lock()?;
        Ok(self
            .read_vehicles()?
            .records
            .into_iter()
            .filter(|r| r.is_parked)
            .collect())
    }
}
