//! The parking service: validation, the serialized sync-mutate-write
//! sequence, and the read-only queries.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bevy::log::{error, info, warn};
use serde::Serialize;

use lot::{LotSnapshot, ParkingLot, Placement, Vehicle, VehicleKind};
use store::{unix_now, LotDocument, ParkingStore, StoreError, VehicleRecord};

use crate::config::ServiceConfig;
use crate::error::ParkingError;
use crate::sync::{pull, push, Revision};

// =============================================================================
// Outcomes
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SetupOutcome {
    /// The lot document did not exist and was created empty.
    Created,
    /// A lot document already existed; the in-memory lot now mirrors it.
    Existing { revision: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkOutcome {
    pub license_plate: String,
    pub level: usize,
    pub spots: Vec<usize>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveOutcome {
    pub license_plate: String,
    pub level: usize,
    pub spots_freed: usize,
    pub message: String,
}

/// Result of one successful write attempt, before the vehicle record lands.
struct Committed<T> {
    outcome: T,
    before: LotSnapshot,
    revision: Revision,
}

// =============================================================================
// ParkingService
// =============================================================================

/// Owns the in-memory lot for one process and a handle to the shared store.
///
/// Park and remove hold `lot` for their whole read-sync-mutate-write
/// sequence, so they are serialized within the process. The lot document's
/// revision check catches writers outside this service; losing that race
/// re-runs the sequence up to `max_conflict_retries` times.
pub struct ParkingService {
    store: Arc<dyn ParkingStore>,
    config: ServiceConfig,
    lot: Mutex<ParkingLot>,
}

impl ParkingService {
    /// Build a service. Does not touch the store; call
    /// [`ParkingService::setup_lot`] before parking.
    pub fn new(store: Arc<dyn ParkingStore>, config: ServiceConfig) -> Result<Self, ParkingError> {
        config.validate()?;
        Ok(Self {
            store,
            lot: Mutex::new(ParkingLot::new(config.topology)),
            config,
        })
    }

    /// Build a service and run [`ParkingService::setup_lot`].
    pub fn open(store: Arc<dyn ParkingStore>, config: ServiceConfig) -> Result<Self, ParkingError> {
        let service = Self::new(store, config)?;
        service.setup_lot()?;
        Ok(service)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ParkingStore> {
        &self.store
    }

    /// Every operation re-syncs the lot before using it, so a panic that
    /// poisoned the lock cannot leak stale state.
    fn lock_lot(&self) -> MutexGuard<'_, ParkingLot> {
        self.lot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -------------------------------------------------------------------------
    // Setup
    // -------------------------------------------------------------------------

    /// Create the lot document if it is missing, otherwise sync from it.
    pub fn setup_lot(&self) -> Result<SetupOutcome, ParkingError> {
        let mut lot = self.lock_lot();
        let empty = ParkingLot::new(self.config.topology);
        if self.store.insert_lot(&LotDocument::initial(empty.status()))? {
            *lot = empty;
            info!(
                "Parking lot initialized: {} levels x {} spots",
                self.config.topology.levels, self.config.topology.spots_per_level
            );
            return Ok(SetupOutcome::Created);
        }

        let revision = pull(self.store.as_ref(), &mut lot)
            .map_err(|e| self.log_failure("setup", e))?;
        info!(
            "Parking lot synced at revision {} ({} of {} spots free)",
            revision,
            lot.available_spots(),
            lot.total_spots()
        );
        Ok(SetupOutcome::Existing { revision })
    }

    // -------------------------------------------------------------------------
    // Park
    // -------------------------------------------------------------------------

    /// Park `license_plate` as a vehicle of type `vehicle_type`.
    ///
    /// Validation happens before any storage access.
    pub fn park(&self, license_plate: &str, vehicle_type: &str) -> Result<ParkOutcome, ParkingError> {
        let plate = license_plate.trim();
        if plate.is_empty() {
            return Err(ParkingError::MissingField("licensePlate"));
        }
        let vehicle_type = vehicle_type.trim();
        if vehicle_type.is_empty() {
            return Err(ParkingError::MissingField("vehicleType"));
        }
        let kind: VehicleKind = vehicle_type.parse()?;
        self.park_kind(plate, kind)
    }

    /// Park an already-validated vehicle.
    pub fn park_kind(&self, license_plate: &str, kind: VehicleKind) -> Result<ParkOutcome, ParkingError> {
        let plate = license_plate.trim();
        if plate.is_empty() {
            return Err(ParkingError::MissingField("licensePlate"));
        }

        let mut lot = self.lock_lot();
        let committed = self
            .with_retries("park", || self.try_park(&mut lot, plate, kind))
            .map_err(|e| self.log_failure("park", e))?;

        let outcome = committed.outcome;
        let placement = Placement {
            floor: outcome.level,
            spots: outcome.spots.clone(),
        };
        let record = VehicleRecord::parked(plate, kind, &placement, unix_now());
        if let Err(e) = self.store.upsert_vehicle(&record) {
            self.undo(&mut lot, &committed.before, committed.revision, "park", plate);
            return Err(self.log_failure("park", e.into()));
        }

        info!("{}: {} parked on level {} at {:?}", plate, kind, outcome.level, outcome.spots);
        Ok(outcome)
    }

    fn try_park(
        &self,
        lot: &mut ParkingLot,
        plate: &str,
        kind: VehicleKind,
    ) -> Result<Committed<ParkOutcome>, ParkingError> {
        if self
            .store
            .find_vehicle(plate)?
            .is_some_and(|record| record.is_parked)
        {
            return Err(ParkingError::AlreadyParked(plate.to_string()));
        }

        let revision = pull(self.store.as_ref(), lot)?;
        // The lot document is the authority on occupancy. Another service may
        // have placed this plate and not written its record yet.
        if let Some((floor, spots)) = lot.status().spots_of(plate) {
            warn!("{plate}: holds {spots:?} on level {floor} in the lot document without an active record");
            return Err(ParkingError::AlreadyParked(plate.to_string()));
        }
        let before = lot.status();

        let mut vehicle = Vehicle::new(plate, kind);
        let Some(placement) = lot.park(&mut vehicle)? else {
            return Err(ParkingError::NoAvailableSpot {
                license_plate: plate.to_string(),
                kind,
            });
        };

        let revision = push(self.store.as_ref(), &lot.status(), revision)?;
        Ok(Committed {
            outcome: ParkOutcome {
                license_plate: plate.to_string(),
                message: format!("Vehicle parked successfully on level {}", placement.floor),
                level: placement.floor,
                spots: placement.spots,
            },
            before,
            revision,
        })
    }

    // -------------------------------------------------------------------------
    // Remove
    // -------------------------------------------------------------------------

    /// Free the spots held by `license_plate` and close its record.
    pub fn remove(&self, license_plate: &str) -> Result<RemoveOutcome, ParkingError> {
        let plate = license_plate.trim();
        if plate.is_empty() {
            return Err(ParkingError::MissingField("licensePlate"));
        }

        let mut lot = self.lock_lot();
        let mut record = None;
        let committed = self
            .with_retries("remove", || {
                let (outcome, found) = self.try_remove(&mut lot, plate)?;
                record = Some(found);
                Ok(outcome)
            })
            .map_err(|e| self.log_failure("remove", e))?;

        let Some(mut record) = record else {
            return Err(self.log_failure(
                "remove",
                ParkingError::InternalConsistencyFault(format!("{plate}: record lost after commit")),
            ));
        };
        record.mark_exited(unix_now());
        if let Err(e) = self.store.upsert_vehicle(&record) {
            self.undo(&mut lot, &committed.before, committed.revision, "remove", plate);
            return Err(self.log_failure("remove", e.into()));
        }

        info!("{}: removed from level {}", plate, committed.outcome.level);
        Ok(committed.outcome)
    }

    fn try_remove(
        &self,
        lot: &mut ParkingLot,
        plate: &str,
    ) -> Result<(Committed<RemoveOutcome>, VehicleRecord), ParkingError> {
        let record = self
            .store
            .find_vehicle(plate)?
            .filter(|record| record.is_parked)
            .ok_or_else(|| ParkingError::VehicleNotParked(plate.to_string()))?;

        let floor = record.level.ok_or_else(|| {
            ParkingError::InternalConsistencyFault(format!("{plate} is parked but has no level"))
        })? as usize;
        let spots = record.spot_indices();
        if spots.len() != record.spots_needed as usize {
            return Err(ParkingError::InternalConsistencyFault(format!(
                "{plate} needs {} spots but its record lists {}",
                record.spots_needed,
                spots.len()
            )));
        }

        let revision = pull(self.store.as_ref(), lot)?;
        let before = lot.status();
        let freed = lot.release(floor, &spots, plate)?;
        let revision = push(self.store.as_ref(), &lot.status(), revision)?;

        Ok((
            Committed {
                outcome: RemoveOutcome {
                    license_plate: plate.to_string(),
                    level: floor,
                    spots_freed: freed,
                    message: "Vehicle removed successfully".to_string(),
                },
                before,
                revision,
            },
            record,
        ))
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// The stored lot document. Does not take the lot lock.
    pub fn status(&self) -> Result<LotDocument, ParkingError> {
        Ok(self.store.load_lot()?.ok_or(StoreError::MissingLot)?)
    }

    /// Records of every vehicle currently parked. Does not take the lot lock.
    pub fn list_parked(&self) -> Result<Vec<VehicleRecord>, ParkingError> {
        Ok(self.store.parked_vehicles()?)
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    /// Run `attempt` again when its lot write lost the revision race.
    fn with_retries<T>(
        &self,
        op: &str,
        mut attempt: impl FnMut() -> Result<T, ParkingError>,
    ) -> Result<T, ParkingError> {
        let mut conflicts = 0;
        loop {
            match attempt() {
                Err(ParkingError::StorageUnavailable(StoreError::RevisionConflict {
                    expected,
                    found,
                })) if conflicts < self.config.max_conflict_retries => {
                    conflicts += 1;
                    warn!(
                        "{}: lot revision moved from {} to {}; re-syncing (retry {}/{})",
                        op, expected, found, conflicts, self.config.max_conflict_retries
                    );
                }
                result => return result,
            }
        }
    }

    /// Put the lot document back after the vehicle record failed to write,
    /// so the document and the records agree again.
    fn undo(&self, lot: &mut ParkingLot, before: &LotSnapshot, revision: Revision, op: &str, plate: &str) {
        match push(self.store.as_ref(), before, revision) {
            Ok(_) => {
                if let Err(e) = lot.apply_snapshot(before) {
                    error!("{op} {plate}: in-memory rollback rejected: {e}");
                }
                warn!("{op} {plate}: vehicle record write failed; lot document rolled back");
            }
            Err(e) => error!(
                "{op} {plate}: vehicle record write failed and lot rollback failed too ({e}); \
                 document and records disagree until repaired"
            ),
        }
    }

    /// Log by severity: consistency faults at error, storage at warn,
    /// business outcomes at info.
    fn log_failure(&self, op: &str, err: ParkingError) -> ParkingError {
        match &err {
            ParkingError::InternalConsistencyFault(_) => error!("{op}: {err}"),
            ParkingError::StorageUnavailable(_) => warn!("{op}: {err}"),
            _ => info!("{op}: {err}"),
        }
        err
    }
}
