//! Persisted mirror of the parking lot.
//!
//! Holds one lot document (keyed [`documents::LOT_DOCUMENT_ID`]) and one
//! record per license plate behind the [`ParkingStore`] trait. Two backends:
//! [`MemoryStore`] for tests and throwaway runs, [`FileStore`] for a data
//! directory of checksummed, atomically replaced files.

pub mod atomic_write;
pub mod backend;
pub mod codec;
pub mod crash_recovery;
pub mod dir_lock;
pub mod documents;
pub mod file;
pub mod file_header;
pub mod memory;
pub mod store_error;

pub use backend::ParkingStore;
pub use documents::{unix_now, LotDocument, VehicleRecord, LOT_DOCUMENT_ID};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store_error::StoreError;
