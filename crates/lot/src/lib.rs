//! Parking lot allocation model.
//!
//! Everything in this crate is synchronous and storage-agnostic: a
//! [`ParkingLot`] owns its [`Level`]s, each level owns its [`Spot`]s by value,
//! and vehicles refer to spots by `(floor, spot)` indices. The persisted mirror
//! of this state lives in the `store` crate; keeping the two in step is the
//! job of the `service` crate.

pub mod config;
pub mod error;
pub mod level;
pub mod parking_lot;
pub mod snapshot;
pub mod spot;
pub mod vehicle;

pub use config::LotTopology;
pub use error::LotError;
pub use level::Level;
pub use parking_lot::{ParkingLot, Placement};
pub use snapshot::{LevelSnapshot, LotSnapshot, SpotSnapshot};
pub use spot::Spot;
pub use vehicle::{fits, SpotRef, Vehicle, VehicleKind, VehicleSize};
