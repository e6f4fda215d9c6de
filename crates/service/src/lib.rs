//! Parking service: validates requests, keeps the in-memory lot in sync with
//! the store, and serializes park/remove so the lot document and the vehicle
//! records never disagree.

pub mod config;
pub mod error;
pub mod parking_service;
pub mod plugin;
pub mod request;
pub mod sync;

pub use config::ServiceConfig;
pub use error::ParkingError;
pub use parking_service::{ParkOutcome, ParkingService, RemoveOutcome, SetupOutcome};
pub use plugin::{ParkingPlugin, ParkingRequestEvent, ParkingResponseEvent, ParkingServiceHandle};
pub use request::{ParkingReply, ParkingRequest};
