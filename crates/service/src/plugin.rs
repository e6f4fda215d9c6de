use std::sync::Arc;

use bevy::prelude::*;

use crate::error::ParkingError;
use crate::parking_service::ParkingService;
use crate::request::{ParkingReply, ParkingRequest};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Shared handle to the service. Cloning the `Arc` out lets other threads
/// call it directly while systems go through events.
#[derive(Resource, Clone)]
pub struct ParkingServiceHandle(pub Arc<ParkingService>);

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Ask the service to do something. `id` is echoed on the response.
#[derive(Event, Debug, Clone)]
pub struct ParkingRequestEvent {
    pub id: u64,
    pub request: ParkingRequest,
}

#[derive(Event, Debug)]
pub struct ParkingResponseEvent {
    pub id: u64,
    pub result: Result<ParkingReply, ParkingError>,
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct ParkingPlugin {
    service: Arc<ParkingService>,
}

impl ParkingPlugin {
    pub fn new(service: Arc<ParkingService>) -> Self {
        Self { service }
    }
}

impl Plugin for ParkingPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ParkingRequestEvent>()
            .add_event::<ParkingResponseEvent>()
            .insert_resource(ParkingServiceHandle(self.service.clone()))
            .add_systems(Update, handle_parking_requests);
    }
}

/// Runs each request against the service in arrival order and emits one
/// response per request.
fn handle_parking_requests(
    service: Res<ParkingServiceHandle>,
    mut requests: EventReader<ParkingRequestEvent>,
    mut responses: EventWriter<ParkingResponseEvent>,
) {
    for event in requests.read() {
        responses.send(ParkingResponseEvent {
            id: event.id,
            result: service.0.handle(&event.request),
        });
    }
}
