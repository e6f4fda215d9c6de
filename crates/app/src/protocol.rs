//! Newline-delimited JSON protocol for the headless binary.
//!
//! Each stdin line is one [`Command`] tagged by `"cmd"`. Each stdout line is
//! one [`Response`] carrying `"protocol_version"` and a `"type"` tag.

use serde::{Deserialize, Serialize};

use service::{ParkingError, ParkingReply, ParkingRequest};

pub const PROTOCOL_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Commands (stdin)
// ---------------------------------------------------------------------------

/// Missing string fields decode as empty so the service reports them as
/// `MissingField` instead of the line failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Command {
    Setup,
    Park {
        #[serde(default)]
        license_plate: String,
        #[serde(default)]
        vehicle_type: String,
    },
    Remove {
        #[serde(default)]
        license_plate: String,
    },
    Status,
    ListParked,
    Quit,
}

impl Command {
    /// The service request for this command, `None` for `quit`.
    pub fn into_request(self) -> Option<ParkingRequest> {
        match self {
            Command::Setup => Some(ParkingRequest::Setup),
            Command::Park {
                license_plate,
                vehicle_type,
            } => Some(ParkingRequest::Park {
                license_plate,
                vehicle_type,
            }),
            Command::Remove { license_plate } => Some(ParkingRequest::Remove { license_plate }),
            Command::Status => Some(ParkingRequest::Status),
            Command::ListParked => Some(ParkingRequest::ListParked),
            Command::Quit => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Responses (stdout)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Response {
    pub protocol_version: u32,
    #[serde(flatten)]
    pub payload: Payload,
}

/// Either a service reply or a session-level message. Both carry their own
/// `type` tag.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Reply(ParkingReply),
    Session(SessionMessage),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionMessage {
    Ready,
    Error {
        kind: String,
        message: String,
    },
    Goodbye,
}

pub fn make_response(payload: Payload) -> Response {
    Response {
        protocol_version: PROTOCOL_VERSION,
        payload,
    }
}

pub fn session_response(message: SessionMessage) -> Response {
    make_response(Payload::Session(message))
}

pub fn result_response(result: Result<ParkingReply, ParkingError>) -> Response {
    match result {
        Ok(reply) => make_response(Payload::Reply(reply)),
        Err(err) => session_response(SessionMessage::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }),
    }
}
