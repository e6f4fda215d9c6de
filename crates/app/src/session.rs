//! The blocking command loop: one JSON command in, one JSON response out.
//!
//! Requests go through the bevy event pair registered by
//! [`service::ParkingPlugin`]; each command runs one `app.update()`.

use std::io::{self, BufRead, Write};

use bevy::ecs::event::Events;
use bevy::log::{info, warn};
use bevy::prelude::*;

use service::{ParkingError, ParkingReply, ParkingRequest, ParkingRequestEvent, ParkingResponseEvent};

use crate::protocol::{result_response, session_response, Command, Response, SessionMessage};

pub struct Session {
    app: App,
    next_id: u64,
}

impl Session {
    /// `app` must already have a `ParkingPlugin`.
    pub fn new(app: App) -> Self {
        Self { app, next_id: 0 }
    }

    /// Send one request through the app and wait for its response.
    pub fn dispatch(&mut self, request: ParkingRequest) -> Result<ParkingReply, ParkingError> {
        self.next_id += 1;
        let id = self.next_id;
        self.app
            .world_mut()
            .send_event(ParkingRequestEvent { id, request });
        self.app.update();

        let mut events = self
            .app
            .world_mut()
            .resource_mut::<Events<ParkingResponseEvent>>();
        let response = events.drain().find(|event| event.id == id);
        match response {
            Some(event) => event.result,
            None => Err(ParkingError::InternalConsistencyFault(format!(
                "request {id} got no response"
            ))),
        }
    }

    /// Run until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
        write_response(&mut output, &session_response(SessionMessage::Ready))?;

        for line in input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("stdin read error: {e}");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let command: Command = match serde_json::from_str(&line) {
                Ok(command) => command,
                Err(e) => {
                    let response = session_response(SessionMessage::Error {
                        kind: "ParseError".to_string(),
                        message: format!("Parse error: {e}"),
                    });
                    write_response(&mut output, &response)?;
                    continue;
                }
            };

            let Some(request) = command.into_request() else {
                write_response(&mut output, &session_response(SessionMessage::Goodbye))?;
                break;
            };
            let response = result_response(self.dispatch(request));
            write_response(&mut output, &response)?;
        }

        info!("parking session closed");
        Ok(())
    }
}

fn write_response(output: &mut impl Write, response: &Response) -> io::Result<()> {
    serde_json::to_writer(&mut *output, response)?;
    writeln!(output)?;
    output.flush()
}
