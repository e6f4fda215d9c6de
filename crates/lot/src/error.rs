// ---------------------------------------------------------------------------
// LotError: failures raised by the in-memory allocation model
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors raised by the allocation model.
///
/// "No run found" is not an error at this layer; searches return `None` and
/// the caller decides how to surface it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LotError {
    /// A vehicle type string that is not `Car`, `Motorcycle` or `Bus`.
    UnknownVehicleKind(String),
    /// The model reached a state that a correct caller can never produce:
    /// occupying a spot that is taken, freeing a spot that is empty, or
    /// syncing from a document whose counters disagree with its spots.
    InternalConsistency(String),
    /// Zero levels, zero spots or zero-width rows.
    InvalidTopology(String),
}

impl fmt::Display for LotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LotError::UnknownVehicleKind(kind) => write!(f, "Unknown vehicle type: {kind}"),
            LotError::InternalConsistency(msg) => write!(f, "Internal consistency fault: {msg}"),
            LotError::InvalidTopology(msg) => write!(f, "Invalid lot topology: {msg}"),
        }
    }
}

impl std::error::Error for LotError {}
