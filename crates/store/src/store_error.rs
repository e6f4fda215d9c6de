// ---------------------------------------------------------------------------
// StoreError: proper error types for persisted-store operations
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors that can occur while reading or writing persisted documents.
#[derive(Debug)]
pub enum StoreError {
    /// I/O error (file not found, permission denied, disk full, etc.)
    Io(std::io::Error),
    /// Decoding failed (bitcode or lz4).
    Decode(String),
    /// The file header is malformed or the checksum does not match.
    Corrupt(String),
    /// File was written by a newer build.
    VersionMismatch { expected_max: u32, found: u32 },
    /// A conditional lot write lost the race: the stored revision moved on
    /// since it was read.
    RevisionConflict { expected: u64, found: u64 },
    /// The lot document was expected but has not been created yet.
    MissingLot,
    /// The backend cannot be reached at all.
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {e}"),
            StoreError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            StoreError::Corrupt(msg) => write!(f, "Corrupt store file: {msg}"),
            StoreError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: file is v{found}, but this build only supports up to v{expected_max}"
            ),
            StoreError::RevisionConflict { expected, found } => write!(
                f,
                "Revision conflict: expected lot revision {expected}, found {found}"
            ),
            StoreError::MissingLot => write!(f, "Lot document has not been set up"),
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<bitcode::Error> for StoreError {
    fn from(e: bitcode::Error) -> Self {
        StoreError::Decode(e.to_string())
    }
}

impl From<lz4_flex::block::DecompressError> for StoreError {
    fn from(e: lz4_flex::block::DecompressError) -> Self {
        StoreError::Decode(format!("lz4: {e}"))
    }
}
