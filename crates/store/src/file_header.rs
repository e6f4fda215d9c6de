// ---------------------------------------------------------------------------
// file_header – Store file header with magic bytes, version, and checksum
// ---------------------------------------------------------------------------
//
// Header format (28 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "PARK" (0x5041524B)
//   [4..8]   Format version (u32)
//   [8..12]  Flags (u32: bit 0 = lz4 compressed)
//   [12..20] Timestamp of the write (Unix epoch, u64)
//   [20..24] Uncompressed payload size (u32)
//   [24..28] xxHash32 checksum of the payload as stored (after compression)
//
// On write: encode document -> maybe compress -> prepend header
// On read:  check magic -> check version -> validate checksum -> strip header

use xxhash_rust::xxh32::xxh32;

use crate::store_error::StoreError;

/// Magic bytes identifying a parking store file.
pub const MAGIC: [u8; 4] = *b"PARK";

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 28;

/// Current header layout version.
pub const HEADER_FORMAT_VERSION: u32 = 1;

/// Flag bit: payload is lz4 compressed with a prepended size.
pub const FLAG_COMPRESSED: u32 = 1;

const XXHASH_SEED: u32 = 0;

/// Parsed file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub format_version: u32,
    pub flags: u32,
    pub timestamp: u64,
    pub uncompressed_size: u32,
    pub checksum: u32,
}

impl FileHeader {
    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }
}

/// Prepend a header to `payload`.
///
/// `uncompressed_size` is the encoded document size before compression; it
/// equals `payload.len()` when `flags` has no compression bit.
pub fn wrap_with_header(payload: &[u8], flags: u32, uncompressed_size: usize) -> Vec<u8> {
    let header = FileHeader {
        format_version: HEADER_FORMAT_VERSION,
        flags,
        timestamp: crate::documents::unix_now(),
        uncompressed_size: uncompressed_size as u32,
        checksum: xxh32(payload, XXHASH_SEED),
    };

    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&header.format_version.to_le_bytes());
    out.extend_from_slice(&header.flags.to_le_bytes());
    out.extend_from_slice(&header.timestamp.to_le_bytes());
    out.extend_from_slice(&header.uncompressed_size.to_le_bytes());
    out.extend_from_slice(&header.checksum.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Parse and validate the header, returning it with the payload slice.
///
/// # Errors
///
/// - `Corrupt` if the magic is missing, the file is shorter than a header,
///   or the checksum does not match.
/// - `VersionMismatch` if the header comes from a newer build.
pub fn unwrap_header(bytes: &[u8]) -> Result<(FileHeader, &[u8]), StoreError> {
    if bytes.len() < 4 || bytes[..4] != MAGIC {
        return Err(StoreError::Corrupt(
            "missing PARK magic bytes; not a parking store file".to_string(),
        ));
    }
    if bytes.len() < HEADER_SIZE {
        return Err(StoreError::Corrupt(format!(
            "file is too short ({} bytes, need at least {} for header)",
            bytes.len(),
            HEADER_SIZE
        )));
    }

    let format_version = read_u32(bytes, 4);
    let flags = read_u32(bytes, 8);
    let mut timestamp = [0u8; 8];
    timestamp.copy_from_slice(&bytes[12..20]);
    let timestamp = u64::from_le_bytes(timestamp);
    let uncompressed_size = read_u32(bytes, 20);
    let checksum = read_u32(bytes, 24);

    if format_version > HEADER_FORMAT_VERSION {
        return Err(StoreError::VersionMismatch {
            expected_max: HEADER_FORMAT_VERSION,
            found: format_version,
        });
    }

    let payload = &bytes[HEADER_SIZE..];
    let computed = xxh32(payload, XXHASH_SEED);
    if computed != checksum {
        return Err(StoreError::Corrupt(format!(
            "checksum mismatch (expected {:#010X}, got {:#010X})",
            checksum, computed
        )));
    }

    Ok((
        FileHeader {
            format_version,
            flags,
            timestamp,
            uncompressed_size,
            checksum,
        },
        payload,
    ))
}
