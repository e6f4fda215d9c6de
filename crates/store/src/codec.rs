//! Binary codec for store files: bitcode, optional lz4, checksummed header.

use crate::file_header::{unwrap_header, wrap_with_header, FLAG_COMPRESSED};
use crate::store_error::StoreError;

/// Encode `value` into a complete store file image.
pub fn encode_document<T: bitcode::Encode + ?Sized>(value: &T, compress: bool) -> Vec<u8> {
    let encoded = bitcode::encode(value);
    if compress {
        let compressed = lz4_flex::compress_prepend_size(&encoded);
        wrap_with_header(&compressed, FLAG_COMPRESSED, encoded.len())
    } else {
        wrap_with_header(&encoded, 0, encoded.len())
    }
}

/// Decode a store file image produced by [`encode_document`].
///
/// Compression is read from the header flags, so compressed and plain files
/// can be mixed in one data directory.
pub fn decode_document<T: bitcode::DecodeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    let (header, payload) = unwrap_header(bytes)?;

    let raw;
    let encoded = if header.is_compressed() {
        raw = lz4_flex::decompress_size_prepended(payload)?;
        raw.as_slice()
    } else {
        payload
    };

    if encoded.len() != header.uncompressed_size as usize {
        return Err(StoreError::Corrupt(format!(
            "payload is {} bytes, header says {}",
            encoded.len(),
            header.uncompressed_size
        )));
    }

    Ok(bitcode::decode(encoded)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::LotDocument;
    use lot::{ParkingLot, Vehicle, VehicleKind};

    fn busy_document() -> LotDocument {
        let mut lot = ParkingLot::default();
        for i in 0..20 {
            let mut car = Vehicle::new(format!("CAR-{i}"), VehicleKind::Car);
            lot.park(&mut car).unwrap();
        }
        let mut doc = LotDocument::initial(lot.status());
        doc.revision = 20;
        doc
    }

    #[test]
    fn test_plain_roundtrip_matches_spot_states() {
        let doc = busy_document();
        let bytes = encode_document(&doc, false);
        let back: LotDocument = decode_document(&bytes).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_compressed_roundtrip() {
        let doc = busy_document();
        let plain = encode_document(&doc, false);
        let packed = encode_document(&doc, true);
        assert!(packed.len() < plain.len(), "lot documents are repetitive");
        let back: LotDocument = decode_document(&packed).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_garbage_payload_is_decode_error() {
        let bytes = wrap_with_header(&[0xFF; 3], 0, 3);
        let result: Result<LotDocument, _> = decode_document(&bytes);
        assert!(matches!(result, Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_size_mismatch_is_corrupt() {
        let encoded = bitcode::encode(&busy_document());
        let bytes = wrap_with_header(&encoded, 0, encoded.len() + 1);
        let result: Result<LotDocument, _> = decode_document(&bytes);
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }
}
