//! Binary format of the persisted proposition record.
//!
//! ```text
//! [generation: u64 LE][cached_at millis: i64 LE][sha256(body): 32 bytes][body: JSON]
//! ```
//!
//! The body is a JSON object from surface URI to the array of proposition
//! event data for that surface. Surfaces are written in URI order so equal
//! maps encode to equal bytes.

use std::collections::BTreeMap;

use chrono::DateTime;
use courier_core::{
    compute_content_hash, Proposition, PropositionMap, StorageError, Surface,
};

use super::watermark::Watermark;

const GENERATION_LEN: usize = 8;
const TIMESTAMP_LEN: usize = 8;
const HASH_LEN: usize = 32;

/// Length of the fixed header preceding the JSON body.
pub const HEADER_LEN: usize = GENERATION_LEN + TIMESTAMP_LEN + HASH_LEN;

/// A decoded persisted record.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedPropositions {
    pub watermark: Watermark,
    pub propositions: PropositionMap,
}

/// Encode a mapping and its watermark into record bytes.
pub fn encode_record(
    watermark: &Watermark,
    propositions: &PropositionMap,
) -> Result<Vec<u8>, StorageError> {
    let ordered: BTreeMap<&Surface, &Vec<Proposition>> = propositions.iter().collect();
    let body = serde_json::to_vec(&ordered).map_err(|e| StorageError::PersistenceFailure {
        reason: format!("failed to serialize propositions: {}", e),
    })?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(&watermark.generation.to_le_bytes());
    bytes.extend_from_slice(&watermark.observed_at.timestamp_millis().to_le_bytes());
    bytes.extend_from_slice(&compute_content_hash(&body));
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode record bytes. Any malformation is reported as a cache miss.
pub fn decode_record(bytes: &[u8]) -> Result<PersistedPropositions, StorageError> {
    if bytes.len() < HEADER_LEN {
        return Err(miss(format!(
            "record is {} bytes, shorter than the {} byte header",
            bytes.len(),
            HEADER_LEN
        )));
    }

    let (generation_bytes, rest) = bytes.split_at(GENERATION_LEN);
    let (timestamp_bytes, rest) = rest.split_at(TIMESTAMP_LEN);
    let (hash, body) = rest.split_at(HASH_LEN);

    let generation = u64::from_le_bytes(
        generation_bytes
            .try_into()
            .map_err(|_| miss("invalid generation".to_string()))?,
    );
    let millis = i64::from_le_bytes(
        timestamp_bytes
            .try_into()
            .map_err(|_| miss("invalid timestamp".to_string()))?,
    );
    let observed_at = DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| miss(format!("timestamp {} out of range", millis)))?;

    if compute_content_hash(body).as_slice() != hash {
        return Err(miss("checksum mismatch".to_string()));
    }

    let propositions: PropositionMap = serde_json::from_slice(body)
        .map_err(|e| miss(format!("failed to deserialize propositions: {}", e)))?;

    Ok(PersistedPropositions {
        watermark: Watermark::with_timestamp(generation, observed_at),
        propositions,
    })
}

fn miss(reason: String) -> StorageError {
    StorageError::CacheMiss { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_map() -> PropositionMap {
        let surface = Surface::with_path("app", "home").unwrap();
        let proposition = Proposition::from_event_data(json!({
            "id": "p-1",
            "scope": surface.uri(),
            "scopeDetails": { "activity": { "id": "a" } },
            "items": [{ "id": "i-1", "schema": "https://example.com/s", "data": { "b": 1, "a": 2 } }]
        }))
        .unwrap();
        let mut map = PropositionMap::new();
        map.insert(surface, vec![proposition]);
        map
    }

    #[test]
    fn test_encode_decode() {
        let watermark = Watermark::new(7);
        let bytes = encode_record(&watermark, &sample_map()).unwrap();
        let decoded = decode_record(&bytes).unwrap();
        assert_eq!(decoded.propositions, sample_map());
        assert_eq!(decoded.watermark.generation, 7);
        assert_eq!(
            decoded.watermark.observed_at.timestamp_millis(),
            watermark.observed_at.timestamp_millis()
        );
    }

    #[test]
    fn test_short_record_is_miss() {
        let result = decode_record(&[1, 2, 3]);
        assert!(matches!(result, Err(StorageError::CacheMiss { .. })));
    }

    #[test]
    fn test_flipped_body_byte_is_miss() {
        let mut bytes = encode_record(&Watermark::new(1), &sample_map()).unwrap();
        let last = bytes.len() - 2;
        bytes[last] ^= 0x55;
        let result = decode_record(&bytes);
        assert!(matches!(result, Err(StorageError::CacheMiss { reason }) if reason.contains("checksum")));
    }

    #[test]
    fn test_valid_checksum_bad_json_is_miss() {
        let body = b"{not json";
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&0i64.to_le_bytes());
        bytes.extend_from_slice(&compute_content_hash(body));
        bytes.extend_from_slice(body);
        assert!(matches!(
            decode_record(&bytes),
            Err(StorageError::CacheMiss { .. })
        ));
    }

    #[test]
    fn test_equal_maps_encode_identically() {
        let watermark = Watermark::with_timestamp(3, DateTime::UNIX_EPOCH);
        let mut map = sample_map();
        map.insert(Surface::with_path("app", "feed").unwrap(), Vec::new());
        let a = encode_record(&watermark, &map).unwrap();
        let b = encode_record(&watermark, &map.clone()).unwrap();
        assert_eq!(a, b);
    }
}
