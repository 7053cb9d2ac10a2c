//! Fuzz test for the persisted proposition record decoder.
//!
//! Whatever is on disk, decoding must return a record or a cache miss and
//! never panic. Decoded records must re-encode to a record that decodes to
//! the same mapping.
//!
//! Run with: cargo +nightly fuzz run record_fuzz -- -max_total_time=60

#![no_main]

use courier_core::StorageError;
use courier_storage::{decode_record, encode_record};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match decode_record(data) {
        Ok(record) => {
            let bytes = encode_record(&record.watermark, &record.propositions)
                .expect("decoded record re-encodes");
            let again = decode_record(&bytes).expect("re-encoded record decodes");
            assert_eq!(again.propositions, record.propositions);
            assert_eq!(again.watermark.generation, record.watermark.generation);
        }
        Err(err) => {
            assert!(
                matches!(err, StorageError::CacheMiss { .. }),
                "decode failures are cache misses, got {:?}",
                err
            );
        }
    }
});
