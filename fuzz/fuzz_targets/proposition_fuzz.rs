//! Fuzz test for proposition event data validation.
//!
//! Arbitrary JSON must either be rejected with a validation error or yield a
//! proposition whose accessors and content-card parsing do not panic.
//!
//! Run with: cargo +nightly fuzz run proposition_fuzz -- -max_total_time=60

#![no_main]

use courier_core::Proposition;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    if let Ok(proposition) = Proposition::from_event_data(value) {
        assert!(!proposition.id().is_empty());
        let _ = proposition.surface();
        for item in proposition.items() {
            let _ = item.schema();
            let _ = item.expires_at();
            let _ = item.content_card();
        }
        // Serialized form re-validates.
        assert!(Proposition::from_event_data(proposition.to_event_data()).is_ok());
    }
});
