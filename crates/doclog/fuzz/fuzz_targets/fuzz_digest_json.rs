#![no_main]

//! Fuzz target for digest deserialization
//!
//! Arbitrary JSON must either be rejected or produce a digest that
//! re-serializes and flattens into feed items without panicking.

use libfuzzer_sys::fuzz_target;

use doclog::Digest;

fuzz_target!(|data: &[u8]| {
    if let Ok(digest) = serde_json::from_slice::<Digest>(data) {
        let _ = serde_json::to_string(&digest);
        let items = digest.feed_items();
        assert_eq!(items.len(), digest.entry_count());
    }
});
