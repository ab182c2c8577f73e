#![no_main]

use doclog_docs::resolve_public_url;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(path) = std::str::from_utf8(data) {
        if let Ok(url) = resolve_public_url(path, "docs", "https://example.com") {
            assert!(url.starts_with("https://example.com"));
        }
    }
});
