#![no_main]

use doclog_docs::{extract_front_matter, parse_front_matter};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Some(yaml) = extract_front_matter(content) {
            assert!(yaml.len() <= content.len());
        }
        let _ = parse_front_matter(content);
    }
});
