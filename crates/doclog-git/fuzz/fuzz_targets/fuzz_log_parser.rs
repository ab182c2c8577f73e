#![no_main]

use doclog_git::parse_log;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // Malformed input must surface as an error, never a panic
        if let Ok(groups) = parse_log(text) {
            for group in &groups {
                for change in &group.changes {
                    let _ = change.net_change();
                }
            }
        }
    }
});
