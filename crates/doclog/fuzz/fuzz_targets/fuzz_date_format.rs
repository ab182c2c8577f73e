#![no_main]

//! Fuzz target for bucket date formats
//!
//! Any pattern accepted by `DateFormat::new` must format every commit time
//! without panicking.

use arbitrary::Arbitrary;
use chrono::{DateTime, FixedOffset};
use libfuzzer_sys::fuzz_target;

use doclog::period::DateFormat;

#[derive(Arbitrary, Debug)]
struct Input {
    pattern: String,
    epoch: i64,
    offset_secs: i32,
}

fuzz_target!(|input: Input| {
    let Ok(format) = DateFormat::new(&input.pattern) else {
        return;
    };
    let Some(offset) = FixedOffset::east_opt(input.offset_secs % 86_400) else {
        return;
    };
    let Some(at) = DateTime::from_timestamp(input.epoch, 0) else {
        return;
    };
    let _ = format.bucket_key(&at.with_timezone(&offset));
});
