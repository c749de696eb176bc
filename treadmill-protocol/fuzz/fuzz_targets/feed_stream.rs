#![no_main]

use libfuzzer_sys::fuzz_target;
use treadmill_protocol::{FrameParser, Response};

fuzz_target!(|data: &[u8]| {
    let mut parser = FrameParser::new();
    for frame in parser.feed_all(data) {
        let _ = Response::from_frame(&frame);
    }
});
