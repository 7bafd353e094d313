#![no_main]

use calculo::{parse_expression, ResourceLimits};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_expression(s, &ResourceLimits::default());
    }
});
