#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = calculo::parse_point(s);
        let _ = calculo::parse_relation(s);
        let _ = calculo::parse_variable(s);
    }
});
