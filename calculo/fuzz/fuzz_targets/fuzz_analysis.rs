#![no_main]

use calculo::{limit_at, sign_study, Engine, ErrorKind, Point, Variable};
use libfuzzer_sys::fuzz_target;

// An EngineFault means the engine panicked
fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let engine = Engine::new();
    let Ok(expr) = engine.parse_expression(s) else {
        return;
    };
    let x = Variable::new("x");

    if let Err(failure) = sign_study(&engine, &expr, &x) {
        assert_ne!(failure.kind, ErrorKind::EngineFault, "{}", failure.message);
    }
    for point in [Point::integer(0), Point::PositiveInfinity] {
        if let Err(failure) = limit_at(&engine, &expr, &x, &point) {
            assert_ne!(failure.kind, ErrorKind::EngineFault, "{}", failure.message);
        }
    }
});
