#![no_main]

use calculo::Engine;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u8, u16)| {
    let engine = Engine::new();
    let (depth, signs) = input;

    let depth = (depth as usize % 80) + 1;

    let mut expr = String::from("x");
    for _ in 0..depth {
        expr = format!("({} + 1)", expr);
    }
    let _ = engine.parse_expression(&expr);

    // Unary signs and exponent chains nest as deeply as parentheses
    let signs = signs as usize % 4000 + 1;
    let _ = engine.parse_expression(&format!("{}x", "-".repeat(signs)));
    let _ = engine.parse_expression(&format!("x{}", "**-x".repeat(signs / 4 + 1)));
});
