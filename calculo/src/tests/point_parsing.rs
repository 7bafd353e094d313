use crate::parser::parse_point;
use crate::semantic::Point;
use num_bigint::BigInt;
use num_rational::BigRational;

fn finite(n: i64, d: i64) -> Point {
    Point::Finite(BigRational::new(BigInt::from(n), BigInt::from(d)))
}

#[test]
fn test_numbers_and_fractions() {
    assert_eq!(parse_point("2").unwrap(), Point::integer(2));
    assert_eq!(parse_point("-3").unwrap(), Point::integer(-3));
    assert_eq!(parse_point("1/2").unwrap(), finite(1, 2));
    assert_eq!(parse_point(" -1/-4 ").unwrap(), finite(1, 4));
    assert_eq!(parse_point("0.25").unwrap(), finite(1, 4));
}

#[test]
fn test_infinities() {
    for input in ["oo", "+oo", "inf", "Infinity", "∞"] {
        assert_eq!(parse_point(input).unwrap(), Point::PositiveInfinity, "{}", input);
    }
    for input in ["-oo", "-inf", "-∞"] {
        assert_eq!(parse_point(input).unwrap(), Point::NegativeInfinity, "{}", input);
    }
}

#[test]
fn test_invalid_points() {
    for input in ["", "x", "1/0", "2 + 1", "oo/2"] {
        assert!(parse_point(input).is_err(), "{:?} should not parse", input);
    }
}

#[test]
fn test_display() {
    assert_eq!(Point::PositiveInfinity.to_string(), "oo");
    assert_eq!(Point::NegativeInfinity.to_string(), "-oo");
    assert_eq!(finite(-1, 2).to_string(), "-1/2");
}
