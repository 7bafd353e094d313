use crate::ast::Span;
use crate::error::CalcError;
use crate::numeric::rational_from_decimal;
use crate::parser::Rule;
use crate::semantic::Point;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use pest::iterators::Pair;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

/// Exact value of a number literal such as `3`, `0.25`, `.5` or `2.`
pub(crate) fn parse_number(pair: &Pair<Rule>, source: &Arc<str>) -> Result<BigRational, CalcError> {
    let text = pair.as_str();
    let normalised = match (text.starts_with('.'), text.ends_with('.')) {
        (true, _) => format!("0{}", text),
        (false, true) => text.trim_end_matches('.').to_string(),
        _ => text.to_string(),
    };
    if let Ok(decimal) = Decimal::from_str(&normalised) {
        return Ok(rational_from_decimal(&decimal));
    }
    // Beyond the 96-bit mantissa of Decimal
    parse_big_decimal(&normalised).ok_or_else(|| {
        CalcError::parse(
            format!("Invalid number: '{}'", text),
            Span::from_pest_span(pair.as_span()),
            "<input>",
            source.clone(),
        )
    })
}

fn parse_big_decimal(text: &str) -> Option<BigRational> {
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    let digits = format!("{}{}", whole, fraction);
    let mantissa = BigInt::from_str(&digits).ok()?;
    let scale = u32::try_from(fraction.len()).ok()?;
    Some(BigRational::new(mantissa, BigInt::from(10u32).pow(scale)))
}

pub(crate) fn parse_point(pair: Pair<Rule>, source: &Arc<str>) -> Result<Point, CalcError> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| CalcError::Engine("Empty point".to_string()))?;
    match inner.as_rule() {
        Rule::infinity => {
            let negative = inner
                .clone()
                .into_inner()
                .any(|p| p.as_rule() == Rule::sign && p.as_str() == "-");
            Ok(if negative {
                Point::NegativeInfinity
            } else {
                Point::PositiveInfinity
            })
        }
        Rule::signed_rational => parse_signed_rational(inner, source).map(Point::Finite),
        other => Err(CalcError::Engine(format!(
            "Unexpected point structure: {:?}",
            other
        ))),
    }
}

/// `[sign] number ["/" [sign] number]`
fn parse_signed_rational(pair: Pair<Rule>, source: &Arc<str>) -> Result<BigRational, CalcError> {
    let span = Span::from_pest_span(pair.as_span());
    let mut sign = BigRational::one();
    let mut parts = Vec::with_capacity(2);
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::sign if inner.as_str() == "-" => sign = -sign,
            Rule::sign => {}
            Rule::number => parts.push(parse_number(&inner, source)?),
            _ => {}
        }
    }
    let mut parts = parts.into_iter();
    let numerator = parts
        .next()
        .ok_or_else(|| CalcError::Engine("Missing numerator".to_string()))?;
    let value = match parts.next() {
        Some(denominator) if denominator.is_zero() => {
            return Err(CalcError::parse(
                "Division by zero in point",
                span,
                "<input>",
                source.clone(),
            ))
        }
        Some(denominator) => numerator / denominator,
        None => numerator,
    };
    Ok(sign * value)
}
