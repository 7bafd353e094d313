use super::convert::to_rational_function;
use super::germ::{germ, germ_sign, resolve_branches, Approach, Side};
use super::radical::{has_radicals, RadicalField};
use super::series::{leading, Leading};
use crate::error::EngineError;
use crate::resource_limits::ResourceLimits;
use crate::semantic::{Direction, Expr, Point, Value, Variable};
use num_traits::{Signed, Zero};
use std::cmp::Ordering;
use tracing::{debug, trace};

pub fn limit(
    expr: &Expr,
    variable: &Variable,
    point: &Point,
    direction: Direction,
    limits: &ResourceLimits,
) -> Result<Value, EngineError> {
    let side = match (point, direction) {
        (Point::PositiveInfinity, _) => Side::Below,
        (Point::NegativeInfinity, _) => Side::Above,
        (Point::Finite(_), Direction::Right) => Side::Above,
        (Point::Finite(_), Direction::Left) => Side::Below,
        (Point::Finite(_), Direction::TwoSided) => {
            let right = one_sided(expr, variable, point, Side::Above, limits);
            let left = one_sided(expr, variable, point, Side::Below, limits);
            return match (right, left) {
                (Ok(right), Ok(left)) if same_value(&right, &left, limits) => Ok(right),
                (Ok(right), Ok(left)) => Err(EngineError::LimitDoesNotExist(format!(
                    "the limit of {} as {} -> {} from the left is {}, from the right {}",
                    expr, variable, point, left, right
                ))),
                // Only one side lies in the domain
                (Ok(value), Err(EngineError::Undefined(reason)))
                | (Err(EngineError::Undefined(reason)), Ok(value)) => {
                    debug!(%reason, "limit taken from the defined side");
                    Ok(value)
                }
                (Err(err), _) | (_, Err(err)) => Err(err),
            };
        }
    };
    one_sided(expr, variable, point, side, limits)
}

fn one_sided(
    expr: &Expr,
    variable: &Variable,
    point: &Point,
    side: Side,
    limits: &ResourceLimits,
) -> Result<Value, EngineError> {
    let approach = Approach {
        variable,
        point,
        side,
    };
    let resolved = resolve_branches(expr, &approach, limits)?;
    if has_radicals(&resolved, limits) {
        return expansion_limit(expr, &resolved, &approach, limits);
    }
    let function = to_rational_function(&resolved, limits)?;
    trace!(%resolved, ?side, "one-sided limit");

    let Some(germ) = germ(&function, &approach)? else {
        return Ok(Value::number(0));
    };
    let vanishes = match point {
        Point::Finite(_) => germ.order > 0,
        Point::PositiveInfinity | Point::NegativeInfinity => germ.order < 0,
    };
    if vanishes {
        return Ok(Value::number(0));
    }
    if germ.order == 0 {
        return Ok(Value::Finite(germ.coefficient.to_expr()));
    }
    // Unbounded: only the sign survives
    let sign = germ_sign(&germ, &approach).ok_or_else(|| {
        EngineError::Indeterminate(format!(
            "{} is unbounded as {} with a sign that depends on {}",
            expr,
            approach,
            germ.coefficient.to_expr()
        ))
    })?;
    match sign.cmp(&0) {
        Ordering::Greater => Ok(Value::PositiveInfinity),
        _ => Ok(Value::NegativeInfinity),
    }
}

/// One-sided limit from the leading term of a series expansion
fn expansion_limit(
    expr: &Expr,
    resolved: &Expr,
    approach: &Approach<'_>,
    limits: &ResourceLimits,
) -> Result<Value, EngineError> {
    trace!(%resolved, side = ?approach.side, "one-sided limit by expansion");
    let (leading, field) = leading(resolved, approach, limits)?;
    let (order, coefficient) = match leading {
        Leading::Zero | Leading::Vanishing => return Ok(Value::number(0)),
        Leading::Term { order, coefficient } => (order, coefficient),
    };
    if order.is_positive() {
        return Ok(Value::number(0));
    }
    if order.is_zero() {
        return Ok(Value::Finite(field.to_expr(&coefficient)));
    }
    match field.sign(&coefficient)? {
        Some(sign) if sign > 0 => Ok(Value::PositiveInfinity),
        Some(_) => Ok(Value::NegativeInfinity),
        None => Err(EngineError::Indeterminate(format!(
            "{} is unbounded as {} with a sign that depends on {}",
            expr,
            approach,
            field.to_expr(&coefficient)
        ))),
    }
}

/// Canonical equality of two computed values
pub fn same_value(a: &Value, b: &Value, limits: &ResourceLimits) -> bool {
    match (a, b) {
        (Value::PositiveInfinity, Value::PositiveInfinity)
        | (Value::NegativeInfinity, Value::NegativeInfinity) => true,
        (Value::Finite(x), Value::Finite(y)) => {
            canonical_difference(x, y, limits).unwrap_or(x == y)
        }
        _ => false,
    }
}

/// Whether `a - b` reduces to zero
fn canonical_difference(a: &Expr, b: &Expr, limits: &ResourceLimits) -> Result<bool, EngineError> {
    let mut field = RadicalField::new(limits);
    let a = field.convert(a)?;
    let b = field.convert(b)?;
    field.is_zero(&field.sub(&a, &b)?)
}
