//! Branch-free expressions to rational functions

use crate::algebra::RationalFunction;
use crate::error::EngineError;
use crate::numeric::NumericError;
use crate::resource_limits::ResourceLimits;
use crate::semantic::{ArithmeticOperation, Expr};
use num_rational::BigRational;
use num_traits::ToPrimitive;

/// Convert an expression without `abs` or piecewise parts
pub fn to_rational_function(
    expr: &Expr,
    limits: &ResourceLimits,
) -> Result<RationalFunction, EngineError> {
    let converted = match expr {
        Expr::Number(n) => RationalFunction::constant(n.clone()),
        Expr::Symbol(v) => RationalFunction::variable(v),
        Expr::Negation(inner) => to_rational_function(inner, limits)?.neg(),
        Expr::Arithmetic(l, op, r) => {
            let lhs = to_rational_function(l, limits)?;
            match op {
                ArithmeticOperation::Add => lhs.add(&to_rational_function(r, limits)?),
                ArithmeticOperation::Subtract => lhs.sub(&to_rational_function(r, limits)?),
                ArithmeticOperation::Multiply => lhs.mul(&to_rational_function(r, limits)?),
                ArithmeticOperation::Divide => {
                    let rhs = to_rational_function(r, limits)?;
                    lhs.div(&rhs).map_err(|_| {
                        EngineError::Undefined(format!("division by zero in {}", expr))
                    })?
                }
                ArithmeticOperation::Power => {
                    let exponent = integer_exponent(r, limits)?;
                    power(&lhs, exponent, expr, limits)?
                }
            }
        }
        Expr::Abs(_) | Expr::Piecewise(_) => {
            return Err(EngineError::Unsupported(format!(
                "'{}' has branches that must be resolved before algebraic manipulation",
                expr
            )))
        }
    };
    check_degree(&converted, limits)?;
    Ok(converted)
}

/// The value of an exponent that must not depend on any variable
pub fn constant_exponent(
    exponent: &Expr,
    limits: &ResourceLimits,
) -> Result<BigRational, EngineError> {
    to_rational_function(exponent, limits)?
        .as_constant()
        .ok_or_else(|| {
            EngineError::Unsupported(format!("exponent '{}' depends on a variable", exponent))
        })
}

/// The exponent of a power as an integer
pub fn integer_exponent(exponent: &Expr, limits: &ResourceLimits) -> Result<i64, EngineError> {
    let value = constant_exponent(exponent, limits)?;
    if !value.is_integer() {
        return Err(EngineError::Unsupported(format!(
            "non-integer exponent '{}'",
            exponent
        )));
    }
    value.to_integer().to_i64().ok_or_else(|| {
        EngineError::ResourceLimit(format!("exponent '{}' is too large", exponent))
    })
}

fn power(
    base: &RationalFunction,
    exponent: i64,
    expr: &Expr,
    limits: &ResourceLimits,
) -> Result<RationalFunction, EngineError> {
    let base_degree = base
        .numerator()
        .total_degree()
        .max(base.denominator().total_degree());
    if exponent.unsigned_abs() > u64::from(limits.max_polynomial_degree)
        || u64::from(base_degree) * exponent.unsigned_abs()
            > u64::from(limits.max_polynomial_degree)
    {
        return Err(EngineError::ResourceLimit(format!(
            "'{}' exceeds the maximum polynomial degree of {}",
            expr, limits.max_polynomial_degree
        )));
    }
    base.powi(exponent).map_err(|err| match err {
        NumericError::DivisionByZero => {
            EngineError::Undefined(format!("zero raised to a negative power in {}", expr))
        }
        other => EngineError::Numeric(other),
    })
}

pub(crate) fn check_degree(function: &RationalFunction, limits: &ResourceLimits) -> Result<(), EngineError> {
    let degree = function
        .numerator()
        .total_degree()
        .max(function.denominator().total_degree());
    if degree > limits.max_polynomial_degree {
        return Err(EngineError::ResourceLimit(format!(
            "polynomial degree {} exceeds the maximum of {}",
            degree, limits.max_polynomial_degree
        )));
    }
    Ok(())
}
