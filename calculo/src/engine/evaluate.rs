//! Exact evaluation at a real point
//!
//! `Ok(None)` means the expression is undefined there (division by zero,
//! zero to a negative power, a fractional power of a negative number, or no
//! applicable piecewise branch).

use crate::error::EngineError;
use crate::numeric::{NumericError, RealNumber};
use crate::semantic::{ArithmeticOperation, Condition, Expr, Variable};
use num_traits::ToPrimitive;

/// Value for the single free variable, if any
pub type Binding<'a> = Option<(&'a Variable, &'a RealNumber)>;

pub fn evaluate(expr: &Expr, binding: Binding<'_>) -> Result<Option<RealNumber>, EngineError> {
    match expr {
        Expr::Number(n) => Ok(Some(RealNumber::from_rational(n.clone()))),
        Expr::Symbol(v) => match binding {
            Some((variable, value)) if variable == v => Ok(Some(value.clone())),
            _ => Err(EngineError::Unsupported(format!(
                "cannot evaluate the free symbol '{}'",
                v
            ))),
        },
        Expr::Negation(inner) => Ok(evaluate(inner, binding)?.map(|v| v.neg())),
        Expr::Abs(inner) => Ok(evaluate(inner, binding)?.map(|v| v.abs())),
        Expr::Arithmetic(l, op, r) => {
            let Some(lhs) = evaluate(l, binding)? else {
                return Ok(None);
            };
            let Some(rhs) = evaluate(r, binding)? else {
                return Ok(None);
            };
            let result = match op {
                ArithmeticOperation::Add => lhs.checked_add(&rhs),
                ArithmeticOperation::Subtract => lhs.checked_sub(&rhs),
                ArithmeticOperation::Multiply => lhs.checked_mul(&rhs),
                ArithmeticOperation::Divide => lhs.checked_div(&rhs),
                ArithmeticOperation::Power => {
                    let (numerator, root) = rational_power(&rhs, r)?;
                    // Fractional powers are real only for non-negative bases
                    if root > 1 && lhs.signum() < 0 {
                        return Ok(None);
                    }
                    match lhs.root(root)? {
                        Some(base) => base.powi(numerator),
                        None => return Ok(None),
                    }
                }
            };
            match result {
                Ok(value) => Ok(Some(value)),
                Err(NumericError::DivisionByZero) => Ok(None),
                Err(err) => Err(err.into()),
            }
        }
        Expr::Piecewise(pw) => {
            for branch in &pw.branches {
                match evaluate_condition(&branch.condition, binding)? {
                    Some(true) => return evaluate(&branch.value, binding),
                    Some(false) => continue,
                    None => return Ok(None),
                }
            }
            Ok(None)
        }
    }
}

/// `Ok(None)` when an operand of a comparison is undefined
pub fn evaluate_condition(
    condition: &Condition,
    binding: Binding<'_>,
) -> Result<Option<bool>, EngineError> {
    match condition {
        Condition::Always => Ok(Some(true)),
        Condition::Comparison(l, relation, r) => {
            let (Some(lhs), Some(rhs)) = (evaluate(l, binding)?, evaluate(r, binding)?) else {
                return Ok(None);
            };
            Ok(Some(relation.holds(lhs.cmp(&rhs))))
        }
        Condition::And(a, b) => match evaluate_condition(a, binding)? {
            Some(false) => Ok(Some(false)),
            Some(true) => evaluate_condition(b, binding),
            None => Ok(None),
        },
        Condition::Or(a, b) => match evaluate_condition(a, binding)? {
            Some(true) => Ok(Some(true)),
            Some(false) => evaluate_condition(b, binding),
            None => Ok(None),
        },
    }
}

/// `p/q` in lowest terms as `(p, q)`
fn rational_power(exponent: &RealNumber, expr: &Expr) -> Result<(i64, u32), EngineError> {
    let exponent = exponent
        .as_rational()
        .ok_or_else(|| EngineError::Unsupported(format!("irrational exponent '{}'", expr)))?;
    let numerator = exponent.numer().to_i64();
    let root = exponent.denom().to_u32();
    match (numerator, root) {
        (Some(numerator), Some(root)) => Ok((numerator, root)),
        _ => Err(EngineError::ResourceLimit(format!(
            "exponent '{}' is too large",
            expr
        ))),
    }
}
