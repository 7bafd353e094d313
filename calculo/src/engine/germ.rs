//! Local behaviour of a function next to a point
//!
//! Near a finite point `a`, a non-zero rational function behaves like
//! `c·(x - a)^k`; near `±∞` like `c·x^k`. That leading behaviour decides
//! one-sided limits and which branch of `abs` or a piecewise expression is
//! active on one side of the point. Expressions with radicals go through
//! their series expansion instead.

use super::convert::to_rational_function;
use super::radical::has_radicals;
use super::series::{leading, Leading};
use crate::algebra::{Polynomial, RationalFunction};
use crate::error::EngineError;
use crate::numeric::rational_sign;
use crate::resource_limits::ResourceLimits;
use crate::semantic::{Condition, Expr, Point, Variable};
use std::fmt;

/// Side of the approach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// From above, or towards +∞
    Above,
    /// From below, or towards -∞
    Below,
}

/// A punctured one-sided neighbourhood of a point
#[derive(Debug, Clone, Copy)]
pub struct Approach<'a> {
    pub variable: &'a Variable,
    pub point: &'a Point,
    pub side: Side,
}

impl Approach<'_> {
    /// Whether `t^k` is negative on this side for odd `k`
    fn flips_odd_powers(&self) -> bool {
        match self.point {
            Point::Finite(_) => self.side == Side::Below,
            Point::NegativeInfinity => true,
            Point::PositiveInfinity => false,
        }
    }
}

impl fmt::Display for Approach<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.point, self.side) {
            (Point::Finite(_), Side::Above) => {
                write!(f, "{} approaches {} from above", self.variable, self.point)
            }
            (Point::Finite(_), Side::Below) => {
                write!(f, "{} approaches {} from below", self.variable, self.point)
            }
            _ => write!(f, "{} approaches {}", self.variable, self.point),
        }
    }
}

/// Sign of an expression next to a point
#[derive(Debug, Clone)]
pub enum LocalSign {
    Known(i8),
    /// The sign is that of this expression in the remaining symbols
    Depends(Expr),
}

/// `f ~ coefficient · t^order` where `t = x - a` (finite) or `t = x` (infinite)
#[derive(Debug, Clone)]
pub struct Germ {
    pub order: i64,
    pub coefficient: RationalFunction,
}

/// Leading behaviour of `function`; `None` when it is identically zero
pub fn germ(function: &RationalFunction, approach: &Approach<'_>) -> Result<Option<Germ>, EngineError> {
    if function.is_zero() {
        return Ok(None);
    }
    let variable = approach.variable;
    let (numerator, denominator) = match approach.point {
        Point::Finite(a) => {
            let shifted = function.shift(variable, a);
            let numerator = lowest(shifted.numerator(), variable);
            let denominator = lowest(shifted.denominator(), variable);
            (numerator, denominator)
        }
        Point::PositiveInfinity | Point::NegativeInfinity => (
            highest(function.numerator(), variable),
            highest(function.denominator(), variable),
        ),
    };
    let (numerator_order, numerator_coefficient) = numerator;
    let (denominator_order, denominator_coefficient) = denominator;
    let coefficient = RationalFunction::new(numerator_coefficient, denominator_coefficient)?;
    Ok(Some(Germ {
        order: i64::from(numerator_order) - i64::from(denominator_order),
        coefficient,
    }))
}

fn lowest(polynomial: &Polynomial, variable: &Variable) -> (u32, Polynomial) {
    polynomial
        .lowest_in(variable)
        .unwrap_or_else(|| (0, Polynomial::zero()))
}

fn highest(polynomial: &Polynomial, variable: &Variable) -> (u32, Polynomial) {
    polynomial
        .highest_in(variable)
        .unwrap_or_else(|| (0, Polynomial::zero()))
}

/// Sign of the function on the approach side, next to the point; `None`
/// when the germ coefficient still depends on other symbols
pub fn germ_sign(germ: &Germ, approach: &Approach<'_>) -> Option<i8> {
    let sign = rational_sign(&germ.coefficient.as_constant()?);
    if germ.order % 2 != 0 && approach.flips_odd_powers() {
        Some(-sign)
    } else {
        Some(sign)
    }
}

fn local_sign(
    expr: &Expr,
    approach: &Approach<'_>,
    limits: &ResourceLimits,
) -> Result<LocalSign, EngineError> {
    let resolved = resolve_branches(expr, approach, limits)?;
    if has_radicals(&resolved, limits) {
        return match leading(&resolved, approach, limits)? {
            (Leading::Zero, _) => Ok(LocalSign::Known(0)),
            (Leading::Term { coefficient, .. }, field) => match field.sign(&coefficient)? {
                Some(sign) => Ok(LocalSign::Known(sign)),
                None => Ok(LocalSign::Depends(field.to_expr(&coefficient))),
            },
            (Leading::Vanishing, _) => Err(EngineError::Indeterminate(format!(
                "the sign of {} as {} could not be determined",
                resolved, approach
            ))),
        };
    }
    let function = to_rational_function(&resolved, limits)?;
    let Some(germ) = germ(&function, approach)? else {
        return Ok(LocalSign::Known(0));
    };
    if let Some(sign) = germ_sign(&germ, approach) {
        return Ok(LocalSign::Known(sign));
    }
    let coefficient = germ.coefficient.to_expr();
    if germ.order % 2 != 0 && approach.flips_odd_powers() {
        Ok(LocalSign::Depends(Expr::negate(coefficient)))
    } else {
        Ok(LocalSign::Depends(coefficient))
    }
}

/// Why a branch choice cannot be made: `subject` has the sign of `coefficient`
fn undetermined_sign(subject: &Expr, coefficient: &Expr) -> String {
    let symbols: Vec<String> = coefficient.symbols().iter().map(|s| s.to_string()).collect();
    if subject == coefficient {
        format!(
            "the sign of {} is not fixed (free symbols: {})",
            subject,
            symbols.join(", ")
        )
    } else {
        format!(
            "the sign of {} there is the sign of {}, which is not fixed (free symbols: {})",
            subject,
            coefficient,
            symbols.join(", ")
        )
    }
}

fn condition_holds(
    condition: &Condition,
    approach: &Approach<'_>,
    limits: &ResourceLimits,
) -> Result<bool, EngineError> {
    match condition {
        Condition::Always => Ok(true),
        Condition::Comparison(l, relation, r) => {
            let difference = Expr::sub(l.as_ref().clone(), r.as_ref().clone());
            match local_sign(&difference, approach, limits)? {
                LocalSign::Known(sign) => Ok(relation.holds(sign.cmp(&0))),
                LocalSign::Depends(coefficient) => Err(EngineError::Indeterminate(format!(
                    "cannot tell whether {} holds as {}: {}",
                    condition,
                    approach,
                    undetermined_sign(&difference, &coefficient)
                ))),
            }
        }
        Condition::And(a, b) => {
            Ok(condition_holds(a, approach, limits)? && condition_holds(b, approach, limits)?)
        }
        Condition::Or(a, b) => {
            Ok(condition_holds(a, approach, limits)? || condition_holds(b, approach, limits)?)
        }
    }
}

/// Replace every `abs` and piecewise part by the branch active on the approach side
pub fn resolve_branches(
    expr: &Expr,
    approach: &Approach<'_>,
    limits: &ResourceLimits,
) -> Result<Expr, EngineError> {
    match expr {
        Expr::Number(_) | Expr::Symbol(_) => Ok(expr.clone()),
        Expr::Arithmetic(l, op, r) => Ok(Expr::binary(
            resolve_branches(l, approach, limits)?,
            *op,
            resolve_branches(r, approach, limits)?,
        )),
        Expr::Negation(inner) => Ok(Expr::negate(resolve_branches(inner, approach, limits)?)),
        Expr::Abs(inner) => {
            let inner = resolve_branches(inner, approach, limits)?;
            match local_sign(&inner, approach, limits)? {
                LocalSign::Known(sign) if sign < 0 => Ok(Expr::negate(inner)),
                LocalSign::Known(_) => Ok(inner),
                LocalSign::Depends(coefficient) => Err(EngineError::Indeterminate(format!(
                    "cannot tell which branch of abs({}) applies as {}: {}",
                    inner,
                    approach,
                    undetermined_sign(&inner, &coefficient)
                ))),
            }
        }
        Expr::Piecewise(pw) => {
            for branch in &pw.branches {
                if condition_holds(&branch.condition, approach, limits)? {
                    return resolve_branches(&branch.value, approach, limits);
                }
            }
            Err(EngineError::Undefined(format!(
                "no branch of {} applies as {}",
                expr, approach
            )))
        }
    }
}
